use std::sync::Arc;

use axum::{
    extract::{State, WebSocketUpgrade},
    response::{Json, Response},
};
use serde_json::{json, Value};

use shared_models::AppError;

use crate::models::RealtimeState;
use crate::services::websocket::handle_socket;

/// Upgrade to a realtime session
pub async fn ws_handler(
    State(state): State<Arc<RealtimeState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Describe the realtime protocol for clients
pub async fn get_websocket_info(
    State(_state): State<Arc<RealtimeState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "endpoint": "/ws",
        "message_format": {
            "outbound": "{\"event\": name, \"data\": payload, \"timestamp\": rfc3339}",
            "inbound": "{\"action\": name, ...fields}"
        },
        "actions": [
            "joinDoctorQueue",
            "joinPatientQueue",
            "leaveRoom",
            "startConsultation",
            "completeConsultation",
            "removePatient",
            "updateDoctorAvailability"
        ]
    })))
}
