use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::{get_websocket_info, ws_handler};
use crate::models::RealtimeState;

pub fn create_realtime_router(state: Arc<RealtimeState>) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/info", get(get_websocket_info))
        .with_state(state)
}
