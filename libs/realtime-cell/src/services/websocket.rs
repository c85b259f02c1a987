use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::PatientStatus;

use crate::error::RealtimeError;
use crate::models::{Channel, ClientCommand, RealtimeState};

/// Drive one websocket connection: pump hub messages out, parse client
/// commands in, and tear every membership down when the socket closes.
pub async fn handle_socket(state: std::sync::Arc<RealtimeState>, socket: WebSocket) {
    let session_id = Uuid::new_v4();
    let mut outbound = state.hub.register(session_id).await;
    let (mut sender, mut receiver) = socket.split();

    info!("Realtime session {} connected", session_id);

    loop {
        tokio::select! {
            queued = outbound.recv() => {
                match queued {
                    Some(message) => {
                        if sender.send(Message::Text(message.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_command(&state, session_id, text.as_str()).await {
                            debug!("Command from session {} failed: {}", session_id, e);
                            state
                                .hub
                                .emit_to_session(
                                    session_id,
                                    "error",
                                    json!({ "message": e.to_string() }),
                                )
                                .await;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("Websocket error on session {}: {}", session_id, e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // Implicit membership teardown on session termination.
    state.registry.leave_all(session_id).await;
    state.hub.unregister(session_id).await;
    info!("Realtime session {} disconnected", session_id);
}

async fn handle_command(
    state: &RealtimeState,
    session_id: Uuid,
    raw: &str,
) -> Result<(), RealtimeError> {
    let command: ClientCommand = serde_json::from_str(raw)
        .map_err(|e| RealtimeError::ValidationError(format!("invalid command: {}", e)))?;

    match command {
        ClientCommand::JoinDoctorQueue { doctor_id } => {
            state.registry.join_doctor(session_id, &doctor_id).await?;
            // Fresh snapshot so a reconnecting dashboard does not wait for
            // the next change. Best-effort: the join itself only requires a
            // non-empty id.
            if let Ok(queue) = state.orchestrator.queue_snapshot(&doctor_id).await {
                state
                    .hub
                    .emit_to_session(session_id, "queueChanged", json!({ "queue": queue }))
                    .await;
            }
        }
        ClientCommand::JoinPatientQueue { patient_id } => {
            state.registry.join_patient(session_id, &patient_id).await?;
        }
        ClientCommand::LeaveRoom { channel } => {
            let channel = Channel::parse(&channel).ok_or_else(|| {
                RealtimeError::ValidationError(format!("unknown channel: {}", channel))
            })?;
            state.registry.leave(session_id, &channel).await;
        }
        ClientCommand::StartConsultation { patient_id } => {
            let patient_id = authorize_for_patient(state, session_id, &patient_id).await?;
            state
                .orchestrator
                .transition(patient_id, PatientStatus::Consulting, None)
                .await?;
        }
        ClientCommand::CompleteConsultation { patient_id } => {
            let patient_id = authorize_for_patient(state, session_id, &patient_id).await?;
            state
                .orchestrator
                .transition(patient_id, PatientStatus::Completed, None)
                .await?;
        }
        ClientCommand::RemovePatient { patient_id, reason } => {
            let patient_id = authorize_for_patient(state, session_id, &patient_id).await?;
            state.orchestrator.remove(patient_id, reason).await?;
        }
        ClientCommand::UpdateDoctorAvailability { is_available } => {
            let doctor_id = state
                .registry
                .doctor_binding(session_id)
                .await
                .ok_or_else(|| {
                    RealtimeError::Unauthorized(
                        "availability updates require a doctor session".to_string(),
                    )
                })?;
            state.doctors.set_availability(&doctor_id, is_available).await?;
        }
    }

    Ok(())
}

/// Resolve the patient and require the session to be bound as that patient's
/// doctor.
async fn authorize_for_patient(
    state: &RealtimeState,
    session_id: Uuid,
    patient_id_raw: &str,
) -> Result<Uuid, RealtimeError> {
    let patient_id: Uuid = patient_id_raw.parse().map_err(|_| {
        RealtimeError::ValidationError(format!("malformed patient id: {}", patient_id_raw))
    })?;

    let entry = state
        .store
        .get_patient(patient_id)
        .await?
        .ok_or_else(|| RealtimeError::PatientNotFound(patient_id.to_string()))?;

    state
        .registry
        .authorize_doctor(session_id, &entry.doctor_id)
        .await?;
    Ok(patient_id)
}
