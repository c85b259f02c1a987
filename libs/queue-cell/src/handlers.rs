use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_models::{AppError, PatientStatus};

use crate::models::{
    ClearQueueRequest, JoinQueueRequest, RemovePatientParams, UpdateStatusRequest,
    CLEAR_QUEUE_CONFIRMATION,
};
use crate::QueueOrchestrator;

fn parse_status(raw: &str) -> Result<PatientStatus, AppError> {
    raw.parse::<PatientStatus>()
        .map_err(AppError::ValidationError)
}

/// Enqueue a patient into a doctor's queue
pub async fn join_queue(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
    Json(request): Json<JoinQueueRequest>,
) -> Result<Json<Value>, AppError> {
    info!(
        "Queue join request for doctor {} ({})",
        request.doctor_id, request.patient_name
    );

    let (entry, position) = orchestrator
        .enqueue(&request.doctor_id, &request.patient_name)
        .await?;

    Ok(Json(json!({
        "success": true,
        "patient": entry,
        "position": position,
    })))
}

/// Current position and wait estimate for one patient
pub async fn get_patient_position(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let position = orchestrator.position(patient_id).await?;

    Ok(Json(json!({
        "patient_id": position.patient_id,
        "status": position.status,
        "position": position.position,
        "estimated_wait_minutes": position.estimated_wait_minutes,
    })))
}

/// Apply a status change to a patient
pub async fn update_patient_status(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let status = parse_status(&request.status)?;
    info!("Status update request: patient {} -> {}", patient_id, status);

    let entry = orchestrator
        .transition(patient_id, status, request.reason)
        .await?;

    Ok(Json(json!({
        "success": true,
        "patient": entry,
    })))
}

/// Remove a patient from the queue
pub async fn remove_patient(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<RemovePatientParams>,
) -> Result<Json<Value>, AppError> {
    info!("Remove request for patient {}", patient_id);

    let removed = orchestrator.remove(patient_id, params.reason).await?;

    Ok(Json(json!({
        "success": true,
        "patient_id": removed.id,
    })))
}

/// Full queue snapshot for a doctor, plus the wait a new arrival would face
pub async fn get_doctor_queue(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let queue = orchestrator.queue_snapshot(&doctor_id).await?;
    let new_arrival_wait = orchestrator
        .estimated_wait_for_new_arrival(&doctor_id)
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "queue": queue,
        "estimated_wait_for_new_arrival_minutes": new_arrival_wait,
    })))
}

/// Emergency/administrative bulk clear, gated by a confirmation token
pub async fn clear_doctor_queue(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<ClearQueueRequest>,
) -> Result<Json<Value>, AppError> {
    if request.confirm != CLEAR_QUEUE_CONFIRMATION {
        return Err(AppError::BadRequest(format!(
            "Queue clear requires confirm: \"{}\"",
            CLEAR_QUEUE_CONFIRMATION
        )));
    }
    if request.reason.trim().is_empty() {
        return Err(AppError::ValidationError(
            "A justification is required to clear a queue".to_string(),
        ));
    }

    let status = match &request.status {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    info!(
        "Clearing doctor {} queue (filter {:?}): {}",
        doctor_id, status, request.reason
    );
    let removed = orchestrator.clear_queue(&doctor_id, status).await?;

    Ok(Json(json!({
        "success": true,
        "removed_count": removed,
    })))
}

/// Aggregate statistics for the dashboard
pub async fn get_dashboard_stats(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
) -> Result<Json<Value>, AppError> {
    let stats = orchestrator.dashboard_stats().await?;
    Ok(Json(json!(stats)))
}

/// Trigger a retention cleanup pass
pub async fn run_cleanup(
    State(orchestrator): State<Arc<QueueOrchestrator>>,
) -> Result<Json<Value>, AppError> {
    let removed = orchestrator.cleanup_stale().await?;

    Ok(Json(json!({
        "success": true,
        "removed_count": removed,
    })))
}
