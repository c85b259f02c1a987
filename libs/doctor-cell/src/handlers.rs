use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_models::AppError;

use crate::models::UpdateAvailabilityRequest;
use crate::DoctorService;

/// List all doctors with derived queue counts
pub async fn list_doctors(
    State(service): State<Arc<DoctorService>>,
) -> Result<Json<Value>, AppError> {
    let doctors = service.list_doctors().await?;
    Ok(Json(json!({ "doctors": doctors })))
}

/// A single doctor with counts and the wait a new arrival would face
pub async fn get_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let summary = service.get_doctor(&doctor_id).await?;
    let new_arrival_wait = service.estimated_wait_for_new_arrival(&doctor_id).await?;

    Ok(Json(json!({
        "doctor": summary,
        "estimated_wait_for_new_arrival_minutes": new_arrival_wait,
    })))
}

/// Toggle a doctor's availability flag
pub async fn update_availability(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    info!(
        "Availability update request: doctor {} -> {}",
        doctor_id, request.is_available
    );

    let doctor = service
        .set_availability(&doctor_id, request.is_available)
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor,
    })))
}
