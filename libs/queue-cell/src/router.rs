use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{
    clear_doctor_queue, get_dashboard_stats, get_doctor_queue, get_patient_position,
    join_queue, remove_patient, run_cleanup, update_patient_status,
};
use crate::QueueOrchestrator;

pub fn create_queue_router(orchestrator: Arc<QueueOrchestrator>) -> Router {
    Router::new()
        .route("/join", post(join_queue))
        .route(
            "/patient/{patient_id}",
            get(get_patient_position).delete(remove_patient),
        )
        .route("/patient/{patient_id}/status", put(update_patient_status))
        .route("/doctor/{doctor_id}", get(get_doctor_queue))
        .route("/doctor/{doctor_id}/clear", post(clear_doctor_queue))
        .route("/stats", get(get_dashboard_stats))
        .route("/cleanup", post(run_cleanup))
        .with_state(orchestrator)
}
