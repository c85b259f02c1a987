use std::sync::Arc;

use axum::{routing::get, Router};

use doctor_cell::{create_doctor_router, DoctorService};
use queue_cell::{create_queue_router, QueueOrchestrator};
use realtime_cell::{create_realtime_router, RealtimeState};

pub fn create_router(
    orchestrator: Arc<QueueOrchestrator>,
    doctors: Arc<DoctorService>,
    realtime: Arc<RealtimeState>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Queue API is running!" }))
        .nest("/doctors", create_doctor_router(doctors))
        .nest("/queue", create_queue_router(orchestrator))
        .nest("/ws", create_realtime_router(realtime))
}
