use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::{get_doctor, list_doctors, update_availability};
use crate::DoctorService;

pub fn create_doctor_router(service: Arc<DoctorService>) -> Router {
    Router::new()
        .route("/", get(list_doctors))
        .route("/{doctor_id}", get(get_doctor))
        .route("/{doctor_id}/availability", put(update_availability))
        .with_state(service)
}
