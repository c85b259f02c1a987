use thiserror::Error;

use queue_cell::QueueError;
use shared_database::StoreError;

#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Patient {0} has no assigned doctor")]
    DoctorNotAssigned(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
