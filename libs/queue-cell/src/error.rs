use thiserror::Error;

use shared_database::StoreError;
use shared_models::AppError;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Doctor {0} is not currently accepting patients")]
    DoctorUnavailable(String),

    #[error("Doctor {doctor_id} is at capacity ({max} patients)")]
    CapacityExceeded { doctor_id: String, max: i64 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::DoctorNotFound(_) | QueueError::PatientNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            QueueError::DoctorUnavailable(_) | QueueError::CapacityExceeded { .. } => {
                AppError::Conflict(err.to_string())
            }
            QueueError::ValidationError(msg) => AppError::ValidationError(msg),
            QueueError::Storage(StoreError::DoctorNotFound(id)) => {
                AppError::NotFound(format!("Doctor not found: {}", id))
            }
            QueueError::Storage(StoreError::PatientNotFound(id)) => {
                AppError::NotFound(format!("Patient not found: {}", id))
            }
            QueueError::Storage(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            QueueError::Storage(StoreError::Internal(msg)) => AppError::Internal(msg),
        }
    }
}
