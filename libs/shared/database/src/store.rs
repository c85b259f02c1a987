use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::{AppError, Doctor, PatientStatus, QueueCounts, QueueEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DoctorNotFound(_) | StoreError::PatientNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Durable storage contract for doctors and queue entries.
///
/// Multi-step sequences (capacity check + insert, single-consulting
/// enforcement + status write) are made atomic by the orchestrator's
/// per-doctor serialization; individual calls must be internally consistent
/// on their own.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn get_doctor(&self, id: &str) -> Result<Option<Doctor>, StoreError>;

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError>;

    /// Administrative seeding path; replaces an existing record with the
    /// same id.
    async fn upsert_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError>;

    async fn set_doctor_availability(
        &self,
        id: &str,
        is_available: bool,
    ) -> Result<Doctor, StoreError>;

    async fn create_patient(
        &self,
        doctor_id: &str,
        name: &str,
        estimated_duration_minutes: i64,
    ) -> Result<QueueEntry, StoreError>;

    async fn get_patient(&self, id: Uuid) -> Result<Option<QueueEntry>, StoreError>;

    /// Waiting entries for the doctor, joined_at ascending with the arrival
    /// sequence as tie-break.
    async fn list_waiting(&self, doctor_id: &str) -> Result<Vec<QueueEntry>, StoreError>;

    async fn list_all(&self, doctor_id: &str) -> Result<Vec<QueueEntry>, StoreError>;

    /// Writes the status and stamps consultation_started_at /
    /// consultation_ended_at when entering consulting / completed.
    async fn set_status(
        &self,
        id: Uuid,
        status: PatientStatus,
    ) -> Result<QueueEntry, StoreError>;

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_by_status(
        &self,
        doctor_id: &str,
        status: PatientStatus,
    ) -> Result<u64, StoreError>;

    /// Retention cleanup of terminal entries older than the horizon.
    async fn delete_stale_completed(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    async fn queue_counts(&self, doctor_id: &str) -> Result<QueueCounts, StoreError>;
}
