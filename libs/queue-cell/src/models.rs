use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct JoinQueueRequest {
    pub doctor_id: String,
    pub patient_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemovePatientParams {
    pub reason: Option<String>,
}

/// Token every clear request must echo back before the queue is touched.
pub const CLEAR_QUEUE_CONFIRMATION: &str = "CLEAR_QUEUE";

#[derive(Debug, Clone, Deserialize)]
pub struct ClearQueueRequest {
    pub confirm: String,
    /// Status filter; defaults to waiting when omitted.
    pub status: Option<String>,
    /// Free-text justification, recorded in the logs.
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorQueueStats {
    pub doctor_id: String,
    pub doctor_name: String,
    pub is_available: bool,
    pub waiting_patients: i64,
    pub current_patients: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_doctors: i64,
    pub available_doctors: i64,
    pub waiting_patients: i64,
    pub consulting_patients: i64,
    pub completed_today: i64,
    pub doctors: Vec<DoctorQueueStats>,
}
