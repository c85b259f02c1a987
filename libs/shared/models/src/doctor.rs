use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub is_available: bool,
    pub average_consultation_minutes: i64,
    pub max_daily_patients: i64,
    pub consultation_fee: Option<f64>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn new(id: &str, name: &str, specialization: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            specialization: specialization.to_string(),
            is_available: true,
            average_consultation_minutes: 15,
            max_daily_patients: 50,
            consultation_fee: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Patient counts derived from the queue, never stored on the doctor record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Non-completed entries held by the doctor.
    pub current: i64,
    pub waiting: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub current_patient_count: i64,
    pub waiting_patient_count: i64,
}

impl DoctorSummary {
    pub fn new(doctor: Doctor, counts: QueueCounts) -> Self {
        Self {
            doctor,
            current_patient_count: counts.current,
            waiting_patient_count: counts.waiting,
        }
    }
}
