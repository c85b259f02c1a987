use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of a queue entry. Removal deletes the entry outright and
/// is not a stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    Waiting,
    Next,
    Consulting,
    Completed,
    Late,
}

impl PatientStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PatientStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Waiting => "waiting",
            PatientStatus::Next => "next",
            PatientStatus::Consulting => "consulting",
            PatientStatus::Completed => "completed",
            PatientStatus::Late => "late",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waiting" => Ok(PatientStatus::Waiting),
            "next" => Ok(PatientStatus::Next),
            "consulting" => Ok(PatientStatus::Consulting),
            "completed" => Ok(PatientStatus::Completed),
            "late" => Ok(PatientStatus::Late),
            other => Err(format!("unknown patient status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub name: String,
    pub doctor_id: String,
    pub status: PatientStatus,
    /// Frozen at enqueue time, never recomputed.
    pub estimated_duration_minutes: i64,
    /// Sole FIFO ordering key; immutable after creation.
    pub joined_at: DateTime<Utc>,
    /// Monotonic tie-break for entries sharing a joined_at timestamp.
    #[serde(skip_serializing, default)]
    pub arrival_seq: u64,
    pub consultation_started_at: Option<DateTime<Utc>>,
    pub consultation_ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn is_waiting(&self) -> bool {
        self.status == PatientStatus::Waiting
    }
}

/// Position report for a single patient; position is 0 for anything that is
/// no longer waiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInfo {
    pub patient_id: Uuid,
    pub status: PatientStatus,
    pub position: i64,
    pub estimated_wait_minutes: i64,
}
