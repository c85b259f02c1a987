use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use doctor_cell::DoctorService;
use queue_cell::QueueOrchestrator;
use shared_database::QueueStore;

use crate::services::hub::ChannelHub;
use crate::services::registry::SubscriptionRegistry;

/// A named multicast group. All channel-name construction lives here so no
/// call site ever assembles a topic string by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Doctor(String),
    Patient(Uuid),
    Pair { doctor_id: String, patient_id: Uuid },
}

impl Channel {
    pub fn doctor(doctor_id: &str) -> Self {
        Channel::Doctor(doctor_id.to_string())
    }

    pub fn patient(patient_id: Uuid) -> Self {
        Channel::Patient(patient_id)
    }

    pub fn pair(doctor_id: &str, patient_id: Uuid) -> Self {
        Channel::Pair {
            doctor_id: doctor_id.to_string(),
            patient_id,
        }
    }

    pub fn topic(&self) -> String {
        match self {
            Channel::Doctor(id) => format!("doctor:{}", id),
            Channel::Patient(id) => format!("patient:{}", id),
            Channel::Pair {
                doctor_id,
                patient_id,
            } => format!("queue:{}:{}", doctor_id, patient_id),
        }
    }

    /// Inverse of topic(), for client-supplied leave commands.
    pub fn parse(topic: &str) -> Option<Self> {
        let mut parts = topic.splitn(3, ':');
        match (parts.next()?, parts.next(), parts.next()) {
            ("doctor", Some(id), None) if !id.is_empty() => Some(Channel::doctor(id)),
            ("patient", Some(id), None) => id.parse().ok().map(Channel::Patient),
            ("queue", Some(doctor_id), Some(patient_id)) if !doctor_id.is_empty() => {
                patient_id
                    .parse()
                    .ok()
                    .map(|pid| Channel::pair(doctor_id, pid))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.topic())
    }
}

/// Role a session has bound itself to via a join command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRole {
    Doctor(String),
    Patient(Uuid),
}

/// Commands a connected socket may issue.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientCommand {
    JoinDoctorQueue {
        doctor_id: String,
    },
    JoinPatientQueue {
        patient_id: String,
    },
    LeaveRoom {
        channel: String,
    },
    StartConsultation {
        patient_id: String,
    },
    CompleteConsultation {
        patient_id: String,
    },
    RemovePatient {
        patient_id: String,
        reason: Option<String>,
    },
    UpdateDoctorAvailability {
        is_available: bool,
    },
}

/// Everything the websocket layer needs to serve one connection.
pub struct RealtimeState {
    pub hub: Arc<ChannelHub>,
    pub registry: Arc<SubscriptionRegistry>,
    pub orchestrator: Arc<QueueOrchestrator>,
    pub doctors: Arc<DoctorService>,
    pub store: Arc<dyn QueueStore>,
}
