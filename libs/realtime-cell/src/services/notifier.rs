use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use shared_models::{EventSink, QueueEvent};

use crate::models::Channel;
use crate::services::hub::ChannelHub;

/// Stateless translator from committed queue outcomes to addressed
/// deliveries. Audience resolution is the event catalog: doctor-wide events
/// go to the doctor channel; patient-targeted events go to the pair channel
/// and, when patient-facing, the patient's private channel as well.
pub struct NotificationRouter {
    hub: Arc<ChannelHub>,
}

impl NotificationRouter {
    pub fn new(hub: Arc<ChannelHub>) -> Self {
        Self { hub }
    }

    fn audience(event: &QueueEvent) -> Vec<Channel> {
        let doctor_id = event.doctor_id().to_string();
        match event {
            QueueEvent::QueueChanged { .. } | QueueEvent::DoctorAvailabilityUpdate { .. } => {
                vec![Channel::Doctor(doctor_id)]
            }
            QueueEvent::PatientStatusUpdated { patient_id, .. } => {
                vec![Channel::pair(&doctor_id, *patient_id)]
            }
            QueueEvent::QueueUpdate { patient_id, .. } => vec![
                Channel::pair(&doctor_id, *patient_id),
                Channel::Patient(*patient_id),
            ],
            QueueEvent::ConsultationStarted { patient, .. }
            | QueueEvent::ConsultationCompleted { patient, .. }
            | QueueEvent::PatientRemoved { patient, .. } => vec![
                Channel::pair(&doctor_id, patient.id),
                Channel::Patient(patient.id),
            ],
        }
    }
}

#[async_trait]
impl EventSink for NotificationRouter {
    async fn deliver(&self, event: QueueEvent) {
        let channels = Self::audience(&event);
        debug!(
            "Routing {} for doctor {} to {} channel(s)",
            event.name(),
            event.doctor_id(),
            channels.len()
        );
        self.hub.emit(&channels, event.name(), event.payload()).await;
    }
}
