use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::doctor::Doctor;
use crate::patient::{PatientStatus, QueueEntry};

/// Outcome of a committed queue operation, addressed by doctor and optionally
/// by patient. The notification router resolves the audience from the
/// variant; the orchestrator never touches channel names.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    QueueChanged {
        doctor_id: String,
        queue: Vec<QueueEntry>,
    },
    QueueUpdate {
        doctor_id: String,
        patient_id: Uuid,
        status: PatientStatus,
        position: i64,
        estimated_wait_minutes: i64,
    },
    PatientStatusUpdated {
        doctor_id: String,
        patient_id: Uuid,
        status: PatientStatus,
        reason: Option<String>,
    },
    ConsultationStarted {
        patient: QueueEntry,
        doctor: Doctor,
    },
    ConsultationCompleted {
        patient: QueueEntry,
        doctor: Doctor,
    },
    PatientRemoved {
        patient: QueueEntry,
        doctor: Doctor,
        reason: Option<String>,
    },
    DoctorAvailabilityUpdate {
        doctor_id: String,
        is_available: bool,
    },
}

impl QueueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::QueueChanged { .. } => "queueChanged",
            QueueEvent::QueueUpdate { .. } => "queueUpdate",
            QueueEvent::PatientStatusUpdated { .. } => "patientStatusUpdated",
            QueueEvent::ConsultationStarted { .. } => "consultationStarted",
            QueueEvent::ConsultationCompleted { .. } => "consultationCompleted",
            QueueEvent::PatientRemoved { .. } => "patientRemoved",
            QueueEvent::DoctorAvailabilityUpdate { .. } => "doctorAvailabilityUpdate",
        }
    }

    pub fn doctor_id(&self) -> &str {
        match self {
            QueueEvent::QueueChanged { doctor_id, .. }
            | QueueEvent::QueueUpdate { doctor_id, .. }
            | QueueEvent::PatientStatusUpdated { doctor_id, .. }
            | QueueEvent::DoctorAvailabilityUpdate { doctor_id, .. } => doctor_id,
            QueueEvent::ConsultationStarted { doctor, .. }
            | QueueEvent::ConsultationCompleted { doctor, .. }
            | QueueEvent::PatientRemoved { doctor, .. } => &doctor.id,
        }
    }

    pub fn patient_id(&self) -> Option<Uuid> {
        match self {
            QueueEvent::QueueChanged { .. } | QueueEvent::DoctorAvailabilityUpdate { .. } => None,
            QueueEvent::QueueUpdate { patient_id, .. }
            | QueueEvent::PatientStatusUpdated { patient_id, .. } => Some(*patient_id),
            QueueEvent::ConsultationStarted { patient, .. }
            | QueueEvent::ConsultationCompleted { patient, .. }
            | QueueEvent::PatientRemoved { patient, .. } => Some(patient.id),
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            QueueEvent::QueueChanged { queue, .. } => json!({ "queue": queue }),
            QueueEvent::QueueUpdate {
                patient_id,
                status,
                position,
                estimated_wait_minutes,
                ..
            } => json!({
                "patient_id": patient_id,
                "status": status,
                "position": position,
                "estimated_wait_minutes": estimated_wait_minutes,
            }),
            QueueEvent::PatientStatusUpdated {
                patient_id,
                status,
                reason,
                ..
            } => json!({
                "patient_id": patient_id,
                "status": status,
                "reason": reason,
            }),
            QueueEvent::ConsultationStarted { patient, doctor } => json!({
                "patient": patient,
                "doctor": doctor,
            }),
            QueueEvent::ConsultationCompleted { patient, doctor } => json!({
                "patient": patient,
                "doctor": doctor,
            }),
            QueueEvent::PatientRemoved {
                patient,
                doctor,
                reason,
            } => json!({
                "patient": patient,
                "doctor": doctor,
                "reason": reason,
            }),
            QueueEvent::DoctorAvailabilityUpdate {
                doctor_id,
                is_available,
            } => json!({
                "doctor_id": doctor_id,
                "is_available": is_available,
            }),
        }
    }
}

/// Delivery seam between the orchestrator and the transport. Sinks are
/// best-effort: a failed delivery is logged by the implementation and never
/// surfaces back into committed queue state.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: QueueEvent);
}

/// Sink that drops everything; used where no transport is wired.
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn deliver(&self, _event: QueueEvent) {}
}
