use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use queue_cell::QueueOrchestrator;
use shared_database::QueueStore;

use crate::error::RealtimeError;
use crate::models::{Channel, SessionRole};
use crate::services::hub::ChannelHub;

/// Tracks which transport session belongs to which logical channel, and the
/// role each session has bound. Role bindings gate the doctor-only commands.
pub struct SubscriptionRegistry {
    hub: Arc<ChannelHub>,
    store: Arc<dyn QueueStore>,
    orchestrator: Arc<QueueOrchestrator>,
    roles: RwLock<HashMap<Uuid, SessionRole>>,
}

impl SubscriptionRegistry {
    pub fn new(
        hub: Arc<ChannelHub>,
        store: Arc<dyn QueueStore>,
        orchestrator: Arc<QueueOrchestrator>,
    ) -> Self {
        Self {
            hub,
            store,
            orchestrator,
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Bind the session as a doctor and subscribe it to the doctor channel
    /// plus the pair channel of every currently-queued patient, so it
    /// immediately receives all in-flight per-patient events.
    pub async fn join_doctor(
        &self,
        session_id: Uuid,
        doctor_id: &str,
    ) -> Result<(), RealtimeError> {
        if doctor_id.trim().is_empty() {
            return Err(RealtimeError::ValidationError(
                "doctor_id must not be empty".to_string(),
            ));
        }

        {
            let mut roles = self.roles.write().await;
            roles.insert(session_id, SessionRole::Doctor(doctor_id.to_string()));
        }

        self.hub.join(session_id, Channel::doctor(doctor_id)).await;
        for entry in self.store.list_all(doctor_id).await? {
            self.hub
                .join(session_id, Channel::pair(doctor_id, entry.id))
                .await;
        }

        info!("Session {} joined doctor channel {}", session_id, doctor_id);
        Ok(())
    }

    /// Bind the session as a patient, subscribe it to its private and pair
    /// channels, and immediately resend its current queue status. Safe to
    /// call repeatedly; reconnecting clients use it to resynchronize.
    pub async fn join_patient(
        &self,
        session_id: Uuid,
        patient_id_raw: &str,
    ) -> Result<(), RealtimeError> {
        let patient_id: Uuid = patient_id_raw.parse().map_err(|_| {
            RealtimeError::ValidationError(format!("malformed patient id: {}", patient_id_raw))
        })?;

        let entry = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| RealtimeError::PatientNotFound(patient_id.to_string()))?;
        if self.store.get_doctor(&entry.doctor_id).await?.is_none() {
            return Err(RealtimeError::DoctorNotAssigned(patient_id.to_string()));
        }

        {
            let mut roles = self.roles.write().await;
            roles.insert(session_id, SessionRole::Patient(patient_id));
        }

        self.hub.join(session_id, Channel::patient(patient_id)).await;
        self.hub
            .join(session_id, Channel::pair(&entry.doctor_id, patient_id))
            .await;

        // Idempotent resync: the fresh snapshot replaces anything the client
        // missed while disconnected.
        let position = self.orchestrator.position(patient_id).await?;
        self.hub
            .emit_to_session(
                session_id,
                "queueUpdate",
                serde_json::json!({
                    "patient_id": position.patient_id,
                    "status": position.status,
                    "position": position.position,
                    "estimated_wait_minutes": position.estimated_wait_minutes,
                }),
            )
            .await;

        info!("Session {} joined patient channel {}", session_id, patient_id);
        Ok(())
    }

    pub async fn leave(&self, session_id: Uuid, channel: &Channel) {
        self.hub.leave(session_id, channel).await;
        debug!("Session {} left channel {}", session_id, channel);
    }

    /// Drop all memberships and the role binding; the disconnect path.
    pub async fn leave_all(&self, session_id: Uuid) {
        self.hub.leave_all(session_id).await;
        let mut roles = self.roles.write().await;
        roles.remove(&session_id);
    }

    /// The doctor id this session is bound to, if any.
    pub async fn doctor_binding(&self, session_id: Uuid) -> Option<String> {
        let roles = self.roles.read().await;
        match roles.get(&session_id) {
            Some(SessionRole::Doctor(id)) => Some(id.clone()),
            _ => None,
        }
    }

    /// Doctor-gated commands require a doctor role bound to the target
    /// doctor; anything else is rejected.
    pub async fn authorize_doctor(
        &self,
        session_id: Uuid,
        doctor_id: &str,
    ) -> Result<(), RealtimeError> {
        match self.doctor_binding(session_id).await {
            Some(bound) if bound == doctor_id => Ok(()),
            _ => Err(RealtimeError::Unauthorized(format!(
                "session is not bound as doctor {}",
                doctor_id
            ))),
        }
    }
}
