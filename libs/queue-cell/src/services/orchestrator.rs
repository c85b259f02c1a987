use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::QueueStore;
use shared_models::{
    Doctor, EventSink, PatientStatus, PositionInfo, QueueEntry, QueueEvent,
};

use crate::error::QueueError;
use crate::models::{DashboardStats, DoctorQueueStats};
use crate::services::estimator;

/// Owns the patient lifecycle state machine and the cross-entry invariants:
/// at most one consulting patient per doctor, capacity limits, FIFO
/// positions. All mutating operations for a doctor are serialized behind that
/// doctor's mutex; reads run against the latest committed state.
pub struct QueueOrchestrator {
    store: Arc<dyn QueueStore>,
    events: Arc<dyn EventSink>,
    retention: Duration,
    doctor_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl QueueOrchestrator {
    pub fn new(store: Arc<dyn QueueStore>, events: Arc<dyn EventSink>, retention_hours: i64) -> Self {
        Self {
            store,
            events,
            retention: Duration::hours(retention_hours),
            doctor_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serialization primitive for one doctor's queue. Lazily created and
    /// never removed; the map stays small (one entry per doctor ever seen).
    async fn doctor_lock(&self, doctor_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.doctor_locks.lock().await;
        locks
            .entry(doctor_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn doctor_or_not_found(&self, doctor_id: &str) -> Result<Doctor, QueueError> {
        self.store
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| QueueError::DoctorNotFound(doctor_id.to_string()))
    }

    async fn broadcast_queue(&self, doctor_id: &str) {
        match self.store.list_all(doctor_id).await {
            Ok(queue) => {
                self.events
                    .deliver(QueueEvent::QueueChanged {
                        doctor_id: doctor_id.to_string(),
                        queue,
                    })
                    .await;
            }
            Err(e) => warn!("Skipping queue broadcast for {}: {}", doctor_id, e),
        }
    }

    /// Add a patient to a doctor's queue. Returns the new entry together
    /// with its 1-based position among waiting patients.
    pub async fn enqueue(
        &self,
        doctor_id: &str,
        patient_name: &str,
    ) -> Result<(QueueEntry, i64), QueueError> {
        if doctor_id.trim().is_empty() {
            return Err(QueueError::ValidationError("doctor_id must not be empty".into()));
        }
        if patient_name.trim().is_empty() {
            return Err(QueueError::ValidationError(
                "patient_name must not be empty".into(),
            ));
        }

        let lock = self.doctor_lock(doctor_id).await;
        let position;
        let entry;
        let doctor;
        {
            let _guard = lock.lock().await;

            doctor = self.doctor_or_not_found(doctor_id).await?;
            if !doctor.is_available {
                return Err(QueueError::DoctorUnavailable(doctor_id.to_string()));
            }

            let counts = self.store.queue_counts(doctor_id).await?;
            if counts.current >= doctor.max_daily_patients {
                return Err(QueueError::CapacityExceeded {
                    doctor_id: doctor_id.to_string(),
                    max: doctor.max_daily_patients,
                });
            }

            let estimated = estimator::estimate(&doctor, counts.waiting);
            entry = self
                .store
                .create_patient(doctor_id, patient_name.trim(), estimated)
                .await?;
            position = counts.waiting + 1;

            info!(
                "Enqueued patient {} for doctor {} at position {}",
                entry.id, doctor_id, position
            );
        }

        self.events
            .deliver(QueueEvent::QueueUpdate {
                doctor_id: doctor_id.to_string(),
                patient_id: entry.id,
                status: entry.status,
                position,
                estimated_wait_minutes: (position - 1) * doctor.average_consultation_minutes,
            })
            .await;
        self.broadcast_queue(doctor_id).await;

        Ok((entry, position))
    }

    /// Apply a status change. Any of the five labels is accepted; the
    /// orchestrator's job is the cross-entry invariants, not policing
    /// individual transitions. Entering consulting first force-completes any
    /// other consulting entry of the same doctor; entering completed
    /// auto-advances the earliest waiting entry to next.
    pub async fn transition(
        &self,
        patient_id: Uuid,
        new_status: PatientStatus,
        reason: Option<String>,
    ) -> Result<QueueEntry, QueueError> {
        let current = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| QueueError::PatientNotFound(patient_id.to_string()))?;

        let lock = self.doctor_lock(&current.doctor_id).await;
        let mut pending: Vec<QueueEvent> = Vec::new();
        let updated;
        {
            let _guard = lock.lock().await;

            // Re-check under the lock; the entry may have been removed while
            // we were waiting.
            let current = self
                .store
                .get_patient(patient_id)
                .await?
                .ok_or_else(|| QueueError::PatientNotFound(patient_id.to_string()))?;
            let doctor = self.doctor_or_not_found(&current.doctor_id).await?;

            if new_status == PatientStatus::Consulting {
                let in_progress: Vec<QueueEntry> = self
                    .store
                    .list_all(&doctor.id)
                    .await?
                    .into_iter()
                    .filter(|e| e.status == PatientStatus::Consulting && e.id != patient_id)
                    .collect();
                for displaced in in_progress {
                    let completed = self
                        .store
                        .set_status(displaced.id, PatientStatus::Completed)
                        .await?;
                    debug!(
                        "Force-completed {} so {} can start consulting with doctor {}",
                        completed.id, patient_id, doctor.id
                    );
                    pending.push(QueueEvent::ConsultationCompleted {
                        patient: completed,
                        doctor: doctor.clone(),
                    });
                }
            }

            updated = self.store.set_status(patient_id, new_status).await?;
            info!(
                "Patient {} moved to {} (doctor {})",
                patient_id, new_status, doctor.id
            );

            match new_status {
                PatientStatus::Consulting => pending.push(QueueEvent::ConsultationStarted {
                    patient: updated.clone(),
                    doctor: doctor.clone(),
                }),
                PatientStatus::Completed => pending.push(QueueEvent::ConsultationCompleted {
                    patient: updated.clone(),
                    doctor: doctor.clone(),
                }),
                _ => pending.push(QueueEvent::PatientStatusUpdated {
                    doctor_id: doctor.id.clone(),
                    patient_id,
                    status: new_status,
                    reason: reason.clone(),
                }),
            }

            if new_status == PatientStatus::Completed {
                if let Some(event) = self.auto_advance(&doctor.id).await? {
                    pending.push(event);
                }
            }
        }

        for event in pending {
            self.events.deliver(event).await;
        }
        self.broadcast_queue(&updated.doctor_id).await;

        Ok(updated)
    }

    /// Promote the earliest-joined waiting entry to next, keeping exactly one
    /// patient on deck. Runs under the caller's doctor lock.
    async fn auto_advance(&self, doctor_id: &str) -> Result<Option<QueueEvent>, QueueError> {
        let waiting = self.store.list_waiting(doctor_id).await?;
        let Some(first) = waiting.first() else {
            return Ok(None);
        };

        let promoted = self.store.set_status(first.id, PatientStatus::Next).await?;
        info!("Auto-advanced patient {} to next for doctor {}", promoted.id, doctor_id);
        Ok(Some(QueueEvent::PatientStatusUpdated {
            doctor_id: doctor_id.to_string(),
            patient_id: promoted.id,
            status: PatientStatus::Next,
            reason: None,
        }))
    }

    /// Delete a patient's entry. A second removal of the same id fails with
    /// PatientNotFound.
    pub async fn remove(
        &self,
        patient_id: Uuid,
        reason: Option<String>,
    ) -> Result<QueueEntry, QueueError> {
        let current = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| QueueError::PatientNotFound(patient_id.to_string()))?;

        let lock = self.doctor_lock(&current.doctor_id).await;
        let removed;
        let doctor;
        {
            let _guard = lock.lock().await;

            removed = self
                .store
                .get_patient(patient_id)
                .await?
                .ok_or_else(|| QueueError::PatientNotFound(patient_id.to_string()))?;
            doctor = self.doctor_or_not_found(&removed.doctor_id).await?;

            if !self.store.delete_patient(patient_id).await? {
                return Err(QueueError::PatientNotFound(patient_id.to_string()));
            }
            info!("Removed patient {} from doctor {} queue", patient_id, doctor.id);
        }

        self.events
            .deliver(QueueEvent::PatientRemoved {
                patient: removed.clone(),
                doctor,
                reason,
            })
            .await;
        self.broadcast_queue(&removed.doctor_id).await;

        Ok(removed)
    }

    /// Bulk-delete entries matching the filter (default waiting). An
    /// administrative operation; one queueChanged broadcast afterwards.
    pub async fn clear_queue(
        &self,
        doctor_id: &str,
        status_filter: Option<PatientStatus>,
    ) -> Result<u64, QueueError> {
        let status = status_filter.unwrap_or(PatientStatus::Waiting);

        let lock = self.doctor_lock(doctor_id).await;
        let removed;
        {
            let _guard = lock.lock().await;
            self.doctor_or_not_found(doctor_id).await?;
            removed = self.store.delete_by_status(doctor_id, status).await?;
            info!(
                "Cleared {} {} entries from doctor {} queue",
                removed, status, doctor_id
            );
        }

        self.broadcast_queue(doctor_id).await;
        Ok(removed)
    }

    /// Position report. Position is defined only for waiting entries:
    /// earlier-joined waiting entries + 1. Everything else reports 0.
    pub async fn position(&self, patient_id: Uuid) -> Result<PositionInfo, QueueError> {
        let entry = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| QueueError::PatientNotFound(patient_id.to_string()))?;
        let doctor = self.doctor_or_not_found(&entry.doctor_id).await?;

        if entry.status != PatientStatus::Waiting {
            return Ok(PositionInfo {
                patient_id,
                status: entry.status,
                position: 0,
                estimated_wait_minutes: 0,
            });
        }

        let waiting = self.store.list_waiting(&entry.doctor_id).await?;
        let ahead = waiting
            .iter()
            .filter(|e| {
                (e.joined_at, e.arrival_seq) < (entry.joined_at, entry.arrival_seq)
            })
            .count() as i64;
        let position = ahead + 1;

        Ok(PositionInfo {
            patient_id,
            status: entry.status,
            position,
            estimated_wait_minutes: (position - 1) * doctor.average_consultation_minutes,
        })
    }

    /// Wait a patient arriving right now would face: one average
    /// consultation per patient already waiting (the new arrival would sit
    /// at position waiting + 1).
    pub async fn estimated_wait_for_new_arrival(&self, doctor_id: &str) -> Result<i64, QueueError> {
        let doctor = self.doctor_or_not_found(doctor_id).await?;
        let counts = self.store.queue_counts(doctor_id).await?;
        Ok(counts.waiting * doctor.average_consultation_minutes)
    }

    pub async fn queue_snapshot(&self, doctor_id: &str) -> Result<Vec<QueueEntry>, QueueError> {
        self.doctor_or_not_found(doctor_id).await?;
        Ok(self.store.list_all(doctor_id).await?)
    }

    /// Retention pass: drop completed entries older than the horizon.
    pub async fn cleanup_stale(&self) -> Result<u64, QueueError> {
        let horizon = Utc::now() - self.retention;
        let removed = self.store.delete_stale_completed(horizon).await?;
        if removed > 0 {
            info!("Retention cleanup removed {} stale entries", removed);
        }
        Ok(removed)
    }

    /// Aggregates for the dashboard view.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, QueueError> {
        let doctors = self.store.list_doctors().await?;
        let today_start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or_else(Utc::now);

        let mut stats = DashboardStats {
            total_doctors: doctors.len() as i64,
            available_doctors: doctors.iter().filter(|d| d.is_available).count() as i64,
            waiting_patients: 0,
            consulting_patients: 0,
            completed_today: 0,
            doctors: Vec::with_capacity(doctors.len()),
        };

        for doctor in doctors {
            let counts = self.store.queue_counts(&doctor.id).await?;
            let entries = self.store.list_all(&doctor.id).await?;
            stats.waiting_patients += counts.waiting;
            stats.consulting_patients += entries
                .iter()
                .filter(|e| e.status == PatientStatus::Consulting)
                .count() as i64;
            stats.completed_today += entries
                .iter()
                .filter(|e| {
                    e.status == PatientStatus::Completed
                        && e.consultation_ended_at
                            .map(|t| t >= today_start)
                            .unwrap_or(false)
                })
                .count() as i64;
            stats.doctors.push(DoctorQueueStats {
                doctor_id: doctor.id,
                doctor_name: doctor.name,
                is_available: doctor.is_available,
                waiting_patients: counts.waiting,
                current_patients: counts.current,
            });
        }

        Ok(stats)
    }
}
