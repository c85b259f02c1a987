use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Doctor, PatientStatus, QueueCounts, QueueEntry};

use crate::store::{QueueStore, StoreError};

/// In-memory queue store. Doctors and entries live in RwLock-guarded maps;
/// the arrival counter disambiguates entries enqueued within the same clock
/// tick.
pub struct MemoryStore {
    doctors: RwLock<HashMap<String, Doctor>>,
    patients: RwLock<HashMap<Uuid, QueueEntry>>,
    arrival_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            doctors: RwLock::new(HashMap::new()),
            patients: RwLock::new(HashMap::new()),
            arrival_seq: AtomicU64::new(0),
        }
    }

    fn sort_by_arrival(entries: &mut Vec<QueueEntry>) {
        entries.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then(a.arrival_seq.cmp(&b.arrival_seq))
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn get_doctor(&self, id: &str) -> Result<Option<Doctor>, StoreError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.get(id).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let doctors = self.doctors.read().await;
        let mut list: Vec<Doctor> = doctors.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    async fn upsert_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError> {
        let mut doctors = self.doctors.write().await;
        doctors.insert(doctor.id.clone(), doctor.clone());
        Ok(doctor)
    }

    async fn set_doctor_availability(
        &self,
        id: &str,
        is_available: bool,
    ) -> Result<Doctor, StoreError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors
            .get_mut(id)
            .ok_or_else(|| StoreError::DoctorNotFound(id.to_string()))?;
        doctor.is_available = is_available;
        doctor.updated_at = Utc::now();
        Ok(doctor.clone())
    }

    async fn create_patient(
        &self,
        doctor_id: &str,
        name: &str,
        estimated_duration_minutes: i64,
    ) -> Result<QueueEntry, StoreError> {
        {
            let doctors = self.doctors.read().await;
            if !doctors.contains_key(doctor_id) {
                return Err(StoreError::DoctorNotFound(doctor_id.to_string()));
            }
        }

        let now = Utc::now();
        let entry = QueueEntry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            doctor_id: doctor_id.to_string(),
            status: PatientStatus::Waiting,
            estimated_duration_minutes,
            joined_at: now,
            arrival_seq: self.arrival_seq.fetch_add(1, Ordering::SeqCst),
            consultation_started_at: None,
            consultation_ended_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut patients = self.patients.write().await;
        patients.insert(entry.id, entry.clone());
        debug!("Created queue entry {} for doctor {}", entry.id, doctor_id);
        Ok(entry)
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<QueueEntry>, StoreError> {
        let patients = self.patients.read().await;
        Ok(patients.get(&id).cloned())
    }

    async fn list_waiting(&self, doctor_id: &str) -> Result<Vec<QueueEntry>, StoreError> {
        let patients = self.patients.read().await;
        let mut waiting: Vec<QueueEntry> = patients
            .values()
            .filter(|p| p.doctor_id == doctor_id && p.status == PatientStatus::Waiting)
            .cloned()
            .collect();
        Self::sort_by_arrival(&mut waiting);
        Ok(waiting)
    }

    async fn list_all(&self, doctor_id: &str) -> Result<Vec<QueueEntry>, StoreError> {
        let patients = self.patients.read().await;
        let mut all: Vec<QueueEntry> = patients
            .values()
            .filter(|p| p.doctor_id == doctor_id)
            .cloned()
            .collect();
        Self::sort_by_arrival(&mut all);
        Ok(all)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: PatientStatus,
    ) -> Result<QueueEntry, StoreError> {
        let mut patients = self.patients.write().await;
        let entry = patients
            .get_mut(&id)
            .ok_or_else(|| StoreError::PatientNotFound(id.to_string()))?;

        let now = Utc::now();
        entry.status = status;
        entry.updated_at = now;
        match status {
            PatientStatus::Consulting => entry.consultation_started_at = Some(now),
            PatientStatus::Completed => entry.consultation_ended_at = Some(now),
            _ => {}
        }
        Ok(entry.clone())
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut patients = self.patients.write().await;
        Ok(patients.remove(&id).is_some())
    }

    async fn delete_by_status(
        &self,
        doctor_id: &str,
        status: PatientStatus,
    ) -> Result<u64, StoreError> {
        let mut patients = self.patients.write().await;
        let before = patients.len();
        patients.retain(|_, p| !(p.doctor_id == doctor_id && p.status == status));
        Ok((before - patients.len()) as u64)
    }

    async fn delete_stale_completed(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut patients = self.patients.write().await;
        let before = patients.len();
        patients.retain(|_, p| {
            if p.status != PatientStatus::Completed {
                return true;
            }
            let finished = p.consultation_ended_at.unwrap_or(p.updated_at);
            finished >= older_than
        });
        let removed = (before - patients.len()) as u64;
        if removed > 0 {
            debug!("Retention cleanup removed {} completed entries", removed);
        }
        Ok(removed)
    }

    async fn queue_counts(&self, doctor_id: &str) -> Result<QueueCounts, StoreError> {
        let patients = self.patients.read().await;
        let mut counts = QueueCounts::default();
        for p in patients.values() {
            if p.doctor_id != doctor_id {
                continue;
            }
            if p.status != PatientStatus::Completed {
                counts.current += 1;
            }
            if p.status == PatientStatus::Waiting {
                counts.waiting += 1;
            }
        }
        Ok(counts)
    }
}
