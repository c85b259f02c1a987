use std::sync::Arc;

use tracing::{debug, info};

use shared_database::{QueueStore, StoreError};
use shared_models::{Doctor, DoctorSummary, EventSink, QueueEvent};

pub struct DoctorService {
    store: Arc<dyn QueueStore>,
    events: Arc<dyn EventSink>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn QueueStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// All doctors with their derived queue counts.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorSummary>, StoreError> {
        let doctors = self.store.list_doctors().await?;
        let mut summaries = Vec::with_capacity(doctors.len());
        for doctor in doctors {
            let counts = self.store.queue_counts(&doctor.id).await?;
            summaries.push(DoctorSummary::new(doctor, counts));
        }
        Ok(summaries)
    }

    pub async fn get_doctor(&self, id: &str) -> Result<DoctorSummary, StoreError> {
        let doctor = self
            .store
            .get_doctor(id)
            .await?
            .ok_or_else(|| StoreError::DoctorNotFound(id.to_string()))?;
        let counts = self.store.queue_counts(id).await?;
        Ok(DoctorSummary::new(doctor, counts))
    }

    /// Wait a patient arriving right now would face with this doctor.
    pub async fn estimated_wait_for_new_arrival(&self, id: &str) -> Result<i64, StoreError> {
        let doctor = self
            .store
            .get_doctor(id)
            .await?
            .ok_or_else(|| StoreError::DoctorNotFound(id.to_string()))?;
        let counts = self.store.queue_counts(id).await?;
        Ok(counts.waiting * doctor.average_consultation_minutes)
    }

    /// Toggle availability and notify the doctor channel.
    pub async fn set_availability(
        &self,
        id: &str,
        is_available: bool,
    ) -> Result<Doctor, StoreError> {
        let doctor = self.store.set_doctor_availability(id, is_available).await?;
        info!("Doctor {} availability set to {}", id, is_available);

        self.events
            .deliver(QueueEvent::DoctorAvailabilityUpdate {
                doctor_id: doctor.id.clone(),
                is_available,
            })
            .await;

        Ok(doctor)
    }

    /// Seed the default roster when the store holds no doctors. Returns the
    /// number of doctors created.
    pub async fn seed_doctors(&self) -> Result<usize, StoreError> {
        if !self.store.list_doctors().await?.is_empty() {
            debug!("Doctor roster already present, skipping seed");
            return Ok(0);
        }

        let roster = default_roster();
        let count = roster.len();
        for doctor in roster {
            self.store.upsert_doctor(doctor).await?;
        }
        info!("Seeded {} doctors", count);
        Ok(count)
    }
}

fn default_roster() -> Vec<Doctor> {
    let mut doc1 = Doctor::new("doc1", "Dr. Abena Mensah", "general");
    doc1.average_consultation_minutes = 15;
    doc1.max_daily_patients = 50;
    doc1.consultation_fee = Some(50.0);
    doc1.bio = Some("General practitioner".to_string());

    let mut doc2 = Doctor::new("doc2", "Dr. Kwame Osei", "surgery");
    doc2.average_consultation_minutes = 30;
    doc2.max_daily_patients = 20;
    doc2.consultation_fee = Some(120.0);

    let mut doc3 = Doctor::new("doc3", "Dr. Efua Boateng", "dermatology");
    doc3.average_consultation_minutes = 10;
    doc3.max_daily_patients = 40;
    doc3.consultation_fee = Some(80.0);

    let mut doc4 = Doctor::new("doc4", "Dr. Yaw Darko", "cardiology");
    doc4.average_consultation_minutes = 20;
    doc4.max_daily_patients = 30;
    doc4.consultation_fee = Some(150.0);

    let mut doc5 = Doctor::new("doc5", "Dr. Akosua Asante", "psychiatry");
    doc5.average_consultation_minutes = 25;
    doc5.max_daily_patients = 25;
    doc5.consultation_fee = Some(100.0);

    vec![doc1, doc2, doc3, doc4, doc5]
}
