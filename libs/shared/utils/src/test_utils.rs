use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shared_database::{MemoryStore, QueueStore};
use shared_models::{Doctor, EventSink, QueueEvent};

/// Build a doctor record with the fields the queue cares about.
pub fn test_doctor(id: &str, specialization: &str, average_minutes: i64, capacity: i64) -> Doctor {
    let mut doctor = Doctor::new(id, &format!("Dr. {}", id), specialization);
    doctor.average_consultation_minutes = average_minutes;
    doctor.max_daily_patients = capacity;
    doctor
}

/// Memory store pre-seeded with a small roster: doc1 (general, 15 min,
/// capacity 50), doc2 (surgery, 30 min, capacity 20), doc3 (dermatology,
/// 10 min, capacity 40).
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for doctor in [
        test_doctor("doc1", "general", 15, 50),
        test_doctor("doc2", "surgery", 30, 20),
        test_doctor("doc3", "dermatology", 10, 40),
    ] {
        store
            .upsert_doctor(doctor)
            .await
            .expect("seeding a memory store cannot fail");
    }
    store
}

/// Event sink that records every delivered event for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<QueueEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().await.clone()
    }

    pub async fn names(&self) -> Vec<&'static str> {
        self.events.lock().await.iter().map(|e| e.name()).collect()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn deliver(&self, event: QueueEvent) {
        self.events.lock().await.push(event);
    }
}
