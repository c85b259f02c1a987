use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use shared_database::{MemoryStore, QueueStore, StoreError};
use shared_models::{Doctor, PatientStatus};

async fn store_with_doctor(id: &str) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .upsert_doctor(Doctor::new(id, &format!("Dr. {}", id), "general"))
        .await
        .expect("upsert doctor");
    store
}

#[tokio::test]
async fn test_create_patient_requires_doctor() {
    let store = MemoryStore::new();
    let result = store.create_patient("ghost", "Ama", 15).await;
    assert_matches!(result.unwrap_err(), StoreError::DoctorNotFound(_));
}

#[tokio::test]
async fn test_list_waiting_is_arrival_ordered() {
    let store = store_with_doctor("doc1").await;

    let first = store.create_patient("doc1", "A", 15).await.unwrap();
    let second = store.create_patient("doc1", "B", 15).await.unwrap();
    let third = store.create_patient("doc1", "C", 15).await.unwrap();

    // Entries created back-to-back may share a timestamp; the arrival
    // sequence keeps the order stable regardless.
    let waiting = store.list_waiting("doc1").await.unwrap();
    let ids: Vec<Uuid> = waiting.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    store
        .set_status(second.id, PatientStatus::Consulting)
        .await
        .unwrap();
    let waiting = store.list_waiting("doc1").await.unwrap();
    let ids: Vec<Uuid> = waiting.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
}

#[tokio::test]
async fn test_set_status_stamps_consultation_times() {
    let store = store_with_doctor("doc1").await;
    let entry = store.create_patient("doc1", "Ama", 15).await.unwrap();
    assert!(entry.consultation_started_at.is_none());
    assert!(entry.consultation_ended_at.is_none());

    let consulting = store
        .set_status(entry.id, PatientStatus::Consulting)
        .await
        .unwrap();
    assert!(consulting.consultation_started_at.is_some());
    assert!(consulting.consultation_ended_at.is_none());

    let completed = store
        .set_status(entry.id, PatientStatus::Completed)
        .await
        .unwrap();
    assert!(completed.consultation_started_at.is_some());
    assert!(completed.consultation_ended_at.is_some());
}

#[tokio::test]
async fn test_set_status_unknown_patient_fails() {
    let store = store_with_doctor("doc1").await;
    let result = store.set_status(Uuid::new_v4(), PatientStatus::Next).await;
    assert_matches!(result.unwrap_err(), StoreError::PatientNotFound(_));
}

#[tokio::test]
async fn test_queue_counts_exclude_completed() {
    let store = store_with_doctor("doc1").await;

    let a = store.create_patient("doc1", "A", 15).await.unwrap();
    let b = store.create_patient("doc1", "B", 15).await.unwrap();
    store.create_patient("doc1", "C", 15).await.unwrap();

    store.set_status(a.id, PatientStatus::Consulting).await.unwrap();
    store.set_status(b.id, PatientStatus::Completed).await.unwrap();

    let counts = store.queue_counts("doc1").await.unwrap();
    assert_eq!(counts.current, 2);
    assert_eq!(counts.waiting, 1);
}

#[tokio::test]
async fn test_delete_by_status_counts_removals() {
    let store = store_with_doctor("doc1").await;

    let a = store.create_patient("doc1", "A", 15).await.unwrap();
    store.create_patient("doc1", "B", 15).await.unwrap();
    store.create_patient("doc1", "C", 15).await.unwrap();
    store.set_status(a.id, PatientStatus::Late).await.unwrap();

    let removed = store
        .delete_by_status("doc1", PatientStatus::Waiting)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let all = store.list_all("doc1").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, a.id);
}

#[tokio::test]
async fn test_delete_stale_completed_only_removes_old_terminal_entries() {
    let store = store_with_doctor("doc1").await;

    let old = store.create_patient("doc1", "Old", 15).await.unwrap();
    store.create_patient("doc1", "Waiting", 15).await.unwrap();
    let fresh = store.create_patient("doc1", "Fresh", 15).await.unwrap();

    store.set_status(old.id, PatientStatus::Completed).await.unwrap();
    store.set_status(fresh.id, PatientStatus::Completed).await.unwrap();

    // A horizon in the future makes every completed entry stale; one in the
    // past keeps them all.
    let kept = store
        .delete_stale_completed(Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(kept, 0);

    let removed = store
        .delete_stale_completed(Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let all = store.list_all("doc1").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, PatientStatus::Waiting);
}

#[tokio::test]
async fn test_delete_patient_reports_presence() {
    let store = store_with_doctor("doc1").await;
    let entry = store.create_patient("doc1", "Ama", 15).await.unwrap();

    assert!(store.delete_patient(entry.id).await.unwrap());
    assert!(!store.delete_patient(entry.id).await.unwrap());
}

#[tokio::test]
async fn test_set_doctor_availability_unknown_doctor_fails() {
    let store = MemoryStore::new();
    let result = store.set_doctor_availability("ghost", false).await;
    assert_matches!(result.unwrap_err(), StoreError::DoctorNotFound(_));
}
