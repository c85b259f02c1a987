use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use realtime_cell::{Channel, ChannelHub, NotificationRouter};
use shared_database::QueueStore;
use shared_models::{EventSink, PatientStatus, QueueEvent};
use shared_utils::test_utils::seeded_store;

async fn setup() -> (Arc<ChannelHub>, NotificationRouter, Arc<dyn QueueStore>) {
    let store: Arc<dyn QueueStore> = seeded_store().await;
    let hub = Arc::new(ChannelHub::new());
    let router = NotificationRouter::new(hub.clone());
    (hub, router, store)
}

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).expect("valid envelope")
}

#[tokio::test]
async fn test_queue_changed_reaches_doctor_channel_only() {
    let (hub, router, _store) = setup().await;

    let doctor_session = Uuid::new_v4();
    let mut doctor_rx = hub.register(doctor_session).await;
    hub.join(doctor_session, Channel::doctor("doc1")).await;

    let bystander = Uuid::new_v4();
    let mut bystander_rx = hub.register(bystander).await;
    hub.join(bystander, Channel::doctor("doc2")).await;

    router
        .deliver(QueueEvent::QueueChanged {
            doctor_id: "doc1".to_string(),
            queue: vec![],
        })
        .await;

    let message = parse(&doctor_rx.try_recv().expect("doctor gets the event"));
    assert_eq!(message["event"], "queueChanged");
    assert!(message["data"]["queue"].as_array().unwrap().is_empty());

    assert!(bystander_rx.try_recv().is_err(), "other doctors stay quiet");
}

#[tokio::test]
async fn test_consultation_started_delivered_once_across_pair_and_patient() {
    let (hub, router, store) = setup().await;
    let entry = store.create_patient("doc1", "Ama", 15).await.unwrap();
    let doctor = store.get_doctor("doc1").await.unwrap().unwrap();

    // A patient session sits in both its private channel and the pair
    // channel; the union delivery must still hand it a single copy.
    let patient_session = Uuid::new_v4();
    let mut patient_rx = hub.register(patient_session).await;
    hub.join(patient_session, Channel::patient(entry.id)).await;
    hub.join(patient_session, Channel::pair("doc1", entry.id)).await;

    let doctor_session = Uuid::new_v4();
    let mut doctor_rx = hub.register(doctor_session).await;
    hub.join(doctor_session, Channel::pair("doc1", entry.id)).await;

    router
        .deliver(QueueEvent::ConsultationStarted {
            patient: entry.clone(),
            doctor,
        })
        .await;

    let message = parse(&patient_rx.try_recv().expect("patient copy"));
    assert_eq!(message["event"], "consultationStarted");
    assert!(
        patient_rx.try_recv().is_err(),
        "at most one delivery per session per event"
    );

    let message = parse(&doctor_rx.try_recv().expect("doctor copy via pair channel"));
    assert_eq!(message["event"], "consultationStarted");
}

#[tokio::test]
async fn test_status_update_scoped_to_pair_channel() {
    let (hub, router, store) = setup().await;
    let entry = store.create_patient("doc1", "Ama", 15).await.unwrap();

    let pair_session = Uuid::new_v4();
    let mut pair_rx = hub.register(pair_session).await;
    hub.join(pair_session, Channel::pair("doc1", entry.id)).await;

    // Private-channel-only member: patientStatusUpdated is pair-scoped and
    // must not reach it.
    let private_session = Uuid::new_v4();
    let mut private_rx = hub.register(private_session).await;
    hub.join(private_session, Channel::patient(entry.id)).await;

    router
        .deliver(QueueEvent::PatientStatusUpdated {
            doctor_id: "doc1".to_string(),
            patient_id: entry.id,
            status: PatientStatus::Late,
            reason: Some("missed the call".to_string()),
        })
        .await;

    let message = parse(&pair_rx.try_recv().expect("pair copy"));
    assert_eq!(message["event"], "patientStatusUpdated");
    assert_eq!(message["data"]["status"], "late");
    assert_eq!(message["data"]["reason"], "missed the call");

    assert!(private_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_patient_removed_reaches_pair_and_private_channels() {
    let (hub, router, store) = setup().await;
    let entry = store.create_patient("doc1", "Ama", 15).await.unwrap();
    let doctor = store.get_doctor("doc1").await.unwrap().unwrap();

    let private_session = Uuid::new_v4();
    let mut private_rx = hub.register(private_session).await;
    hub.join(private_session, Channel::patient(entry.id)).await;

    router
        .deliver(QueueEvent::PatientRemoved {
            patient: entry,
            doctor,
            reason: Some("cleared by admin".to_string()),
        })
        .await;

    let message = parse(&private_rx.try_recv().expect("private copy"));
    assert_eq!(message["event"], "patientRemoved");
    assert_eq!(message["data"]["reason"], "cleared by admin");
}

#[tokio::test]
async fn test_availability_update_goes_to_doctor_channel() {
    let (hub, router, _store) = setup().await;

    let dashboard = Uuid::new_v4();
    let mut dashboard_rx = hub.register(dashboard).await;
    hub.join(dashboard, Channel::doctor("doc1")).await;

    router
        .deliver(QueueEvent::DoctorAvailabilityUpdate {
            doctor_id: "doc1".to_string(),
            is_available: false,
        })
        .await;

    let message = parse(&dashboard_rx.try_recv().expect("dashboard copy"));
    assert_eq!(message["event"], "doctorAvailabilityUpdate");
    assert_eq!(message["data"]["is_available"], false);
}

#[tokio::test]
async fn test_unregistered_session_is_skipped_silently() {
    let (hub, router, _store) = setup().await;

    let ghost = Uuid::new_v4();
    let rx = hub.register(ghost).await;
    hub.join(ghost, Channel::doctor("doc1")).await;
    drop(rx);
    hub.unregister(ghost).await;

    // Delivery to an empty audience is a no-op, not an error.
    router
        .deliver(QueueEvent::QueueChanged {
            doctor_id: "doc1".to_string(),
            queue: vec![],
        })
        .await;
}
