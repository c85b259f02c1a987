use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::Value;
use uuid::Uuid;

use queue_cell::QueueOrchestrator;
use realtime_cell::{Channel, ChannelHub, NotificationRouter, RealtimeError, SubscriptionRegistry};
use shared_database::QueueStore;
use shared_models::EventSink;
use shared_utils::test_utils::seeded_store;

struct Harness {
    hub: Arc<ChannelHub>,
    orchestrator: Arc<QueueOrchestrator>,
    registry: Arc<SubscriptionRegistry>,
}

async fn setup() -> Harness {
    let store: Arc<dyn QueueStore> = seeded_store().await;
    let hub = Arc::new(ChannelHub::new());
    let notifier: Arc<dyn EventSink> = Arc::new(NotificationRouter::new(hub.clone()));
    let orchestrator = Arc::new(QueueOrchestrator::new(store.clone(), notifier, 24));
    let registry = Arc::new(SubscriptionRegistry::new(
        hub.clone(),
        store,
        orchestrator.clone(),
    ));
    Harness {
        hub,
        orchestrator,
        registry,
    }
}

#[tokio::test]
async fn test_join_doctor_subscribes_to_doctor_and_pair_channels() {
    let h = setup().await;
    let (ama, _) = h.orchestrator.enqueue("doc1", "Ama").await.unwrap();
    let (kofi, _) = h.orchestrator.enqueue("doc1", "Kofi").await.unwrap();

    let session = Uuid::new_v4();
    let _rx = h.hub.register(session).await;
    h.registry.join_doctor(session, "doc1").await.unwrap();

    assert_eq!(h.hub.member_count(&Channel::doctor("doc1")).await, 1);
    assert_eq!(h.hub.member_count(&Channel::pair("doc1", ama.id)).await, 1);
    assert_eq!(h.hub.member_count(&Channel::pair("doc1", kofi.id)).await, 1);
}

#[tokio::test]
async fn test_join_doctor_rejects_empty_id() {
    let h = setup().await;
    let session = Uuid::new_v4();

    let result = h.registry.join_doctor(session, "  ").await;
    assert_matches!(result.unwrap_err(), RealtimeError::ValidationError(_));
}

#[tokio::test]
async fn test_join_patient_subscribes_and_resyncs() {
    let h = setup().await;
    let (ama, _) = h.orchestrator.enqueue("doc1", "Ama").await.unwrap();

    let session = Uuid::new_v4();
    let mut rx = h.hub.register(session).await;
    h.registry
        .join_patient(session, &ama.id.to_string())
        .await
        .unwrap();

    assert_eq!(h.hub.member_count(&Channel::patient(ama.id)).await, 1);
    assert_eq!(h.hub.member_count(&Channel::pair("doc1", ama.id)).await, 1);

    // The join immediately replays the current status to this session.
    let raw = rx.try_recv().expect("resync message queued");
    let message: Value = serde_json::from_str(&raw).expect("valid envelope");
    assert_eq!(message["event"], "queueUpdate");
    assert_eq!(message["data"]["position"], 1);
    assert_eq!(message["data"]["status"], "waiting");
}

#[tokio::test]
async fn test_join_patient_is_idempotent_for_reconnects() {
    let h = setup().await;
    let (ama, _) = h.orchestrator.enqueue("doc1", "Ama").await.unwrap();

    let session = Uuid::new_v4();
    let mut rx = h.hub.register(session).await;
    let patient_id = ama.id.to_string();
    h.registry.join_patient(session, &patient_id).await.unwrap();
    h.registry.join_patient(session, &patient_id).await.unwrap();

    // Still a single membership, one resync per join.
    assert_eq!(h.hub.member_count(&Channel::patient(ama.id)).await, 1);
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_join_patient_rejects_malformed_and_unknown_ids() {
    let h = setup().await;
    let session = Uuid::new_v4();

    let malformed = h.registry.join_patient(session, "not-a-uuid").await;
    assert_matches!(malformed.unwrap_err(), RealtimeError::ValidationError(_));

    let unknown = h
        .registry
        .join_patient(session, &Uuid::new_v4().to_string())
        .await;
    assert_matches!(unknown.unwrap_err(), RealtimeError::PatientNotFound(_));
}

#[tokio::test]
async fn test_authorize_doctor_gates_by_role_and_identity() {
    let h = setup().await;
    let session = Uuid::new_v4();

    // No binding at all.
    let result = h.registry.authorize_doctor(session, "doc1").await;
    assert_matches!(result.unwrap_err(), RealtimeError::Unauthorized(_));

    h.registry.join_doctor(session, "doc1").await.unwrap();
    h.registry.authorize_doctor(session, "doc1").await.unwrap();

    // Bound to a different doctor.
    let result = h.registry.authorize_doctor(session, "doc2").await;
    assert_matches!(result.unwrap_err(), RealtimeError::Unauthorized(_));

    // Patient sessions never pass the doctor gate.
    let (ama, _) = h.orchestrator.enqueue("doc1", "Ama").await.unwrap();
    let patient_session = Uuid::new_v4();
    h.registry
        .join_patient(patient_session, &ama.id.to_string())
        .await
        .unwrap();
    let result = h.registry.authorize_doctor(patient_session, "doc1").await;
    assert_matches!(result.unwrap_err(), RealtimeError::Unauthorized(_));
}

#[tokio::test]
async fn test_leave_all_drops_memberships_and_role() {
    let h = setup().await;
    let session = Uuid::new_v4();
    let _rx = h.hub.register(session).await;

    h.registry.join_doctor(session, "doc1").await.unwrap();
    assert_eq!(h.hub.member_count(&Channel::doctor("doc1")).await, 1);

    h.registry.leave_all(session).await;
    assert_eq!(h.hub.member_count(&Channel::doctor("doc1")).await, 0);

    let result = h.registry.authorize_doctor(session, "doc1").await;
    assert_matches!(result.unwrap_err(), RealtimeError::Unauthorized(_));
}

#[tokio::test]
async fn test_leave_single_channel() {
    let h = setup().await;
    let session = Uuid::new_v4();
    let _rx = h.hub.register(session).await;

    h.registry.join_doctor(session, "doc1").await.unwrap();
    h.registry.leave(session, &Channel::doctor("doc1")).await;
    assert_eq!(h.hub.member_count(&Channel::doctor("doc1")).await, 0);
}

#[tokio::test]
async fn test_channel_topics_round_trip() {
    let patient_id = Uuid::new_v4();
    for channel in [
        Channel::doctor("doc1"),
        Channel::patient(patient_id),
        Channel::pair("doc1", patient_id),
    ] {
        assert_eq!(Channel::parse(&channel.topic()), Some(channel));
    }

    assert_eq!(Channel::parse("doctor:"), None);
    assert_eq!(Channel::parse("patient:not-a-uuid"), None);
    assert_eq!(Channel::parse("unrelated:doc1"), None);
}
