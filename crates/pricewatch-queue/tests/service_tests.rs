// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the tracker service facade.

use std::sync::Arc;
use std::time::Duration;

use pricewatch_config::AccountRegistry;
use pricewatch_config::model::{AccountConfig, PricewatchConfig};
use pricewatch_core::{AccountId, MutationErrorKind, MutationOutcome, PricewatchError, TrackingOp};
use pricewatch_queue::{QueueSettings, TaskQueue, TrackerService};
use pricewatch_session::SessionManager;
use pricewatch_store::TrackingStore;
use pricewatch_test_utils::{MockDriver, MockLogin, MockMutator};

struct Harness {
    #[allow(dead_code)]
    dir: tempfile::TempDir,
    driver: Arc<MockDriver>,
    mutator: Arc<MockMutator>,
    store: Arc<TrackingStore>,
    service: TrackerService,
}

fn harness(ids: &[&str]) -> Harness {
    let mut config = PricewatchConfig::default();
    for id in ids {
        config.accounts.insert(
            id.to_string(),
            AccountConfig {
                username: format!("{id}@example.com"),
                password: "pw".to_string(),
            },
        );
    }
    config.tracking.default_account = ids[0].to_string();
    let registry = AccountRegistry::from_config(&config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        TrackingStore::new(
            dir.path().join("data"),
            registry.list().iter().map(|a| a.id.clone()).collect(),
        )
        .unwrap(),
    );
    let driver = Arc::new(MockDriver::new());
    let sessions = Arc::new(SessionManager::new(
        driver.clone(),
        Arc::new(MockLogin::new()),
        Duration::from_secs(3600),
    ));
    let mutator = Arc::new(MockMutator::new());
    let queue = Arc::new(TaskQueue::new(
        dir.path().join("task_queue.txt"),
        registry.clone(),
        store.clone(),
        sessions.clone(),
        mutator.clone(),
        QueueSettings::default(),
    ));
    let service = TrackerService::new(registry, store.clone(), sessions, mutator.clone(), queue);
    Harness {
        dir,
        driver,
        mutator,
        store,
        service,
    }
}

#[tokio::test]
async fn enqueue_manual_normalizes_input() {
    let h = harness(&["Premium"]);
    assert_eq!(h.service.enqueue_manual(" b000aaaaaa ", "10,5").await, 1);
    let status = h.service.status().await;
    assert_eq!(status.queue_size, 1);
}

#[tokio::test]
async fn pause_resume_round_trip() {
    let h = harness(&["Premium"]);
    assert!(h.service.pause().await.paused);
    assert!(!h.service.resume().await.paused);
}

#[tokio::test]
async fn mutate_now_writes_through_on_success() {
    let h = harness(&["Premium", "Meraxes"]);
    h.mutator
        .push_outcome(MutationOutcome::ok(Some("Widget".to_string())))
        .await;

    let outcome = h
        .service
        .mutate_now(
            Some(&AccountId::from("Meraxes")),
            "b000aaaaaa",
            "10,5",
            TrackingOp::CreateOrUpdate,
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.title.as_deref(), Some("Widget"));

    let tracked = h
        .service
        .get_tracked(&AccountId::from("Meraxes"), "B000AAAAAA")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tracked.price, "10.50");
    assert_eq!(tracked.product_title.as_deref(), Some("Widget"));

    let calls = h.mutator.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].price, "10.50");
}

#[tokio::test]
async fn mutate_now_uses_default_account_when_none_named() {
    let h = harness(&["Premium", "Meraxes"]);
    h.service
        .mutate_now(None, "B000AAAAAA", "10.00", TrackingOp::CreateOrUpdate)
        .await
        .unwrap();

    assert!(
        h.store
            .get(&AccountId::from("Premium"), &pricewatch_core::ItemId::new("B000AAAAAA"))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn mutate_now_delete_removes_from_store() {
    let h = harness(&["Premium"]);
    let account = AccountId::from("Premium");
    h.store
        .put(
            &account,
            &pricewatch_core::ItemId::new("B000AAAAAA"),
            "10.00",
            None,
        )
        .await
        .unwrap();

    let outcome = h
        .service
        .mutate_now(Some(&account), "B000AAAAAA", "", TrackingOp::Delete)
        .await
        .unwrap();

    assert!(outcome.success);
    assert!(
        h.service
            .get_tracked(&account, "B000AAAAAA")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn mutate_now_unknown_account_is_a_config_error() {
    let h = harness(&["Premium"]);
    let err = h
        .service
        .mutate_now(
            Some(&AccountId::from("Ghost")),
            "B000AAAAAA",
            "10.00",
            TrackingOp::CreateOrUpdate,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PricewatchError::AccountNotFound { name } if name == "Ghost"));
}

#[tokio::test(start_paused = true)]
async fn mutate_now_retries_session_acquisition_once() {
    let h = harness(&["Premium"]);
    h.driver.fail_next_create("browser refused to start").await;

    let outcome = h
        .service
        .mutate_now(None, "B000AAAAAA", "10.00", TrackingOp::CreateOrUpdate)
        .await
        .unwrap();

    // The second attempt got a browser and succeeded.
    assert!(outcome.success);
    assert_eq!(h.driver.created_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn mutate_now_folds_exhausted_retries_into_unknown() {
    let h = harness(&["Premium"]);
    h.driver.fail_next_create("down").await;
    h.driver.fail_next_create("still down").await;

    let outcome = h
        .service
        .mutate_now(None, "B000AAAAAA", "10.00", TrackingOp::CreateOrUpdate)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(MutationErrorKind::Unknown));
    assert_eq!(h.mutator.calls().await.len(), 0);
}

#[tokio::test]
async fn unsuccessful_outcome_is_not_retried_or_stored() {
    let h = harness(&["Premium"]);
    h.mutator
        .push_outcome(MutationOutcome::failed(MutationErrorKind::FormError))
        .await;

    let outcome = h
        .service
        .mutate_now(None, "B000AAAAAA", "10.00", TrackingOp::CreateOrUpdate)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(MutationErrorKind::FormError));
    // A definitive rejection is not a retryable condition.
    assert_eq!(h.mutator.calls().await.len(), 1);
    assert!(h.store.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_tracked_validates_the_account() {
    let h = harness(&["Premium"]);
    let err = h
        .service
        .list_tracked(Some(&AccountId::from("Ghost")))
        .await
        .unwrap_err();
    assert!(matches!(err, PricewatchError::AccountNotFound { .. }));
    assert!(h.service.list_tracked(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn store_statistics_reflect_mutations() {
    let h = harness(&["Premium", "Meraxes"]);
    h.service
        .mutate_now(None, "B000AAAAAA", "10.00", TrackingOp::CreateOrUpdate)
        .await
        .unwrap();

    let stats = h.service.store_statistics().await.unwrap();
    assert_eq!(stats.total, 1);
}
