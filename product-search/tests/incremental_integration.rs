//! Integration tests for the incremental update service.

mod common;

use common::{published, EngineOp, Harness};
use product_search::{ProductEvent, UpdateOutcome};

#[tokio::test]
async fn test_removed_variant_leaves_no_orphan() {
    let harness = Harness::new(vec![published(
        "prod_1",
        "Blue T-Shirt",
        &[("A", 1500, 3), ("B", 1500, 4)],
    )]);
    harness.deps.sync.full_resync().await.unwrap();
    assert_eq!(harness.object_ids(), vec!["prod_1_A", "prod_1_B"]);

    harness
        .catalog
        .insert(published("prod_1", "Blue T-Shirt", &[("A", 1800, 9)]));
    let outcome = harness
        .deps
        .incremental
        .handle_event(&ProductEvent::product_updated("prod_1"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Reindexed {
            deleted: 2,
            indexed: 1
        }
    );
    assert_eq!(harness.object_ids(), vec!["prod_1_A"]);
    let record = harness.engine.inner.get("prod_1_A").unwrap();
    assert_eq!(record.price, 1800);
    assert_eq!(record.stocked_quantity, 9);
}

#[tokio::test]
async fn test_delete_happens_before_upsert() {
    let harness = Harness::new(vec![published("prod_1", "Lamp", &[("v1", 2000, 2)])]);
    harness.deps.sync.full_resync().await.unwrap();
    harness.engine.reset_ops();

    harness
        .deps
        .incremental
        .handle_event(&ProductEvent::variant_updated("prod_1", "v1"))
        .await
        .unwrap();

    assert_eq!(
        harness.engine.ops(),
        vec![EngineOp::Search, EngineOp::Delete(1), EngineOp::Save(1)]
    );
}

#[tokio::test]
async fn test_created_product_is_indexed() {
    let harness = Harness::new(vec![]);
    harness
        .catalog
        .insert(published("prod_9", "Kettle", &[("v1", 3500, 5), ("v2", 3900, 0)]));

    harness
        .deps
        .incremental
        .handle_event(&ProductEvent::product_created("prod_9"))
        .await
        .unwrap();

    assert_eq!(harness.object_ids(), vec!["prod_9_v1", "prod_9_v2"]);
}

#[tokio::test]
async fn test_deleted_product_does_not_refetch() {
    let harness = Harness::new(vec![
        published("prod_1", "Lamp", &[("v1", 2000, 2), ("v2", 2000, 2)]),
        published("prod_2", "Chair", &[("v1", 5000, 1)]),
    ]);
    harness.deps.sync.full_resync().await.unwrap();
    harness.catalog.set_failing(true);

    let outcome = harness
        .deps
        .incremental
        .handle_event(&ProductEvent::product_deleted("prod_1"))
        .await
        .unwrap();

    assert_eq!(outcome, UpdateOutcome::Removed { deleted: 2 });
    assert_eq!(harness.object_ids(), vec!["prod_2_v1"]);
}

#[tokio::test]
async fn test_update_product_entry_point() {
    let harness = Harness::new(vec![]);

    harness
        .deps
        .incremental
        .update_product(&published("prod_1", "Lamp", &[("v1", 2000, 2)]))
        .await
        .unwrap();
    let removed = harness.deps.incremental.delete_product("prod_1").await.unwrap();

    assert_eq!(removed, 1);
    assert!(harness.object_ids().is_empty());
}

#[tokio::test]
async fn test_event_failures_are_isolated() {
    let harness = Harness::new(vec![published("prod_2", "Chair", &[("v1", 5000, 1)])]);

    let summary = harness
        .deps
        .incremental
        .handle_events(&[
            ProductEvent::product_deleted(""),
            ProductEvent::product_created("prod_2"),
        ])
        .await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].event, ProductEvent::product_deleted(""));
    assert_eq!(harness.object_ids(), vec!["prod_2_v1"]);
}

#[tokio::test]
async fn test_engine_failure_surfaces_and_next_event_proceeds() {
    let harness = Harness::new(vec![
        published("prod_1", "Lamp", &[("v1", 2000, 2)]),
        published("prod_2", "Chair", &[("v1", 5000, 1)]),
    ]);
    harness.engine.inner.fail_save_on_call(1);

    let summary = harness
        .deps
        .incremental
        .handle_events(&[
            ProductEvent::product_updated("prod_1"),
            ProductEvent::product_updated("prod_2"),
        ])
        .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].event.product_id(), "prod_1");
    assert_eq!(harness.object_ids(), vec!["prod_2_v1"]);
}
