//! Recovery, including recursion through the dependent graph

mod common;

use common::*;
use paranoid::prelude::*;

#[tokio::test]
async fn test_recover_restores_default_read_population() {
    let h = harness().await;

    assert_eq!(h.not_deleted("task").await, 3);
    let task = h.first_not_deleted("task").await;
    h.paranoid.destroy(&task).await.unwrap();
    assert_eq!(h.not_deleted("task").await, 2);

    let deleted = h.first_only_deleted("task").await;
    h.paranoid.recover(&deleted, false).await.unwrap();
    assert_eq!(h.not_deleted("task").await, 3);

    assert_eq!(h.not_deleted("tag").await, 1);
    let tag = h.first_not_deleted("tag").await;
    h.paranoid.destroy(&tag).await.unwrap();
    assert_eq!(h.not_deleted("tag").await, 0);

    let from_full_population = h
        .paranoid
        .with_deleted("tag")
        .await
        .unwrap()
        .remove(0);
    h.paranoid
        .recover(&from_full_population, false)
        .await
        .unwrap();
    assert_eq!(h.not_deleted("tag").await, 1);
}

/// Cascade-delete the seeded graph and verify the post-destroy counts
/// shared by the recursion tests
async fn destroy_seeded_graph(h: &Harness) -> Record {
    let project = h.seed_project_graph().await;

    assert_eq!(h.not_deleted("project").await, 3);
    assert_eq!(h.not_deleted("milestone").await, 3);
    assert_eq!(h.not_deleted("sponsor").await, 3);
    assert_eq!(h.not_deleted("checklist").await, 3);
    assert_eq!(h.not_deleted("task").await, 6);
    assert_eq!(h.paranoid.count_all("audit_log").await.unwrap(), 5);
    assert_eq!(h.paranoid.count_all("banner").await.unwrap(), 1);

    h.paranoid.destroy(&project).await.unwrap();

    assert_eq!(h.not_deleted("project").await, 2);
    assert_eq!(h.not_deleted("milestone").await, 0);
    assert_eq!(h.not_deleted("sponsor").await, 0);
    assert_eq!(h.not_deleted("checklist").await, 0);
    assert_eq!(h.not_deleted("task").await, 3);

    // Non-paranoid dependents are hard-cascaded: rows are gone
    assert_eq!(h.paranoid.count_all("audit_log").await.unwrap(), 1);
    assert_eq!(h.paranoid.count_all("banner").await.unwrap(), 0);

    project
}

#[tokio::test]
async fn test_recursive_recovery_restores_the_whole_cascade() {
    let h = harness().await;
    let project = destroy_seeded_graph(&h).await;

    h.paranoid.recover(&project, true).await.unwrap();

    assert_eq!(h.not_deleted("project").await, 3);
    assert_eq!(h.not_deleted("milestone").await, 3);
    assert_eq!(h.not_deleted("sponsor").await, 3);
    assert_eq!(h.not_deleted("checklist").await, 3);
    assert_eq!(h.not_deleted("task").await, 6);

    // Hard-cascaded rows cannot come back
    assert_eq!(h.paranoid.count_all("audit_log").await.unwrap(), 1);
    assert_eq!(h.paranoid.count_all("banner").await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_recursive_recovery_leaves_dependents_deleted() {
    let h = harness().await;
    let project = destroy_seeded_graph(&h).await;

    h.paranoid.recover(&project, false).await.unwrap();

    assert_eq!(h.not_deleted("project").await, 3);
    assert_eq!(h.not_deleted("milestone").await, 0);
    assert_eq!(h.not_deleted("sponsor").await, 0);
    assert_eq!(h.not_deleted("checklist").await, 0);
    assert_eq!(h.not_deleted("task").await, 3);
    assert_eq!(h.paranoid.count_all("audit_log").await.unwrap(), 1);
    assert_eq!(h.paranoid.count_all("banner").await.unwrap(), 0);
}

#[tokio::test]
async fn test_recursion_from_a_live_record_still_reaches_dependents() {
    let h = harness().await;
    let project = destroy_seeded_graph(&h).await;

    // Restore only the parent first
    h.paranoid.recover(&project, false).await.unwrap();
    assert_eq!(h.not_deleted("milestone").await, 0);

    // Recovering the now-live parent recursively is a no-op for the
    // parent itself but still walks the graph
    h.paranoid.recover(&project, true).await.unwrap();
    assert_eq!(h.not_deleted("milestone").await, 3);
    assert_eq!(h.not_deleted("sponsor").await, 3);
}

#[tokio::test]
async fn test_hard_deleted_record_cannot_be_recovered() {
    let h = harness().await;

    let project = h.first_not_deleted("project").await;
    h.paranoid.hard_destroy(&project).await.unwrap();

    let err = h.paranoid.recover(&project, false).await.unwrap_err();
    assert!(matches!(err, ParanoidError::NotFound { .. }));
}

#[tokio::test]
async fn test_recovery_never_creates_rows() {
    let h = harness().await;
    let before = h.with_deleted("project").await;

    let project = h.first_not_deleted("project").await;
    h.paranoid.destroy(&project).await.unwrap();
    h.paranoid.recover(&project, true).await.unwrap();

    assert_eq!(h.with_deleted("project").await, before);
}
