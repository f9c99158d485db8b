//! Driving the full service from a declarative YAML registration

use paranoid::prelude::*;

const WORKSPACE: &str = r#"
types:
  - name: audit_log
  - name: sponsor
    column: deleted_at
  - name: milestone
    column: deleted_at
    edges:
      - name: sponsor
        target: sponsor
        cardinality: one
        foreign_key: sponsor_id
        owned: source
  - name: project
    column: deleted_at
    dependent_recovery: true
    edges:
      - name: milestones
        target: milestone
        foreign_key: project_id
      - name: audit_logs
        target: audit_log
        foreign_key: project_id
  - name: task
    column: is_deleted
    column_type: boolean
  - name: tag
    column: state
    column_type: string
    deleted_value: discarded
"#;

fn service() -> Paranoid {
    let registry = RegistryConfig::from_yaml_str(WORKSPACE)
        .unwrap()
        .build()
        .unwrap();
    Paranoid::new(
        Arc::new(MemoryStore::new()),
        Arc::new(registry),
        Dispatcher::new(),
    )
}

#[tokio::test]
async fn test_yaml_registered_types_get_full_semantics() {
    let paranoid = service();

    let project = paranoid
        .insert(Record::new("project").with("name", "from yaml"))
        .await
        .unwrap();
    let sponsor = paranoid.insert(Record::new("sponsor")).await.unwrap();
    paranoid
        .insert(
            Record::new("milestone")
                .with("project_id", project.id.to_string())
                .with("sponsor_id", sponsor.id.to_string()),
        )
        .await
        .unwrap();
    paranoid
        .insert(Record::new("audit_log").with("project_id", project.id.to_string()))
        .await
        .unwrap();

    paranoid.destroy(&project).await.unwrap();

    assert_eq!(
        paranoid.count("milestone", DeletionScope::OnlyDeleted).await.unwrap(),
        1
    );
    assert_eq!(
        paranoid.count("sponsor", DeletionScope::OnlyDeleted).await.unwrap(),
        1
    );
    assert_eq!(paranoid.count_all("audit_log").await.unwrap(), 0);

    paranoid.recover(&project, true).await.unwrap();
    assert_eq!(
        paranoid.count("milestone", DeletionScope::NotDeleted).await.unwrap(),
        1
    );
    assert_eq!(
        paranoid.count("sponsor", DeletionScope::NotDeleted).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_yaml_marker_kinds_round_trip() {
    let paranoid = service();

    let task = paranoid
        .insert(Record::new("task").with("name", "boolean marked"))
        .await
        .unwrap();
    paranoid.destroy(&task).await.unwrap();
    let stored = paranoid.find("task", &task.id).await.unwrap();
    assert_eq!(stored.get("is_deleted"), &json!(true));

    let tag = paranoid
        .insert(Record::new("tag").with("name", "string marked"))
        .await
        .unwrap();
    paranoid.destroy(&tag).await.unwrap();
    let stored = paranoid.find("tag", &tag.id).await.unwrap();
    assert_eq!(stored.get("state"), &json!("discarded"));

    paranoid.recover(&stored, false).await.unwrap();
    let stored = paranoid.find("tag", &tag.id).await.unwrap();
    assert_eq!(stored.get("state"), &Value::Null);
}

#[tokio::test]
async fn test_yaml_plain_types_stay_unsupported() {
    let paranoid = service();
    let err = paranoid
        .count("audit_log", DeletionScope::NotDeleted)
        .await
        .unwrap_err();
    assert!(matches!(err, ParanoidError::UnsupportedOperation { .. }));
}
