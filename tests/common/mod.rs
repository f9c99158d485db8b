//! Shared fixture for the integration suites
//!
//! Builds a registry modelling a small project-management domain that
//! exercises every cascade shape:
//!
//! ```text
//! project (timestamp) ──has_many──▶ milestone (timestamp) ──belongs_to──▶ sponsor (timestamp)
//!    │                 ──has_many──▶ task (boolean) ──has_one──▶ checklist (timestamp)
//!    │                 ──has_many──▶ audit_log (plain)
//!    │                 ──belongs_to─▶ audit_log (plain)
//!    │                 ──has_one───▶ banner (plain)
//! tag (string marker), document (timestamp, used for hook tests)
//! vendor ──has_many (destroy)──▶ product ◀──has_many (delete)── supplier
//! portfolio ──has_many──▶ internal_project (extends project)
//! ```
//!
//! Seeded like a fresh workspace: three projects and three tasks named
//! "paranoid", "really paranoid" and "extremely paranoid", one tag, one
//! audit log and one document.

#![allow(dead_code)]

use paranoid::prelude::*;

pub const NAMES: [&str; 3] = ["paranoid", "really paranoid", "extremely paranoid"];

pub struct Harness {
    pub paranoid: Paranoid,
    pub store: Arc<MemoryStore>,
    pub observer: Arc<RecordingObserver>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn registry() -> ParanoidRegistry {
    let mut registry = ParanoidRegistry::new();

    registry.register(TypeSpec::plain("audit_log")).unwrap();
    registry.register(TypeSpec::plain("banner")).unwrap();
    registry
        .register(TypeSpec::paranoid(
            "sponsor",
            Marker::timestamp("deleted_at"),
        ))
        .unwrap();
    registry
        .register(TypeSpec::paranoid(
            "checklist",
            Marker::timestamp("deleted_at"),
        ))
        .unwrap();
    registry
        .register(
            TypeSpec::paranoid("milestone", Marker::timestamp("deleted_at"))
                .edge(AssociationEdge::belongs_to("sponsor", "sponsor", "sponsor_id")),
        )
        .unwrap();
    registry
        .register(
            TypeSpec::paranoid("task", Marker::boolean("is_deleted"))
                .edge(AssociationEdge::has_one("checklist", "checklist", "task_id")),
        )
        .unwrap();
    registry
        .register(TypeSpec::paranoid(
            "tag",
            Marker::literal("state", "discarded"),
        ))
        .unwrap();
    registry
        .register(
            TypeSpec::paranoid("project", Marker::timestamp("deleted_at"))
                .edge(AssociationEdge::has_many("milestones", "milestone", "project_id"))
                .edge(AssociationEdge::has_many("tasks", "task", "project_id"))
                .edge(AssociationEdge::has_many("audit_logs", "audit_log", "project_id"))
                .edge(AssociationEdge::belongs_to(
                    "primary_log",
                    "audit_log",
                    "primary_log_id",
                ))
                .edge(AssociationEdge::has_one("banner", "banner", "project_id")),
        )
        .unwrap();
    registry
        .register(TypeSpec::paranoid(
            "document",
            Marker::timestamp("deleted_at"),
        ))
        .unwrap();

    // Two parents of the same dependent type with different policies
    registry
        .register(
            TypeSpec::paranoid("vendor", Marker::timestamp("deleted_at"))
                .edge(AssociationEdge::has_many("products", "product", "vendor_id")),
        )
        .unwrap();
    registry
        .register(
            TypeSpec::paranoid("supplier", Marker::timestamp("deleted_at")).edge(
                AssociationEdge::has_many("products", "product", "supplier_id")
                    .on_delete(CascadePolicy::Delete),
            ),
        )
        .unwrap();
    registry
        .register(TypeSpec::paranoid(
            "product",
            Marker::timestamp("deleted_at"),
        ))
        .unwrap();

    // Inheritance: subtype shares the supertype's marker and edges
    registry
        .register(TypeSpec::plain("internal_project").extends("project"))
        .unwrap();
    registry
        .register(
            TypeSpec::paranoid("portfolio", Marker::timestamp("deleted_at")).edge(
                AssociationEdge::has_many("internal", "internal_project", "portfolio_id"),
            ),
        )
        .unwrap();

    registry
}

/// Harness with an empty dispatcher
pub async fn harness() -> Harness {
    harness_with(Dispatcher::new()).await
}

/// Harness with caller-registered hooks; seeds the base population
pub async fn harness_with(mut dispatcher: Dispatcher) -> Harness {
    init_tracing();

    let observer = Arc::new(RecordingObserver::new());
    dispatcher.observe("document", observer.clone());

    let store = Arc::new(MemoryStore::new());
    let paranoid = Paranoid::new(store.clone(), Arc::new(registry()), dispatcher);

    for name in NAMES {
        paranoid
            .insert(Record::new("project").with("name", name))
            .await
            .unwrap();
        paranoid
            .insert(Record::new("task").with("name", name))
            .await
            .unwrap();
    }
    paranoid
        .insert(Record::new("tag").with("name", "strings can be paranoid"))
        .await
        .unwrap();
    paranoid
        .insert(Record::new("audit_log").with("name", "no paranoid goals"))
        .await
        .unwrap();
    paranoid
        .insert(Record::new("document").with("name", "paranoid with callbacks"))
        .await
        .unwrap();

    observer.reset();

    Harness {
        paranoid,
        store,
        observer,
    }
}

impl Harness {
    pub async fn not_deleted(&self, record_type: &str) -> usize {
        self.paranoid
            .count(record_type, DeletionScope::NotDeleted)
            .await
            .unwrap()
    }

    pub async fn only_deleted(&self, record_type: &str) -> usize {
        self.paranoid
            .count(record_type, DeletionScope::OnlyDeleted)
            .await
            .unwrap()
    }

    pub async fn with_deleted(&self, record_type: &str) -> usize {
        self.paranoid
            .count(record_type, DeletionScope::WithDeleted)
            .await
            .unwrap()
    }

    /// First row of the default read population, in insertion order
    pub async fn first_not_deleted(&self, record_type: &str) -> Record {
        self.paranoid
            .not_deleted(record_type)
            .await
            .unwrap()
            .into_iter()
            .next()
            .expect("expected a live row")
    }

    /// First row currently marked deleted
    pub async fn first_only_deleted(&self, record_type: &str) -> Record {
        self.paranoid
            .only_deleted(record_type)
            .await
            .unwrap()
            .into_iter()
            .next()
            .expect("expected a deleted row")
    }

    /// Attach the full dependent graph to the first project: three
    /// milestones (each with a sponsor), three tasks (each with a
    /// checklist), three audit logs, one primary log and one banner.
    pub async fn seed_project_graph(&self) -> Record {
        let project = self.first_not_deleted("project").await;

        for i in 1..=3 {
            let sponsor = self
                .paranoid
                .insert(Record::new("sponsor").with("name", format!("sponsor_{i}")))
                .await
                .unwrap();
            self.paranoid
                .insert(
                    Record::new("milestone")
                        .with("name", format!("milestone_{i}"))
                        .with("project_id", project.id.to_string())
                        .with("sponsor_id", sponsor.id.to_string()),
                )
                .await
                .unwrap();

            let task = self
                .paranoid
                .insert(
                    Record::new("task")
                        .with("name", format!("graph_task_{i}"))
                        .with("project_id", project.id.to_string()),
                )
                .await
                .unwrap();
            self.paranoid
                .insert(
                    Record::new("checklist")
                        .with("name", format!("checklist_{i}"))
                        .with("task_id", task.id.to_string()),
                )
                .await
                .unwrap();

            self.paranoid
                .insert(
                    Record::new("audit_log")
                        .with("name", format!("log_{i}"))
                        .with("project_id", project.id.to_string()),
                )
                .await
                .unwrap();
        }

        let primary_log = self
            .paranoid
            .insert(Record::new("audit_log").with("name", "primary log"))
            .await
            .unwrap();
        let mut project_with_log = self
            .paranoid
            .find("project", &project.id)
            .await
            .unwrap();
        project_with_log.set("primary_log_id", primary_log.id.to_string());
        let project = self
            .store
            .update(project_with_log)
            .await
            .unwrap();

        self.paranoid
            .insert(Record::new("banner").with("project_id", project.id.to_string()))
            .await
            .unwrap();

        project
    }
}
