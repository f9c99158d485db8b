//! # Paranoid-RS
//!
//! Reversible ("paranoid") deletion for record stores: records marked
//! deleted remain physically stored but are excluded from default reads,
//! can be distinguished via query scopes, and can later be restored.
//!
//! ## Features
//!
//! - **Deletion-State Scopes**: `not_deleted`, `only_deleted` and
//!   `with_deleted` query populations per registered type
//! - **Cascading Deletes**: declared association edges with per-edge
//!   policy (destroy, delete, nullify, restrict)
//! - **Recursive Recovery**: restore a record and, transitively, its
//!   cascade-deleted dependents
//! - **Transactional Cascades**: a failure mid-cascade rolls back every
//!   mutation of the cascade
//! - **Lifecycle Hooks**: before/after destroy and recover stages, plus a
//!   commit-deferred stage bound to the outermost transaction
//! - **Scope-Aware Uniqueness**: soft-deleted rows still occupy their
//!   values until hard-deleted
//! - **Pluggable Storage**: everything runs against a small async
//!   [`core::store::Store`] contract
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paranoid::prelude::*;
//!
//! let mut registry = ParanoidRegistry::new();
//! registry.register(
//!     TypeSpec::paranoid("order", Marker::timestamp("deleted_at"))
//!         .edge(AssociationEdge::has_many("items", "item", "order_id")),
//! )?;
//! registry.register(TypeSpec::paranoid("item", Marker::timestamp("deleted_at")))?;
//!
//! let paranoid = Paranoid::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(registry),
//!     Dispatcher::new(),
//! );
//!
//! let order = paranoid.insert(Record::new("order").with("name", "Order #1")).await?;
//!
//! paranoid.destroy(&order).await?;            // soft delete, cascades to items
//! assert!(paranoid.not_deleted("order").await?.is_empty());
//!
//! paranoid.recover(&order, true).await?;      // restore order and its items
//! paranoid.hard_destroy(&order).await?;       // physically remove
//! ```

pub mod associations;
pub mod config;
pub mod core;
pub mod engine;
pub mod hooks;
pub mod registry;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ParanoidError, ParanoidResult},
        predicate::Predicate,
        record::Record,
        scope::{DeletionScope, DeletionState, scope_predicate},
        store::{CommitHook, Store},
        validation::{UniquenessRule, validate_unique},
    };

    // === Registry ===
    pub use crate::registry::{
        AssociationEdge, Cardinality, CascadePolicy, DependentRecovery, ForeignKey, Marker,
        MarkerKind, ParanoidRegistry, TypeConfig, TypeSpec,
    };

    // === Engines ===
    pub use crate::engine::{DeletionEngine, Paranoid, RecoveryEngine};

    // === Hooks & observers ===
    pub use crate::hooks::{Dispatcher, HookStage, Observer, RecordingObserver};

    // === Associations ===
    pub use crate::associations::AssociationResolver;

    // === Storage ===
    pub use crate::storage::MemoryStore;

    // === Config ===
    pub use crate::config::{EdgeEntry, RegistryConfig, TypeEntry};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
