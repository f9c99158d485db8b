//! Storage collaborator contract
//!
//! The engines are agnostic to the underlying storage mechanism: anything
//! that can filter rows by predicate, mutate single rows, mutate in bulk,
//! and scope work in nested transactions can back them. The crate ships
//! one implementation, [`crate::storage::MemoryStore`], for tests and
//! development.
//!
//! # Transactions
//!
//! `begin`/`commit`/`rollback` nest by depth counting: a `begin` inside an
//! open transaction joins it instead of opening a new one, so a rollback
//! anywhere unwinds every mutation since the outermost `begin`. Callbacks
//! registered with `defer_on_commit` run exactly once, after the
//! outermost commit, and are discarded on rollback. With no transaction
//! open, a deferred callback runs immediately.

use crate::core::error::ParanoidResult;
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Callback deferred to the outermost transaction commit
pub type CommitHook = Box<dyn FnOnce() + Send + 'static>;

/// Contract the engines require from a storage backend
#[async_trait]
pub trait Store: Send + Sync {
    // === Transactions ===

    /// Open a transaction, or join the ambient one
    async fn begin(&self) -> ParanoidResult<()>;

    /// Commit the current transaction level. The outermost commit makes
    /// all mutations durable and fires deferred callbacks.
    async fn commit(&self) -> ParanoidResult<()>;

    /// Roll back to the state at the outermost `begin`, discarding
    /// deferred callbacks
    async fn rollback(&self) -> ParanoidResult<()>;

    /// Register a callback to run after the outermost commit
    fn defer_on_commit(&self, hook: CommitHook);

    // === Single-row operations ===

    /// Insert a new row
    async fn insert(&self, record: Record) -> ParanoidResult<Record>;

    /// Fetch a row by id
    async fn fetch(&self, record_type: &str, id: &Uuid) -> ParanoidResult<Option<Record>>;

    /// Replace an existing row
    async fn update(&self, record: Record) -> ParanoidResult<Record>;

    /// Physically remove a row. Removing an absent row is a no-op.
    async fn remove(&self, record_type: &str, id: &Uuid) -> ParanoidResult<()>;

    // === Predicate-filtered operations ===

    /// All rows of a type matching the predicate
    async fn select(&self, record_type: &str, predicate: &Predicate)
    -> ParanoidResult<Vec<Record>>;

    /// Number of rows of a type matching the predicate
    async fn count(&self, record_type: &str, predicate: &Predicate) -> ParanoidResult<usize>;

    /// Set the given fields on every matching row, returning how many
    /// rows changed
    async fn update_where(
        &self,
        record_type: &str,
        predicate: &Predicate,
        changes: &Map<String, Value>,
    ) -> ParanoidResult<u64>;

    /// Physically remove every matching row, returning how many rows
    /// were removed
    async fn remove_where(&self, record_type: &str, predicate: &Predicate) -> ParanoidResult<u64>;
}
