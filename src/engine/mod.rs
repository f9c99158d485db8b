//! The caller-facing paranoid service
//!
//! [`Paranoid`] bundles a store, a registry and a dispatcher and exposes
//! the full operation surface: deletion-state scopes, soft/hard destroy,
//! bulk deletes and recovery. Every scope-gated operation fails with
//! `UnsupportedOperation` for types not registered as paranoid.

pub mod delete;
pub mod recover;

pub use delete::DeletionEngine;
pub use recover::RecoveryEngine;

use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use crate::core::scope::{DeletionScope, scope_predicate};
use crate::core::store::Store;
use crate::hooks::Dispatcher;
use crate::registry::ParanoidRegistry;
use std::sync::Arc;
use uuid::Uuid;

/// Facade over the deletion and recovery engines
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ParanoidRegistry::new();
/// registry.register(TypeSpec::paranoid("order", Marker::timestamp("deleted_at")))?;
///
/// let paranoid = Paranoid::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(registry),
///     Dispatcher::new(),
/// );
///
/// let order = paranoid.insert(Record::new("order").with("name", "Order #1")).await?;
/// paranoid.destroy(&order).await?;
/// assert_eq!(paranoid.count("order", DeletionScope::OnlyDeleted).await?, 1);
/// paranoid.recover(&order, false).await?;
/// ```
#[derive(Clone)]
pub struct Paranoid {
    store: Arc<dyn Store>,
    registry: Arc<ParanoidRegistry>,
    deletion: DeletionEngine,
    recovery: RecoveryEngine,
}

impl Paranoid {
    /// Assemble the service from its collaborators.
    ///
    /// The dispatcher (hooks and observers) is taken by value and frozen;
    /// registration happens before construction.
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<ParanoidRegistry>,
        dispatcher: Dispatcher,
    ) -> Self {
        let dispatcher = Arc::new(dispatcher);
        Self {
            deletion: DeletionEngine::new(store.clone(), registry.clone(), dispatcher.clone()),
            recovery: RecoveryEngine::new(store.clone(), registry.clone(), dispatcher),
            store,
            registry,
        }
    }

    /// The underlying store, for explicit caller-driven transactions
    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    /// The registry backing this service
    pub fn registry(&self) -> &ParanoidRegistry {
        &self.registry
    }

    // === Scopes ===

    /// The predicate a scope compiles to for a paranoid type, for
    /// composing with further filtering
    pub fn scope(&self, record_type: &str, scope: DeletionScope) -> ParanoidResult<Predicate> {
        let config = self
            .registry
            .paranoid(record_type, scope.operation_name())?;
        scope_predicate(config, scope)
    }

    /// Rows of a paranoid type within a scope, optionally narrowed by an
    /// extra predicate, in store order
    pub async fn select(
        &self,
        record_type: &str,
        scope: DeletionScope,
        extra: Option<&Predicate>,
    ) -> ParanoidResult<Vec<Record>> {
        let mut predicate = self.scope(record_type, scope)?;
        if let Some(extra) = extra {
            predicate = predicate.and(extra.clone());
        }
        self.store.select(record_type, &predicate).await
    }

    /// The default read population: rows not marked deleted
    pub async fn not_deleted(&self, record_type: &str) -> ParanoidResult<Vec<Record>> {
        self.select(record_type, DeletionScope::NotDeleted, None).await
    }

    /// Rows currently marked deleted
    pub async fn only_deleted(&self, record_type: &str) -> ParanoidResult<Vec<Record>> {
        self.select(record_type, DeletionScope::OnlyDeleted, None).await
    }

    /// The entire stored population
    pub async fn with_deleted(&self, record_type: &str) -> ParanoidResult<Vec<Record>> {
        self.select(record_type, DeletionScope::WithDeleted, None).await
    }

    /// Number of rows of a paranoid type within a scope
    pub async fn count(&self, record_type: &str, scope: DeletionScope) -> ParanoidResult<usize> {
        let predicate = self.scope(record_type, scope)?;
        self.store.count(record_type, &predicate).await
    }

    // === Plain record access (any registered type) ===

    /// Insert a record of a registered type
    pub async fn insert(&self, record: Record) -> ParanoidResult<Record> {
        self.registry.expect(&record.record_type)?;
        self.store.insert(record).await
    }

    /// Fetch a record by id from the full population.
    ///
    /// Hard-deleted rows are gone: the lookup fails with `NotFound`.
    pub async fn find(&self, record_type: &str, id: &Uuid) -> ParanoidResult<Record> {
        self.registry.expect(record_type)?;
        self.store
            .fetch(record_type, id)
            .await?
            .ok_or_else(|| ParanoidError::not_found(record_type, *id))
    }

    /// All rows of any registered type, paranoid or not
    pub async fn all(&self, record_type: &str) -> ParanoidResult<Vec<Record>> {
        self.registry.expect(record_type)?;
        self.store.select(record_type, &Predicate::All).await
    }

    /// Number of stored rows of any registered type
    pub async fn count_all(&self, record_type: &str) -> ParanoidResult<usize> {
        self.registry.expect(record_type)?;
        self.store.count(record_type, &Predicate::All).await
    }

    /// Whether the record currently reads as deleted under its type's
    /// marker
    pub fn is_deleted(&self, record: &Record) -> ParanoidResult<bool> {
        let config = self.registry.paranoid(&record.record_type, "is_deleted")?;
        Ok(config.is_deleted(record))
    }

    // === Deletion ===

    /// Soft-delete a record, cascading per edge policy
    pub async fn destroy(&self, record: &Record) -> ParanoidResult<()> {
        self.deletion.destroy(record).await
    }

    /// Physically remove a record, cascading per edge policy
    pub async fn hard_destroy(&self, record: &Record) -> ParanoidResult<()> {
        self.deletion.hard_destroy(record).await
    }

    /// Bulk soft-mark matching rows; no hooks, no cascade
    pub async fn delete_all(
        &self,
        record_type: &str,
        predicate: Option<&Predicate>,
    ) -> ParanoidResult<u64> {
        self.deletion.delete_all(record_type, predicate).await
    }

    /// Bulk physical removal of matching rows; no hooks, no cascade
    pub async fn hard_delete_all(
        &self,
        record_type: &str,
        predicate: Option<&Predicate>,
    ) -> ParanoidResult<u64> {
        self.deletion.hard_delete_all(record_type, predicate).await
    }

    // === Recovery ===

    /// Clear a record's deletion marker; with `recursive`, restore its
    /// cascade-deleted dependents as well
    pub async fn recover(&self, record: &Record, recursive: bool) -> ParanoidResult<()> {
        self.recovery.recover(record, recursive).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Marker, TypeSpec};
    use crate::storage::MemoryStore;

    fn service() -> Paranoid {
        let mut registry = ParanoidRegistry::new();
        registry
            .register(TypeSpec::paranoid("order", Marker::timestamp("deleted_at")))
            .unwrap();
        registry.register(TypeSpec::plain("audit_entry")).unwrap();
        Paranoid::new(
            Arc::new(MemoryStore::new()),
            Arc::new(registry),
            Dispatcher::new(),
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_unregistered_type() {
        let paranoid = service();
        let err = paranoid.insert(Record::new("mystery")).await.unwrap_err();
        assert!(matches!(err, ParanoidError::Config { .. }));
    }

    #[tokio::test]
    async fn test_scopes_gated_on_paranoid_types() {
        let paranoid = service();
        for scope in [
            DeletionScope::NotDeleted,
            DeletionScope::OnlyDeleted,
            DeletionScope::WithDeleted,
        ] {
            let err = paranoid.count("audit_entry", scope).await.unwrap_err();
            assert!(matches!(err, ParanoidError::UnsupportedOperation { .. }));
        }
        assert_eq!(
            paranoid.count("order", DeletionScope::WithDeleted).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_select_composes_extra_predicate() {
        let paranoid = service();
        paranoid
            .insert(Record::new("order").with("name", "big").with("amount", 500))
            .await
            .unwrap();
        paranoid
            .insert(Record::new("order").with("name", "small").with("amount", 5))
            .await
            .unwrap();

        let big = paranoid
            .select(
                "order",
                DeletionScope::NotDeleted,
                Some(&Predicate::gt("amount", 100)),
            )
            .await
            .unwrap();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].str_field("name"), Some("big"));
    }

    #[tokio::test]
    async fn test_find_reports_not_found() {
        let paranoid = service();
        let err = paranoid
            .find("order", &Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ParanoidError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_is_deleted_reads_marker() {
        let paranoid = service();
        let order = paranoid.insert(Record::new("order")).await.unwrap();
        assert!(!paranoid.is_deleted(&order).unwrap());

        paranoid.destroy(&order).await.unwrap();
        let current = paranoid.find("order", &order.id).await.unwrap();
        assert!(paranoid.is_deleted(&current).unwrap());
    }
}
