//! Deletion engine: soft and hard deletes with policy-driven cascade
//!
//! The soft path marks rows and leaves them in storage; the hard path
//! removes rows. Both walk the declared association edges of the record's
//! type and apply the per-edge cascade policy, inside one transaction:
//! a failure anywhere unwinds every mutation of the cascade.

use crate::associations::AssociationResolver;
use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use crate::core::scope::{DeletionScope, scope_predicate};
use crate::core::store::Store;
use crate::hooks::{Dispatcher, HookStage};
use crate::registry::{AssociationEdge, CascadePolicy, ForeignKey, ParanoidRegistry, TypeConfig};
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Performs soft and hard deletes, single-record or bulk
#[derive(Clone)]
pub struct DeletionEngine {
    store: Arc<dyn Store>,
    registry: Arc<ParanoidRegistry>,
    dispatcher: Arc<Dispatcher>,
    resolver: AssociationResolver,
}

impl DeletionEngine {
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<ParanoidRegistry>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            resolver: AssociationResolver::new(store.clone()),
            store,
            registry,
            dispatcher,
        }
    }

    /// Soft-delete a record and cascade to its dependents.
    ///
    /// Re-invoking on an already-deleted record re-marks and re-cascades;
    /// callers wanting idempotence should check state first.
    pub async fn destroy(&self, record: &Record) -> ParanoidResult<()> {
        self.registry.paranoid(&record.record_type, "destroy")?;
        self.store.begin().await?;
        match self.soft_destroy(record.clone()).await {
            Ok(()) => self.store.commit().await,
            Err(e) => {
                let _ = self.store.rollback().await;
                Err(e)
            }
        }
    }

    /// Physically remove a record and cascade to its dependents.
    ///
    /// On a `Destroy` edge to a paranoid type, dependents already in the
    /// deleted state are purged while live dependents are only
    /// soft-deleted: hard-deleting a parent does not hard-delete its live
    /// paranoid dependents unless the edge policy is `Delete`. Callers
    /// depend on this asymmetry; do not change it.
    pub async fn hard_destroy(&self, record: &Record) -> ParanoidResult<()> {
        self.registry.paranoid(&record.record_type, "hard_destroy")?;
        self.store.begin().await?;
        match self.hard_destroy_tree(record.clone()).await {
            Ok(()) => self.store.commit().await,
            Err(e) => {
                let _ = self.store.rollback().await;
                Err(e)
            }
        }
    }

    /// Bulk soft-mark of every matching row (the whole population when no
    /// predicate is given). Bypasses hooks and cascade.
    pub async fn delete_all(
        &self,
        record_type: &str,
        predicate: Option<&Predicate>,
    ) -> ParanoidResult<u64> {
        let config = self.registry.paranoid(record_type, "delete_all")?;
        let marker = config.marker_for("delete_all")?;

        let mut changes = Map::new();
        changes.insert(marker.column.clone(), marker.deleted_value());
        let predicate = predicate.cloned().unwrap_or(Predicate::All);

        let marked = self
            .store
            .update_where(record_type, &predicate, &changes)
            .await?;
        tracing::debug!(record_type, rows = marked, "bulk soft delete");
        Ok(marked)
    }

    /// Bulk physical removal of every matching row. Bypasses hooks and
    /// cascade.
    pub async fn hard_delete_all(
        &self,
        record_type: &str,
        predicate: Option<&Predicate>,
    ) -> ParanoidResult<u64> {
        self.registry.paranoid(record_type, "hard_delete_all")?;

        let predicate = predicate.cloned().unwrap_or(Predicate::All);
        let removed = self.store.remove_where(record_type, &predicate).await?;
        tracing::debug!(record_type, rows = removed, "bulk hard delete");
        Ok(removed)
    }

    /// Soft-delete one record and cascade. Boxed for recursion through
    /// the association graph.
    pub(crate) fn soft_destroy(&self, record: Record) -> BoxFuture<'_, ParanoidResult<()>> {
        Box::pin(async move {
            let config = self.registry.paranoid(&record.record_type, "destroy")?;
            let marker = config.marker_for("destroy")?;
            let current = self.require(&record.record_type, &record.id).await?;

            self.dispatcher.run(HookStage::BeforeDestroy, &current)?;

            let mut marked = current;
            marked.set(marker.column.clone(), marker.deleted_value());
            marked.touch();
            let marked = self.store.update(marked).await?;
            tracing::debug!(
                record_type = %marked.record_type,
                id = %marked.id,
                "soft deleted record"
            );

            for edge in &config.edges {
                self.cascade_soft(&marked, edge).await?;
            }

            self.dispatcher.run(HookStage::AfterDestroy, &marked)?;
            self.schedule_deferred(&marked);
            Ok(())
        })
    }

    /// Hard-delete one record and cascade. Works for any registered type:
    /// non-paranoid dependents reach this path through `Destroy` edges.
    pub(crate) fn hard_destroy_tree(&self, record: Record) -> BoxFuture<'_, ParanoidResult<()>> {
        Box::pin(async move {
            let config = self.registry.expect(&record.record_type)?;
            let current = self.require(&record.record_type, &record.id).await?;

            self.dispatcher.run(HookStage::BeforeDestroy, &current)?;

            for edge in &config.edges {
                self.cascade_hard(&current, edge).await?;
            }

            self.store.remove(&current.record_type, &current.id).await?;
            tracing::debug!(
                record_type = %current.record_type,
                id = %current.id,
                "hard deleted record"
            );

            self.dispatcher.run(HookStage::AfterDestroy, &current)?;
            self.schedule_deferred(&current);
            Ok(())
        })
    }

    /// Apply one edge's policy on the soft path
    async fn cascade_soft(&self, parent: &Record, edge: &AssociationEdge) -> ParanoidResult<()> {
        let target = self.registry.expect(&edge.target_type)?;
        if !target.is_paranoid() {
            // No soft state to fall back to
            return self.cascade_plain(parent, edge, target).await;
        }

        match edge.on_delete {
            CascadePolicy::Destroy => {
                let live = scope_predicate(target, DeletionScope::NotDeleted)?;
                for dependent in self.resolver.dependents(parent, edge, &live).await? {
                    self.soft_destroy(dependent).await?;
                }
                Ok(())
            }
            CascadePolicy::Delete => self.bulk_soft_mark(parent, edge, target).await,
            CascadePolicy::Nullify => self.nullify(parent, edge).await,
            CascadePolicy::Restrict => self.restrict(parent, edge, target).await,
        }
    }

    /// Apply one edge's policy on the hard path
    async fn cascade_hard(&self, parent: &Record, edge: &AssociationEdge) -> ParanoidResult<()> {
        let target = self.registry.expect(&edge.target_type)?;
        if !target.is_paranoid() {
            return self.cascade_plain(parent, edge, target).await;
        }

        match edge.on_delete {
            CascadePolicy::Destroy => {
                // Purge dependents that are already soft-deleted; live
                // dependents only lose their parent softly
                let deleted = scope_predicate(target, DeletionScope::OnlyDeleted)?;
                for dependent in self.resolver.dependents(parent, edge, &deleted).await? {
                    self.hard_destroy_tree(dependent).await?;
                }
                let live = scope_predicate(target, DeletionScope::NotDeleted)?;
                for dependent in self.resolver.dependents(parent, edge, &live).await? {
                    self.soft_destroy(dependent).await?;
                }
                Ok(())
            }
            CascadePolicy::Delete => {
                self.bulk_remove(parent, edge).await?;
                Ok(())
            }
            CascadePolicy::Nullify => self.nullify(parent, edge).await,
            CascadePolicy::Restrict => self.restrict(parent, edge, target).await,
        }
    }

    /// Cascade into a non-paranoid target: hard semantics on both paths
    async fn cascade_plain(
        &self,
        parent: &Record,
        edge: &AssociationEdge,
        target: &TypeConfig,
    ) -> ParanoidResult<()> {
        match edge.on_delete {
            CascadePolicy::Destroy => {
                for dependent in self.resolver.dependents(parent, edge, &Predicate::All).await? {
                    self.hard_destroy_tree(dependent).await?;
                }
                Ok(())
            }
            CascadePolicy::Delete => {
                self.bulk_remove(parent, edge).await?;
                Ok(())
            }
            CascadePolicy::Nullify => self.nullify(parent, edge).await,
            CascadePolicy::Restrict => self.restrict(parent, edge, target).await,
        }
    }

    /// Soft-mark all live dependents of an edge in one storage call,
    /// without hooks or deeper cascade
    async fn bulk_soft_mark(
        &self,
        parent: &Record,
        edge: &AssociationEdge,
        target: &TypeConfig,
    ) -> ParanoidResult<()> {
        let marker = target.marker_for("delete_all")?;
        let live = scope_predicate(target, DeletionScope::NotDeleted)?;

        let mut changes = Map::new();
        changes.insert(marker.column.clone(), marker.deleted_value());

        match self.resolver.dependent_predicate(parent, edge) {
            Some(predicate) => {
                self.store
                    .update_where(&edge.target_type, &predicate.and(live), &changes)
                    .await?;
            }
            None => {
                // Source-held key: a single row, addressed directly
                for mut dependent in self.resolver.dependents(parent, edge, &live).await? {
                    dependent.set(marker.column.clone(), marker.deleted_value());
                    self.store.update(dependent).await?;
                }
            }
        }
        Ok(())
    }

    /// Physically remove all dependents of an edge, regardless of state,
    /// without hooks or deeper cascade
    async fn bulk_remove(&self, parent: &Record, edge: &AssociationEdge) -> ParanoidResult<u64> {
        match self.resolver.dependent_predicate(parent, edge) {
            Some(predicate) => self.store.remove_where(&edge.target_type, &predicate).await,
            None => {
                let dependents = self
                    .resolver
                    .dependents(parent, edge, &Predicate::All)
                    .await?;
                let removed = dependents.len() as u64;
                for dependent in dependents {
                    self.store
                        .remove(&dependent.record_type, &dependent.id)
                        .await?;
                }
                Ok(removed)
            }
        }
    }

    /// Clear the dependents' foreign-key column.
    ///
    /// Source-held keys have nothing to clear on the dependent side; the
    /// edge is a no-op there.
    async fn nullify(&self, parent: &Record, edge: &AssociationEdge) -> ParanoidResult<()> {
        let ForeignKey::OnTarget(column) = &edge.foreign_key else {
            return Ok(());
        };
        let predicate = Predicate::eq(column.as_str(), parent.id.to_string());

        let mut changes = Map::new();
        changes.insert(column.clone(), Value::Null);

        self.store
            .update_where(&edge.target_type, &predicate, &changes)
            .await?;
        Ok(())
    }

    /// Abort when any live dependent exists on a restricted edge
    async fn restrict(
        &self,
        parent: &Record,
        edge: &AssociationEdge,
        target: &TypeConfig,
    ) -> ParanoidResult<()> {
        let live = if target.is_paranoid() {
            scope_predicate(target, DeletionScope::NotDeleted)?
        } else {
            Predicate::All
        };
        let dependents = self.resolver.dependents(parent, edge, &live).await?;
        if dependents.is_empty() {
            Ok(())
        } else {
            Err(ParanoidError::validation(format!(
                "cannot delete {} '{}': {} dependent '{}' record(s) exist",
                parent.record_type,
                parent.id,
                dependents.len(),
                edge.target_type
            )))
        }
    }

    /// Queue the commit-deferred stage for this record on the ambient
    /// transaction
    fn schedule_deferred(&self, record: &Record) {
        if !self.dispatcher.wants_deferred(&record.record_type) {
            return;
        }
        let dispatcher = Arc::clone(&self.dispatcher);
        let record = record.clone();
        self.store
            .defer_on_commit(Box::new(move || dispatcher.run_deferred(&record)));
    }

    async fn require(&self, record_type: &str, id: &Uuid) -> ParanoidResult<Record> {
        self.store
            .fetch(record_type, id)
            .await?
            .ok_or_else(|| ParanoidError::not_found(record_type, *id))
    }
}
