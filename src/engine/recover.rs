//! Recovery engine: clearing deletion markers, optionally through the
//! association graph
//!
//! Recovery never creates rows; it only clears an existing marker. A row
//! that was hard-deleted is gone: lookups fail with `NotFound` before
//! any recovery logic runs.

use crate::associations::AssociationResolver;
use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::record::Record;
use crate::core::scope::{DeletionScope, scope_predicate};
use crate::core::store::Store;
use crate::hooks::{Dispatcher, HookStage};
use crate::registry::ParanoidRegistry;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Clears deletion markers, depth-first over recoverable edges
#[derive(Clone)]
pub struct RecoveryEngine {
    store: Arc<dyn Store>,
    registry: Arc<ParanoidRegistry>,
    dispatcher: Arc<Dispatcher>,
    resolver: AssociationResolver,
}

impl RecoveryEngine {
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

    /// Recover a record; with `recursive`, also every currently-deleted
    /// dependent along recoverable edges, depth-first.
    ///
    /// A record that is not deleted is left untouched (no hooks), but the
    /// requested recursion still proceeds to its dependents.
    pub async fn recover(&self, record: &Record, recursive: bool) -> ParanoidResult<()> {
        self.registry.paranoid(&record.record_type, "recover")?;
        self.store.begin().await?;
        match self.recover_tree(record.clone(), recursive).await {
            Ok(()) => self.store.commit().await,
            Err(e) => {
                let _ = self.store.rollback().await;
                Err(e)
            }
        }
    }

    fn recover_tree(&self, record: Record, recursive: bool) -> BoxFuture<'_, ParanoidResult<()>> {
        Box::pin(async move {
            let config = self.registry.paranoid(&record.record_type, "recover")?;
            let marker = config.marker_for("recover")?;

            let current = self
                .store
                .fetch(&record.record_type, &record.id)
                .await?
                .ok_or_else(|| ParanoidError::not_found(&record.record_type, record.id))?;

            let mut recovered = current.clone();
            if config.is_deleted(&current) {
                self.dispatcher.run(HookStage::BeforeRecover, &current)?;

                recovered.set(marker.column.clone(), marker.cleared_value());
                recovered.touch();
                recovered = self.store.update(recovered).await?;
                tracing::debug!(
                    record_type = %recovered.record_type,
                    id = %recovered.id,
                    "recovered record"
                );

                self.dispatcher.run(HookStage::AfterRecover, &recovered)?;
            }

            if recursive {
                for edge in config.edges.iter().filter(|edge| edge.recoverable) {
                    let target = self.registry.expect(&edge.target_type)?;
                    if !target.is_paranoid() {
                        // Hard-cascaded dependents have no rows to restore
                        continue;
                    }
                    let deleted = scope_predicate(target, DeletionScope::OnlyDeleted)?;
                    for dependent in self.resolver.dependents(&recovered, edge, &deleted).await? {
                        self.recover_tree(dependent, true).await?;
                    }
                }
            }
            Ok(())
        })
    }
}
