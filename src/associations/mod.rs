//! Association resolution for cascade traversal
//!
//! Resolves "record X has dependents of type Y" for a declared edge. The
//! engines never touch foreign keys themselves; they ask the resolver for
//! the dependent rows (or for a predicate selecting them, when a bulk
//! operation can do the work in one storage call).

use crate::core::error::ParanoidResult;
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use crate::core::store::Store;
use crate::registry::{AssociationEdge, ForeignKey};
use std::sync::Arc;

/// Resolves the dependents of a record along a declared edge
#[derive(Clone)]
pub struct AssociationResolver {
    store: Arc<dyn Store>,
}

impl AssociationResolver {
    /// Create a resolver over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// A predicate selecting all dependents of `record` along `edge`, when
    /// the dependents carry the foreign key.
    ///
    /// Returns `None` for source-held keys (belongs-to): the dependent is
    /// a single row addressed by id, and bulk predicates cannot reach it.
    pub fn dependent_predicate(
        &self,
        record: &Record,
        edge: &AssociationEdge,
    ) -> Option<Predicate> {
        match &edge.foreign_key {
            ForeignKey::OnTarget(column) => {
                Some(Predicate::eq(column.as_str(), record.id.to_string()))
            }
            ForeignKey::OnSource(_) => None,
        }
    }

    /// The dependents of `record` along `edge` that match `filter`.
    ///
    /// Rows come back in store order; a has-one edge simply resolves to at
    /// most one row.
    pub async fn dependents(
        &self,
        record: &Record,
        edge: &AssociationEdge,
        filter: &Predicate,
    ) -> ParanoidResult<Vec<Record>> {
        match &edge.foreign_key {
            ForeignKey::OnTarget(column) => {
                let predicate = Predicate::eq(column.as_str(), record.id.to_string())
                    .and(filter.clone());
                self.store.select(&edge.target_type, &predicate).await
            }
            ForeignKey::OnSource(column) => {
                let Some(id) = record.uuid_field(column) else {
                    return Ok(Vec::new());
                };
                let dependent = self.store.fetch(&edge.target_type, &id).await?;
                Ok(dependent
                    .into_iter()
                    .filter(|record| filter.matches(record))
                    .collect())
            }
        }
    }
}
