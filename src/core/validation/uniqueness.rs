//! Scope-aware uniqueness validation
//!
//! On a paranoid type a uniqueness check defaults to the `with_deleted`
//! population: soft-deleted rows still occupy their value, and the value
//! only frees up once the row is hard-deleted. The scope can be narrowed
//! to `not_deleted` per rule.

use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use crate::core::scope::{DeletionScope, scope_predicate};
use crate::core::store::Store;
use crate::registry::ParanoidRegistry;

/// A uniqueness constraint on one field of a record type
#[derive(Debug, Clone)]
pub struct UniquenessRule {
    /// The constrained field
    pub field: String,

    /// The population the constraint checks against
    pub scope: DeletionScope,
}

impl UniquenessRule {
    /// A rule over the full population, soft-deleted rows included
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            scope: DeletionScope::WithDeleted,
        }
    }

    /// Narrow the rule to rows not marked deleted
    pub fn among_not_deleted(mut self) -> Self {
        self.scope = DeletionScope::NotDeleted;
        self
    }
}

/// Check a candidate record against a uniqueness rule.
///
/// A null or absent field value passes; rows with the candidate's own id
/// never conflict, so re-validating a stored record is safe. Non-paranoid
/// types always validate against their whole population.
pub async fn validate_unique(
    store: &dyn Store,
    registry: &ParanoidRegistry,
    rule: &UniquenessRule,
    candidate: &Record,
) -> ParanoidResult<()> {
    let value = candidate.get(&rule.field);
    if value.is_null() {
        return Ok(());
    }

    let mut predicate = Predicate::eq(rule.field.as_str(), value.clone())
        .and(Predicate::ne("id", candidate.id.to_string()));

    if let Some(config) = registry.get(&candidate.record_type) {
        if config.is_paranoid() {
            predicate = predicate.and(scope_predicate(config, rule.scope)?);
        }
    }

    let conflicts = store.count(&candidate.record_type, &predicate).await?;
    if conflicts == 0 {
        Ok(())
    } else {
        Err(ParanoidError::ValidationFailed {
            message: "has already been taken".to_string(),
            field: Some(rule.field.clone()),
        })
    }
}
