//! Deletion-state scopes
//!
//! Scopes are the query-side of paranoid semantics: every paranoid type
//! has exactly three populations (`not_deleted`, `only_deleted` and
//! `with_deleted`) where the first two are disjoint and together equal
//! the third. A scope compiles to a [`Predicate`] over the type's marker
//! column and composes with any further filtering the caller needs.

use crate::core::error::ParanoidResult;
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use crate::registry::{MarkerKind, TypeConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Derived deletion state of a record. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    NotDeleted,
    Deleted,
}

impl DeletionState {
    /// Derive the state of a record under its type configuration
    pub fn of(config: &TypeConfig, record: &Record) -> Self {
        if config.is_deleted(record) {
            DeletionState::Deleted
        } else {
            DeletionState::NotDeleted
        }
    }
}

/// A named subset of a paranoid type's population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionScope {
    /// Rows whose marker is clear (the default read population)
    NotDeleted,

    /// Rows whose marker is set
    OnlyDeleted,

    /// The entire stored population
    WithDeleted,
}

/// Compile a scope into a predicate for the given type.
///
/// Fails with `UnsupportedOperation` when the type is not paranoid: scopes
/// are meaningless without a marker column and must not silently read the
/// whole table.
pub fn scope_predicate(config: &TypeConfig, scope: DeletionScope) -> ParanoidResult<Predicate> {
    let marker = config.marker_for(scope.operation_name())?;
    let column = marker.column.as_str();

    Ok(match (scope, &marker.kind) {
        (DeletionScope::WithDeleted, _) => Predicate::All,
        (DeletionScope::OnlyDeleted, MarkerKind::Timestamp) => Predicate::ne(column, Value::Null),
        (DeletionScope::NotDeleted, MarkerKind::Timestamp) => Predicate::eq(column, Value::Null),
        (DeletionScope::OnlyDeleted, MarkerKind::Boolean) => Predicate::eq(column, true),
        (DeletionScope::NotDeleted, MarkerKind::Boolean) => Predicate::ne(column, true),
        (DeletionScope::OnlyDeleted, MarkerKind::Literal { deleted }) => {
            Predicate::eq(column, deleted.as_str())
        }
        (DeletionScope::NotDeleted, MarkerKind::Literal { deleted }) => {
            Predicate::ne(column, deleted.as_str())
        }
    })
}

impl DeletionScope {
    /// The caller-facing operation name, used in error reporting
    pub fn operation_name(&self) -> &'static str {
        match self {
            DeletionScope::NotDeleted => "not_deleted",
            DeletionScope::OnlyDeleted => "only_deleted",
            DeletionScope::WithDeleted => "with_deleted",
        }
    }
}
