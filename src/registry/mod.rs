//! Per-type paranoid configuration
//!
//! The registry owns one flattened [`TypeConfig`] per registered record
//! type: whether the type participates in paranoid semantics (and through
//! which marker column), and its outgoing association edges with per-edge
//! cascade policy. Type inheritance is resolved once at registration
//! time: a subtype receives a copy of its supertype's marker and edges,
//! so lookups never walk an inheritance chain.

use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::record::Record;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The kind of value stored in a deletion marker column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    /// RFC 3339 timestamp; null means not deleted
    Timestamp,

    /// Boolean flag; false or null means not deleted
    Boolean,

    /// A configured literal string means deleted; null means not deleted
    Literal { deleted: String },
}

/// Deletion marker column declaration for a paranoid type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Column holding the marker
    pub column: String,

    /// How deleted/not-deleted are encoded in that column
    pub kind: MarkerKind,
}

impl Marker {
    /// Timestamp marker in the given column
    pub fn timestamp(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: MarkerKind::Timestamp,
        }
    }

    /// Boolean marker in the given column
    pub fn boolean(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: MarkerKind::Boolean,
        }
    }

    /// String marker: the column reads `deleted` when the row is deleted
    pub fn literal(column: impl Into<String>, deleted: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: MarkerKind::Literal {
                deleted: deleted.into(),
            },
        }
    }

    /// The value written to mark a row deleted, evaluated at call time
    pub fn deleted_value(&self) -> Value {
        match &self.kind {
            MarkerKind::Timestamp => Value::String(Utc::now().to_rfc3339()),
            MarkerKind::Boolean => Value::Bool(true),
            MarkerKind::Literal { deleted } => Value::String(deleted.clone()),
        }
    }

    /// The value written to clear the marker on recovery
    pub fn cleared_value(&self) -> Value {
        match &self.kind {
            MarkerKind::Timestamp => Value::Null,
            MarkerKind::Boolean => Value::Bool(false),
            MarkerKind::Literal { .. } => Value::Null,
        }
    }

    /// Whether a stored marker value means "deleted"
    pub fn means_deleted(&self, value: &Value) -> bool {
        match &self.kind {
            MarkerKind::Timestamp => !value.is_null(),
            MarkerKind::Boolean => value == &Value::Bool(true),
            MarkerKind::Literal { deleted } => value.as_str() == Some(deleted.as_str()),
        }
    }

    /// Whether the record currently reads as deleted
    pub fn is_deleted(&self, record: &Record) -> bool {
        self.means_deleted(record.get(&self.column))
    }
}

/// How many dependents an edge can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

/// Where the foreign key of an association lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKey {
    /// Dependents carry the parent's id in this column (has-many/has-one)
    OnTarget(String),

    /// The record itself carries the dependent's id in this column
    /// (belongs-to)
    OnSource(String),
}

/// What happens to dependents when the parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePolicy {
    /// Run each dependent's own destroy path (hooks and deeper cascade)
    Destroy,

    /// Bulk-delete dependents without hooks or deeper cascade
    Delete,

    /// Clear the dependents' foreign key, delete nothing
    Nullify,

    /// Abort the operation if any live dependent exists
    Restrict,
}

/// A declared propagation rule from one record type to a dependent type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEdge {
    /// Edge name, unique within the declaring type
    pub name: String,

    /// The dependent record type
    pub target_type: String,

    /// One or many dependents
    pub cardinality: Cardinality,

    /// Where the foreign key lives
    pub foreign_key: ForeignKey,

    /// Cascade policy applied by the deletion engine
    pub on_delete: CascadePolicy,

    /// Whether recursive recovery walks this edge
    pub recoverable: bool,
}

impl AssociationEdge {
    /// A has-many edge: dependents carry the parent id in `foreign_key`
    pub fn has_many(
        name: impl Into<String>,
        target_type: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            cardinality: Cardinality::Many,
            foreign_key: ForeignKey::OnTarget(foreign_key.into()),
            on_delete: CascadePolicy::Destroy,
            recoverable: true,
        }
    }

    /// A has-one edge: the single dependent carries the parent id
    pub fn has_one(
        name: impl Into<String>,
        target_type: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            cardinality: Cardinality::One,
            ..Self::has_many(name, target_type, foreign_key)
        }
    }

    /// A belongs-to edge: the record itself carries the dependent's id
    pub fn belongs_to(
        name: impl Into<String>,
        target_type: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            cardinality: Cardinality::One,
            foreign_key: ForeignKey::OnSource(foreign_key.into()),
            on_delete: CascadePolicy::Destroy,
            recoverable: true,
        }
    }

    /// Override the cascade policy
    pub fn on_delete(mut self, policy: CascadePolicy) -> Self {
        self.on_delete = policy;
        self
    }

    /// Exclude this edge from recursive recovery
    pub fn skip_recovery(mut self) -> Self {
        self.recoverable = false;
        self
    }
}

/// Type-level recursive-recovery declaration: a blanket switch or an
/// explicit list of edge names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependentRecovery {
    All(bool),
    Edges(Vec<String>),
}

/// Registration request for one record type, consumed by
/// [`ParanoidRegistry::register`]
#[derive(Debug, Clone)]
pub struct TypeSpec {
    name: String,
    extends: Option<String>,
    marker: Option<Marker>,
    edges: Vec<AssociationEdge>,
    dependent_recovery: Option<DependentRecovery>,
}

impl TypeSpec {
    /// A paranoid type with the given deletion marker
    pub fn paranoid(name: impl Into<String>, marker: Marker) -> Self {
        Self {
            name: name.into(),
            extends: None,
            marker: Some(marker),
            edges: Vec::new(),
            dependent_recovery: None,
        }
    }

    /// A type with no paranoid semantics (hard deletes only)
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            marker: None,
            edges: Vec::new(),
            dependent_recovery: None,
        }
    }

    /// Inherit marker and edges from an already-registered supertype
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Declare an outgoing association edge
    pub fn edge(mut self, edge: AssociationEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Type-level recursive-recovery declaration, applied to every edge
    /// at registration time
    pub fn dependent_recovery(mut self, recovery: DependentRecovery) -> Self {
        self.dependent_recovery = Some(recovery);
        self
    }
}

/// Flattened, immutable configuration for one registered type
#[derive(Debug, Clone)]
pub struct TypeConfig {
    /// The registered type name
    pub name: String,

    /// Deletion marker; `None` means the type is not paranoid
    pub marker: Option<Marker>,

    /// Outgoing association edges, supertype edges first
    pub edges: Vec<AssociationEdge>,
}

impl TypeConfig {
    /// Whether the type participates in paranoid semantics
    pub fn is_paranoid(&self) -> bool {
        self.marker.is_some()
    }

    /// The marker, or `UnsupportedOperation` when the type is not paranoid
    pub fn marker_for(&self, operation: &str) -> ParanoidResult<&Marker> {
        self.marker
            .as_ref()
            .ok_or_else(|| ParanoidError::unsupported(&self.name, operation))
    }

    /// Whether the record currently reads as deleted.
    ///
    /// Non-paranoid types are never deleted-but-present.
    pub fn is_deleted(&self, record: &Record) -> bool {
        self.marker.as_ref().is_some_and(|m| m.is_deleted(record))
    }
}

/// Registry of flattened per-type configurations
///
/// Registration order matters only for inheritance: a supertype must be
/// registered before any type extending it.
#[derive(Debug, Default)]
pub struct ParanoidRegistry {
    types: HashMap<String, TypeConfig>,
}

impl ParanoidRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, flattening inheritance and recovery declarations
    pub fn register(&mut self, spec: TypeSpec) -> ParanoidResult<()> {
        if self.types.contains_key(&spec.name) {
            return Err(ParanoidError::config(format!(
                "type '{}' is already registered",
                spec.name
            )));
        }

        let (mut marker, mut edges) = match &spec.extends {
            Some(parent) => {
                let parent = self.types.get(parent).ok_or_else(|| {
                    ParanoidError::config(format!(
                        "type '{}' extends unregistered type '{}'",
                        spec.name, parent
                    ))
                })?;
                (parent.marker.clone(), parent.edges.clone())
            }
            None => (None, Vec::new()),
        };

        if spec.marker.is_some() {
            marker = spec.marker;
        }
        edges.extend(spec.edges);

        if let Some(recovery) = &spec.dependent_recovery {
            for edge in &mut edges {
                edge.recoverable = match recovery {
                    DependentRecovery::All(all) => *all,
                    DependentRecovery::Edges(names) => names.contains(&edge.name),
                };
            }
        }

        self.types.insert(
            spec.name.clone(),
            TypeConfig {
                name: spec.name,
                marker,
                edges,
            },
        );
        Ok(())
    }

    /// Look up a type's configuration
    pub fn get(&self, record_type: &str) -> Option<&TypeConfig> {
        self.types.get(record_type)
    }

    /// Look up a type that must be registered (cascade targets)
    pub fn expect(&self, record_type: &str) -> ParanoidResult<&TypeConfig> {
        self.get(record_type).ok_or_else(|| {
            ParanoidError::config(format!("type '{}' is not registered", record_type))
        })
    }

    /// Look up a type that must be paranoid.
    ///
    /// Unregistered and non-paranoid types both fail with
    /// `UnsupportedOperation` carrying the attempted operation.
    pub fn paranoid(&self, record_type: &str, operation: &str) -> ParanoidResult<&TypeConfig> {
        match self.get(record_type) {
            Some(config) if config.is_paranoid() => Ok(config),
            _ => Err(ParanoidError::unsupported(record_type, operation)),
        }
    }

    /// Whether a type is registered as paranoid
    pub fn is_paranoid(&self, record_type: &str) -> bool {
        self.get(record_type).is_some_and(TypeConfig::is_paranoid)
    }
}
