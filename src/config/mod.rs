//! Configuration loading for declarative type registration
//!
//! Registration can be driven from a YAML document instead of the
//! programmatic builders, one entry per record type:
//!
//! ```yaml
//! types:
//!   - name: note
//!     column: deleted_at
//!     column_type: timestamp
//!     dependent_recovery: true
//!     edges:
//!       - name: attachments
//!         target: attachment
//!         cardinality: many
//!         foreign_key: note_id
//!         on_delete: destroy
//!   - name: attachment
//!     column: deleted_at
//!   - name: audit_entry
//! ```
//!
//! An entry without a `column` registers a non-paranoid type. `extends`
//! inherits the marker and edges of an earlier entry.

use crate::core::error::{ParanoidError, ParanoidResult};
use crate::registry::{
    AssociationEdge, Cardinality, CascadePolicy, DependentRecovery, Marker, ParanoidRegistry,
    TypeSpec,
};
use serde::{Deserialize, Serialize};

/// Complete registration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// One entry per record type, supertypes before subtypes
    pub types: Vec<TypeEntry>,
}

/// Declarative registration of one record type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    /// The record type name
    pub name: String,

    /// Inherit marker and edges from this earlier entry
    #[serde(default)]
    pub extends: Option<String>,

    /// Deletion marker column; absent means not paranoid
    #[serde(default)]
    pub column: Option<String>,

    /// Marker encoding; defaults to `timestamp`
    #[serde(default)]
    pub column_type: Option<ColumnType>,

    /// The literal meaning "deleted", required for `column_type: string`
    #[serde(default)]
    pub deleted_value: Option<String>,

    /// Recursive-recovery declaration: a bool for all edges, or a list of
    /// edge names
    #[serde(default)]
    pub dependent_recovery: Option<DependentRecovery>,

    /// Outgoing association edges
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

/// Supported marker column encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Timestamp,
    Boolean,
    String,
}

/// Which side of the association holds the foreign key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOwner {
    /// Dependents carry the parent id (has-many/has-one)
    #[default]
    Target,

    /// The declaring type carries the dependent's id (belongs-to)
    Source,
}

/// Declarative registration of one association edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeEntry {
    /// Edge name, unique within the type
    pub name: String,

    /// Dependent record type
    pub target: String,

    /// One or many dependents; defaults to `many`
    #[serde(default = "default_cardinality")]
    pub cardinality: Cardinality,

    /// Foreign key column
    pub foreign_key: String,

    /// Which side holds the foreign key; defaults to `target`
    #[serde(default)]
    pub owned: KeyOwner,

    /// Cascade policy; defaults to `destroy`
    #[serde(default = "default_policy")]
    pub on_delete: CascadePolicy,
}

fn default_cardinality() -> Cardinality {
    Cardinality::Many
}

fn default_policy() -> CascadePolicy {
    CascadePolicy::Destroy
}

impl RegistryConfig {
    /// Load a registration document from a YAML file
    pub fn from_yaml_file(path: &str) -> ParanoidResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load a registration document from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ParanoidResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build a registry from the document, in entry order
    pub fn build(&self) -> ParanoidResult<ParanoidRegistry> {
        let mut registry = ParanoidRegistry::new();
        for entry in &self.types {
            registry.register(entry.to_spec()?)?;
        }
        Ok(registry)
    }
}

impl TypeEntry {
    fn to_spec(&self) -> ParanoidResult<TypeSpec> {
        let marker = match &self.column {
            None => None,
            Some(column) => Some(
                match self.column_type.unwrap_or(ColumnType::Timestamp) {
                    ColumnType::Timestamp => Marker::timestamp(column),
                    ColumnType::Boolean => Marker::boolean(column),
                    ColumnType::String => {
                        let deleted = self.deleted_value.as_ref().ok_or_else(|| {
                            ParanoidError::config(format!(
                                "type '{}': column_type 'string' requires deleted_value",
                                self.name
                            ))
                        })?;
                        Marker::literal(column, deleted)
                    }
                },
            ),
        };

        let mut spec = match marker {
            Some(marker) => TypeSpec::paranoid(&self.name, marker),
            None => TypeSpec::plain(&self.name),
        };
        if let Some(parent) = &self.extends {
            spec = spec.extends(parent);
        }
        for edge in &self.edges {
            spec = spec.edge(edge.to_edge());
        }
        if let Some(recovery) = &self.dependent_recovery {
            spec = spec.dependent_recovery(recovery.clone());
        }
        Ok(spec)
    }
}

impl EdgeEntry {
    fn to_edge(&self) -> AssociationEdge {
        let edge = match (self.owned, self.cardinality) {
            (KeyOwner::Source, _) => {
                AssociationEdge::belongs_to(&self.name, &self.target, &self.foreign_key)
            }
            (KeyOwner::Target, Cardinality::One) => {
                AssociationEdge::has_one(&self.name, &self.target, &self.foreign_key)
            }
            (KeyOwner::Target, Cardinality::Many) => {
                AssociationEdge::has_many(&self.name, &self.target, &self.foreign_key)
            }
        };
        edge.on_delete(self.on_delete)
    }
}
