//! Predicates for filtering records
//!
//! A small predicate AST shared by the scope filter, the engines and the
//! store: scopes compile to predicates, callers compose additional
//! criteria onto them, and store implementations evaluate them against
//! rows.
//!
//! # Format
//! - Exact match: `Predicate::eq("status", "active")`
//! - Null checks: `Predicate::eq("deleted_at", Value::Null)` matches rows
//!   where the column is null or absent
//! - Comparison: `gt` / `gte` / `lt` / `lte` compare numbers numerically
//!   and strings lexicographically (RFC 3339 timestamps order correctly)
//! - Composition: `and` / `or`

use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A predicate over record fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every record
    All,

    /// Field equals value (null matches null/absent)
    Eq { field: String, value: Value },

    /// Field differs from value (null/absent differs from any non-null)
    Ne { field: String, value: Value },

    /// Field is strictly greater than value
    Gt { field: String, value: Value },

    /// Field is greater than or equal to value
    Gte { field: String, value: Value },

    /// Field is strictly less than value
    Lt { field: String, value: Value },

    /// Field is less than or equal to value
    Lte { field: String, value: Value },

    /// All sub-predicates match
    And(Vec<Predicate>),

    /// At least one sub-predicate matches
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Equality predicate
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Inequality predicate
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Greater-than predicate
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Greater-or-equal predicate
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Less-than predicate
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Less-or-equal predicate
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Conjunction with another predicate.
    ///
    /// `All` is the identity element, so scopes compose without nesting
    /// noise.
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::All, other) => other,
            (this, Predicate::All) => this,
            (Predicate::And(mut these), Predicate::And(others)) => {
                these.extend(others);
                Predicate::And(these)
            }
            (Predicate::And(mut these), other) => {
                these.push(other);
                Predicate::And(these)
            }
            (this, other) => Predicate::And(vec![this, other]),
        }
    }

    /// Evaluate this predicate against a record
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq { field, value } => &record.lookup(field) == value,
            Predicate::Ne { field, value } => &record.lookup(field) != value,
            Predicate::Gt { field, value } => compare(&record.lookup(field), value, |o| o > 0.0),
            Predicate::Gte { field, value } => compare(&record.lookup(field), value, |o| o >= 0.0),
            Predicate::Lt { field, value } => compare(&record.lookup(field), value, |o| o < 0.0),
            Predicate::Lte { field, value } => compare(&record.lookup(field), value, |o| o <= 0.0),
            Predicate::And(preds) => preds.iter().all(|p| p.matches(record)),
            Predicate::Or(preds) => preds.iter().any(|p| p.matches(record)),
        }
    }
}

/// Ordered comparison between a row value and a predicate value.
///
/// Numbers compare numerically, strings lexicographically; mixed or
/// non-orderable values never match.
fn compare(actual: &Value, expected: &Value, accept: fn(f64) -> bool) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => accept(a - b),
            _ => false,
        },
        (Value::String(a), Value::String(b)) => {
            let ordering = a.cmp(b) as i8;
            accept(f64::from(ordering))
        }
        _ => false,
    }
}
