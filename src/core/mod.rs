//! Core module containing the fundamental types of the policy layer

pub mod error;
pub mod predicate;
pub mod record;
pub mod scope;
pub mod store;
pub mod validation;

pub use error::{ParanoidError, ParanoidResult};
pub use predicate::Predicate;
pub use record::Record;
pub use scope::{DeletionScope, DeletionState, scope_predicate};
pub use store::{CommitHook, Store};
pub use validation::{UniquenessRule, validate_unique};
