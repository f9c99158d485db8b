//! Typed error handling for the paranoid deletion layer
//!
//! Clients are expected to match on specific variants rather than deal
//! with opaque error strings: `UnsupportedOperation` is a usage bug and is
//! never retried, `Persistence` aborts and rolls back the enclosing
//! transaction, and `ValidationFailed` is surfaced before any mutation.
//!
//! # Example
//!
//! ```rust,ignore
//! match paranoid.hard_destroy(&record).await {
//!     Ok(()) => {}
//!     Err(ParanoidError::UnsupportedOperation { record_type, .. }) => {
//!         eprintln!("{} is not a paranoid type", record_type);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use std::fmt;
use uuid::Uuid;

/// The main error type for the paranoid deletion layer
#[derive(Debug)]
pub enum ParanoidError {
    /// A paranoid-only operation was invoked on a non-paranoid type.
    ///
    /// This is a configuration/usage bug, never a transient condition.
    UnsupportedOperation {
        record_type: String,
        operation: String,
    },

    /// The target record is absent (already hard-deleted or never existed)
    NotFound {
        record_type: String,
        id: Uuid,
    },

    /// A validation rejected the operation before any mutation: a
    /// uniqueness conflict, a vetoing before-hook, or a `Restrict`
    /// cascade violation
    ValidationFailed {
        message: String,
        field: Option<String>,
    },

    /// Storage collaborator failure; aborts the whole cascade and rolls
    /// back the enclosing transaction
    Persistence {
        message: String,
    },

    /// Registration or configuration error (unknown parent type,
    /// duplicate registration, malformed config file)
    Config {
        message: String,
    },
}

impl fmt::Display for ParanoidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParanoidError::UnsupportedOperation {
                record_type,
                operation,
            } => {
                write!(
                    f,
                    "'{}' is not supported on non-paranoid type '{}'",
                    operation, record_type
                )
            }
            ParanoidError::NotFound { record_type, id } => {
                write!(f, "{} with id '{}' not found", record_type, id)
            }
            ParanoidError::ValidationFailed { message, field } => match field {
                Some(field) => write!(f, "Validation failed for '{}': {}", field, message),
                None => write!(f, "Validation failed: {}", message),
            },
            ParanoidError::Persistence { message } => {
                write!(f, "Persistence error: {}", message)
            }
            ParanoidError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for ParanoidError {}

impl ParanoidError {
    /// Error code for programmatic handling and log fields
    pub fn code(&self) -> &'static str {
        match self {
            ParanoidError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            ParanoidError::NotFound { .. } => "NOT_FOUND",
            ParanoidError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ParanoidError::Persistence { .. } => "PERSISTENCE_ERROR",
            ParanoidError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Shorthand for an [`ParanoidError::UnsupportedOperation`] value
    pub fn unsupported(record_type: impl Into<String>, operation: impl Into<String>) -> Self {
        ParanoidError::UnsupportedOperation {
            record_type: record_type.into(),
            operation: operation.into(),
        }
    }

    /// Shorthand for a [`ParanoidError::NotFound`] value
    pub fn not_found(record_type: impl Into<String>, id: Uuid) -> Self {
        ParanoidError::NotFound {
            record_type: record_type.into(),
            id,
        }
    }

    /// Shorthand for a field-less [`ParanoidError::ValidationFailed`] value
    pub fn validation(message: impl Into<String>) -> Self {
        ParanoidError::ValidationFailed {
            message: message.into(),
            field: None,
        }
    }

    /// Shorthand for a [`ParanoidError::Persistence`] value
    pub fn persistence(message: impl Into<String>) -> Self {
        ParanoidError::Persistence {
            message: message.into(),
        }
    }

    /// Shorthand for a [`ParanoidError::Config`] value
    pub fn config(message: impl Into<String>) -> Self {
        ParanoidError::Config {
            message: message.into(),
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for ParanoidError {
    fn from(err: serde_yaml::Error) -> Self {
        ParanoidError::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ParanoidError {
    fn from(err: std::io::Error) -> Self {
        ParanoidError::Config {
            message: err.to_string(),
        }
    }
}

/// Backend adapters built on `anyhow` surface through the persistence
/// variant
impl From<anyhow::Error> for ParanoidError {
    fn from(err: anyhow::Error) -> Self {
        ParanoidError::Persistence {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for paranoid operations
pub type ParanoidResult<T> = Result<T, ParanoidError>;
