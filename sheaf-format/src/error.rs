//! Error types for Sheaf

use thiserror::Error;

/// Sheaf error types
#[derive(Debug, Error)]
pub enum SheafError {
    /// A source type name has no canonical counterpart.
    #[error("Unknown source type '{type_name}' at '{path}'")]
    UnknownSourceType {
        /// Dot-joined path of the offending field (empty when not known).
        path: String,
        /// The unrecognised type name.
        type_name: String,
    },
    /// A canonical type has no physical counterpart.
    #[error("Unsupported canonical type {canonical} at '{path}'")]
    UnsupportedCanonicalType {
        /// Dot-joined path of the offending field (empty when not known).
        path: String,
        /// Debug name of the canonical type.
        canonical: String,
    },
    /// A field path is syntactically invalid.
    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath {
        /// The path as supplied.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A filter configuration entry could not be parsed.
    #[error("Malformed filter entry '{0}': expected <namespace>/<branch.path>")]
    MalformedFilter(String),
    /// A constraint block cannot be turned into a rule.
    #[error("Invalid constraint at '{path}': {reason}")]
    InvalidConstraint {
        /// Dot-joined path of the constrained field.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Number of row values differs from the number of leaf fields.
    #[error("Row has {values} values but {fields} fields were declared")]
    ArityMismatch {
        /// Declared leaf fields.
        fields: usize,
        /// Supplied values.
        values: usize,
    },
    /// A nested record already holds a scalar where an object is required.
    #[error("Path conflict at '{0}': a value already occupies this key")]
    PathConflict(String),
    /// A configured limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SheafError>;
