//! Error types for write sessions

use sheaf_format::SheafError;
use sheaf_rules::{RuleFamily, ValidationFailure};
use thiserror::Error;

/// Errors raised while opening a session or processing rows
#[derive(Debug, Error)]
pub enum SessionError {
    /// Schema construction, nesting or sink failure
    #[error(transparent)]
    Schema(#[from] SheafError),

    /// A leaf value was rejected by one of its rules
    #[error("field '{path}': {failure}")]
    Validation {
        /// Dotted path of the offending leaf
        path: String,
        /// First violated rule
        #[source]
        failure: ValidationFailure,
    },

    /// A constrained leaf received a value its rules cannot check
    #[error("field '{path}' expects {expected} value, found {found}")]
    TypeMismatch {
        /// Dotted path of the offending leaf
        path: String,
        /// Value kind the rules expect
        expected: &'static str,
        /// Rendering of the value found
        found: String,
    },

    /// An input row could not be decoded
    #[error("malformed row: {source}")]
    MalformedRow {
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// A row-level failure, tagged with the zero-based row index
    #[error("row {row}: {source}")]
    Row {
        /// Zero-based row index
        row: usize,
        /// Underlying failure
        #[source]
        source: Box<SessionError>,
    },
}

impl SessionError {
    pub(crate) fn mismatch(path: String, family: RuleFamily, found: &serde_json::Value) -> Self {
        let expected = match family {
            RuleFamily::String => "a string",
            RuleFamily::Integer => "a 32-bit integer",
            RuleFamily::Long => "a 64-bit integer",
        };
        SessionError::TypeMismatch {
            path,
            expected,
            found: found.to_string(),
        }
    }

    /// Classify an error raised while reading a row.
    ///
    /// Undecodable rows become [`SessionError::MalformedRow`]; anything else,
    /// such as an I/O failure, stays a session error.
    pub fn from_input(err: SheafError) -> Self {
        match err {
            SheafError::Json(source) => SessionError::MalformedRow { source },
            other => SessionError::Schema(other),
        }
    }

    /// Attach a row index
    pub fn at_row(self, row: usize) -> Self {
        match self {
            already @ SessionError::Row { .. } => already,
            other => SessionError::Row {
                row,
                source: Box::new(other),
            },
        }
    }

    /// Row index, if this error is tied to one
    pub fn row(&self) -> Option<usize> {
        match self {
            SessionError::Row { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Validation failure behind this error, if any
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            SessionError::Validation { failure, .. } => Some(failure),
            SessionError::Row { source, .. } => source.validation_failure(),
            _ => None,
        }
    }

    /// Whether the error concerns a single row rather than the session
    pub fn is_row_error(&self) -> bool {
        match self {
            SessionError::Validation { .. }
            | SessionError::TypeMismatch { .. }
            | SessionError::MalformedRow { .. } => true,
            SessionError::Schema(SheafError::ArityMismatch { .. }) => true,
            SessionError::Row { source, .. } => source.is_row_error(),
            SessionError::Schema(_) => false,
        }
    }
}

/// Result alias for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;
