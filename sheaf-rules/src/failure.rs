//! Validation failures and their step-ordered builder
//!
//! A failure message is assembled in a fixed sequence: pick the failure kind,
//! supply the offending value, supply the violated bound, finish. Each step
//! returns a distinct type exposing only the next step, so a message cannot
//! be built with a missing or out-of-order parameter:
//!
//! ```
//! use sheaf_rules::{FailureKind, ValidationFailure};
//!
//! let failure = ValidationFailure::builder()
//!     .upper_bound()
//!     .value(9)
//!     .bound(8)
//!     .finish();
//! assert_eq!(failure.kind(), FailureKind::UpperBound);
//! assert_eq!(failure.to_string(), "value 9 violates upper bound 8");
//! ```
//!
//! Skipping a step does not compile:
//!
//! ```compile_fail
//! use sheaf_rules::ValidationFailure;
//!
//! let failure = ValidationFailure::builder().upper_bound().bound(8).finish();
//! ```

use std::fmt::Display;
use thiserror::Error;

/// Which message template a failure uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Value (or its length) is below a lower bound
    LowerBound,
    /// Value (or its length) is above an upper bound
    UpperBound,
    /// Value is outside an allowed set, range or format
    Range,
}

impl FailureKind {
    fn render(self, value: &str, bound: &str) -> String {
        match self {
            FailureKind::LowerBound => format!("value {} violates lower bound {}", value, bound),
            FailureKind::UpperBound => format!("value {} violates upper bound {}", value, bound),
            FailureKind::Range => format!("value {} is outside allowed range {}", value, bound),
        }
    }
}

/// A rule rejected a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    kind: FailureKind,
    value: String,
    bound: String,
    message: String,
}

impl ValidationFailure {
    /// Start building a failure
    pub fn builder() -> FailureBuilder {
        FailureBuilder { _private: () }
    }

    /// Template used for the message
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Rendered offending value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rendered violated bound
    pub fn bound(&self) -> &str {
        &self.bound
    }

    /// Full message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// First step: select the failure kind
#[must_use]
#[derive(Debug)]
pub struct FailureBuilder {
    _private: (),
}

impl FailureBuilder {
    /// Value fell below a lower bound
    pub fn lower_bound(self) -> KindSelected {
        KindSelected {
            kind: FailureKind::LowerBound,
        }
    }

    /// Value exceeded an upper bound
    pub fn upper_bound(self) -> KindSelected {
        KindSelected {
            kind: FailureKind::UpperBound,
        }
    }

    /// Value is not a member of the allowed set or format
    pub fn out_of_range(self) -> KindSelected {
        KindSelected {
            kind: FailureKind::Range,
        }
    }
}

/// Second step: supply the offending value
#[must_use]
#[derive(Debug)]
pub struct KindSelected {
    kind: FailureKind,
}

impl KindSelected {
    /// Offending value
    pub fn value(self, value: impl Display) -> ValueSupplied {
        ValueSupplied {
            kind: self.kind,
            value: value.to_string(),
        }
    }
}

/// Third step: supply the violated bound
#[must_use]
#[derive(Debug)]
pub struct ValueSupplied {
    kind: FailureKind,
    value: String,
}

impl ValueSupplied {
    /// Violated bound
    pub fn bound(self, bound: impl Display) -> BoundSupplied {
        BoundSupplied {
            kind: self.kind,
            value: self.value,
            bound: bound.to_string(),
        }
    }
}

/// Final step: render the message
#[must_use]
#[derive(Debug)]
pub struct BoundSupplied {
    kind: FailureKind,
    value: String,
    bound: String,
}

impl BoundSupplied {
    /// Produce the failure
    pub fn finish(self) -> ValidationFailure {
        let message = self.kind.render(&self.value, &self.bound);
        ValidationFailure {
            kind: self.kind,
            value: self.value,
            bound: self.bound,
            message,
        }
    }
}
