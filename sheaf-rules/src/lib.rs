//! Sheaf Rules - Validation rule resolution
//!
//! This crate turns per-leaf constraint blocks into reusable rules:
//!
//! - A generic bounded-value rule shared by strings and integral types
//! - Named format rules for strings
//! - An immutable rule builder
//! - A step-ordered builder for validation failure messages
//! - A registry resolving rules by exact root-to-leaf path

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod failure;
pub mod registry;
pub mod rule;

// Re-export commonly used types
pub use sheaf_format::{Constraint, Result, SheafError, TraversablePath};

// Re-export our own types
pub use builder::RuleBuilder;
pub use failure::{
    BoundSupplied, FailureBuilder, FailureKind, KindSelected, ValidationFailure, ValueSupplied,
};
pub use registry::{Rejection, RuleFamily, RuleList, ValidationRegistry};
pub use rule::{FormatRule, Rule, RuleValue, ValueRule};
