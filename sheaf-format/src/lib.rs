//! Sheaf Format - Core primitives for the schema field-path engine
//!
//! This crate provides the data model shared by every Sheaf crate with no I/O
//! dependencies. It includes:
//!
//! - Path delimiters and source type names
//! - Canonical and physical type vocabularies
//! - Root-to-leaf field paths
//! - Per-leaf constraint blocks
//! - Structural limits
//! - Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod constraint;
pub mod error;
pub mod limits;
pub mod path;
pub mod types;

// Re-export commonly used types
pub use constraint::Constraint;
pub use error::{Result, SheafError};
pub use limits::Limits;
pub use path::TraversablePath;
pub use types::{CanonicalType, PhysicalType, Repetition};
