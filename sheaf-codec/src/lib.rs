//! Sheaf Codec - Schema tree engines
//!
//! This crate provides the structural engines of the schema field-path engine:
//!
//! - Tree building from flattened `path -> type` descriptors
//! - Two-stage type reconciliation into a physical schema
//! - Namespaced branch filtering
//! - Re-nesting of flat rows into hierarchical records

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod filter;
pub mod nest;
pub mod reconcile;
pub mod tree;

// Re-export commonly used types
pub use sheaf_format::{
    CanonicalType, Constraint, Limits, PhysicalType, Repetition, Result, SheafError,
    TraversablePath,
};

// Re-export our own types
pub use filter::{parse_filter_config, FieldFilterer, FilterSpec};
pub use nest::{nest_row, RowNester};
pub use reconcile::{
    canonical_type, physical_type, reconcile, ColumnDescriptor, PhysicalField, PhysicalSchema,
};
pub use tree::{InsertOutcome, Leaf, NodeKind, SchemaNode, SchemaTree, SchemaTreeBuilder};
