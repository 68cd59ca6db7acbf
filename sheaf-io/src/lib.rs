//! Sheaf I/O - Descriptors, write sessions and record sinks
//!
//! This crate ties the schema engines together for writing rows:
//!
//! - Ordered schema descriptors read from JSON
//! - Write sessions resolving tree, physical schema and rules once
//! - Row validation and nesting with a configurable invalid-row policy
//! - Record sinks handing nested rows to a columnar writer
//! - Parallel row processing

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod parallel;
pub mod rows;
pub mod session;
pub mod sink;

// Re-export commonly used types
pub use sheaf_codec::{ColumnDescriptor, PhysicalField, PhysicalSchema, SchemaTree};
pub use sheaf_format::{Limits, Result, SheafError, TraversablePath};
pub use sheaf_rules::{RuleFamily, ValidationFailure, ValidationRegistry};

// Re-export our own types
pub use descriptor::{DescriptorEntry, SchemaDescriptor};
pub use error::{SessionError, SessionResult};
pub use parallel::{
    process_rows_parallel, write_row_results_parallel, write_rows_parallel, ParallelConfig,
    ParallelDecision,
};
pub use rows::NdjsonRows;
pub use session::{InvalidRowPolicy, SessionOptions, WriteSession, WriteSummary};
pub use sink::{MemorySink, NdjsonSink, RecordSink};
