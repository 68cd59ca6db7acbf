//! Write sessions: schema setup once, then per-row validation and nesting

use serde_json::{Map, Value};
use sheaf_codec::{
    parse_filter_config, FieldFilterer, FilterSpec, PhysicalSchema, RowNester, SchemaTree,
};
use sheaf_format::constants::DEFAULT_PATH_DELIMITER;
use sheaf_format::{Limits, Result, SheafError, TraversablePath};
use sheaf_rules::{Rejection, RuleFamily, ValidationRegistry};
use tracing::{debug, info, warn};

use crate::descriptor::SchemaDescriptor;
use crate::error::{SessionError, SessionResult};
use crate::sink::RecordSink;

/// What to do with a row that fails validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRowPolicy {
    /// Stop at the first invalid row and return its error
    #[default]
    Abort,
    /// Count the row, log it and continue
    Skip,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Path delimiter used by the descriptor
    pub delimiter: char,
    /// Namespace the filters are applied for; `None` applies no filter
    pub namespace: Option<String>,
    /// Configured branch filters
    pub filters: Vec<FilterSpec>,
    /// Structural limits for the schema tree
    pub limits: Limits,
    /// Invalid row handling
    pub policy: InvalidRowPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_PATH_DELIMITER,
            namespace: None,
            filters: Vec::new(),
            limits: Limits::default(),
            policy: InvalidRowPolicy::default(),
        }
    }
}

impl SessionOptions {
    /// Apply filters for `namespace`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add filters from a configuration string such as `ns/a.b,ns/c`
    pub fn with_filter_config(mut self, config: &str) -> Result<Self> {
        self.filters.extend(parse_filter_config(config)?);
        Ok(self)
    }

    /// Set the invalid row policy
    pub fn with_policy(mut self, policy: InvalidRowPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Counters reported after writing a batch of rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Rows consumed from the input
    pub rows_read: u64,
    /// Rows handed to the sink
    pub rows_written: u64,
    /// Rows dropped under [`InvalidRowPolicy::Skip`]
    pub rows_skipped: u64,
}

/// Filtered schema, physical schema, rule table and nester for one write.
///
/// Everything is resolved in [`WriteSession::open`] and read-only afterwards,
/// so a session can be shared across threads.
#[derive(Debug)]
pub struct WriteSession {
    tree: SchemaTree,
    physical_schema: PhysicalSchema,
    registry: ValidationRegistry,
    nester: RowNester,
    families: Vec<Option<RuleFamily>>,
    policy: InvalidRowPolicy,
}

impl WriteSession {
    /// Build every schema artifact from a descriptor
    pub fn open(descriptor: &SchemaDescriptor, options: SessionOptions) -> SessionResult<Self> {
        let mut tree = descriptor.build_tree(options.delimiter, options.limits.clone())?;

        match &options.namespace {
            Some(namespace) => {
                let filterer = FieldFilterer::new(options.filters.clone());
                let removed = filterer.apply_to_tree(namespace, &mut tree);
                debug!(namespace = %namespace, removed, "filters applied");
            }
            None if !options.filters.is_empty() => {
                warn!(
                    filters = options.filters.len(),
                    "filters configured without a namespace; none applied"
                );
            }
            None => {}
        }

        let physical_schema = PhysicalSchema::from_tree(&tree)?;
        let registry = ValidationRegistry::from_tree(&tree)?;

        let paths = tree.leaf_paths();
        let families = paths.iter().map(|path| registry.family(path)).collect();
        let nester = RowNester::new(paths);

        info!(
            entries = descriptor.len(),
            columns = nester.paths().len(),
            constrained = registry.len(),
            "write session opened"
        );

        Ok(Self {
            tree,
            physical_schema,
            registry,
            nester,
            families,
            policy: options.policy,
        })
    }

    /// Filtered schema tree
    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    /// Physical schema for the columnar writer
    pub fn physical_schema(&self) -> &PhysicalSchema {
        &self.physical_schema
    }

    /// Resolved validation rules
    pub fn registry(&self) -> &ValidationRegistry {
        &self.registry
    }

    /// Leaf paths rows are aligned with
    pub fn columns(&self) -> &[TraversablePath] {
        self.nester.paths()
    }

    /// Invalid row policy in effect
    pub fn policy(&self) -> InvalidRowPolicy {
        self.policy
    }

    /// Validate every non-null constrained value, then nest the row
    pub fn process_row(&self, values: Vec<Value>) -> SessionResult<Map<String, Value>> {
        self.validate_row(&values)?;
        Ok(self.nester.nest(values)?)
    }

    /// Check a row against the rule table without nesting it
    pub fn validate_row(&self, values: &[Value]) -> SessionResult<()> {
        let columns = self.columns();
        if values.len() != columns.len() {
            return Err(SheafError::ArityMismatch {
                fields: columns.len(),
                values: values.len(),
            }
            .into());
        }

        for ((path, family), value) in columns.iter().zip(&self.families).zip(values) {
            if family.is_some() {
                self.validate_value(path, value)?;
            }
        }
        Ok(())
    }

    /// Validate and nest `rows`, handing valid records to `sink`
    pub fn write_rows<I, S>(&self, rows: I, sink: &mut S) -> SessionResult<WriteSummary>
    where
        I: IntoIterator<Item = Vec<Value>>,
        S: RecordSink + ?Sized,
    {
        self.write_row_results(rows.into_iter().map(Ok), sink)
    }

    /// Stream rows straight from a reader such as [`crate::NdjsonRows`].
    ///
    /// Rows are pulled one at a time. An undecodable row is a row error and
    /// follows the session policy; a read failure always aborts.
    pub fn write_row_results<I, S>(&self, rows: I, sink: &mut S) -> SessionResult<WriteSummary>
    where
        I: IntoIterator<Item = Result<Vec<Value>>>,
        S: RecordSink + ?Sized,
    {
        let results = rows.into_iter().enumerate().map(|(row, item)| {
            item.map_err(SessionError::from_input)
                .and_then(|values| self.process_row(values))
                .map_err(|e| e.at_row(row))
        });

        let mut summary = WriteSummary::default();
        self.drain(results, sink, &mut summary)?;
        self.finish(sink, summary)
    }

    /// Apply the row policy to already processed rows, in order
    pub(crate) fn drain<I, S>(
        &self,
        results: I,
        sink: &mut S,
        summary: &mut WriteSummary,
    ) -> SessionResult<()>
    where
        I: IntoIterator<Item = SessionResult<Map<String, Value>>>,
        S: RecordSink + ?Sized,
    {
        for result in results {
            summary.rows_read += 1;
            match result {
                Ok(record) => {
                    sink.write_record(&record)?;
                    summary.rows_written += 1;
                }
                Err(err) if self.policy == InvalidRowPolicy::Skip && err.is_row_error() => {
                    warn!(error = %err, "invalid row skipped");
                    summary.rows_skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Flush the sink and report the totals
    pub(crate) fn finish<S>(&self, sink: &mut S, summary: WriteSummary) -> SessionResult<WriteSummary>
    where
        S: RecordSink + ?Sized,
    {
        sink.flush()?;
        info!(
            read = summary.rows_read,
            written = summary.rows_written,
            skipped = summary.rows_skipped,
            "rows written"
        );
        Ok(summary)
    }

    fn validate_value(&self, path: &TraversablePath, value: &Value) -> SessionResult<()> {
        self.registry.validate(path, value).map_err(|rejection| match rejection {
            Rejection::Failure(failure) => SessionError::Validation {
                path: path.dotted(),
                failure,
            },
            Rejection::Mismatch { family, .. } => SessionError::mismatch(path.dotted(), family, value),
        })
    }
}
