//! Parallel row processing.
//!
//! Rows are validated and nested on a dedicated rayon pool. Results are
//! collected by row index, so output order always matches input order and the
//! row policy is applied exactly as in the sequential path.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde_json::{Map, Value};
use sheaf_format::{Result, SheafError};
use tracing::debug;

use crate::error::{SessionError, SessionResult};
use crate::session::{WriteSession, WriteSummary};
use crate::sink::RecordSink;

const MAX_PARALLEL_THREADS: usize = 16;
const MIN_ROWS_PER_THREAD: usize = 256;
const BATCH_ROWS: usize = MAX_PARALLEL_THREADS * MIN_ROWS_PER_THREAD * 4;

/// Configuration for the parallel row pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelConfig {
    /// Optional cap on worker thread count
    pub max_threads: Option<usize>,
}

/// Thread count chosen for a batch, with the reason behind it
#[derive(Debug, Clone)]
pub struct ParallelDecision {
    /// Whether more than one worker is used
    pub use_parallel: bool,
    /// Worker thread count
    pub thread_count: usize,
    /// Human-readable explanation
    pub reason: String,
}

impl ParallelConfig {
    /// Pick a thread count for `row_count` rows
    pub fn decide(&self, row_count: usize) -> ParallelDecision {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        evaluate_parallel_decision(cores, row_count, self)
    }
}

fn evaluate_parallel_decision(
    cores: usize,
    row_count: usize,
    config: &ParallelConfig,
) -> ParallelDecision {
    let user_cap = config
        .max_threads
        .map(|cap| cap.max(1))
        .unwrap_or(MAX_PARALLEL_THREADS)
        .min(MAX_PARALLEL_THREADS);
    let by_rows = (row_count / MIN_ROWS_PER_THREAD).max(1);
    let thread_count = cores.min(user_cap).min(by_rows).max(1);

    let reason = if cores < 2 {
        "Single-core system detected".to_string()
    } else if user_cap <= 1 {
        "Sequential mode forced by thread cap".to_string()
    } else if by_rows < 2 {
        format!(
            "Small batch ({} rows) - parallel overhead exceeds benefit",
            row_count
        )
    } else {
        format!("Using {}/{} cores for {} rows", thread_count, cores, row_count)
    };

    ParallelDecision {
        use_parallel: thread_count > 1,
        thread_count,
        reason,
    }
}

/// Validate and nest `rows` on a worker pool, preserving row order.
///
/// Each entry of the result is the outcome for the row at the same index;
/// errors carry that index.
pub fn process_rows_parallel(
    session: &WriteSession,
    rows: Vec<Vec<Value>>,
    config: &ParallelConfig,
) -> SessionResult<Vec<SessionResult<Map<String, Value>>>> {
    let pool = build_pool(&config.decide(rows.len()))?;
    let batch = rows.into_iter().map(Ok).collect();
    Ok(process_batch(&pool, session, batch, 0))
}

/// Parallel counterpart of [`WriteSession::write_rows`]
pub fn write_rows_parallel<S>(
    session: &WriteSession,
    rows: Vec<Vec<Value>>,
    sink: &mut S,
    config: &ParallelConfig,
) -> SessionResult<WriteSummary>
where
    S: RecordSink + ?Sized,
{
    let results = process_rows_parallel(session, rows, config)?;
    let mut summary = WriteSummary::default();
    session.drain(results, sink, &mut summary)?;
    session.finish(sink, summary)
}

/// Parallel counterpart of [`WriteSession::write_row_results`].
///
/// Input is pulled in batches of `BATCH_ROWS`, so memory stays bounded by
/// the batch size rather than the input size. The pool is sized from the
/// first batch.
pub fn write_row_results_parallel<I, S>(
    session: &WriteSession,
    rows: I,
    sink: &mut S,
    config: &ParallelConfig,
) -> SessionResult<WriteSummary>
where
    I: IntoIterator<Item = Result<Vec<Value>>>,
    S: RecordSink + ?Sized,
{
    let mut rows = rows.into_iter();
    let mut summary = WriteSummary::default();

    let mut batch: Vec<Result<Vec<Value>>> = rows.by_ref().take(BATCH_ROWS).collect();
    let pool = build_pool(&config.decide(batch.len()))?;
    let mut offset = 0;

    while !batch.is_empty() {
        let len = batch.len();
        let results = process_batch(&pool, session, batch, offset);
        session.drain(results, sink, &mut summary)?;
        offset += len;
        batch = rows.by_ref().take(BATCH_ROWS).collect();
    }

    session.finish(sink, summary)
}

fn build_pool(decision: &ParallelDecision) -> SessionResult<ThreadPool> {
    debug!(
        threads = decision.thread_count,
        reason = %decision.reason,
        "parallel row processing"
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(decision.thread_count)
        .thread_name(|idx| format!("sheaf-rows-{}", idx))
        .build()
        .map_err(|e| SheafError::Internal(format!("Failed to create thread pool: {}", e)))?;
    Ok(pool)
}

fn process_batch(
    pool: &ThreadPool,
    session: &WriteSession,
    batch: Vec<Result<Vec<Value>>>,
    offset: usize,
) -> Vec<SessionResult<Map<String, Value>>> {
    pool.install(|| {
        batch
            .into_par_iter()
            .enumerate()
            .map(|(idx, item)| {
                item.map_err(SessionError::from_input)
                    .and_then(|values| session.process_row(values))
                    .map_err(|e| e.at_row(offset + idx))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_core_is_sequential() {
        let decision = evaluate_parallel_decision(1, 100_000, &ParallelConfig::default());
        assert!(!decision.use_parallel);
        assert_eq!(decision.thread_count, 1);
    }

    #[test]
    fn test_small_batch_is_sequential() {
        let decision = evaluate_parallel_decision(8, 100, &ParallelConfig::default());
        assert!(!decision.use_parallel);
        assert!(decision.reason.contains("Small batch"));
    }

    #[test]
    fn test_thread_cap_respected() {
        let config = ParallelConfig {
            max_threads: Some(3),
        };
        let decision = evaluate_parallel_decision(8, 100_000, &config);
        assert!(decision.use_parallel);
        assert_eq!(decision.thread_count, 3);

        let forced = ParallelConfig {
            max_threads: Some(0),
        };
        let decision = evaluate_parallel_decision(8, 100_000, &forced);
        assert_eq!(decision.thread_count, 1);
    }

    #[test]
    fn test_hard_cap_applies() {
        let decision = evaluate_parallel_decision(64, 1_000_000, &ParallelConfig::default());
        assert_eq!(decision.thread_count, MAX_PARALLEL_THREADS);
    }
}
