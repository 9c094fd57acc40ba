//! Result aggregation for a dispatch run

use std::time::Duration;

use super::outcome::OperationOutcome;
use super::target::Target;

/// A target paired with its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    /// Position of the target in the dispatch order
    pub index: usize,
    pub target: Target,
    pub outcome: OperationOutcome,
}

impl TargetResult {
    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded
    }
}

/// Folds completions into a running verdict as they arrive.
///
/// Arrival order is whatever order runners finished in; nothing here
/// depends on it matching dispatch order.
#[derive(Debug)]
pub struct ResultAggregator {
    all_succeeded: bool,
    results: Vec<TargetResult>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            all_succeeded: true,
            results: Vec::with_capacity(capacity),
        }
    }

    /// Record one completion and return the stored entry
    pub fn record(&mut self, result: TargetResult) -> &TargetResult {
        if !result.succeeded() {
            self.all_succeeded = false;
        }
        let position = self.results.len();
        self.results.push(result);
        &self.results[position]
    }

    pub fn all_succeeded(&self) -> bool {
        self.all_succeeded
    }

    /// Number of completions recorded so far
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[TargetResult] {
        &self.results
    }

    pub fn finish(self, elapsed: Duration) -> RunReport {
        RunReport {
            all_succeeded: self.all_succeeded,
            results: self.results,
            elapsed,
        }
    }
}

/// Final result of a dispatch run
#[derive(Debug, Clone)]
pub struct RunReport {
    all_succeeded: bool,
    results: Vec<TargetResult>,
    elapsed: Duration,
}

impl RunReport {
    /// True iff every target succeeded (vacuously true for no targets)
    pub fn all_succeeded(&self) -> bool {
        self.all_succeeded
    }

    /// Per-target results in completion order
    pub fn results(&self) -> &[TargetResult] {
        &self.results
    }

    /// Per-target results re-sorted into dispatch order
    pub fn in_dispatch_order(&self) -> Vec<&TargetResult> {
        let mut ordered: Vec<&TargetResult> = self.results.iter().collect();
        ordered.sort_by_key(|r| r.index);
        ordered
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetResult> {
        self.results.iter().filter(|r| !r.succeeded())
    }

    /// Wall-clock time of the whole run
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    pub fn timed_out_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.timed_out()).count()
    }

    pub fn into_results(self) -> Vec<TargetResult> {
        self.results
    }
}
