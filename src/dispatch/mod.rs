//! Bounded-concurrency dispatch engine
//!
//! Runs one [`Operation`] against every [`Target`] and reduces the outcomes to
//! a single verdict.
//!
//! # Components
//!
//! - **Runner** ([`run_operation`]): starts the operation for one target and
//!   races it against the configured timeout. On expiry the unit is
//!   terminated through its cancellation handle before the runner returns.
//! - **Gate** ([`ConcurrencyGate`]): a pool of capacity tokens. A limit of 0
//!   means unbounded.
//! - **Dispatcher** ([`Dispatcher`]): launches one runner thread per target in
//!   input order, blocking only on the gate, then drains completions until
//!   every target has reported.
//! - **Aggregator** ([`ResultAggregator`]): folds completions into the
//!   running `all_succeeded` flag and keeps every per-target result.
//!
//! # Failure Behavior
//!
//! A target that fails, is unconfirmed, or times out never stops or delays
//! the others. Capacity is returned the moment each runner finishes, so the
//! window of in-flight work rolls instead of advancing in batches.
//!
//! There are no retries: each target is attempted exactly once.

mod aggregator;
mod dispatcher;
mod error;
mod gate;
mod operation;
mod outcome;
mod runner;
mod target;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::RunConfig;

pub use aggregator::{ResultAggregator, RunReport, TargetResult};
pub use dispatcher::{Dispatcher, RunObserver, SilentObserver};
pub use error::DispatchError;
pub use gate::{ConcurrencyGate, GatePermit};
pub use operation::{Completion, Operation, RunningOperation, Terminate};
pub use outcome::{OperationError, OperationOutcome};
pub use runner::run_operation;
pub use target::Target;

/// Run `operation` against every target and collect the report.
///
/// `report.all_succeeded()` is the overall verdict and `report.results()`
/// holds one entry per target.
pub fn run_all(
    targets: &[Target],
    operation: Arc<dyn Operation>,
    config: &RunConfig,
) -> Result<RunReport, DispatchError> {
    Dispatcher::new(operation, config.clone()).run(targets)
}
