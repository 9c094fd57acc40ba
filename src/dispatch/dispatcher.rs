//! Fan-out of runners and fan-in of their outcomes

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

use super::aggregator::{ResultAggregator, RunReport, TargetResult};
use super::error::DispatchError;
use super::gate::{ConcurrencyGate, GatePermit};
use super::operation::Operation;
use super::runner::run_operation;
use super::target::Target;
use crate::config::RunConfig;

/// Progress hooks for a run.
///
/// Called on the dispatcher's own thread, never from runner threads.
pub trait RunObserver {
    /// A runner for `target` is about to be launched
    fn on_dispatch(&mut self, _index: usize, _target: &Target) {}

    /// A completion was just recorded
    fn on_completion(&mut self, _result: &TargetResult) {}
}

/// Observer that ignores everything
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

pub struct Dispatcher {
    operation: Arc<dyn Operation>,
    config: RunConfig,
}

impl Dispatcher {
    pub fn new(operation: Arc<dyn Operation>, config: RunConfig) -> Self {
        Self { operation, config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(&self, targets: &[Target]) -> Result<RunReport, DispatchError> {
        self.run_with_observer(targets, &mut SilentObserver)
    }

    /// Drive every target through exactly one runner and collect all outcomes.
    ///
    /// Targets are launched in input order, each after taking a gate permit.
    /// Completions are folded in as they arrive; the call returns once one
    /// completion per target has been received.
    pub fn run_with_observer(
        &self,
        targets: &[Target],
        observer: &mut dyn RunObserver,
    ) -> Result<RunReport, DispatchError> {
        let started = Instant::now();
        let gate = ConcurrencyGate::new(self.config.concurrency_limit);
        let (completion_tx, completion_rx) = mpsc::channel::<TargetResult>();
        let mut aggregator = ResultAggregator::with_capacity(targets.len());

        info!(
            targets = targets.len(),
            concurrency_limit = self.config.concurrency_limit,
            timeout_ms = self.config.operation_timeout.as_millis() as u64,
            "starting dispatch",
        );

        for (index, target) in targets.iter().enumerate() {
            let permit = gate.acquire()?;
            observer.on_dispatch(index, target);
            self.launch(index, target.clone(), permit, completion_tx.clone())?;

            while let Ok(result) = completion_rx.try_recv() {
                observer.on_completion(aggregator.record(result));
            }
        }
        drop(completion_tx);

        while aggregator.len() < targets.len() {
            let result = completion_rx
                .recv()
                .map_err(|_| DispatchError::MissingCompletions {
                    expected: targets.len(),
                    received: aggregator.len(),
                })?;
            observer.on_completion(aggregator.record(result));
        }

        let report = aggregator.finish(started.elapsed());
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            elapsed_ms = report.elapsed().as_millis() as u64,
            "dispatch finished",
        );
        Ok(report)
    }

    fn launch(
        &self,
        index: usize,
        target: Target,
        permit: GatePermit,
        completion_tx: Sender<TargetResult>,
    ) -> Result<(), DispatchError> {
        let operation = Arc::clone(&self.operation);
        let config = self.config.clone();
        let label = target.to_string();

        debug!(target = %target, index, "launching runner");
        thread::Builder::new()
            .name(format!("runner-{index}"))
            .spawn(move || {
                let outcome = run_operation(operation.as_ref(), &target, &config);
                permit.release();
                // Only fails if the dispatcher already gave up on the run
                let _ = completion_tx.send(TargetResult {
                    index,
                    target,
                    outcome,
                });
            })
            .map(|_| ())
            .map_err(|source| DispatchError::Spawn {
                target: label,
                source,
            })
    }
}
