//! Operation runner: one target, one attempt, hard deadline

use std::sync::mpsc::RecvTimeoutError;
use std::time::Instant;
use tracing::{debug, warn};

use super::operation::{Completion, Operation};
use super::outcome::{OperationError, OperationOutcome};
use super::target::Target;
use crate::config::RunConfig;

/// Run `operation` against `target` and produce its outcome.
///
/// Races the unit's completion against `config.operation_timeout`. If the
/// deadline wins, the unit is terminated before this returns, so nothing
/// outlives the runner. Never retries.
pub fn run_operation(
    operation: &dyn Operation,
    target: &Target,
    config: &RunConfig,
) -> OperationOutcome {
    let start = Instant::now();

    let running = match operation.start(target) {
        Ok(running) => running,
        Err(error) => {
            warn!(target = %target, %error, "operation failed to start");
            return OperationOutcome::failure(error, start.elapsed());
        }
    };
    let (completion_rx, mut terminator) = running.into_parts();

    match completion_rx.recv_timeout(config.operation_timeout) {
        Ok(completion) => {
            let duration = start.elapsed();
            match check_completion(target, completion, operation.confirmation_marker()) {
                Ok(()) => {
                    debug!(target = %target, ?duration, "operation succeeded");
                    OperationOutcome::success(duration)
                }
                Err(error) => {
                    warn!(target = %target, %error, "operation failed");
                    OperationOutcome::failure(error, duration)
                }
            }
        }
        Err(RecvTimeoutError::Timeout) => {
            if let Err(err) = terminator.terminate() {
                warn!(target = %target, %err, "failed to terminate timed-out operation");
            }
            let duration = start.elapsed();
            warn!(target = %target, ?duration, "operation timed out");
            OperationOutcome::failure(
                OperationError::Timeout {
                    timeout: config.operation_timeout,
                },
                duration,
            )
        }
        Err(RecvTimeoutError::Disconnected) => {
            // The unit went away without reporting; make sure it is really gone
            let _ = terminator.terminate();
            OperationOutcome::failure(
                OperationError::execution("operation ended without reporting completion"),
                start.elapsed(),
            )
        }
    }
}

/// Judge a finished unit: its own error wins, then the confirmation marker
fn check_completion(
    target: &Target,
    completion: Completion,
    marker: Option<&str>,
) -> Result<(), OperationError> {
    if let Some(error) = completion.error {
        return Err(OperationError::Execution { message: error });
    }

    match marker {
        Some(marker) if !completion.output.contains(marker) => Err(OperationError::Unconfirmed {
            target: target.to_string(),
        }),
        _ => Ok(()),
    }
}
