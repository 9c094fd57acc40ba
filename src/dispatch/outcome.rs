//! Per-target outcome types

use std::time::Duration;
use thiserror::Error;

/// Why an operation against a single target failed.
///
/// Every variant is local to one target: it is recorded in that target's
/// [`OperationOutcome`] and never aborts the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The operation reported an error (nonzero exit, failed to start, ...)
    #[error("{message}")]
    Execution { message: String },

    /// The operation reported no error but its output lacked the confirmation marker
    #[error("{target} did not confirm completion")]
    Unconfirmed { target: String },

    /// The operation overran its deadline and was terminated
    #[error("timed out after {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },
}

impl OperationError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result of running the operation against one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub succeeded: bool,
    pub error: Option<OperationError>,
    pub duration: Duration,
}

impl OperationOutcome {
    pub fn success(duration: Duration) -> Self {
        Self {
            succeeded: true,
            error: None,
            duration,
        }
    }

    pub fn failure(error: OperationError, duration: Duration) -> Self {
        Self {
            succeeded: false,
            error: Some(error),
            duration,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.error.as_ref().is_some_and(OperationError::is_timeout)
    }

    /// One-line status, e.g. `PASSED (812ms)` or `TIMEOUT (60000ms): timed out after 60s`
    pub fn summary(&self) -> String {
        let status = if self.timed_out() {
            "TIMEOUT"
        } else if self.succeeded {
            "PASSED"
        } else {
            "FAILED"
        };
        let duration_ms = self.duration.as_millis();
        match &self.error {
            Some(error) => format!("{status} ({duration_ms}ms): {error}"),
            None => format!("{status} ({duration_ms}ms)"),
        }
    }
}
