//! Executor abstraction consumed by the operation runner
//!
//! An [`Operation`] knows how to start one unit of external work against a
//! [`Target`]. Starting hands back a [`RunningOperation`]: a channel that
//! yields the unit's [`Completion`] exactly once, and an owned [`Terminate`]
//! handle that forcibly stops the unit. The runner never reaches into the
//! unit any other way.

use std::sync::mpsc::Receiver;

use super::outcome::OperationError;
use super::target::Target;

/// What a finished unit reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// `Some` when the unit signalled failure
    pub error: Option<String>,
    /// Raw output, searched for the confirmation marker
    pub output: String,
}

impl Completion {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            error: None,
            output: output.into(),
        }
    }

    pub fn failure(error: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            output: output.into(),
        }
    }
}

/// Cancellation handle for a started unit
pub trait Terminate: Send {
    /// Stop the unit and wait until it is gone.
    ///
    /// Must be safe to call after the unit already finished.
    fn terminate(&mut self) -> std::io::Result<()>;
}

/// A started unit: its completion channel plus its cancellation handle
pub struct RunningOperation {
    completion: Receiver<Completion>,
    terminator: Box<dyn Terminate>,
}

impl RunningOperation {
    pub fn new(completion: Receiver<Completion>, terminator: impl Terminate + 'static) -> Self {
        Self {
            completion,
            terminator: Box::new(terminator),
        }
    }

    pub fn into_parts(self) -> (Receiver<Completion>, Box<dyn Terminate>) {
        (self.completion, self.terminator)
    }
}

/// The external operation dispatched against every target
pub trait Operation: Send + Sync {
    /// Launch the unit of work for `target` without waiting for it.
    ///
    /// An error here means the unit never started; it is recorded as an
    /// execution failure for that target.
    fn start(&self, target: &Target) -> Result<RunningOperation, OperationError>;

    /// Output text proving the unit really finished its job.
    ///
    /// When set, a unit that reports no error but whose output lacks the
    /// marker is treated as failed.
    fn confirmation_marker(&self) -> Option<&str> {
        None
    }
}
