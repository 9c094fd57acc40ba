//! Errors that abort a dispatch run
//!
//! These are violations of the dispatcher's own bookkeeping, not failures of
//! individual targets (those live in [`super::OperationError`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("concurrency gate token pool is no longer usable")]
    GateClosed,

    #[error("failed to spawn runner thread for {target}")]
    Spawn {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("completion channel closed after {received} of {expected} completions")]
    MissingCompletions { expected: usize, received: usize },
}
