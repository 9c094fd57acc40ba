//! Dispatch parameters

use std::time::Duration;

/// Default deadline for one operation (1 minute)
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default concurrency limit: 0 launches every target at once
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 0;

/// Timeout and concurrency settings for a dispatch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum time a single operation may run before it is terminated
    pub operation_timeout: Duration,
    /// Maximum operations in flight at once, 0 meaning unbounded
    pub concurrency_limit: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl RunConfig {
    pub fn new(operation_timeout: Duration, concurrency_limit: usize) -> Self {
        Self {
            operation_timeout,
            concurrency_limit,
        }
    }

    /// Replace the per-operation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Replace the concurrency limit (0 = unbounded)
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.concurrency_limit == 0
    }
}
