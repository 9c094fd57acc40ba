//! Concurrency gate bounding simultaneously active runners
//!
//! The gate is a pool of capacity tokens held in a bounded channel. Acquiring
//! takes a token out of the channel (blocking while it is empty), and dropping
//! the returned [`GatePermit`] puts the token back. A limit of 0 disables the
//! pool entirely and every acquire succeeds immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

use super::error::DispatchError;

struct TokenPool {
    tokens_tx: SyncSender<()>,
    tokens_rx: Mutex<Receiver<()>>,
}

pub struct ConcurrencyGate {
    limit: usize,
    pool: Option<TokenPool>,
    in_use: AtomicUsize,
}

impl ConcurrencyGate {
    /// Create a gate admitting at most `limit` holders at once (0 = unbounded)
    pub fn new(limit: usize) -> Arc<Self> {
        let pool = (limit > 0).then(|| {
            let (tokens_tx, tokens_rx) = mpsc::sync_channel(limit);
            for _ in 0..limit {
                // Capacity equals the token count, so this never fails
                let _ = tokens_tx.try_send(());
            }
            TokenPool {
                tokens_tx,
                tokens_rx: Mutex::new(tokens_rx),
            }
        });

        Arc::new(Self {
            limit,
            pool,
            in_use: AtomicUsize::new(0),
        })
    }

    /// Configured limit, 0 meaning unbounded
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_unbounded(&self) -> bool {
        self.pool.is_none()
    }

    /// Number of permits currently held
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::SeqCst)
    }

    /// Block until a token is available and take it.
    ///
    /// Never blocks for an unbounded gate. Fails only if the token pool is
    /// unusable, which means a holder panicked while acquiring.
    pub fn acquire(self: &Arc<Self>) -> Result<GatePermit, DispatchError> {
        if let Some(pool) = &self.pool {
            let tokens_rx = pool
                .tokens_rx
                .lock()
                .map_err(|_| DispatchError::GateClosed)?;
            tokens_rx.recv().map_err(|_| DispatchError::GateClosed)?;
        }

        self.in_use.fetch_add(1, Ordering::SeqCst);
        Ok(GatePermit {
            gate: Arc::clone(self),
        })
    }

    fn release(&self) {
        self.in_use.fetch_sub(1, Ordering::SeqCst);
        if let Some(pool) = &self.pool {
            let returned = pool.tokens_tx.try_send(());
            debug_assert!(returned.is_ok(), "gate token returned twice");
        }
    }
}

/// Capacity held by one runner; the token goes back to the gate on drop
#[must_use = "dropping a permit releases its capacity immediately"]
pub struct GatePermit {
    gate: Arc<ConcurrencyGate>,
}

impl GatePermit {
    /// Return the token to the gate
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
