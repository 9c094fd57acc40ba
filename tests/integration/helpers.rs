//! Scripted operation used by the integration tests

use refresher::dispatch::{
    Completion, Operation, OperationError, RunningOperation, Target, Terminate,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const MARKER: &str = "Successfully refreshed table";

/// What one target does when started
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub error: Option<String>,
    pub output: String,
}

impl Step {
    /// Succeeds after `delay` and prints the confirmation marker
    pub fn confirmed(delay: Duration) -> Self {
        Self {
            delay,
            error: None,
            output: format!("Query: refresh t\n{MARKER}\n"),
        }
    }

    /// Succeeds after `delay` without printing the marker
    pub fn unconfirmed(delay: Duration) -> Self {
        Self {
            delay,
            error: None,
            output: "Query: refresh t\n".to_string(),
        }
    }

    pub fn failing(delay: Duration, error: &str) -> Self {
        Self {
            delay,
            error: Some(error.to_string()),
            output: String::new(),
        }
    }
}

#[derive(Default)]
pub struct Instruments {
    active: AtomicUsize,
    peak: AtomicUsize,
    terminated: Mutex<Vec<String>>,
}

impl Instruments {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> Vec<String> {
        self.terminated.lock().unwrap().clone()
    }
}

pub struct FakeRefresh {
    steps: HashMap<String, Step>,
    default: Step,
    instruments: Arc<Instruments>,
}

impl FakeRefresh {
    pub fn new(default: Step) -> Self {
        Self {
            steps: HashMap::new(),
            default,
            instruments: Arc::new(Instruments::default()),
        }
    }

    pub fn step(mut self, target: &str, step: Step) -> Self {
        self.steps.insert(target.to_string(), step);
        self
    }

    pub fn instruments(&self) -> Arc<Instruments> {
        Arc::clone(&self.instruments)
    }
}

impl Operation for FakeRefresh {
    fn start(&self, target: &Target) -> Result<RunningOperation, OperationError> {
        let step = self
            .steps
            .get(target.address())
            .unwrap_or(&self.default)
            .clone();

        let instruments = Arc::clone(&self.instruments);
        let now = instruments.active.fetch_add(1, Ordering::SeqCst) + 1;
        instruments.peak.fetch_max(now, Ordering::SeqCst);

        let (completion_tx, completion_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker_instruments = Arc::clone(&instruments);
        let handle = thread::spawn(move || {
            let stopped = stop_rx.recv_timeout(step.delay).is_ok();
            worker_instruments.active.fetch_sub(1, Ordering::SeqCst);
            if !stopped {
                let _ = completion_tx.send(Completion {
                    error: step.error,
                    output: step.output,
                });
            }
        });

        Ok(RunningOperation::new(
            completion_rx,
            Kill {
                target: target.to_string(),
                stop_tx,
                handle: Some(handle),
                instruments,
            },
        ))
    }

    fn confirmation_marker(&self) -> Option<&str> {
        Some(MARKER)
    }
}

struct Kill {
    target: String,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
    instruments: Arc<Instruments>,
}

impl Terminate for Kill {
    fn terminate(&mut self) -> std::io::Result<()> {
        self.instruments
            .terminated
            .lock()
            .unwrap()
            .push(self.target.clone());
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

pub fn targets(names: &[&str]) -> Vec<Target> {
    names.iter().map(|name| Target::new(*name)).collect()
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
