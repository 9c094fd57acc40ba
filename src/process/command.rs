//! Operation that runs an external program per target

use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::kill_process_group;
use super::output::{spawn_reader, tail_lines};
use crate::dispatch::{Completion, Operation, OperationError, RunningOperation, Target, Terminate};

/// Argument text replaced with the target address
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// How long the waiter holds the child before checking for a kill request
const WAIT_SLICE: Duration = Duration::from_millis(20);

/// Timeout for collecting output once the child has exited
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Lines of stderr included in a failure message
const MAX_ERROR_OUTPUT_LINES: usize = 20;

/// Runs `program args...` once per target.
///
/// Every `{target}` inside an argument is replaced with the target address.
/// The program is executed directly, not through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOperation {
    program: String,
    args: Vec<String>,
    confirmation_marker: Option<String>,
}

impl CommandOperation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            confirmation_marker: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Require `marker` in the output of a successful run
    pub fn with_confirmation_marker(mut self, marker: impl Into<String>) -> Self {
        self.confirmation_marker = Some(marker.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with the target substituted in
    pub fn args_for(&self, target: &Target) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, target.address()))
            .collect()
    }

    /// Shell-quoted command line, for logs and error messages
    pub fn command_line(&self, target: &Target) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args_for(target))
            .map(|part| shell_escape::escape(part.into()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_command(&self, target: &Target) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);
        cmd
    }
}

impl Operation for CommandOperation {
    fn start(&self, target: &Target) -> Result<RunningOperation, OperationError> {
        debug!(target = %target, command = %self.command_line(target), "spawning process");

        let mut child = self.build_command(target).spawn().map_err(|e| {
            OperationError::execution(format!("Failed to spawn {}: {e}", self.program))
        })?;

        let pid = child.id();
        // Readers start before anything waits on the child, otherwise a full
        // pipe buffer would block it forever
        let stdout_rx = spawn_reader(child.stdout.take());
        let stderr_rx = spawn_reader(child.stderr.take());

        let child = Arc::new(Mutex::new(child));
        let kill_requested = Arc::new(AtomicBool::new(false));
        let mut terminator = ProcessTerminator {
            child: Arc::clone(&child),
            pgid: pid,
            kill_requested: Arc::clone(&kill_requested),
        };

        let (completion_tx, completion_rx) = mpsc::channel();
        let program = self.program.clone();
        let spawned = thread::Builder::new()
            .name(format!("wait-{pid}"))
            .spawn(move || {
                let Some(status) = wait_for_exit(&child, &kill_requested) else {
                    return;
                };
                let completion = match status {
                    Ok(status) => collect_completion(&program, status, stdout_rx, stderr_rx),
                    Err(e) => Completion::failure(format!("Failed to wait for {program}: {e}"), ""),
                };
                let _ = completion_tx.send(completion);
            });

        if let Err(e) = spawned {
            let _ = terminator.terminate();
            return Err(OperationError::execution(format!(
                "Failed to watch {} (pid {pid}): {e}",
                self.program
            )));
        }

        Ok(RunningOperation::new(completion_rx, terminator))
    }

    fn confirmation_marker(&self) -> Option<&str> {
        self.confirmation_marker.as_deref()
    }
}

/// Poll the child until it exits or a kill is requested.
///
/// The lock is held only for one [`WAIT_SLICE`] at a time so the terminator
/// can take the child over. Returns `None` when the terminator took over.
fn wait_for_exit(
    child: &Mutex<Child>,
    kill_requested: &AtomicBool,
) -> Option<std::io::Result<ExitStatus>> {
    loop {
        if kill_requested.load(Ordering::SeqCst) {
            return None;
        }
        let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
        match child.wait_timeout(WAIT_SLICE) {
            Ok(Some(status)) => return Some(Ok(status)),
            Ok(None) => {}
            Err(e) => return Some(Err(e)),
        }
    }
}

/// Build the completion for an exited child. Output is stdout followed by stderr.
fn collect_completion(
    program: &str,
    status: ExitStatus,
    stdout_rx: Receiver<String>,
    stderr_rx: Receiver<String>,
) -> Completion {
    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());

    let error = if status.success() {
        None
    } else {
        let details = tail_lines(&stderr, MAX_ERROR_OUTPUT_LINES);
        Some(if details.is_empty() {
            format!("{program} failed ({status})")
        } else {
            format!("{program} failed ({status})\n{details}")
        })
    };

    let mut output = stdout;
    output.push_str(&stderr);
    Completion { error, output }
}

/// Kills a spawned child together with its process group, then reaps it
pub struct ProcessTerminator {
    child: Arc<Mutex<Child>>,
    pgid: u32,
    kill_requested: Arc<AtomicBool>,
}

impl ProcessTerminator {
    /// Process group id, equal to the child's pid
    pub fn pgid(&self) -> u32 {
        self.pgid
    }
}

impl Terminate for ProcessTerminator {
    fn terminate(&mut self) -> std::io::Result<()> {
        self.kill_requested.store(true, Ordering::SeqCst);
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);

        match kill_process_group(self.pgid) {
            Ok(true) => debug!(pgid = self.pgid, "killed process group"),
            Ok(false) => {}
            Err(e) => warn!(pgid = self.pgid, error = %e, "failed to kill process group"),
        }

        // The group kill normally covers the child; this handles the case
        // where the group could not be signalled. Already-exited is fine.
        let _ = child.kill();
        child.wait()?;
        Ok(())
    }
}
