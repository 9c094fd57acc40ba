//! External process execution
//!
//! [`CommandOperation`] runs a program once per target. Each child gets its
//! own process group so a timeout can take down anything it spawned, and its
//! output pipes are drained on background threads from the moment it starts.

mod command;
mod output;

pub use command::{CommandOperation, ProcessTerminator, TARGET_PLACEHOLDER};
pub use output::MAX_OUTPUT_SIZE;

use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;

/// Check if a process with the given PID is alive
///
/// Sends the null signal: `EPERM` still means the process exists, `ESRCH`
/// means it does not. PIDs that do not fit in an `i32` are treated as gone.
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };

    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// SIGKILL every process in the group led by `pgid`.
///
/// Returns `Ok(false)` if the group no longer exists.
pub fn kill_process_group(pgid: u32) -> std::io::Result<bool> {
    let pgid = i32::try_from(pgid)
        .map_err(|_| std::io::Error::from(std::io::ErrorKind::InvalidInput))?;

    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(std::io::Error::from(errno)),
    }
}
