//! POSIX rlimit backend
//!
//! The child gets its own process group so the whole tree can be killed with
//! one `killpg`, and its limits are set in the pre-exec hook (between fork and
//! exec, so they never touch the worker itself).

#[cfg(target_os = "linux")]
use std::io;

use nix::errno::Errno;
use nix::sys::resource::{setrlimit, Resource};
use nix::sys::signal::{killpg, Signal};
#[cfg(target_os = "linux")]
use nix::sys::wait::{waitid, Id, WaitPidFlag};
use nix::unistd::Pid;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{Limits, ProcessSandbox};

#[derive(Debug, Default)]
pub struct RlimitSandbox;

impl ProcessSandbox for RlimitSandbox {
    fn name(&self) -> &'static str {
        "rlimit"
    }

    fn confine(&self, command: &mut Command, limits: &Limits) {
        let address_space = limits.memory_mb.saturating_mul(1024 * 1024);
        let file_size = limits.fsize_kb.saturating_mul(1024);

        command.process_group(0);

        // SAFETY: the hook only calls setrlimit, which is async-signal-safe
        // and does not allocate.
        unsafe {
            command.pre_exec(move || {
                // A limit the kernel rejects is skipped rather than failing the spawn
                let _ = setrlimit(Resource::RLIMIT_AS, address_space, address_space);
                let _ = setrlimit(Resource::RLIMIT_CORE, 0, 0);
                let _ = setrlimit(Resource::RLIMIT_FSIZE, file_size, file_size);
                Ok(())
            });
        }
    }

    fn kill_tree(&self, pid: u32) {
        // killpg(0) would target the worker's own group
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => return,
        };

        match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
            Ok(()) => debug!("Killed process group {}", raw),
            // Group already gone
            Err(Errno::ESRCH) => {}
            Err(e) => warn!("Failed to kill process group {}: {}", raw, e),
        }
    }
}

/// Wait for `pid` to exit without reaping it.
///
/// The zombie keeps its pid, and with it the process group id, reserved
/// until the caller reaps it, so a `kill_tree` issued in between cannot hit
/// a recycled group.
#[cfg(target_os = "linux")]
pub async fn wait_exited(pid: u32) -> io::Result<()> {
    let raw = i32::try_from(pid).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;

    tokio::task::spawn_blocking(move || loop {
        match waitid(
            Id::Pid(Pid::from_raw(raw)),
            WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT,
        ) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => continue,
            // Reaped elsewhere already
            Err(Errno::ECHILD) => return Ok(()),
            Err(e) => return Err(io::Error::from(e)),
        }
    })
    .await
    .map_err(io::Error::other)?
}
