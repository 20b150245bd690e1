//! Sandbox module - Platform process confinement
//!
//! This module provides a minimal abstraction over OS confinement primitives.
//! It handles:
//! - Applying resource limits to a child before it execs
//! - Killing a child together with every process it spawned
//! - Best-effort memory probing of a running child
//!
//! The backend is chosen once at startup by [`select_backend`]; callers never
//! check the platform themselves.
//!
//! The sandbox module does NOT:
//! - Enforce the wall-clock deadline (that's the runner's job)
//! - Interpret exit statuses or output

pub mod memory;
#[cfg(unix)]
pub mod rlimit;

use std::fmt;
use std::sync::Arc;
use tokio::process::Command;
use tracing::info;

#[cfg(unix)]
pub use rlimit::RlimitSandbox;

/// Resource limits applied to a sandboxed child
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Address-space ceiling in MB
    pub memory_mb: u64,
    /// Largest file the child may write, in KB
    pub fsize_kb: u64,
}

/// Confinement backend for child processes
pub trait ProcessSandbox: Send + Sync + fmt::Debug {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Configure `command` so that `limits` apply to the child before exec.
    /// Limits the platform does not support are skipped, never fatal.
    fn confine(&self, command: &mut Command, limits: &Limits);

    /// Forcibly kill every process started under the child `pid`.
    /// The direct child itself is killed by the caller.
    fn kill_tree(&self, pid: u32);
}

/// Backend for platforms without a limit primitive: runs the child as is
#[derive(Debug, Default)]
pub struct UnconfinedSandbox;

impl ProcessSandbox for UnconfinedSandbox {
    fn name(&self) -> &'static str {
        "unconfined"
    }

    fn confine(&self, _command: &mut Command, _limits: &Limits) {}

    fn kill_tree(&self, _pid: u32) {}
}

/// Select the confinement backend for this host
pub fn select_backend() -> Arc<dyn ProcessSandbox> {
    #[cfg(unix)]
    let backend: Arc<dyn ProcessSandbox> = Arc::new(RlimitSandbox);

    #[cfg(not(unix))]
    let backend: Arc<dyn ProcessSandbox> = {
        tracing::warn!("No resource limit primitive on this platform; memory limits are not enforced");
        Arc::new(UnconfinedSandbox)
    };

    info!("Using {} process sandbox", backend.name());
    backend
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_backend() {
        let backend = select_backend();
        if cfg!(unix) {
            assert_eq!(backend.name(), "rlimit");
        } else {
            assert_eq!(backend.name(), "unconfined");
        }
    }

    #[test]
    fn test_unconfined_is_noop() {
        let sandbox = UnconfinedSandbox;
        let mut cmd = Command::new("true");
        sandbox.confine(
            &mut cmd,
            &Limits {
                memory_mb: 1,
                fsize_kb: 1,
            },
        );
        sandbox.kill_tree(u32::MAX);
    }
}
