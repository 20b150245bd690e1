//! Runner module - Execution abstraction layer
//!
//! This module provides a unified interface for running programs:
//! - `SandboxedRunner`: untrusted code in a confined child process
//!
//! The runner module does NOT:
//! - Compare outputs or determine verdicts
//! - Generate harness code
//! - Retry anything; every failure is reported exactly once

pub mod sandboxed;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use sandboxed::SandboxedRunner;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 128;

/// Resource limits for one execution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunLimits {
    /// Wall-clock deadline in seconds
    pub timeout_secs: u64,
    /// Address-space ceiling in MB
    pub memory_limit_mb: u64,
}

impl RunLimits {
    pub fn new(timeout_secs: u64, memory_limit_mb: u64) -> Self {
        Self {
            timeout_secs,
            memory_limit_mb,
        }
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
        }
    }
}

/// Outcome of running a program once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code 0 within the deadline. Stderr content does not affect it.
    pub success: bool,
    /// Trimmed stdout
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    /// User-visible diagnostic for failed runs
    pub error: Option<String>,
    /// `None` when killed by a signal or by the deadline
    pub exit_code: Option<i32>,
    /// Terminating signal, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
    pub timed_out: bool,
    pub wall_time_seconds: f64,
    pub peak_memory_mb: f64,
}

impl ExecutionResult {
    /// Result of a run that hit the deadline
    pub fn timed_out(timeout_secs: u64) -> Self {
        Self {
            success: false,
            stdout: None,
            stderr: None,
            error: Some(format!("Execution timed out after {} seconds", timeout_secs)),
            exit_code: None,
            signal: None,
            timed_out: true,
            wall_time_seconds: timeout_secs as f64,
            peak_memory_mb: 0.0,
        }
    }
}

/// Runner trait for executing programs
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run `source` with `stdin` under `limits`.
    ///
    /// Program failures (nonzero exit, timeout) come back as an unsuccessful
    /// `ExecutionResult`; `Err` is reserved for host failures.
    async fn run(&self, source: &str, stdin: &str, limits: &RunLimits) -> Result<ExecutionResult>;
}
