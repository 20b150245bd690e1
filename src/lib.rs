//! Judge for single-function Python submissions.
//!
//! A submission is wrapped in a generated harness, run once per test case in
//! a confined child process, and its output is compared with type-aware
//! rules. [`JudgeEngine`] is the entry point; the `judge-worker` binary feeds
//! it from a Redis queue.

pub mod checker;
pub mod config;
pub mod core;
pub mod error;
pub mod harness;
pub mod input;
pub mod jobs;
pub mod judger;
pub mod redis_manager;
pub mod runner;
pub mod sandbox;

pub use crate::config::JudgeConfig;
pub use crate::core::{FailureKind, OverallStatus, SuiteResult, TestCase, TestCaseResult};
pub use crate::error::JudgeError;
pub use crate::judger::JudgeEngine;
pub use crate::runner::{ExecutionResult, RunLimits};

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use crate::error::Result;
    use crate::runner::{ExecutionResult, RunLimits, Runner};

    /// Whether a Python 3 interpreter is on PATH; interpreter tests skip
    /// themselves without one.
    pub fn python_available() -> bool {
        let available = std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if !available {
            eprintln!("python3 not available, skipping");
        }
        available
    }

    pub fn python_command() -> Vec<String> {
        vec!["python3".to_string(), "-I".to_string()]
    }

    /// Runner whose program always prints the same thing
    pub struct FixedRunner {
        stdout: String,
    }

    impl FixedRunner {
        pub fn new(stdout: &str) -> Self {
            Self {
                stdout: stdout.to_string(),
            }
        }
    }

    #[async_trait]
    impl Runner for FixedRunner {
        async fn run(&self, _source: &str, _stdin: &str, _limits: &RunLimits) -> Result<ExecutionResult> {
            Ok(ExecutionResult {
                success: true,
                stdout: Some(self.stdout.clone()),
                stderr: None,
                error: None,
                exit_code: Some(0),
                signal: None,
                timed_out: false,
                wall_time_seconds: 0.01,
                peak_memory_mb: 1.0,
            })
        }
    }
}
