//! Playground job - run code as a plain program

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::engine_for_job;
use crate::judger::JudgeEngine;
use crate::runner::ExecutionResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaygroundJob {
    /// List the result is pushed to
    pub result_key: String,
    pub code: String,
    #[serde(default, alias = "stdin_input", skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>,
    /// MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
}

/// Process a playground job
pub async fn process_playground_job(
    job: &PlaygroundJob,
    engine: &JudgeEngine,
) -> anyhow::Result<ExecutionResult> {
    let engine = engine_for_job(engine, job.time_limit, job.memory_limit)?;
    let result = engine
        .execute(&job.code, job.stdin.as_deref().unwrap_or(""))
        .await
        .context("Playground execution failed")?;
    Ok(result)
}

/// Result pushed when the job could not run at all
pub fn failed_result(message: impl Into<String>) -> ExecutionResult {
    ExecutionResult {
        success: false,
        stdout: None,
        stderr: None,
        error: Some(message.into()),
        exit_code: None,
        signal: None,
        timed_out: false,
        wall_time_seconds: 0.0,
        peak_memory_mb: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedRunner;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_process_playground_job() {
        let engine = JudgeEngine::with_runner(Arc::new(FixedRunner::new("hello")), 1);
        let job = PlaygroundJob {
            result_key: "pg:1".to_string(),
            code: "print('hello')".to_string(),
            stdin: None,
            time_limit: None,
            memory_limit: None,
        };

        let result = process_playground_job(&job, &engine).await.unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.as_deref(), Some("hello"));
    }

    #[test]
    fn test_failed_result() {
        let result = failed_result("Playground execution failed");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Playground execution failed"));
    }
}
