//! Sample job - one test case, result handed back on a private key

use serde::{Deserialize, Serialize};

use super::engine_for_job;
use crate::core::{FailureKind, TestCaseResult};
use crate::input::ParameterSchema;
use crate::judger::JudgeEngine;

#[derive(Debug, Serialize, Deserialize)]
pub struct SampleJob {
    /// List the result is pushed to
    pub result_key: String,
    pub code: String,
    pub input: String,
    #[serde(alias = "output", alias = "expectedOutput")]
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>,
    /// MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterSchema>,
}

/// Process a sample job. Job-level problems become a failed case.
pub async fn process_sample_job(job: &SampleJob, engine: &JudgeEngine) -> TestCaseResult {
    let mut engine = match engine_for_job(engine, job.time_limit, job.memory_limit) {
        Ok(engine) => engine,
        Err(e) => {
            return TestCaseResult::failed(
                &job.input,
                &job.expected_output,
                FailureKind::ConfigurationError,
                e.to_string(),
            )
        }
    };
    if let Some(schema) = &job.parameters {
        engine = engine.with_parameters(schema.clone());
    }

    engine
        .run_test_case(
            &job.code,
            &job.input,
            &job.expected_output,
            job.function_name.as_deref(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedRunner;
    use std::sync::Arc;

    fn job() -> SampleJob {
        SampleJob {
            result_key: "sample:1".to_string(),
            code: "def solution(): return True".to_string(),
            input: String::new(),
            expected_output: "True".to_string(),
            function_name: None,
            time_limit: Some(2),
            memory_limit: None,
            parameters: None,
        }
    }

    #[tokio::test]
    async fn test_process_sample_job() {
        let engine = JudgeEngine::with_runner(Arc::new(FixedRunner::new("true")), 1);
        let result = process_sample_job(&job(), &engine).await;

        assert!(result.passed);
        assert_eq!(result.actual_output.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_sample_job_with_bad_limits() {
        let engine = JudgeEngine::with_runner(Arc::new(FixedRunner::new("true")), 1);
        let mut job = job();
        job.memory_limit = Some(0);

        let result = process_sample_job(&job, &engine).await;
        assert!(!result.passed);
        assert_eq!(result.failure, Some(FailureKind::ConfigurationError));
    }
}
