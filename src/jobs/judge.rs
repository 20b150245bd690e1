//! Judge job - full test suite for one submission

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::engine_for_job;
use crate::core::{FailureKind, SuiteResult, TestCase};
use crate::input::ParameterSchema;
use crate::judger::JudgeEngine;

/// Job received from the Redis queue
#[derive(Debug, Serialize, Deserialize)]
pub struct JudgeJob {
    pub submission_id: i64,
    pub code: String,
    #[serde(alias = "testcases")]
    pub test_cases: Vec<TestCase>,
    /// Target function; the engine default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>,
    /// MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
    /// Declared parameter types; inputs are guessed without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterSchema>,
}

/// Result of judging a submission
#[derive(Debug, Serialize, Deserialize)]
pub struct JudgeResult {
    pub submission_id: i64,
    #[serde(flatten)]
    pub suite: SuiteResult,
    /// Highest peak memory of any case, in MB
    #[serde(default)]
    pub max_memory_mb: f64,
    /// Why the job could not be judged at all, or the first error when no
    /// case passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl JudgeResult {
    pub fn from_suite(submission_id: i64, suite: SuiteResult) -> Self {
        let max_memory_mb = suite
            .results
            .iter()
            .map(|r| r.peak_memory_mb)
            .fold(0.0, f64::max);

        // Wrong answers carry no error worth surfacing here
        let error_message = if suite.results.iter().all(|r| !r.passed) {
            suite
                .results
                .iter()
                .filter(|r| r.failure != Some(FailureKind::ValidationMismatch))
                .find_map(|r| r.error.clone())
        } else {
            None
        };

        Self {
            submission_id,
            suite,
            max_memory_mb,
            error_message,
        }
    }

    /// Result for a job that failed before any test case ran
    pub fn failed(submission_id: i64, message: impl Into<String>) -> Self {
        Self {
            submission_id,
            suite: SuiteResult::from_results(vec![]),
            max_memory_mb: 0.0,
            error_message: Some(message.into()),
        }
    }
}

/// Process a judge job
pub async fn process_judge_job(job: &JudgeJob, engine: &JudgeEngine) -> anyhow::Result<JudgeResult> {
    let mut engine = engine_for_job(engine, job.time_limit, job.memory_limit)
        .with_context(|| format!("Invalid limits for submission {}", job.submission_id))?;
    if let Some(schema) = &job.parameters {
        engine = engine.with_parameters(schema.clone());
    }

    let suite = engine
        .run_all_test_cases(&job.code, &job.test_cases, job.function_name.as_deref())
        .await;

    info!(
        "Submission {} judged: {} ({}/{})",
        job.submission_id, suite.overall_status, suite.passed_count, suite.total_count
    );

    Ok(JudgeResult::from_suite(job.submission_id, suite))
}
