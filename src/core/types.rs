//! Test case and result types shared by the judger and the worker

use serde::{Deserialize, Serialize};

use super::verdict::{FailureKind, OverallStatus};

/// A single input/expected-output pair supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(alias = "output", alias = "expectedOutput")]
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Outcome of judging one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub input: String,
    pub expected: String,
    /// Trimmed program output; only present when the program exited cleanly
    pub actual_output: Option<String>,
    pub passed: bool,
    pub wall_time_seconds: f64,
    pub peak_memory_mb: f64,
    /// Short diagnostic, only present when `passed` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl TestCaseResult {
    pub fn passed(
        input: &str,
        expected: &str,
        actual_output: String,
        wall_time_seconds: f64,
        peak_memory_mb: f64,
    ) -> Self {
        Self {
            input: input.to_string(),
            expected: expected.to_string(),
            actual_output: Some(actual_output),
            passed: true,
            wall_time_seconds,
            peak_memory_mb,
            error: None,
            failure: None,
        }
    }

    /// A failed case that never produced usable output
    pub fn failed(
        input: &str,
        expected: &str,
        kind: FailureKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            input: input.to_string(),
            expected: expected.to_string(),
            actual_output: None,
            passed: false,
            wall_time_seconds: 0.0,
            peak_memory_mb: 0.0,
            error: Some(error.into()),
            failure: Some(kind),
        }
    }

    pub fn with_timing(mut self, wall_time_seconds: f64, peak_memory_mb: f64) -> Self {
        self.wall_time_seconds = wall_time_seconds;
        self.peak_memory_mb = peak_memory_mb;
        self
    }

    pub fn with_actual_output(mut self, actual_output: Option<String>) -> Self {
        self.actual_output = actual_output;
        self
    }
}

/// Aggregated outcome of a whole test suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub results: Vec<TestCaseResult>,
    pub total_count: usize,
    pub passed_count: usize,
    pub overall_status: OverallStatus,
    pub total_time: f64,
    pub avg_time: f64,
}

impl SuiteResult {
    pub fn from_results(results: Vec<TestCaseResult>) -> Self {
        let total_count = results.len();
        let passed_count = results.iter().filter(|r| r.passed).count();
        let total_time: f64 = results.iter().map(|r| r.wall_time_seconds).sum();
        let avg_time = if total_count > 0 {
            total_time / total_count as f64
        } else {
            0.0
        };

        Self {
            results,
            total_count,
            passed_count,
            overall_status: OverallStatus::classify(passed_count, total_count),
            total_time,
            avg_time,
        }
    }
}
