//! Judger module - Test suite orchestration
//!
//! `JudgeEngine` drives one submission through the pipeline, once per test
//! case:
//! input decoding -> harness generation -> sandboxed run -> output check.
//!
//! Every failure, including host failures, is recorded on the affected case;
//! a suite always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::checker::check_output;
use crate::config::JudgeConfig;
use crate::core::diagnostics::{parse_diagnostic, DiagnosticKind, GENERIC_RUNTIME_ERROR};
use crate::core::{FailureKind, SuiteResult, TestCase, TestCaseResult};
use crate::error::{JudgeError, Result};
use crate::harness::{is_valid_function_name, HarnessGenerator, DEFAULT_FUNCTION_NAME};
use crate::input::{decode_with_schema, normalize_input, ParameterSchema};
use crate::runner::{ExecutionResult, RunLimits, Runner, SandboxedRunner};
use crate::sandbox::ProcessSandbox;

/// Error text for a program that ran fine but printed the wrong answer
pub const WRONG_ANSWER: &str = "Wrong answer";

/// Signals that usually mean the child ran into its memory ceiling
const MEMORY_SIGNALS: [i32; 2] = [9, 11];

/// Judges submissions against test cases.
///
/// Cheap to clone; clones share the runner and the sandbox pool.
#[derive(Clone)]
pub struct JudgeEngine {
    runner: Arc<dyn Runner>,
    limits: RunLimits,
    function_name: String,
    parameters: Option<ParameterSchema>,
    /// Bounds the number of sandboxes alive at once across all clones
    permits: Arc<Semaphore>,
}

impl JudgeEngine {
    /// Build an engine that runs code through `sandbox` as configured
    pub fn new(config: &JudgeConfig, sandbox: Arc<dyn ProcessSandbox>) -> Self {
        let runner = SandboxedRunner::new(config.run_command(), sandbox)
            .with_max_output_bytes(config.max_output_bytes())
            .with_sample_interval(Duration::from_millis(
                config.engine.memory_sample_interval_ms,
            ));

        Self::with_runner(Arc::new(runner), config.engine.max_concurrent_sandboxes)
            .with_limits(config.run_limits())
            .with_function_name(config.engine.function_name.clone())
    }

    /// Build an engine around any runner, with default limits
    pub fn with_runner(runner: Arc<dyn Runner>, max_concurrent_sandboxes: usize) -> Self {
        Self {
            runner,
            limits: RunLimits::default(),
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            parameters: None,
            permits: Arc::new(Semaphore::new(max_concurrent_sandboxes.max(1))),
        }
    }

    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Decode inputs with `schema` instead of guessing
    pub fn with_parameters(mut self, schema: ParameterSchema) -> Self {
        self.parameters = Some(schema);
        self
    }

    pub fn with_function_name(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = function_name.into();
        self
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Sandboxes that could start right now without waiting
    pub fn available_sandboxes(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run a raw program (no harness) with `stdin`.
    ///
    /// Waits for a free sandbox first. Program failures are part of the
    /// returned `ExecutionResult`; `Err` means the host failed.
    pub async fn execute(&self, source_code: &str, stdin: &str) -> Result<ExecutionResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| JudgeError::PoolClosed)?;

        self.runner.run(source_code, stdin, &self.limits).await
    }

    /// Judge `source_code` on one input
    pub async fn run_test_case(
        &self,
        source_code: &str,
        input: &str,
        expected: &str,
        function_name: Option<&str>,
    ) -> TestCaseResult {
        let function_name = function_name.unwrap_or(&self.function_name);
        if !is_valid_function_name(function_name) {
            return TestCaseResult::failed(
                input,
                expected,
                FailureKind::ConfigurationError,
                format!("Invalid function name: {:?}", function_name),
            );
        }

        let arguments = match &self.parameters {
            Some(schema) => match decode_with_schema(input, schema) {
                Ok(arguments) => arguments,
                Err(e) => {
                    return TestCaseResult::failed(
                        input,
                        expected,
                        FailureKind::ConfigurationError,
                        format!("Invalid input: {}", e),
                    )
                }
            },
            None => normalize_input(input),
        };

        let payload = match serde_json::to_string(&arguments) {
            Ok(payload) => payload,
            Err(e) => {
                let e = JudgeError::from(e);
                error!("{}", e);
                return TestCaseResult::failed(input, expected, FailureKind::SystemError, e.to_string());
            }
        };

        let program = HarnessGenerator::new(function_name).generate(source_code);
        debug!("Running {}() with arguments {}", function_name, payload);

        match self.execute(&program, &payload).await {
            Ok(execution) => grade(input, expected, execution),
            Err(e) => {
                error!("Host failure while judging a test case: {}", e);
                TestCaseResult::failed(input, expected, FailureKind::SystemError, e.to_string())
            }
        }
    }

    /// Judge `source_code` on every test case, in order
    pub async fn run_all_test_cases(
        &self,
        source_code: &str,
        test_cases: &[TestCase],
        function_name: Option<&str>,
    ) -> SuiteResult {
        let mut results = Vec::with_capacity(test_cases.len());

        for (idx, case) in test_cases.iter().enumerate() {
            let result = self
                .run_test_case(source_code, &case.input, &case.expected_output, function_name)
                .await;

            debug!(
                "Test case {}/{}: passed={} time={:.3}s failure={:?}",
                idx + 1,
                test_cases.len(),
                result.passed,
                result.wall_time_seconds,
                result.failure
            );
            results.push(result);
        }

        let suite = SuiteResult::from_results(results);
        info!(
            "Judged {} test cases: {}/{} passed, status={}, total={:.3}s",
            suite.total_count,
            suite.passed_count,
            suite.total_count,
            suite.overall_status,
            suite.total_time
        );
        suite
    }
}

impl std::fmt::Debug for JudgeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeEngine")
            .field("limits", &self.limits)
            .field("function_name", &self.function_name)
            .field("parameters", &self.parameters)
            .field("available_sandboxes", &self.available_sandboxes())
            .finish()
    }
}

/// Turn one execution into a test case result
fn grade(input: &str, expected: &str, execution: ExecutionResult) -> TestCaseResult {
    let wall = execution.wall_time_seconds;
    let memory = execution.peak_memory_mb;

    if !execution.success {
        let kind = classify_failure(&execution);
        let message = execution
            .error
            .unwrap_or_else(|| GENERIC_RUNTIME_ERROR.to_string());
        return TestCaseResult::failed(input, expected, kind, message).with_timing(wall, memory);
    }

    let actual = execution.stdout.unwrap_or_default();
    match check_output(&actual, expected) {
        Some(rule) => {
            debug!("Output accepted by {} rule", rule);
            TestCaseResult::passed(input, expected, actual, wall, memory)
        }
        None => TestCaseResult::failed(input, expected, FailureKind::ValidationMismatch, WRONG_ANSWER)
            .with_timing(wall, memory)
            .with_actual_output(Some(actual)),
    }
}

/// Decide why an unsuccessful execution failed
pub fn classify_failure(execution: &ExecutionResult) -> FailureKind {
    if execution.timed_out {
        return FailureKind::Timeout;
    }

    let stderr = execution.stderr.as_deref().unwrap_or("");
    if let Some(diagnostic) = parse_diagnostic(stderr) {
        return if diagnostic.kind.is_configuration() {
            FailureKind::ConfigurationError
        } else if diagnostic.kind == DiagnosticKind::MemoryError {
            FailureKind::ResourceExhaustion
        } else {
            FailureKind::ProcessFailure
        };
    }

    // Uncaught MemoryError outside the harness
    let last_line = stderr.lines().last().unwrap_or("").trim();
    if last_line.starts_with("MemoryError") {
        return FailureKind::ResourceExhaustion;
    }

    match execution.signal {
        Some(signal) if stderr.is_empty() && MEMORY_SIGNALS.contains(&signal) => {
            FailureKind::ResourceExhaustion
        }
        _ => FailureKind::ProcessFailure,
    }
}
