//! Worker jobs
//!
//! Jobs arrive on the Redis queue as JSON objects tagged by `job_type`.

pub mod judge;
pub mod playground;
pub mod sample;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::judger::JudgeEngine;
use crate::runner::RunLimits;

pub use judge::{process_judge_job, JudgeJob, JudgeResult};
pub use playground::{process_playground_job, PlaygroundJob};
pub use sample::{process_sample_job, SampleJob};

/// Worker job enum - represents different types of jobs the worker can process
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum WorkerJob {
    /// Judge a submission against its full test suite
    #[serde(rename = "judge")]
    Judge(JudgeJob),
    /// Judge a submission against a single sample case
    #[serde(rename = "sample")]
    Sample(SampleJob),
    /// Run a program as is with the given stdin
    #[serde(rename = "playground")]
    Playground(PlaygroundJob),
}

impl WorkerJob {
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        // Tagged enums buffer their fields, and buffered numbers only keep
        // their type when they come from a parsed `Value`
        let value: serde_json::Value = serde_json::from_str(data)?;
        serde_json::from_value(value)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkerJob::Judge(_) => "judge",
            WorkerJob::Sample(_) => "sample",
            WorkerJob::Playground(_) => "playground",
        }
    }
}

/// Engine for one job: the shared engine with the job's limits applied.
/// Missing limits fall back to the engine's defaults.
fn engine_for_job(
    engine: &JudgeEngine,
    time_limit: Option<u64>,
    memory_limit: Option<u64>,
) -> anyhow::Result<JudgeEngine> {
    let defaults = engine.limits();
    let limits = RunLimits::new(
        time_limit.unwrap_or(defaults.timeout_secs),
        memory_limit.unwrap_or(defaults.memory_limit_mb),
    );

    if limits.timeout_secs == 0 {
        bail!("time_limit must be positive");
    }
    if limits.memory_limit_mb == 0 {
        bail!("memory_limit must be positive");
    }

    Ok(engine.clone().with_limits(limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::SandboxedRunner;
    use crate::sandbox::UnconfinedSandbox;
    use std::sync::Arc;

    fn engine() -> JudgeEngine {
        let runner = SandboxedRunner::new(vec!["python3".into()], Arc::new(UnconfinedSandbox));
        JudgeEngine::with_runner(Arc::new(runner), 1).with_limits(RunLimits::new(5, 128))
    }

    #[test]
    fn test_parse_judge_job() {
        let job = WorkerJob::parse(
            r#"{"job_type":"judge","submission_id":7,"code":"def solution(): return 1",
                "test_cases":[{"input":"","output":"1"},{"input":"2","expected_output":"2"}]}"#,
        )
        .unwrap();

        let WorkerJob::Judge(job) = job else {
            panic!("expected judge job");
        };
        assert_eq!(job.submission_id, 7);
        assert_eq!(job.test_cases.len(), 2);
        assert_eq!(job.test_cases[0].expected_output, "1");
        assert_eq!(job.function_name, None);
    }

    #[test]
    fn test_parse_sample_and_playground_jobs() {
        let sample = WorkerJob::parse(
            r#"{"job_type":"sample","result_key":"sample:1","code":"x","input":"1","expected_output":"1","function_name":"answer"}"#,
        )
        .unwrap();
        assert_eq!(sample.kind(), "sample");

        let playground =
            WorkerJob::parse(r#"{"job_type":"playground","result_key":"pg:1","code":"print(1)"}"#)
                .unwrap();
        let WorkerJob::Playground(job) = playground else {
            panic!("expected playground job");
        };
        assert_eq!(job.stdin, None);
    }

    #[test]
    fn test_parse_keeps_numeric_fields() {
        let job = WorkerJob::parse(
            r#"{"job_type":"judge","submission_id":9007199254740993,"code":"x",
                "test_cases":[],"time_limit":2,"memory_limit":64}"#,
        )
        .unwrap();

        let WorkerJob::Judge(job) = job else {
            panic!("expected judge job");
        };
        assert_eq!(job.submission_id, 9007199254740993);
        assert_eq!(job.time_limit, Some(2));
        assert_eq!(job.memory_limit, Some(64));
    }

    #[test]
    fn test_parse_rejects_unknown_job_type() {
        assert!(WorkerJob::parse(r#"{"job_type":"validate","submission_id":1}"#).is_err());
        assert!(WorkerJob::parse("not json").is_err());
    }

    #[test]
    fn test_engine_for_job_limits() {
        let engine = engine();

        let job_engine = engine_for_job(&engine, Some(2), None).unwrap();
        assert_eq!(job_engine.limits(), RunLimits::new(2, 128));
        // Shared engine keeps its defaults
        assert_eq!(engine.limits(), RunLimits::new(5, 128));

        assert!(engine_for_job(&engine, Some(0), None).is_err());
        assert!(engine_for_job(&engine, None, Some(0)).is_err());
    }
}
