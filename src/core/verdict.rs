use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall classification of a test suite run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pass,
    Fail,
    Partial,
}

impl OverallStatus {
    /// Classify a suite from its counts. An empty suite is a failure.
    pub fn classify(passed_count: usize, total_count: usize) -> Self {
        if total_count > 0 && passed_count == total_count {
            OverallStatus::Pass
        } else if passed_count == 0 {
            OverallStatus::Fail
        } else {
            OverallStatus::Partial
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallStatus::Pass => "pass",
            OverallStatus::Fail => "fail",
            OverallStatus::Partial => "partial",
        };
        write!(f, "{}", s)
    }
}

/// Why a single test case did not pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The harness could not be set up for this submission (missing function,
    /// arity mismatch, undecodable input)
    ConfigurationError,
    /// Nonzero exit: syntax errors, uncaught exceptions
    ProcessFailure,
    /// Deadline exceeded, process tree killed
    Timeout,
    /// Ran successfully but the output did not match
    ValidationMismatch,
    /// Killed or failing because of the memory ceiling
    ResourceExhaustion,
    /// Host failure while judging the case
    SystemError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::ConfigurationError => "configuration_error",
            FailureKind::ProcessFailure => "process_failure",
            FailureKind::Timeout => "timeout",
            FailureKind::ValidationMismatch => "validation_mismatch",
            FailureKind::ResourceExhaustion => "resource_exhaustion",
            FailureKind::SystemError => "system_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(OverallStatus::classify(3, 3), OverallStatus::Pass);
        assert_eq!(OverallStatus::classify(1, 3), OverallStatus::Partial);
        assert_eq!(OverallStatus::classify(0, 3), OverallStatus::Fail);
        assert_eq!(OverallStatus::classify(0, 0), OverallStatus::Fail);
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(OverallStatus::Partial.to_string(), "partial");
        assert_eq!(
            serde_json::to_string(&OverallStatus::Partial).unwrap(),
            "\"partial\""
        );
        assert_eq!(
            FailureKind::ResourceExhaustion.to_string(),
            "resource_exhaustion"
        );
        assert_eq!(
            serde_json::to_string(&FailureKind::ValidationMismatch).unwrap(),
            "\"validation_mismatch\""
        );
    }
}
