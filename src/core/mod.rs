//! Core types shared across the judge: test case data, verdicts, harness
//! diagnostics and small helpers.

pub mod diagnostics;
pub mod types;
pub mod utils;
pub mod verdict;

pub use types::{SuiteResult, TestCase, TestCaseResult};
pub use verdict::{FailureKind, OverallStatus};
