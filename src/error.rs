//! Infrastructure errors
//!
//! Failures of the host rather than of the submitted code. Ordinary program
//! failures (wrong answer, crash, timeout) never surface as `JudgeError`; they
//! are recorded in the result types instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeError {
    /// Writing the transient source file or its directory failed
    #[error("failed to prepare sandbox workspace: {0}")]
    Workspace(#[source] std::io::Error),

    /// The interpreter process could not be started
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on or talking to the child process failed
    #[error("process i/o failed: {0}")]
    Process(#[source] std::io::Error),

    #[error("configured run command is empty")]
    EmptyCommand,

    #[error("failed to encode harness arguments: {0}")]
    Encode(#[from] serde_json::Error),

    /// The sandbox pool was shut down while waiting for a permit
    #[error("sandbox pool is closed")]
    PoolClosed,
}

pub type Result<T> = std::result::Result<T, JudgeError>;
