//! Sandboxed runner implementation
//!
//! Executes untrusted code as a confined child process with a wall-clock
//! deadline. The source is written into a per-run temporary directory that is
//! also the child's working directory; it is removed on every exit path.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::{ExecutionResult, RunLimits, Runner};
use crate::core::diagnostics;
use crate::core::utils::{kb_to_mb, truncate_chars};
use crate::error::{JudgeError, Result};
use crate::sandbox::{memory, Limits, ProcessSandbox};

/// File name of the program inside the run directory
const SOURCE_FILE: &str = "main.py";

/// PATH handed to the child; nothing else from the worker's environment leaks
const SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// How long to wait for output pipes to close once the child is gone
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Appended to a stream that hit the output cap
const TRUNCATION_NOTE: &str = "\n... (output truncated)";

/// Longest error message surfaced to users
const MAX_ERROR_CHARS: usize = 2000;

pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(5);

/// Runner that executes code in a confined child process
#[derive(Debug, Clone)]
pub struct SandboxedRunner {
    /// Interpreter command; the source path is appended
    run_command: Vec<String>,
    sandbox: Arc<dyn ProcessSandbox>,
    max_output_bytes: usize,
    sample_interval: Duration,
}

/// Captured contents of one output pipe
#[derive(Debug, Default)]
struct Captured {
    text: String,
    truncated: bool,
}

impl SandboxedRunner {
    /// Create a new sandboxed runner
    pub fn new(run_command: Vec<String>, sandbox: Arc<dyn ProcessSandbox>) -> Self {
        Self {
            run_command,
            sandbox,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }

    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Run `source` in the sandbox
    pub async fn execute(
        &self,
        source: &str,
        stdin_content: &str,
        limits: &RunLimits,
    ) -> Result<ExecutionResult> {
        let (program, args) = self
            .run_command
            .split_first()
            .ok_or(JudgeError::EmptyCommand)?;

        // Dropped (and deleted) on every return path below
        let workspace = tempfile::Builder::new()
            .prefix("judge-")
            .tempdir()
            .map_err(JudgeError::Workspace)?;
        let source_path = workspace.path().join(SOURCE_FILE);
        tokio::fs::write(&source_path, source)
            .await
            .map_err(JudgeError::Workspace)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(&source_path)
            .current_dir(workspace.path())
            .env_clear()
            .env("PATH", SANDBOX_PATH)
            .env("LANG", "C.UTF-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        self.sandbox.confine(
            &mut cmd,
            &Limits {
                memory_mb: limits.memory_limit_mb,
                fsize_kb: (self.max_output_bytes / 1024) as u64,
            },
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| JudgeError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        debug!(
            "Spawned {:?} (pid {:?}) timeout={}s memory={}MB",
            self.run_command, pid, limits.timeout_secs, limits.memory_limit_mb
        );

        // Stdin is fed from its own task so a child that never reads cannot
        // stall us; dropping the pipe at the end signals EOF.
        let stdin_task = child.stdin.take().map(|mut pipe| {
            let input = stdin_content.as_bytes().to_vec();
            tokio::spawn(async move {
                let _ = pipe.write_all(&input).await;
            })
        });
        let stdout_task = child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(read_capped(pipe, self.max_output_bytes)));
        let stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(read_capped(pipe, self.max_output_bytes)));

        let deadline = Duration::from_secs(limits.timeout_secs);
        let waited = tokio::time::timeout(deadline, self.wait_sampling(&mut child, pid)).await;
        let wall_time_seconds = start.elapsed().as_secs_f64();

        // Nothing started by this run may outlive it. The child is not reaped
        // yet, so its process group id still belongs to this run.
        if let Some(pid) = pid {
            self.sandbox.kill_tree(pid);
        }
        if let Some(task) = stdin_task {
            task.abort();
        }

        let peak_kb = match waited {
            Ok(Ok(peak_kb)) => peak_kb,
            Ok(Err(e)) => {
                let _ = child.start_kill();
                return Err(JudgeError::Process(e));
            }
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                abort_reader(stdout_task);
                abort_reader(stderr_task);
                warn!(
                    "Execution timed out after {}s (pid {:?}), process tree killed",
                    limits.timeout_secs, pid
                );
                return Ok(ExecutionResult::timed_out(limits.timeout_secs));
            }
        };
        let status = child.wait().await.map_err(JudgeError::Process)?;

        let stdout = drain_reader(stdout_task).await;
        let stderr = drain_reader(stderr_task).await;
        if stdout.truncated || stderr.truncated {
            warn!(
                "Output of pid {:?} exceeded {} bytes and was truncated",
                pid, self.max_output_bytes
            );
        }

        let stderr_text = stderr.text.trim().to_string();
        let success = status.success();
        let error = if success {
            None
        } else {
            Some(failure_message(&status, &stderr_text))
        };

        debug!(
            "pid {:?} finished: status={} wall={:.3}s peak={}KB",
            pid, status, wall_time_seconds, peak_kb
        );

        Ok(ExecutionResult {
            success,
            stdout: Some(stdout.text.trim().to_string()),
            stderr: (!stderr_text.is_empty()).then_some(stderr_text),
            error,
            exit_code: status.code(),
            signal: termination_signal(&status),
            timed_out: false,
            wall_time_seconds,
            peak_memory_mb: kb_to_mb(peak_kb),
        })
    }

    /// Wait for the child to exit while sampling its peak memory. The
    /// child is left for the caller to reap where the platform allows it.
    async fn wait_sampling(&self, child: &mut Child, pid: Option<u32>) -> std::io::Result<u64> {
        let mut peak_kb = 0u64;
        let mut ticker = tokio::time::interval(self.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let exited = wait_exited(child, pid);
        tokio::pin!(exited);

        loop {
            tokio::select! {
                result = &mut exited => return result.map(|_| peak_kb),
                _ = ticker.tick() => {
                    if let Some(pid) = pid {
                        if let Some(kb) = memory::peak_memory_kb(pid).await {
                            peak_kb = peak_kb.max(kb);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(target_os = "linux")]
async fn wait_exited(child: &mut Child, pid: Option<u32>) -> std::io::Result<()> {
    match pid {
        Some(pid) => crate::sandbox::rlimit::wait_exited(pid).await,
        None => child.wait().await.map(|_| ()),
    }
}

#[cfg(not(target_os = "linux"))]
async fn wait_exited(child: &mut Child, _pid: Option<u32>) -> std::io::Result<()> {
    child.wait().await.map(|_| ())
}

#[async_trait]
impl Runner for SandboxedRunner {
    async fn run(&self, source: &str, stdin: &str, limits: &RunLimits) -> Result<ExecutionResult> {
        self.execute(source, stdin, limits).await
    }
}

/// Read a pipe to EOF, keeping at most `cap` bytes. The rest is drained and
/// discarded so the child never blocks on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = cap.saturating_sub(buf.len());
                if n > room {
                    truncated = true;
                }
                buf.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }

    let mut text = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        text.push_str(TRUNCATION_NOTE);
    }
    Captured { text, truncated }
}

async fn drain_reader(task: Option<JoinHandle<Captured>>) -> Captured {
    let Some(mut task) = task else {
        return Captured::default();
    };

    match tokio::time::timeout(PIPE_DRAIN_GRACE, &mut task).await {
        Ok(Ok(captured)) => captured,
        Ok(Err(_)) => Captured::default(),
        Err(_) => {
            // Something outside the process group still holds the pipe
            task.abort();
            Captured::default()
        }
    }
}

fn abort_reader(task: Option<JoinHandle<Captured>>) {
    if let Some(task) = task {
        task.abort();
    }
}

/// User-visible message for an unsuccessful exit
fn failure_message(status: &ExitStatus, stderr: &str) -> String {
    if stderr.is_empty() {
        if let Some(signal) = termination_signal(status) {
            return format!("Process terminated by signal {}", signal);
        }
    }
    truncate_chars(&diagnostics::error_message(stderr), MAX_ERROR_CHARS)
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
