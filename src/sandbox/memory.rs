//! Memory probing
//!
//! Peak memory is read from `/proc/<pid>/status` while the child runs. Once
//! the child is reaped the entry is gone, so the runner samples periodically
//! and keeps the maximum. Readings are best-effort: anything unreadable is
//! reported as `None` and never fails a run.

/// Read the peak resident set size of `pid` in KB
pub async fn peak_memory_kb(pid: u32) -> Option<u64> {
    if !cfg!(target_os = "linux") {
        return None;
    }

    let content = tokio::fs::read_to_string(format!("/proc/{}/status", pid))
        .await
        .ok()?;
    parse_status(&content)
}

/// Parse a `/proc/<pid>/status` file.
///
/// `VmHWM` (high-water mark) is preferred; `VmRSS` is the fallback for
/// kernels that do not report it.
pub fn parse_status(content: &str) -> Option<u64> {
    let mut rss = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let kb = value
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok());

        match key.trim() {
            "VmHWM" => return kb,
            "VmRSS" => rss = kb,
            _ => {}
        }
    }

    rss
}
