//! Judge configuration
//!
//! Defaults live in `files/judge.toml`, embedded at build time. A file named
//! by `JUDGE_CONFIG` replaces them, and individual `JUDGE_*` environment
//! variables override single values on top of that.

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::harness::is_valid_function_name;
use crate::runner::RunLimits;

const DEFAULT_CONFIG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/judge.toml"));

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct JudgeConfig {
    pub runtime: RuntimeConfig,
    pub limits: LimitsConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interpreter command line; the source file path is appended
    pub run_command: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub timeout_secs: u64,
    pub memory_limit_mb: u64,
    /// Per-stream output cap, also used as the child's file size limit
    pub max_output_kb: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub function_name: String,
    pub max_concurrent_sandboxes: usize,
    pub memory_sample_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            run_command: "python3 -I".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            memory_limit_mb: 128,
            max_output_kb: 1024,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            function_name: "solution".to_string(),
            max_concurrent_sandboxes: 4,
            memory_sample_interval_ms: 5,
        }
    }
}

impl JudgeConfig {
    /// Load the configuration for this process: embedded defaults or the
    /// `JUDGE_CONFIG` file, then environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("JUDGE_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::embedded()?,
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// The defaults shipped in `files/judge.toml`
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG).context("Invalid embedded judge.toml")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `JUDGE_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("JUDGE_TIMEOUT_SECS") {
            self.limits.timeout_secs = parse_env("JUDGE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("JUDGE_MEMORY_LIMIT_MB") {
            self.limits.memory_limit_mb = parse_env("JUDGE_MEMORY_LIMIT_MB", &v)?;
        }
        if let Some(v) = lookup("JUDGE_MAX_CONCURRENCY") {
            self.engine.max_concurrent_sandboxes = parse_env("JUDGE_MAX_CONCURRENCY", &v)?;
        }
        if let Some(python) = lookup("JUDGE_PYTHON") {
            // Swap the interpreter, keep its flags
            let mut parts = into_command(&self.runtime.run_command);
            match parts.first_mut() {
                Some(program) => *program = python,
                None => parts.push(python),
            }
            self.runtime.run_command = parts.join(" ");
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.run_command().is_empty() {
            bail!("runtime.run_command must not be empty");
        }
        if self.limits.timeout_secs == 0 {
            bail!("limits.timeout_secs must be positive");
        }
        if self.limits.memory_limit_mb == 0 {
            bail!("limits.memory_limit_mb must be positive");
        }
        if self.engine.max_concurrent_sandboxes == 0 {
            bail!("engine.max_concurrent_sandboxes must be positive");
        }
        if !is_valid_function_name(&self.engine.function_name) {
            bail!(
                "engine.function_name is not a valid identifier: {:?}",
                self.engine.function_name
            );
        }
        Ok(())
    }

    pub fn run_command(&self) -> Vec<String> {
        into_command(&self.runtime.run_command)
    }

    pub fn run_limits(&self) -> RunLimits {
        RunLimits::new(self.limits.timeout_secs, self.limits.memory_limit_mb)
    }

    pub fn max_output_bytes(&self) -> usize {
        (self.limits.max_output_kb as usize).saturating_mul(1024)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", key, value))
}

fn into_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(|s| s.to_string()).collect()
}
