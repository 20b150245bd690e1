use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use solution_judge::config::JudgeConfig;
use solution_judge::core::{FailureKind, TestCaseResult};
use solution_judge::jobs::{
    playground, process_judge_job, process_playground_job, process_sample_job, JudgeResult,
    WorkerJob,
};
use solution_judge::judger::JudgeEngine;
use solution_judge::redis_manager::{RedisManager, ResultPublisher};
use solution_judge::sandbox::select_backend;

/// How long one BLPOP waits before the shutdown flag is checked again
const POP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("solution_judge=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = JudgeConfig::load().context("Failed to load judge configuration")?;
    info!(
        "Loaded judge configuration: run_command={:?} timeout={}s memory={}MB sandboxes={}",
        config.run_command(),
        config.limits.timeout_secs,
        config.limits.memory_limit_mb,
        config.engine.max_concurrent_sandboxes
    );

    let engine = JudgeEngine::new(&config, select_backend());

    info!("Starting Judge Worker...");
    let mut redis = RedisManager::from_env().await?;
    let publisher = redis.publisher().await?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested, finishing in-flight jobs...");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    // Jobs stay in the queue (for other workers) while every slot is busy
    let max_in_flight = config.engine.max_concurrent_sandboxes;
    let slots = Arc::new(Semaphore::new(max_in_flight));

    info!("Waiting for jobs...");

    while !shutdown.load(Ordering::SeqCst) {
        let slot = slots.clone().acquire_owned().await?;

        let Some(job) = redis.pop_job(POP_TIMEOUT).await? else {
            continue;
        };

        let engine = engine.clone();
        let publisher = publisher.clone();
        tokio::spawn(async move {
            let _slot = slot;
            handle_job(job, &engine, &publisher).await;
        });
    }

    let _ = slots.acquire_many(max_in_flight as u32).await?;
    info!("Judge Worker stopped");
    Ok(())
}

/// Run one job and deliver its result
async fn handle_job(job: WorkerJob, engine: &JudgeEngine, publisher: &ResultPublisher) {
    match job {
        WorkerJob::Judge(job) => {
            info!(
                "Received judge job: submission_id={}, test_cases={}",
                job.submission_id,
                job.test_cases.len()
            );

            let result = match process_judge_job(&job, engine).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Judge job {} failed: {:#}", job.submission_id, e);
                    JudgeResult::failed(job.submission_id, format!("{:#}", e))
                }
            };

            if let Err(e) = publisher.store_judge_result(&result).await {
                error!(
                    "Failed to store result for submission {}: {:#}",
                    job.submission_id, e
                );
            }
        }
        WorkerJob::Sample(job) => {
            info!("Received sample job: result_key={}", job.result_key);

            let result: TestCaseResult = process_sample_job(&job, engine).await;
            if result.failure == Some(FailureKind::SystemError) {
                warn!("Sample job {} hit a host failure", job.result_key);
            }

            if let Err(e) = publisher.push_result(&job.result_key, &result).await {
                error!("Failed to push sample result to {}: {:#}", job.result_key, e);
            }
        }
        WorkerJob::Playground(job) => {
            info!("Received playground job: result_key={}", job.result_key);

            let result = match process_playground_job(&job, engine).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Playground job {} failed: {:#}", job.result_key, e);
                    playground::failed_result(format!("{:#}", e))
                }
            };

            if let Err(e) = publisher.push_result(&job.result_key, &result).await {
                error!(
                    "Failed to push playground result to {}: {:#}",
                    job.result_key, e
                );
            }
        }
    }
}
