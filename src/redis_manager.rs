//! Redis Manager - Centralized Redis connection and operations
//!
//! This module handles all Redis-related operations including:
//! - Job queue operations (BLPOP)
//! - Result storage and publishing
//!
//! BLPOP occupies its connection, so results go out through a separate
//! [`ResultPublisher`] that job tasks can clone freely.

use std::time::Duration;

use anyhow::{Context, Result};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use tracing::{info, warn};

use crate::jobs::{JudgeResult, WorkerJob};

/// Redis key constants
pub mod keys {
    /// Judge job queue key
    pub const JUDGE_QUEUE: &str = "judge:queue";

    /// Judge result key prefix (for polling)
    pub const JUDGE_RESULT_PREFIX: &str = "judge:result:";

    /// Judge result channel (for pub/sub)
    pub const JUDGE_RESULT_CHANNEL: &str = "judge:results";
}

const RESULT_EXPIRY_SECS: u64 = 3600; // 1 hour
const PUSHED_RESULT_EXPIRY_SECS: i64 = 300;
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Key a submission's result is stored under
pub fn judge_result_key(submission_id: i64) -> String {
    format!("{}{}", keys::JUDGE_RESULT_PREFIX, submission_id)
}

/// Queue side of the worker's Redis access
pub struct RedisManager {
    client: redis::Client,
    conn: MultiplexedConnection,
}

impl RedisManager {
    async fn with_url(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = get_connection_with_retry(&client).await?;
        info!("Connected to Redis at {}", redis_url);

        Ok(Self { client, conn })
    }

    /// Create a new RedisManager using the REDIS_URL environment variable.
    /// Defaults to "redis://localhost:6379" if not set.
    pub async fn from_env() -> Result<Self> {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into());
        Self::with_url(&url).await
    }

    /// Open a publisher on its own connection
    pub async fn publisher(&self) -> Result<ResultPublisher> {
        let conn = get_connection_with_retry(&self.client).await?;
        Ok(ResultPublisher {
            client: self.client.clone(),
            conn,
        })
    }

    /// Wait up to `timeout` for the next job.
    ///
    /// Returns `None` when the wait expires so the caller can check for
    /// shutdown. Malformed jobs are logged and skipped. Automatically
    /// reconnects on connection failure.
    pub async fn pop_job(&mut self, timeout: Duration) -> Result<Option<WorkerJob>> {
        let result: Option<(String, String)> = match self
            .conn
            .blpop(keys::JUDGE_QUEUE, timeout.as_secs_f64())
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("Redis BLPOP failed: {}. Reconnecting...", e);
                self.reconnect().await?;
                return Ok(None);
            }
        };

        let Some((_, job_data)) = result else {
            return Ok(None);
        };

        match WorkerJob::parse(&job_data) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                warn!("Failed to parse job data: {}. Data: {}", e, job_data);
                Ok(None)
            }
        }
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.conn = get_connection_with_retry(&self.client).await?;
        Ok(())
    }
}

/// Result side of the worker's Redis access
#[derive(Clone)]
pub struct ResultPublisher {
    client: redis::Client,
    conn: MultiplexedConnection,
}

impl ResultPublisher {
    /// Store a judge result in Redis.
    ///
    /// The result is stored with a 1-hour expiration and also published
    /// to a channel for real-time subscribers.
    pub async fn store_judge_result(&self, result: &JudgeResult) -> Result<()> {
        let key = judge_result_key(result.submission_id);
        let json = serde_json::to_string(result)?;
        let mut conn = self.conn.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, &json, RESULT_EXPIRY_SECS)
            .await
        {
            warn!("Failed to store result: {}. Reconnecting...", e);
            conn = get_connection_with_retry(&self.client).await?;
            conn.set_ex::<_, _, ()>(&key, &json, RESULT_EXPIRY_SECS)
                .await
                .with_context(|| format!("Failed to store result at {}", key))?;
        }

        // Publish errors are ignored; there may be no subscribers
        let _ = conn
            .publish::<_, _, ()>(keys::JUDGE_RESULT_CHANNEL, &json)
            .await;

        Ok(())
    }

    /// Push a result onto `key` for a client waiting with BLPOP
    pub async fn push_result<T: Serialize>(&self, key: &str, result: &T) -> Result<()> {
        let json = serde_json::to_string(result)?;
        let mut conn = self.conn.clone();

        if let Err(e) = conn.rpush::<_, _, ()>(key, &json).await {
            warn!("Failed to push result: {}. Reconnecting...", e);
            conn = get_connection_with_retry(&self.client).await?;
            conn.rpush::<_, _, ()>(key, &json)
                .await
                .with_context(|| format!("Failed to push result to {}", key))?;
        }

        let _ = conn
            .expire::<_, ()>(key, PUSHED_RESULT_EXPIRY_SECS)
            .await;

        Ok(())
    }
}

/// Get a Redis connection with retry logic
async fn get_connection_with_retry(client: &redis::Client) -> Result<MultiplexedConnection> {
    loop {
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                warn!(
                    "Failed to connect to Redis: {}. Retrying in {} seconds...",
                    e,
                    RECONNECT_DELAY.as_secs()
                );
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judge_result_key() {
        assert_eq!(judge_result_key(17), "judge:result:17");
    }
}
