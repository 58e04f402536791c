use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::MailQueueError;
use crate::models::{CancellationMailJob, JOB_TTL_SECONDS, PENDING_QUEUE};

/// Redis-backed queue for cancellation mail.
///
/// The request path only ever enqueues; delivery is the external mail
/// processor's job. Each job is stored as a hash for later inspection and
/// its id pushed onto the pending list the processor consumes.
pub struct CancellationMailQueue {
    pool: Pool,
}

impl CancellationMailQueue {
    pub async fn connect(config: &AppConfig) -> Result<Self, MailQueueError> {
        let redis_url = config
            .redis_url
            .clone()
            .unwrap_or_else(|| "redis://localhost:6379".to_string());

        let cfg = Config::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| MailQueueError::Pool(format!("Failed to create Redis pool: {}", e)))?;

        // Fail fast at startup if the queue is unreachable.
        let mut conn = pool
            .get()
            .await
            .map_err(|e| MailQueueError::Pool(format!("Failed to connect to Redis: {}", e)))?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!("Cancellation mail queue initialized");
        Ok(Self { pool })
    }

    pub async fn enqueue(&self, job: &CancellationMailJob) -> Result<(), MailQueueError> {
        let mut conn = self.get_connection().await?;

        let job_data = serde_json::to_string(job)?;
        let job_key = job.redis_key();

        let _: () = conn
            .hset_multiple(
                &job_key,
                &[
                    ("data", job_data.as_str()),
                    ("appointment_id", &job.appointment_id.to_string()),
                    ("created_at", &job.created_at.to_rfc3339()),
                ],
            )
            .await?;
        let _: () = conn.expire(&job_key, JOB_TTL_SECONDS as _).await?;

        let _: () = conn.lpush(PENDING_QUEUE, job.job_id.to_string()).await?;

        debug!(
            "Cancellation mail job {} enqueued for appointment {}",
            job.job_id, job.appointment_id
        );
        Ok(())
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<Option<CancellationMailJob>, MailQueueError> {
        let mut conn = self.get_connection().await?;
        let job_key = format!("cancellation_mail_job:{}", job_id);

        let job_data: Option<String> = conn.hget(&job_key, "data").await?;

        match job_data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn get_connection(&self) -> Result<Connection, MailQueueError> {
        self.pool
            .get()
            .await
            .map_err(|e| MailQueueError::Pool(format!("Failed to get Redis connection: {}", e)))
    }
}
