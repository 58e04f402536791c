use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pending queue consumed by the external mail processor.
pub const PENDING_QUEUE: &str = "cancellation_mail:pending";

/// Jobs linger for inspection for 7 days, then expire.
pub const JOB_TTL_SECONDS: i64 = 604_800;

/// Snapshot of a cancelled appointment with the parties resolved, enqueued
/// for asynchronous mail delivery. The mail itself is composed and sent by
/// the background processor, not by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationMailJob {
    pub job_id: Uuid,
    pub appointment_id: i64,
    pub date: DateTime<Utc>,
    pub canceled_at: DateTime<Utc>,
    pub client_name: String,
    pub provider_name: String,
    pub provider_email: String,
    /// Human-readable slot, pre-formatted for the mail template.
    pub formatted_date: String,
    pub created_at: DateTime<Utc>,
}

impl CancellationMailJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        appointment_id: i64,
        date: DateTime<Utc>,
        canceled_at: DateTime<Utc>,
        client_name: String,
        provider_name: String,
        provider_email: String,
        formatted_date: String,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            appointment_id,
            date,
            canceled_at,
            client_name,
            provider_name,
            provider_email,
            formatted_date,
            created_at: Utc::now(),
        }
    }

    pub fn redis_key(&self) -> String {
        format!("cancellation_mail_job:{}", self.job_id)
    }
}
