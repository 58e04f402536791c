use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailQueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis pool error: {0}")]
    Pool(String),
}
