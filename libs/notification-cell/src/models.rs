use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-facing notification message, held in the external document
/// store. The surface that reads and marks notifications lives elsewhere;
/// this service only ever writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    /// Target provider's account id.
    pub user: i64,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(content: impl Into<String>, user: i64) -> Self {
        Self {
            id: None,
            content: content.into(),
            user,
            read: false,
            created_at: Utc::now(),
        }
    }
}
