use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::debug;

use shared_config::AppConfig;

use crate::models::Notification;

/// Client for the document store's notification collection.
pub struct NotificationStore {
    client: Client,
    base_url: String,
}

impl NotificationStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.notification_store_url.clone(),
        }
    }

    pub async fn create(&self, content: &str, user: i64) -> Result<Notification> {
        let notification = Notification::new(content, user);
        let url = format!("{}/notifications", self.base_url);
        debug!("Writing notification for provider {}", user);

        let response = self.client.post(&url).json(&notification).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "notification store error ({}): {}",
                status,
                error_text
            ));
        }

        Ok(notification)
    }
}
