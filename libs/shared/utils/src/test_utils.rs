use std::sync::Arc;

use serde_json::json;

use shared_config::AppConfig;

pub struct TestConfig {
    pub database_rest_url: String,
    pub database_service_key: String,
    pub notification_store_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            database_rest_url: "http://localhost:54321".to_string(),
            database_service_key: "test-service-key".to_string(),
            notification_store_url: "http://localhost:54322".to_string(),
        }
    }
}

impl TestConfig {
    /// Point both stores at a wiremock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            database_rest_url: uri.to_string(),
            notification_store_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_rest_url: self.database_rest_url.clone(),
            database_service_key: self.database_service_key.clone(),
            notification_store_url: self.notification_store_url.clone(),
            redis_url: None,
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn account_response(id: i64, name: &str, email: &str, provider: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": email,
            "provider": provider,
            "avatar_url": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: i64,
        user_id: i64,
        provider_id: i64,
        date: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "provider_id": provider_id,
            "date": date,
            "canceled_at": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }
}
