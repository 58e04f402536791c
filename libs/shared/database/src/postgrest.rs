use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Errors surfaced by the relational store's REST interface.
///
/// `Conflict` is a distinct variant so callers can react to unique-index
/// violations (the appointments table carries a partial unique index on
/// `(provider_id, date) where canceled_at is null`).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Thin client for the relational store's PostgREST-style API.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_rest_url.clone(),
            service_key: config.database_service_key.clone(),
        }
    }

    fn headers(&self, prefer: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_static(prefer));
        }

        headers
    }

    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        prefer: Option<&'static str>,
        body: Option<Value>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store request: {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(prefer));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(error_text),
                StatusCode::NOT_FOUND => StoreError::NotFound(error_text),
                StatusCode::CONFLICT => StoreError::Conflict(error_text),
                _ => StoreError::Api {
                    status: status.as_u16(),
                    body: error_text,
                },
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Run a filtered select; `path` carries the table and query string.
    pub async fn select<T>(&self, path: &str) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, None, None).await
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self
            .request(Method::POST, &path, Some("return=representation"), Some(row))
            .await?;

        rows.pop()
            .ok_or_else(|| StoreError::Api {
                status: 200,
                body: format!("insert into {} returned no representation", table),
            })
    }

    /// Patch rows matching `filter` and return the updated row.
    pub async fn update<T>(&self, table: &str, filter: &str, patch: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, filter);
        let mut rows: Vec<T> = self
            .request(
                Method::PATCH,
                &path,
                Some("return=representation"),
                Some(patch),
            )
            .await?;

        rows.pop()
            .ok_or_else(|| StoreError::NotFound(format!("no {} row matched {}", table, filter)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
