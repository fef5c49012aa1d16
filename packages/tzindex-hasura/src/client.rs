use crate::{generator::merge, metadata::Metadata, HasuraError, HasuraResult};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, StatusCode,
};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use tzindex_lib::config::HasuraConfig;

pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Talks to the metadata API of a single Hasura instance.
#[derive(Debug, Clone)]
pub struct HasuraClient {
    client: Client,
    url: String,
    headers: HeaderMap,
    attempts: usize,
    interval: Duration,
    timeout: Duration,
}

impl HasuraClient {
    pub fn new(config: &HasuraConfig) -> HasuraResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(secret) = &config.admin_secret {
            let value = HeaderValue::from_str(secret).map_err(|e| {
                HasuraError::ConfigurationError(format!("invalid admin secret: {e}"))
            })?;
            headers.insert(ADMIN_SECRET_HEADER, value);
        }

        Ok(Self {
            client: Client::new(),
            url: config.base_url().to_string(),
            headers,
            attempts: config.health_check_attempts,
            interval: config.health_check_interval(),
            timeout: config.health_check_timeout(),
        })
    }

    /// Poll `/healthz` until it answers 200. Connection failures, timeouts
    /// and other statuses count as failed attempts.
    pub async fn wait_healthy(&self) -> HasuraResult<()> {
        info!("Waiting for Hasura instance to be healthy");
        let target = format!("{}/healthz", self.url);

        for attempt in 1..=self.attempts {
            match self.client.get(&target).timeout(self.timeout).send().await {
                Ok(res) if res.status() == StatusCode::OK => return Ok(()),
                Ok(res) => debug!("Health check {attempt} returned {}", res.status()),
                Err(e) => debug!("Health check {attempt} failed: {e}"),
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(HasuraError::Unhealthy {
            attempts: self.attempts,
        })
    }

    async fn query(&self, body: Value) -> HasuraResult<Value> {
        let res = self
            .client
            .post(format!("{}/v1/query", self.url))
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let payload = res.json::<Value>().await?;
        if !status.is_success() {
            return Err(HasuraError::Rejected(payload));
        }

        Ok(payload)
    }

    pub async fn export_metadata(&self) -> HasuraResult<Metadata> {
        info!("Fetching existing metadata");
        let payload = self
            .query(json!({"type": "export_metadata", "args": {}}))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn replace_metadata(&self, metadata: &Metadata) -> HasuraResult<()> {
        info!("Sending replace metadata request");
        let result = self
            .query(json!({"type": "replace_metadata", "args": metadata}))
            .await?;

        if result.get("message").and_then(Value::as_str) != Some("success") {
            return Err(HasuraError::Rejected(result));
        }

        Ok(())
    }

    /// Wait for the instance, merge `metadata` into what it already tracks,
    /// and push the result. Returns the document that was pushed.
    pub async fn configure(&self, metadata: Metadata) -> HasuraResult<Metadata> {
        self.wait_healthy().await?;

        let existing = self.export_metadata().await?;
        info!("Merging existing metadata");
        let merged = merge(metadata, existing);

        self.replace_metadata(&merged).await?;
        info!("Hasura instance has been configured");

        Ok(merged)
    }
}
