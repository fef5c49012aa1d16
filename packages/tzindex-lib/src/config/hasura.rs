use crate::{
    config::{Env, IndexerConfigResult},
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::Deserialize;
use std::time::Duration;

/// Credentials and polling settings for the Hasura instance that fronts the
/// indexer database.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct HasuraConfig {
    /// Base URL of the Hasura instance (e.g., `http://hasura:8080`).
    pub url: String,

    /// Value sent in the `X-Hasura-Admin-Secret` header, if any.
    #[serde(default)]
    pub admin_secret: Option<String>,

    /// Number of `/healthz` checks before giving up.
    #[serde(default = "default_health_check_attempts")]
    pub health_check_attempts: usize,

    /// Milliseconds between two `/healthz` checks.
    #[serde(default = "default_health_check_interval_ms")]
    pub health_check_interval_ms: u64,

    /// Milliseconds a single `/healthz` check may take.
    #[serde(default = "default_health_check_timeout_ms")]
    pub health_check_timeout_ms: u64,
}

fn default_health_check_attempts() -> usize {
    defaults::HASURA_HEALTH_CHECK_ATTEMPTS
}

fn default_health_check_interval_ms() -> u64 {
    defaults::HASURA_HEALTH_CHECK_INTERVAL_MS
}

fn default_health_check_timeout_ms() -> u64 {
    defaults::HASURA_HEALTH_CHECK_TIMEOUT_MS
}

impl HasuraConfig {
    pub fn new(url: impl Into<String>, admin_secret: Option<String>) -> Self {
        Self {
            url: url.into(),
            admin_secret,
            ..Default::default()
        }
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_millis(self.health_check_timeout_ms)
    }
}

impl Default for HasuraConfig {
    fn default() -> Self {
        Self {
            url: defaults::HASURA_URL.to_string(),
            admin_secret: None,
            health_check_attempts: defaults::HASURA_HEALTH_CHECK_ATTEMPTS,
            health_check_interval_ms: defaults::HASURA_HEALTH_CHECK_INTERVAL_MS,
            health_check_timeout_ms: defaults::HASURA_HEALTH_CHECK_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for HasuraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HasuraConfig")
            .field("url", &self.url)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "XXXX"))
            .field("health_check_attempts", &self.health_check_attempts)
            .field("health_check_interval_ms", &self.health_check_interval_ms)
            .field("health_check_timeout_ms", &self.health_check_timeout_ms)
            .finish()
    }
}

impl Env for HasuraConfig {
    fn inject_opt_env_vars(&mut self) -> IndexerConfigResult<()> {
        if is_opt_env_var(&self.url) {
            self.url = std::env::var(trim_opt_env_key(&self.url))?;
        }

        if let Some(secret) = self.admin_secret.as_mut() {
            if is_opt_env_var(secret) {
                *secret = std::env::var(trim_opt_env_key(secret))?;
            }
        }

        Ok(())
    }
}
