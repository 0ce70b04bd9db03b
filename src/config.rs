//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml with environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use url::Url;
use zeroize::Zeroizing;

use crate::auth::Credentials;
use crate::client::pagination::{TerminationPolicy, MAX_PAGE_SIZE};

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub oauth: OAuthConfig,
    pub api: ApiConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub jwt: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("jwt", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

/// Termination rule for each listing endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationConfig {
    pub principals: TerminationPolicy,
    pub roles: TerminationPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from embedded config.toml with environment variable overrides.
    pub fn load() -> Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded defaults with environment overrides applied, not yet validated.
    ///
    /// Callers layering further overrides validate once they are done.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::embedded()?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Credentials
        if let Some(client_id) = lookup("RINGCENTRAL_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }

        if let Some(client_secret) = lookup("RINGCENTRAL_CLIENT_SECRET") {
            self.oauth.client_secret = client_secret;
        }

        if let Some(jwt) = lookup("RINGCENTRAL_JWT") {
            self.oauth.jwt = jwt;
        }

        // Endpoint and logging
        if let Some(base_url) = lookup("RINGCENTRAL_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Some(log_level) = lookup("RUST_LOG") {
            self.logging.level = log_level;
        }
    }

    /// The embedded defaults, without environment overrides.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(CONFIG_TOML)
    }

    /// Parse a configuration document without applying overrides.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    /// Validate the parts of the configuration that cannot be encoded in types.
    ///
    /// Missing credentials are accepted: the token exchange is then skipped.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;

        if self.api.version.is_empty() {
            anyhow::bail!("API version must not be empty");
        }

        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            anyhow::bail!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.api.page_size
            );
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Full API root, e.g. `https://platform.ringcentral.com/restapi/v1.0/`.
    pub fn api_root(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}/",
            self.api.base_url.trim_end_matches('/'),
            self.api.version.trim_matches('/')
        ))
    }

    /// Token endpoint, which lives outside the versioned API root.
    pub fn token_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/oauth/token",
            self.api.base_url.trim_end_matches('/')
        ))
    }

    /// Per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Credentials for the JWT-bearer exchange.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.oauth.client_id.clone(),
            client_secret: Zeroizing::new(self.oauth.client_secret.clone()),
            jwt: Zeroizing::new(self.oauth.jwt.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> Config {
    let mut config = Config::embedded().expect("embedded config parses");
    config.api.base_url = base_url.to_string();
    config
}
