//! Client configuration
//!
//! [`ClientCredentials`] and [`ClientConfig`] are what a [`GeocodeClient`]
//! is built from. [`Settings`] is the on-disk YAML form used by the CLI, with
//! optional environment overrides for secrets.
//!
//! [`GeocodeClient`]: crate::client::GeocodeClient

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default Geocoding API endpoint
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default steady-state request rate
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Default pause after the provider reports `OVER_QUERY_LIMIT`
pub const DEFAULT_OVER_QUERY_LIMIT_COOLDOWN: Duration = Duration::from_secs(1);

/// Environment variable overriding the client id
pub const ENV_CLIENT_ID: &str = "GEOCODE_CLIENT_ID";
/// Environment variable overriding the signing key
pub const ENV_SIGNING_KEY: &str = "GEOCODE_SIGNING_KEY";
/// Environment variable overriding the channel
pub const ENV_CHANNEL: &str = "GEOCODE_CHANNEL";
/// Environment variable overriding the response language
pub const ENV_LANGUAGE: &str = "GEOCODE_LANGUAGE";

// ============================================================================
// Credentials
// ============================================================================

/// Business credentials used to sign requests
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// Client id sent as the `client` parameter
    pub client_id: String,
    /// Signing secret, URL-safe base64
    signing_key: String,
    /// Optional usage-reporting channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl ClientCredentials {
    /// Create credentials without a channel
    pub fn new(client_id: impl Into<String>, signing_key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            signing_key: signing_key.into(),
            channel: None,
        }
    }

    /// Attach a channel
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// The signing secret as distributed (URL-safe base64)
    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }

    /// The channel, if one is set and non-empty
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref().filter(|c| !c.is_empty())
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("signing_key", &"<redacted>")
            .field("channel", &self.channel)
            .finish()
    }
}

// ============================================================================
// Client Config
// ============================================================================

/// Runtime configuration of a geocoding client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Geocoding endpoint, e.g. `https://maps.googleapis.com/maps/api/geocode/json`
    pub base_url: String,
    /// Output language; `None` keeps the provider default
    pub language: Option<String>,
    /// Steady-state request rate
    pub requests_per_second: u32,
    /// How long all requests pause after `OVER_QUERY_LIMIT`
    pub over_query_limit_cooldown: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: None,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            over_query_limit_cooldown: DEFAULT_OVER_QUERY_LIMIT_COOLDOWN,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// The language, if one is set and non-empty
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.is_empty())
    }

    /// Validate the config and return the parsed endpoint
    pub fn validate(&self) -> Result<Url> {
        if self.base_url.trim().is_empty() {
            return Err(Error::invalid_value(
                "base_url",
                format!("must not be empty, use {DEFAULT_BASE_URL}"),
            ));
        }
        if self.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be a positive number",
            ));
        }

        let endpoint = Url::parse(&self.base_url)?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::invalid_value(
                "base_url",
                format!("'{}' is not a hierarchical URL", self.base_url),
            ));
        }
        if endpoint.query().is_some() {
            return Err(Error::invalid_value(
                "base_url",
                "must not carry a query string",
            ));
        }
        Ok(endpoint)
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the output language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = Some(language.into());
        self
    }

    /// Set the steady-state request rate
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.config.requests_per_second = rps;
        self
    }

    /// Set the cooldown applied after `OVER_QUERY_LIMIT`
    pub fn over_query_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.over_query_limit_cooldown = cooldown;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// ============================================================================
// Settings File
// ============================================================================

/// Settings document loaded from YAML
///
/// ```yaml
/// credentials:
///   client_id: gme-example
///   signing_key: bXlfdGVzdF9rZXk=
///   channel: backend
/// client:
///   language: de
///   requests_per_second: 20
///   over_query_limit_cooldown_ms: 2000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Business credentials
    #[serde(default)]
    pub credentials: Option<ClientCredentials>,

    /// Client tuning
    #[serde(default)]
    pub client: ClientSettings,
}

/// Client section of the settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_cooldown_ms")]
    pub over_query_limit_cooldown_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_requests_per_second() -> u32 {
    DEFAULT_REQUESTS_PER_SECOND
}

fn default_cooldown_ms() -> u64 {
    DEFAULT_OVER_QUERY_LIMIT_COOLDOWN.as_millis() as u64
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: None,
            requests_per_second: default_requests_per_second(),
            over_query_limit_cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl Settings {
    /// Parse settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (`GEOCODE_*` keys)
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(ENV_CLIENT_ID);
        let signing_key = lookup(ENV_SIGNING_KEY);

        if let Some(creds) = self.credentials.as_mut() {
            if let Some(id) = client_id {
                creds.client_id = id;
            }
            if let Some(key) = signing_key {
                creds.signing_key = key;
            }
        } else if let (Some(id), Some(key)) = (client_id, signing_key) {
            self.credentials = Some(ClientCredentials::new(id, key));
        }

        if let (Some(creds), Some(channel)) = (self.credentials.as_mut(), lookup(ENV_CHANNEL)) {
            creds.channel = Some(channel);
        }
        if let Some(language) = lookup(ENV_LANGUAGE) {
            self.client.language = Some(language);
        }
        self
    }

    /// Split into validated credentials and client config
    pub fn into_parts(self) -> Result<(ClientCredentials, ClientConfig)> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::missing_field("credentials"))?;

        let config = ClientConfig {
            base_url: self.client.base_url,
            language: self.client.language,
            requests_per_second: self.client.requests_per_second,
            over_query_limit_cooldown: Duration::from_millis(
                self.client.over_query_limit_cooldown_ms,
            ),
        };
        config.validate()?;

        Ok((credentials, config))
    }
}
