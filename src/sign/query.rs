//! Canonical query serialization and request URL building

use super::signer::sign;
use crate::config::{ClientConfig, ClientCredentials};
use crate::error::Result;
use std::collections::BTreeMap;
use url::Url;

/// Query parameters serialized in sorted key order
///
/// Keys and values are percent-encoded per RFC 3986: only `A-Z a-z 0-9 - . _ ~`
/// pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalQuery {
    params: BTreeMap<String, String>,
}

impl CanonicalQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value for the key
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a parameter only when a non-empty value is given
    #[must_use]
    pub fn param_opt(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.param(key, v),
            _ => self,
        }
    }

    /// Look up a raw (unencoded) value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Check if no parameters are set
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Serialize to `k=v&k=v`
    pub fn encode(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl std::fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// A single reverse geocoding lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeRequest {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeRequest {
    /// Create a request for the given coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` with exactly 8 fractional digits each
    pub fn latlng(&self) -> String {
        format!("{:.8},{:.8}", self.lat, self.lng)
    }
}

/// Build the unsigned canonical query for a reverse geocoding request
pub fn reverse_geocode_query(
    request: &GeocodeRequest,
    config: &ClientConfig,
    credentials: &ClientCredentials,
) -> CanonicalQuery {
    CanonicalQuery::new()
        .param("latlng", request.latlng())
        .param("sensor", "false")
        .param_opt("language", config.language())
        .param("client", credentials.client_id.as_str())
        .param_opt("channel", credentials.channel())
}

/// Build the signed request URL
///
/// The signature covers `endpoint_path?canonical_query` and is appended as
/// the last parameter.
pub fn build_request_url(
    endpoint: &Url,
    request: &GeocodeRequest,
    config: &ClientConfig,
    credentials: &ClientCredentials,
) -> Result<Url> {
    let query = reverse_geocode_query(request, config, credentials).encode();
    let signature = sign(endpoint.path(), &query, credentials.signing_key())?;

    let mut url = endpoint.clone();
    url.set_query(Some(&format!(
        "{query}&signature={}",
        urlencoding::encode(&signature)
    )));
    Ok(url)
}
