//! GeocodeClient implementation

use crate::config::{ClientConfig, ClientCredentials};
use crate::error::{Error, Result};
use crate::http::{RequestThrottle, Transport};
use crate::observe::{RequestObserver, REVERSE_GEOCODE_LABEL};
use crate::sign::{build_request_url, GeocodeRequest};
use crate::types::GeocodeResponse;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

struct ClientInner {
    credentials: ClientCredentials,
    config: ClientConfig,
    endpoint: Url,
    transport: Arc<dyn Transport>,
    throttle: RequestThrottle,
    observer: Option<Arc<dyn RequestObserver>>,
}

/// Rate-limited, signed reverse geocoding client
///
/// Cloning is cheap; clones share the same throttle, so the configured rate
/// and any provider cooldown apply across all of them.
#[derive(Clone)]
pub struct GeocodeClient {
    inner: Arc<ClientInner>,
}

impl GeocodeClient {
    /// Create a client, validating the config
    pub fn new(
        credentials: ClientCredentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Self::from_parts(credentials, config, transport, None)
    }

    /// Create a new client builder
    pub fn builder() -> GeocodeClientBuilder {
        GeocodeClientBuilder::default()
    }

    fn from_parts(
        credentials: ClientCredentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        observer: Option<Arc<dyn RequestObserver>>,
    ) -> Result<Self> {
        let endpoint = config.validate()?;
        let throttle = RequestThrottle::new(config.requests_per_second)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                credentials,
                config,
                endpoint,
                transport,
                throttle,
                observer,
            }),
        })
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Throttle shared by every clone of this client
    pub fn throttle(&self) -> &RequestThrottle {
        &self.inner.throttle
    }

    /// Build the signed URL for a lookup without sending it
    pub fn request_url(&self, lat: f64, lng: f64) -> Result<Url> {
        build_request_url(
            &self.inner.endpoint,
            &GeocodeRequest::new(lat, lng),
            &self.inner.config,
            &self.inner.credentials,
        )
    }

    /// Reverse geocode a coordinate pair
    ///
    /// Waits for a throttle slot first. An `OVER_QUERY_LIMIT` response is
    /// returned as `Ok` after the client has cooled down; other statuses are
    /// returned untouched.
    ///
    /// `cancel` is honored at every wait. Cancelling during the cooldown
    /// returns [`Error::Cancelled`] at once while the other callers stay
    /// paused until the cooldown ends.
    pub async fn reverse_geocode(
        &self,
        cancel: &CancellationToken,
        lat: f64,
        lng: f64,
    ) -> Result<GeocodeResponse> {
        self.inner.throttle.acquire(cancel).await?;

        let url = self.request_url(lat, lng)?;
        debug!(lat, lng, "Reverse geocoding");

        let started = Instant::now();
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.inner.transport.fetch(url.as_str()) => result,
        };
        self.observe(started.elapsed());

        let body = fetched.map_err(Error::Transport)?;
        let response: GeocodeResponse = serde_json::from_slice(&body)?;

        if response.status.is_over_query_limit() {
            warn!(lat, lng, "Provider reported OVER_QUERY_LIMIT, cooling down");
            self.inner
                .throttle
                .suspend_for(self.inner.config.over_query_limit_cooldown, cancel)
                .await?;
        }

        Ok(response)
    }

    fn observe(&self, elapsed: Duration) {
        if let Some(observer) = &self.inner.observer {
            observer.observe(REVERSE_GEOCODE_LABEL, elapsed);
        }
    }
}

impl std::fmt::Debug for GeocodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeClient")
            .field("credentials", &self.inner.credentials)
            .field("config", &self.inner.config)
            .field("throttle", &self.inner.throttle)
            .field("has_observer", &self.inner.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`GeocodeClient`]
///
/// Credentials and a transport are required; everything else falls back to
/// [`ClientConfig::default`].
#[derive(Default)]
pub struct GeocodeClientBuilder {
    credentials: Option<ClientCredentials>,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl GeocodeClientBuilder {
    /// Set the business credentials
    pub fn credentials(mut self, credentials: ClientCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replace the whole client config
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

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

    /// Set the transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the request observer
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate and build the client
    pub fn build(self) -> Result<GeocodeClient> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::missing_field("credentials"))?;
        let transport = self
            .transport
            .ok_or_else(|| Error::missing_field("transport"))?;

        GeocodeClient::from_parts(credentials, self.config, transport, self.observer)
    }
}
