//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::client::GeocodeClient;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::http::HttpTransport;
use crate::observe::TracingObserver;
use crate::sign::sign_url;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Reverse {
                lat,
                lng,
                repeat,
                timeout_secs,
            } => self.reverse(*lat, *lng, *repeat, *timeout_secs).await,
            Commands::Url { lat, lng } => self.url(*lat, *lng),
            Commands::Sign { url, key } => self.sign(url, key.as_deref()),
        }
    }

    /// Load settings from the config file (if any) plus environment overrides
    fn settings(&self) -> Result<Settings> {
        let settings = match &self.cli.config {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                Settings::from_file(path)?
            }
            None => Settings::default(),
        };
        Ok(settings.with_env())
    }

    fn client(&self) -> Result<GeocodeClient> {
        let (credentials, config) = self.settings()?.into_parts()?;

        GeocodeClient::builder()
            .credentials(credentials)
            .config(config)
            .transport(Arc::new(HttpTransport::new()?))
            .observer(Arc::new(TracingObserver))
            .build()
    }

    async fn reverse(
        &self,
        lat: f64,
        lng: f64,
        repeat: usize,
        timeout_secs: Option<u64>,
    ) -> Result<()> {
        let client = self.client()?;
        let cancel = CancellationToken::new();

        // Ctrl-C or the timeout cancels every pending lookup
        let watchdog = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let deadline = async {
                    match timeout_secs {
                        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Interrupted, cancelling"),
                    () = deadline => info!("Timed out, cancelling"),
                }
                cancel.cancel();
            })
        };

        let mut lookups = JoinSet::new();
        for index in 0..repeat.max(1) {
            let client = client.clone();
            let cancel = cancel.clone();
            lookups.spawn(async move {
                let result = client.reverse_geocode(&cancel, lat, lng).await;
                (index, result)
            });
        }

        let mut first_error = None;
        while let Some(joined) = lookups.join_next().await {
            let (index, result) =
                joined.map_err(|e| Error::Other(format!("lookup task failed: {e}")))?;
            match result {
                Ok(response) => {
                    self.print_json(&json!({ "index": index, "response": response }))?;
                }
                Err(e) => {
                    eprintln!("Lookup {index} failed: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        watchdog.abort();
        first_error.map_or(Ok(()), Err)
    }

    fn url(&self, lat: f64, lng: f64) -> Result<()> {
        println!("{}", self.client()?.request_url(lat, lng)?);
        Ok(())
    }

    fn sign(&self, url: &str, key: Option<&str>) -> Result<()> {
        let url = Url::parse(url)?;
        let key = match key {
            Some(key) => key.to_string(),
            None => self
                .settings()?
                .credentials
                .ok_or_else(|| Error::missing_field("credentials"))?
                .signing_key()
                .to_string(),
        };

        let signature = sign_url(&url, &key)?;
        self.print_json(&json!({
            "url": url.as_str(),
            "signature": signature,
        }))
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let output = if self.cli.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| Error::Other(format!("failed to serialize output: {e}")))?;

        println!("{output}");
        Ok(())
    }
}
