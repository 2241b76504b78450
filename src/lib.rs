// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # geocode-throttle
//!
//! A rate-limited, signed client for reverse geocoding against the Google
//! Maps Geocoding API with business ("client") credentials.
//!
//! ## Features
//!
//! - **Throttling**: Token bucket limiter shared by every clone of a client
//! - **Provider Backoff**: `OVER_QUERY_LIMIT` pauses all requests for a cooldown
//! - **Request Signing**: HMAC-SHA1 over a canonical, sorted query string
//! - **Cancellation**: Every wait honors a `CancellationToken`
//! - **Pluggable Transport**: Bring your own HTTP stack or use the reqwest one
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geocode_throttle::{ClientCredentials, GeocodeClient, HttpTransport, Result};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = GeocodeClient::builder()
//!         .credentials(ClientCredentials::new("gme-example", "bXlfdGVzdF9rZXk="))
//!         .language("en")
//!         .requests_per_second(10)
//!         .transport(Arc::new(HttpTransport::new()?))
//!         .build()?;
//!
//!     let response = client
//!         .reverse_geocode(&CancellationToken::new(), 49.1758444, 7.3019607)
//!         .await?;
//!     println!("{:?}", response.first_address());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       GeocodeClient                         │
//! │   acquire → sign → fetch → decode → (cooldown on limit)     │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴──┬───────────────┬──────────┐
//! │    Throttle   │      Sign       │   Transport   │ Observe  │
//! ├───────────────┼─────────────────┼───────────────┼──────────┤
//! │ Token bucket  │ Canonical query │ reqwest GET   │ Timings  │
//! │ Suspend/resume│ HMAC-SHA1       │ Test doubles  │          │
//! └───────────────┴─────────────────┴───────────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Geocoding API response types
pub mod types;

/// Credentials, client config and settings files
pub mod config;

/// Request signing and canonical query building
pub mod sign;

/// Transport and request throttle
pub mod http;

/// Request timing hook
pub mod observe;

/// Reverse geocoding client
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{GeocodeClient, GeocodeClientBuilder};
pub use config::{ClientConfig, ClientCredentials, Settings};
pub use error::{Error, Result};
pub use http::{HttpTransport, RequestThrottle, Transport};
pub use observe::{RequestObserver, TracingObserver};
pub use types::{GeocodeResponse, Status};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
