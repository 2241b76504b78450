//! HTTP plumbing
//!
//! Provides the transport seam and the request throttle.
//!
//! # Features
//!
//! - **Transport**: `Transport` trait plus a reqwest-backed `HttpTransport`
//! - **Rate Limiting**: Token bucket throttle using governor
//! - **Suspension**: Provider-triggered cooldown shared by all callers

mod rate_limit;
mod transport;

pub use rate_limit::{RequestThrottle, SuspendGuard};
pub use transport::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder, Transport};
