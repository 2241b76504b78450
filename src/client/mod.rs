//! Reverse geocoding client
//!
//! [`GeocodeClient`] ties the pieces together. Each call moves through:
//!
//! ```text
//! THROTTLED ─▶ SIGNING ─▶ IN_FLIGHT ─▶ DECODING ─┬─▶ DONE
//!                                                └─▶ OVER_LIMIT_COOLDOWN ─▶ DONE
//! ```
//!
//! - **THROTTLED**: waits for a throttle slot, may be cancelled
//! - **SIGNING**: builds the canonical URL and its signature
//! - **IN_FLIGHT**: one GET through the injected transport, never retried
//! - **DECODING**: parses the JSON body
//! - **OVER_LIMIT_COOLDOWN**: on `OVER_QUERY_LIMIT` the whole client pauses
//!   for the configured cooldown, then the response is returned as usual

mod geocoder;

pub use geocoder::{GeocodeClient, GeocodeClientBuilder};
