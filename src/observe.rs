//! Request observation hook
//!
//! An optional [`RequestObserver`] receives the wall-clock duration of every
//! HTTP round trip. Observation is fire-and-forget and never affects the
//! outcome of a call.

use std::time::Duration;
use tracing::info;

/// Label under which reverse geocoding round trips are reported
pub const REVERSE_GEOCODE_LABEL: &str = "reverse_geocode";

/// Receives request timings
pub trait RequestObserver: Send + Sync {
    /// Record one HTTP round trip
    fn observe(&self, label: &str, elapsed: Duration);
}

/// Observer that emits timings as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn observe(&self, label: &str, elapsed: Duration) {
        info!(
            label,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "HTTP request finished"
        );
    }
}

impl<F> RequestObserver for F
where
    F: Fn(&str, Duration) + Send + Sync,
{
    fn observe(&self, label: &str, elapsed: Duration) {
        self(label, elapsed);
    }
}
