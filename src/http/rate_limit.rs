//! Request throttling
//!
//! Uses the governor crate for a token bucket with capacity 1, refilled at
//! `requests_per_second`. On top of that the throttle can be suspended: while
//! suspended the effective rate is 0 and every `acquire` parks until the last
//! suspension ends.
//!
//! Suspensions are counted rather than toggled, so two callers that hit the
//! provider limit at the same time cannot lose each other's update: the rate
//! comes back only when the longest cooldown is over.

use crate::error::{Error, Result};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

type DirectLimiter = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

struct ThrottleState {
    limiter: DirectLimiter,
    clock: DefaultClock,
    requests_per_second: NonZeroU32,
    /// Number of active suspensions; the rate is 0 while this is non-zero
    suspensions: watch::Sender<usize>,
}

/// Token bucket throttle with suspend/resume control
#[derive(Clone)]
pub struct RequestThrottle {
    state: Arc<ThrottleState>,
}

impl RequestThrottle {
    /// Create a throttle allowing `requests_per_second` requests, burst 1
    pub fn new(requests_per_second: u32) -> Result<Self> {
        let rps = NonZeroU32::new(requests_per_second).ok_or_else(|| {
            Error::invalid_value("requests_per_second", "must be a positive number")
        })?;
        let quota = Quota::per_second(rps).allow_burst(NonZeroU32::MIN);
        let (suspensions, _) = watch::channel(0);
        let clock = DefaultClock::default();

        Ok(Self {
            state: Arc::new(ThrottleState {
                limiter: Governor::direct_with_clock(quota, &clock),
                clock,
                requests_per_second: rps,
                suspensions,
            }),
        })
    }

    /// Configured steady-state rate
    pub fn requests_per_second(&self) -> u32 {
        self.state.requests_per_second.get()
    }

    /// Current refill rate: the configured rate, or 0 while suspended
    pub fn current_rate(&self) -> u32 {
        if self.is_suspended() {
            0
        } else {
            self.requests_per_second()
        }
    }

    /// Check if any suspension is active
    pub fn is_suspended(&self) -> bool {
        *self.state.suspensions.borrow() > 0
    }

    /// Wait for a slot, or until `cancel` fires
    ///
    /// A cancelled wait consumes no token.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            () = self.wait_for_slot() => Ok(()),
        }
    }

    /// Take a slot if one is available right now
    pub fn try_acquire(&self) -> bool {
        !self.is_suspended() && self.state.limiter.check().is_ok()
    }

    /// Tokens are only taken while no suspension is active, so a wait that is
    /// cancelled or dropped at any await point has taken nothing.
    async fn wait_for_slot(&self) {
        let mut resumed = self.state.suspensions.subscribe();
        loop {
            // The sender lives as long as `self`, so this only returns Ok
            let _ = resumed.wait_for(|active| *active == 0).await;
            if self.is_suspended() {
                continue;
            }

            match self.state.limiter.check() {
                Ok(()) => return,
                Err(not_until) => {
                    let wait = not_until.wait_time_from(self.state.clock.now());
                    tokio::select! {
                        () = tokio::time::sleep(wait) => {}
                        _ = resumed.changed() => {
                            debug!("Throttle state changed while waiting for a slot");
                        }
                    }
                }
            }
        }
    }

    /// Suspend the throttle until the returned guard is dropped
    pub fn suspend(&self) -> SuspendGuard {
        self.state.suspensions.send_modify(|active| *active += 1);
        SuspendGuard {
            state: Arc::clone(&self.state),
        }
    }

    /// Set the rate to 0, sleep `cooldown` on this task, then restore it
    ///
    /// Other callers stay parked in `acquire` for the whole cooldown. If this
    /// future is dropped early the suspension ends with it.
    pub async fn suspend_then_resume(&self, cooldown: Duration) {
        debug!("Suspending requests for {:?}", cooldown);
        let guard = self.suspend();
        tokio::time::sleep(cooldown).await;
        drop(guard);
    }

    /// Like [`suspend_then_resume`](Self::suspend_then_resume), but the caller
    /// stops waiting as soon as `cancel` fires
    ///
    /// The suspension itself always lasts the full `cooldown`: on cancellation
    /// the guard moves to a background task that ends it on schedule.
    pub async fn suspend_for(&self, cooldown: Duration, cancel: &CancellationToken) -> Result<()> {
        debug!("Suspending requests for {:?}", cooldown);
        let guard = self.suspend();
        let resume_at = tokio::time::Instant::now() + cooldown;

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tokio::spawn(async move {
                    tokio::time::sleep_until(resume_at).await;
                    drop(guard);
                });
                Err(Error::Cancelled)
            }
            () = tokio::time::sleep_until(resume_at) => {
                drop(guard);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("requests_per_second", &self.requests_per_second())
            .field("current_rate", &self.current_rate())
            .finish()
    }
}

/// Active suspension of a [`RequestThrottle`]; resumes on drop
#[must_use = "the throttle resumes as soon as the guard is dropped"]
pub struct SuspendGuard {
    state: Arc<ThrottleState>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        let mut remaining = 0;
        self.state.suspensions.send_modify(|active| {
            *active = active.saturating_sub(1);
            remaining = *active;
        });
        if remaining == 0 {
            info!(
                "Resuming requests at {} per second",
                self.state.requests_per_second
            );
        }
    }
}

impl std::fmt::Debug for SuspendGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspendGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_throttle_rejects_zero_rate() {
        let err = RequestThrottle::new(0).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_throttle_initial_rate() {
        let throttle = RequestThrottle::new(7).unwrap();
        assert_eq!(throttle.requests_per_second(), 7);
        assert_eq!(throttle.current_rate(), 7);
        assert!(!throttle.is_suspended());
    }

    #[test]
    fn test_throttle_bucket_capacity_is_one() {
        let throttle = RequestThrottle::new(1).unwrap();
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[tokio::test]
    async fn test_throttle_acquire_fresh() {
        let throttle = RequestThrottle::new(1).unwrap();
        let cancel = CancellationToken::new();

        let result = tokio::time::timeout(Duration::from_millis(100), throttle.acquire(&cancel))
            .await
            .expect("first slot should be immediate");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_throttle_respects_rate() {
        let throttle = RequestThrottle::new(20).unwrap();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        for _ in 0..5 {
            throttle.acquire(&cancel).await.unwrap();
        }

        // 4 refills at 50ms each
        assert!(start.elapsed() >= Duration::from_millis(195), "{:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_throttle_cancelled_before_wait_consumes_nothing() {
        let throttle = RequestThrottle::new(1).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = throttle.acquire(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());

        // The single token is still there
        assert!(throttle.try_acquire());
    }

    #[tokio::test]
    async fn test_throttle_cancel_while_suspended() {
        let throttle = RequestThrottle::new(10).unwrap();
        let _guard = throttle.suspend();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(2), throttle.acquire(&cancel))
            .await
            .expect("cancellation must unblock acquire");
        assert!(result.unwrap_err().is_cancelled());
        assert!(throttle.is_suspended());
    }

    #[tokio::test]
    async fn test_throttle_suspend_blocks_until_resume() {
        let throttle = RequestThrottle::new(100).unwrap();
        let guard = throttle.suspend();
        assert_eq!(throttle.current_rate(), 0);
        assert!(!throttle.try_acquire());

        let waiter = {
            let throttle = throttle.clone();
            tokio::spawn(async move { throttle.acquire(&CancellationToken::new()).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert_eq!(throttle.current_rate(), 100);

        let result = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should resume")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_suspend_then_resume_restores_rate() {
        let throttle = RequestThrottle::new(5).unwrap();

        let start = Instant::now();
        throttle.suspend_then_resume(Duration::from_millis(60)).await;

        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(throttle.current_rate(), 5);
    }

    #[tokio::test]
    async fn test_overlapping_suspensions_do_not_lose_updates() {
        let throttle = RequestThrottle::new(5).unwrap();

        let long = {
            let throttle = throttle.clone();
            tokio::spawn(async move {
                throttle.suspend_then_resume(Duration::from_millis(300)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A shorter cooldown ending first must not resume the throttle
        throttle.suspend_then_resume(Duration::from_millis(50)).await;
        assert_eq!(throttle.current_rate(), 0);

        long.await.unwrap();
        assert_eq!(throttle.current_rate(), 5);
    }

    #[tokio::test]
    async fn test_dropped_cooldown_resumes() {
        let throttle = RequestThrottle::new(5).unwrap();

        let _ = tokio::time::timeout(
            Duration::from_millis(20),
            throttle.suspend_then_resume(Duration::from_secs(60)),
        )
        .await;

        assert!(!throttle.is_suspended());
    }

    #[tokio::test]
    async fn test_throttle_cancel_during_refill_consumes_nothing() {
        let throttle = RequestThrottle::new(5).unwrap();
        assert!(throttle.try_acquire());
        let drained = Instant::now();

        let cancel = CancellationToken::new();
        let waiter = {
            let throttle = throttle.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { throttle.acquire(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        assert!(waiter.await.unwrap().unwrap_err().is_cancelled());

        // One refill interval after draining, the token is still there
        tokio::time::sleep(Duration::from_millis(250).saturating_sub(drained.elapsed())).await;
        assert!(throttle.try_acquire());
    }

    #[tokio::test]
    async fn test_throttle_cancel_after_suspend_consumes_nothing() {
        let throttle = RequestThrottle::new(1).unwrap();
        assert!(throttle.try_acquire());

        let cancel = CancellationToken::new();
        let waiter = {
            let throttle = throttle.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { throttle.acquire(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        let guard = throttle.suspend();

        // The refill lands at 1s, while suspended
        tokio::time::sleep(Duration::from_millis(700)).await;
        cancel.cancel();
        assert!(waiter.await.unwrap().unwrap_err().is_cancelled());

        drop(guard);
        assert!(throttle.try_acquire());
    }

    #[tokio::test]
    async fn test_suspend_for_completes() {
        let throttle = RequestThrottle::new(5).unwrap();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        throttle
            .suspend_for(Duration::from_millis(60), &cancel)
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(60));
        assert!(!throttle.is_suspended());
    }

    #[tokio::test]
    async fn test_suspend_for_cancel_keeps_suspension() {
        let throttle = RequestThrottle::new(5).unwrap();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let err = throttle
            .suspend_for(Duration::from_millis(300), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(start.elapsed() < Duration::from_millis(300));
        assert!(throttle.is_suspended());

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(!throttle.is_suspended());
    }
}
