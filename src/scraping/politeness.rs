use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Request headers sent with every page fetch, after the User-Agent.
pub fn browser_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Upgrade-Insecure-Requests", "1"),
    ]
}

/// Fixed-interval pacing for outbound page fetches.
///
/// One permit per `interval`, no burst: the first fetch goes out immediately and
/// each later one waits until `interval` has passed since the previous permit.
/// Clones share the same budget.
#[derive(Clone)]
pub struct ScrapeLimiter {
    limiter: Option<Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    interval: Duration,
}

impl std::fmt::Debug for ScrapeLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeLimiter")
            .field("interval", &self.interval)
            .finish()
    }
}

impl ScrapeLimiter {
    /// A zero interval yields a limiter that never waits.
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(|quota| Arc::new(RateLimiter::direct(quota)));
        Self { limiter, interval }
    }

    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait for the next fetch permit.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                debug!("scrape pacing: waiting up to {:?} for next fetch", self.interval);
                limiter.until_ready().await;
            }
        }
    }
}
