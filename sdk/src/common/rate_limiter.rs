use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type DirectGovernor = Governor<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side throttle for outgoing ARM requests.
///
/// ARM enforces per-subscription read/write quotas; spacing requests out
/// locally keeps the samples under them even when a poller runs with a
/// short interval. Clones share one quota.
#[derive(Clone)]
pub struct RateLimiter {
    governor: Arc<DirectGovernor>,
    per_second: NonZeroU32,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("per_second", &self.per_second)
            .finish()
    }
}

impl RateLimiter {
    /// Zero is treated as one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            governor: Arc::new(Governor::direct(Quota::per_second(per_second))),
            per_second,
        }
    }

    pub fn per_second(&self) -> u32 {
        self.per_second.get()
    }

    /// Takes one cell without waiting.
    pub fn try_acquire(&self) -> Result<(), RateLimitError> {
        self.governor.check().map_err(|not_until| RateLimitError::Throttled {
            wait: not_until.wait_time_from(DefaultClock::default().now()),
        })
    }

    /// Takes one cell, sleeping first when the quota is used up.
    pub async fn acquire(&self) {
        if let Err(RateLimitError::Throttled { wait }) = self.try_acquire() {
            log::debug!("Request throttled locally for {wait:?}");
            self.governor.until_ready().await;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Local request quota exhausted, next slot in {wait:?}")]
    Throttled { wait: Duration },
}
