use rand::Rng;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Lowest fraction of the scheduled delay a jittered retry waits.
const JITTER_FLOOR: f64 = 0.8;

/// Retry behaviour for a single logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOptions {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further attempt.
    pub base_delay: Duration,
    /// Upper bound for any computed delay, including `Retry-After`.
    pub max_delay: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(800),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryOptions {
    /// Delay before retry number `attempt` (zero-based).
    ///
    /// A server-provided `Retry-After` wins over the exponential schedule.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(delay) => delay,
            None => self
                .base_delay
                .checked_mul(2_u32.saturating_pow(attempt))
                .unwrap_or(self.max_delay),
        };
        delay.min(self.max_delay)
    }

    /// [`RetryOptions::delay_for`] with random jitter on the exponential
    /// schedule, so parallel clients do not retry in lockstep.
    /// A `Retry-After` hint is honored as sent.
    pub fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = self.delay_for(attempt, retry_after);
        if retry_after.is_some() {
            return delay;
        }
        delay.mul_f64(rand::thread_rng().gen_range(JITTER_FLOOR..=1.0))
    }
}

/// Status codes ARM documents as transient.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Reads `retry-after-ms`, `x-ms-retry-after-ms` or `Retry-After` (seconds).
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    for name in ["retry-after-ms", "x-ms-retry-after-ms"] {
        if let Some(ms) = header_number(headers, name) {
            return Some(Duration::from_millis(ms));
        }
    }
    header_number(headers, "retry-after").map(Duration::from_secs)
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}
