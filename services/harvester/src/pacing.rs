//! Request pacing with a token bucket and adaptive back-off.
//!
//! Every request waits on the pacer first. The bucket sets the steady rate
//! and the allowed burst. Throttling responses add a back-off delay that
//! doubles while the API keeps refusing and decays once requests succeed.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::PacingConfig;

/// Gate placed in front of every imagery request.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    /// Tokens added per second
    rate: f64,
    capacity: f64,
    /// May go negative: a reservation taken on credit is repaid by refill
    tokens: f64,
    last_refill: Instant,
    backoff: Duration,
    max_backoff: Duration,
}

impl RequestPacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    /// Pacer with a full bucket at `now`.
    pub fn starting_at(config: &PacingConfig, now: Instant) -> Self {
        let capacity = f64::from(config.burst.max(1));
        Self {
            rate: config.requests_per_second,
            capacity,
            tokens: capacity,
            last_refill: now,
            backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }

    /// Steady-state spacing between requests.
    pub fn interval(&self) -> Duration {
        secs_or_max(1.0 / self.rate)
    }

    /// Current extra delay caused by throttling.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.rate).min(self.capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }

    /// Take one token and return how long to wait before sending.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        self.refill(now);

        let wait = if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            secs_or_max((1.0 - self.tokens) / self.rate)
        };
        self.tokens -= 1.0;

        wait.saturating_add(self.backoff)
    }

    /// Sleep until the next request may be sent.
    pub async fn wait(&mut self) {
        let delay = self.reserve(Instant::now());
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Pacing next request");
            tokio::time::sleep(delay).await;
        }
    }

    /// A request went through; relax any back-off.
    pub fn record_success(&mut self) {
        if self.backoff.is_zero() {
            return;
        }
        self.backoff /= 2;
        if self.backoff < self.interval() {
            self.backoff = Duration::ZERO;
        }
    }

    /// The API refused a request for exceeding its rate.
    pub fn record_throttled(&mut self, retry_after: Option<Duration>) {
        let doubled = if self.backoff.is_zero() {
            self.interval()
        } else {
            self.backoff.saturating_mul(2)
        };
        let next = retry_after.map_or(doubled, |hint| hint.max(doubled));
        self.backoff = next.min(self.max_backoff);
        self.tokens = self.tokens.min(0.0);

        warn!(
            backoff_ms = self.backoff.as_millis() as u64,
            retry_after_secs = retry_after.map(|d| d.as_secs()),
            "Imagery API throttled requests, backing off"
        );
    }
}

/// Seconds as a `Duration`, saturating when the value does not fit.
fn secs_or_max(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rps: f64, burst: u32) -> PacingConfig {
        PacingConfig {
            requests_per_second: rps,
            burst,
            max_backoff_secs: 60,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_request_is_free() {
        let t0 = Instant::now();
        let mut pacer = RequestPacer::starting_at(&config(1.0, 1), t0);
        assert_eq!(pacer.reserve(t0), Duration::ZERO);
    }

    #[test]
    fn test_steady_rate_one_per_second() {
        let t0 = Instant::now();
        let mut pacer = RequestPacer::starting_at(&config(1.0, 1), t0);

        assert_eq!(pacer.reserve(t0), Duration::ZERO);
        assert_eq!(pacer.reserve(t0 + ms(250)), ms(750));
        // Caller slept until t0 + 1s; the next slot is a full second later.
        assert_eq!(pacer.reserve(t0 + ms(1000)), ms(1000));
    }

    #[test]
    fn test_idle_time_refills_bucket() {
        let t0 = Instant::now();
        let mut pacer = RequestPacer::starting_at(&config(2.0, 1), t0);

        assert_eq!(pacer.reserve(t0), Duration::ZERO);
        assert_eq!(pacer.reserve(t0 + Duration::from_secs(10)), Duration::ZERO);
    }

    #[test]
    fn test_burst_capacity() {
        let t0 = Instant::now();
        let mut pacer = RequestPacer::starting_at(&config(1.0, 3), t0);

        for _ in 0..3 {
            assert_eq!(pacer.reserve(t0), Duration::ZERO);
        }
        assert_eq!(pacer.reserve(t0), Duration::from_secs(1));
    }

    #[test]
    fn test_throttle_doubles_and_caps() {
        let mut pacer = RequestPacer::starting_at(&config(1.0, 1), Instant::now());

        pacer.record_throttled(None);
        assert_eq!(pacer.backoff(), Duration::from_secs(1));
        pacer.record_throttled(None);
        assert_eq!(pacer.backoff(), Duration::from_secs(2));
        pacer.record_throttled(Some(Duration::from_secs(10)));
        assert_eq!(pacer.backoff(), Duration::from_secs(10));
        pacer.record_throttled(Some(Duration::from_secs(300)));
        assert_eq!(pacer.backoff(), Duration::from_secs(60));
    }

    #[test]
    fn test_success_decays_backoff() {
        let mut pacer = RequestPacer::starting_at(&config(1.0, 1), Instant::now());
        pacer.record_throttled(Some(Duration::from_secs(8)));

        pacer.record_success();
        assert_eq!(pacer.backoff(), Duration::from_secs(4));
        pacer.record_success();
        assert_eq!(pacer.backoff(), Duration::from_secs(2));
        pacer.record_success();
        assert_eq!(pacer.backoff(), Duration::from_secs(1));
        pacer.record_success();
        assert_eq!(pacer.backoff(), Duration::ZERO);
    }

    #[test]
    fn test_throttle_drains_bucket_and_delays() {
        let t0 = Instant::now();
        let mut pacer = RequestPacer::starting_at(&config(1.0, 5), t0);
        pacer.record_throttled(Some(Duration::from_secs(3)));

        // Empty bucket: one interval for the token plus the back-off.
        assert_eq!(pacer.reserve(t0), Duration::from_secs(4));
    }

    #[test]
    fn test_tiny_rate_saturates_instead_of_overflowing() {
        let t0 = Instant::now();
        let mut pacer = RequestPacer::starting_at(&config(1.0e-20, 1), t0);

        assert_eq!(pacer.reserve(t0), Duration::ZERO);
        assert_eq!(pacer.reserve(t0), Duration::MAX);
        assert_eq!(pacer.interval(), Duration::MAX);

        pacer.record_throttled(None);
        assert_eq!(pacer.backoff(), Duration::from_secs(60));
        assert_eq!(pacer.reserve(t0), Duration::MAX);
    }
}
