//! Per-host politeness delay.

use dashmap::DashMap;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum spacing between requests to the same host.
///
/// Best-effort: two concurrent requests to one host may both read the same
/// timestamp and under-delay. Different hosts never wait on each other.
pub struct DomainThrottle {
    delay: Duration,
    jitter: Duration,
    last_request: DashMap<String, Instant>,
}

impl DomainThrottle {
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self {
            delay,
            jitter,
            last_request: DashMap::new(),
        }
    }

    /// Sleep until `host` may be contacted again, then record the request.
    pub async fn wait(&self, host: &str) {
        // Copy out so no map guard is held across the sleep.
        let last = self.last_request.get(host).map(|entry| *entry.value());

        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                let wait = self.delay - elapsed + self.random_jitter();
                debug!(host, wait_ms = wait.as_millis() as u64, "Politeness delay");
                tokio::time::sleep(wait).await;
            }
        }

        self.last_request.insert(host.to_string(), Instant::now());
    }

    fn random_jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let throttle = DomainThrottle::new(Duration::from_secs(1), Duration::ZERO);
        let start = Instant::now();
        throttle.wait("example.com").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn same_host_is_spaced() {
        let throttle = DomainThrottle::new(Duration::from_secs(1), Duration::ZERO);
        throttle.wait("example.com").await;
        let start = Instant::now();
        throttle.wait("example.com").await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn other_hosts_are_not_delayed() {
        let throttle = DomainThrottle::new(Duration::from_secs(1), Duration::ZERO);
        throttle.wait("a.example").await;
        let start = Instant::now();
        throttle.wait("b.example").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn jitter_stays_below_bound() {
        let throttle = DomainThrottle::new(Duration::from_secs(1), Duration::from_millis(500));
        throttle.wait("example.com").await;
        let start = Instant::now();
        throttle.wait("example.com").await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(1));
        assert!(waited < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_requests_do_not_wait() {
        let throttle = DomainThrottle::new(Duration::from_secs(1), Duration::ZERO);
        throttle.wait("example.com").await;
        tokio::time::advance(Duration::from_secs(2)).await;
        let start = Instant::now();
        throttle.wait("example.com").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
