//! Reconnect backoff policy
//!
//! The session task retries lost connections forever; delays grow
//! exponentially up to a cap, with jitter to avoid synchronized reconnect
//! storms when a game server restarts.

use rand::Rng;
use std::time::Duration;

/// Backoff policy for session reconnects
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,

    /// Maximum delay between attempts (caps exponential growth)
    pub max_delay: Duration,

    /// Multiplier for exponential backoff
    pub multiplier: f64,

    /// Whether to add jitter to delays
    pub use_jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl ReconnectPolicy {
    /// Calculate the delay for a given attempt number (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);

        // Cap before applying jitter so the jittered delay stays bounded
        let delay_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.use_jitter {
            rand::thread_rng().gen_range(delay_ms / 2.0..=delay_ms)
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_without_jitter() -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            use_jitter: false,
        }
    }

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = policy_without_jitter();

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = policy_without_jitter();

        // 100ms * 2^20 is far beyond the 10s cap
        assert_eq!(policy.delay_for(20), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = ReconnectPolicy {
            use_jitter: true,
            ..policy_without_jitter()
        };

        for _ in 0..100 {
            let delay = policy.delay_for(3);
            assert!(delay >= Duration::from_millis(400));
            assert!(delay <= Duration::from_millis(800));
        }
    }
}
