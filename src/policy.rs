use std::time::Duration;

use rand::Rng;

use crate::{ReqresError, Result};

/// Status codes retried by default: rate limiting plus transient gateway
/// failures. 500 is deliberately absent — an unexpected server error is a
/// test finding, not a transient condition.
pub const DEFAULT_RETRY_STATUSES: [u16; 4] = [429, 502, 503, 504];

/// Immutable retry parameters governing attempt count, delay growth and
/// jitter. Configured once per client (or overridden per call) and validated
/// fail-fast.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, initial request included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Growth factor applied per attempt (exponential backoff).
    pub backoff_multiplier: f64,
    /// Fraction of the computed delay added as uniform random jitter,
    /// in `0.0..=1.0`.
    pub jitter_factor: f64,
    /// Upper bound on any single wait, computed or server-directed.
    pub max_backoff: Duration,
    /// Status codes classified as retryable.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            max_backoff: Duration::from_secs(30),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// More patient profile for bulk operations, which hit rate limits far
    /// more often than single calls.
    pub fn bulk() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_secs(3),
            max_backoff: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Single attempt, no waiting. Used when rate-limit responses are the
    /// thing under test.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            jitter_factor: 0.0,
            ..Self::default()
        }
    }

    /// Rejects parameter combinations that would break the retry loop.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ReqresError::Config(
                "retry policy: max_attempts must be at least 1".to_owned(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ReqresError::Config(format!(
                "retry policy: backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(ReqresError::Config(format!(
                "retry policy: jitter_factor must be within 0.0..=1.0, got {}",
                self.jitter_factor
            )));
        }
        if self.base_delay > self.max_backoff {
            return Err(ReqresError::Config(
                "retry policy: base_delay exceeds max_backoff".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Pure backoff computation, no jitter: `base * multiplier^(attempt-1)`,
    /// capped at `max_backoff`. `attempt` is the 1-based attempt that just
    /// failed.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(24) as i32;
        let scaled = self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = scaled.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Backoff plus uniform jitter in `[0, jitter_factor * backoff]`,
    /// still capped at `max_backoff`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff_delay(attempt);
        let jitter_bound = (base.as_millis() as f64 * self.jitter_factor) as u64;
        let jitter = if jitter_bound > 0 {
            rand::thread_rng().gen_range(0..=jitter_bound)
        } else {
            0
        };
        (base + Duration::from_millis(jitter)).min(self.max_backoff)
    }

    /// Caps a server-provided `Retry-After` wait at the policy maximum.
    pub fn clamp_server_delay(&self, requested: Duration) -> Duration {
        requested.min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RetryPolicy, DEFAULT_RETRY_STATUSES};
    use crate::ReqresError;

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            max_backoff: Duration::from_millis(2_000),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }

    #[test]
    fn backoff_grows_exponentially() {
        let policy = test_policy();
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(400));
    }

    #[test]
    fn backoff_is_capped_at_max() {
        let policy = test_policy();
        assert_eq!(policy.backoff_delay(10), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_delay(u32::MAX), Duration::from_millis(2_000));
    }

    #[test]
    fn jittered_delay_stays_within_bound() {
        let policy = test_policy();
        for attempt in 1..=4 {
            let base = policy.backoff_delay(attempt);
            let bound = base + Duration::from_millis((base.as_millis() as f64 * 0.1) as u64);
            for _ in 0..50 {
                let delay = policy.delay_for(attempt);
                assert!(delay >= base, "delay {delay:?} below base {base:?}");
                assert!(delay <= bound, "delay {delay:?} above bound {bound:?}");
            }
        }
    }

    #[test]
    fn server_delay_is_clamped_to_max_backoff() {
        let policy = test_policy();
        assert_eq!(
            policy.clamp_server_delay(Duration::from_secs(300)),
            Duration::from_millis(2_000)
        );
        assert_eq!(
            policy.clamp_server_delay(Duration::from_millis(500)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn default_retry_statuses_exclude_plain_500() {
        let policy = RetryPolicy::default();
        for status in [429, 502, 503, 504] {
            assert!(policy.is_retryable_status(status));
        }
        assert!(!policy.is_retryable_status(500));
        assert!(!policy.is_retryable_status(404));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(ReqresError::Config(_))
        ));
    }

    #[test]
    fn out_of_range_jitter_is_rejected() {
        let policy = RetryPolicy {
            jitter_factor: 1.5,
            ..RetryPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(ReqresError::Config(_))));
    }

    #[test]
    fn sub_unit_multiplier_is_rejected() {
        let policy = RetryPolicy {
            backoff_multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(ReqresError::Config(_))));
    }

    #[test]
    fn presets_are_valid() {
        RetryPolicy::default().validate().expect("default");
        RetryPolicy::bulk().validate().expect("bulk");
        RetryPolicy::no_retry().validate().expect("no_retry");
    }
}
