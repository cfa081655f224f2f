//! Retry policy: bounds and paces the conflict-retry loop.

use std::time::Duration;

/// Backoff policy for version-conflict retries.
///
/// A conflict means another writer moved the view between our read and
/// our conditional write; the update is recomputed from a fresh read, so
/// retrying is always safe. The policy only decides how many times and
/// how fast. The default is bounded with full jitter; under pathological
/// write concentration on one user an unbounded loop can livelock, so
/// exhaustion is surfaced to the caller instead and the view converges on
/// redelivery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after which [`RetryPolicy::exhausted`] reports true.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Exponential backoff multiplier.
    pub multiplier: f64,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
    /// Draw each delay uniformly from `[0, computed delay]`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(16),
            base_delay: Duration::from_millis(10),
            multiplier: 2.0,
            max_delay: Duration::from_secs(1),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Retry forever, as the conflict-retry contract originally read.
    /// Callers own the livelock risk.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            ..Self::default()
        }
    }

    /// Whether the given number of conflicts has used up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Delay before retry number `attempts` (1-indexed):
    /// `base_delay * multiplier^(attempts - 1)`, clamped to `max_delay`,
    /// jittered when configured.
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        let delay = if self.jitter && capped > 0.0 {
            use rand::Rng;
            rand::thread_rng().gen_range(0.0..=capped)
        } else {
            capped
        };
        Duration::from_secs_f64(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_jitter() -> RetryPolicy {
        RetryPolicy {
            jitter: false,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn delays_grow_exponentially() {
        let policy = without_jitter();

        assert_eq!(policy.next_delay(1), Duration::from_millis(10));
        assert_eq!(policy.next_delay(2), Duration::from_millis(20));
        assert_eq!(policy.next_delay(3), Duration::from_millis(40));
    }

    #[test]
    fn delays_are_capped_at_max_delay() {
        let policy = without_jitter();
        assert_eq!(policy.next_delay(30), policy.max_delay);
    }

    #[test]
    fn jittered_delay_stays_within_the_computed_ceiling() {
        let policy = RetryPolicy::default();
        for attempts in 1..8 {
            let ceiling = RetryPolicy {
                jitter: false,
                ..policy.clone()
            }
            .next_delay(attempts);
            assert!(policy.next_delay(attempts) <= ceiling);
        }
    }

    #[test]
    fn bounded_policy_exhausts_at_the_limit() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            ..RetryPolicy::default()
        };
        assert!(!policy.exhausted(2));
        assert!(policy.exhausted(3));
    }

    #[test]
    fn unbounded_policy_never_exhausts() {
        let policy = RetryPolicy::unbounded();
        assert!(!policy.exhausted(u32::MAX));
    }
}
