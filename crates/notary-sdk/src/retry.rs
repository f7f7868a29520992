//! Bounded retry with jittered exponential backoff.
//!
//! The retry loop is an explicit state machine,
//! `Attempting(n) -> {Succeeded, Backoff(n + 1), Exhausted}`, that knows
//! nothing about how time passes. The committer drives it with tokio sleeps;
//! any other executor can drive it the same way.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NotaryError, NotaryResult};

/// Lower bound of the jitter factor (inclusive).
pub const JITTER_MIN: f64 = 0.5;
/// Upper bound of the jitter factor (exclusive).
pub const JITTER_MAX: f64 = 1.0;
/// Largest accepted backoff base (one hour).
pub const MAX_BASE_DELAY_MS: u64 = 3_600_000;
/// Largest accepted attempt count.
pub const MAX_ATTEMPTS: u32 = 32;

/// Retry limits for ledger submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total submission attempts, including the first.
    pub max_retries: u32,
    /// Base of the exponential backoff, in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay_ms: u64::try_from(base_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Sleep after the zero-based attempt `attempt` failed:
    /// `base_delay * 2^attempt * jitter`.
    ///
    /// With jitter in `[0.5, 1.0)` the delay after attempt `n + 1` is never
    /// shorter than the delay after attempt `n`.
    ///
    /// Saturates at [`Duration::MAX`] instead of overflowing.
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let jitter = jitter.clamp(JITTER_MIN, JITTER_MAX);
        let multiplier = 2f64.powi(attempt.min(63) as i32);
        let secs = self.base_delay().as_secs_f64() * multiplier * jitter;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Upper bound (exclusive) of [`RetryPolicy::delay_for`] for an attempt.
    pub fn max_delay_for(&self, attempt: u32) -> Duration {
        self.delay_for(attempt, JITTER_MAX)
    }

    pub fn validate(&self) -> NotaryResult<()> {
        if self.max_retries == 0 {
            return Err(NotaryError::Config("max_retries must be at least 1".into()));
        }
        if self.max_retries > MAX_ATTEMPTS {
            return Err(NotaryError::Config(format!(
                "max_retries must be at most {MAX_ATTEMPTS}"
            )));
        }
        if self.base_delay_ms > MAX_BASE_DELAY_MS {
            return Err(NotaryError::Config(format!(
                "base_delay_ms must be at most {MAX_BASE_DELAY_MS}"
            )));
        }
        Ok(())
    }
}

/// Draw a jitter factor uniformly from `[0.5, 1.0)`.
pub fn sample_jitter() -> f64 {
    rand::thread_rng().gen_range(JITTER_MIN..JITTER_MAX)
}

/// Where a retrying operation stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryState {
    /// Attempt `n` (zero-based) is due or in flight.
    Attempting(u32),
    /// Waiting `delay` before attempt `next_attempt`.
    Backoff { next_attempt: u32, delay: Duration },
    /// An attempt succeeded.
    Succeeded,
    /// Every allowed attempt failed.
    Exhausted { attempts: u32 },
}

/// Bounded retry state machine.
///
/// Events that do not apply to the current state leave it unchanged, so a
/// driver cannot push the machine past its bound.
#[derive(Debug, Clone)]
pub struct RetryMachine {
    policy: RetryPolicy,
    state: RetryState,
}

impl RetryMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: RetryState::Attempting(0),
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Total attempts allowed; a zero policy still allows one.
    pub fn max_attempts(&self) -> u32 {
        self.policy.max_retries.max(1)
    }

    /// The in-flight attempt succeeded.
    pub fn on_success(&mut self) -> RetryState {
        if let RetryState::Attempting(_) = self.state {
            self.state = RetryState::Succeeded;
        }
        self.state
    }

    /// The in-flight attempt failed; back off or give up.
    pub fn on_failure(&mut self, jitter: f64) -> RetryState {
        if let RetryState::Attempting(n) = self.state {
            let attempts = n + 1;
            self.state = if attempts >= self.max_attempts() {
                RetryState::Exhausted { attempts }
            } else {
                RetryState::Backoff {
                    next_attempt: attempts,
                    delay: self.policy.delay_for(n, jitter),
                }
            };
        }
        self.state
    }

    /// The backoff delay elapsed; start the next attempt.
    pub fn resume(&mut self) -> RetryState {
        if let RetryState::Backoff { next_attempt, .. } = self.state {
            self.state = RetryState::Attempting(next_attempt);
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1000))
    }

    #[test]
    fn default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries, 3);
        assert_eq!(p.base_delay(), Duration::from_secs(1));
    }

    #[test]
    fn delay_formula() {
        let p = policy(3);
        assert_eq!(p.delay_for(0, 0.5), Duration::from_millis(500));
        assert_eq!(p.delay_for(1, 0.5), Duration::from_millis(1000));
        assert_eq!(p.delay_for(2, 0.75), Duration::from_millis(3000));
        assert_eq!(p.max_delay_for(1), Duration::from_millis(2000));
    }

    #[test]
    fn jitter_is_clamped() {
        let p = policy(3);
        assert_eq!(p.delay_for(0, 0.0), Duration::from_millis(500));
        assert_eq!(p.delay_for(0, 7.0), Duration::from_millis(1000));
    }

    #[test]
    fn huge_delays_saturate() {
        let p = RetryPolicy {
            max_retries: 32,
            base_delay_ms: u64::MAX,
        };
        assert_eq!(p.delay_for(31, 0.99), Duration::MAX);
        assert_eq!(p.delay_for(u32::MAX, 0.5), Duration::MAX);
    }

    #[test]
    fn validate_bounds_the_policy() {
        policy(3).validate().unwrap();
        let p = RetryPolicy {
            max_retries: 32,
            base_delay_ms: 1_000_000_000_000_000,
        };
        assert!(matches!(p.validate(), Err(NotaryError::Config(msg)) if msg.contains("base_delay_ms")));
        assert!(matches!(policy(33).validate(), Err(NotaryError::Config(_))));
        let largest = RetryPolicy {
            max_retries: MAX_ATTEMPTS,
            base_delay_ms: MAX_BASE_DELAY_MS,
        };
        largest.validate().unwrap();
        assert!(largest.max_delay_for(MAX_ATTEMPTS - 2) > Duration::ZERO);
    }

    #[test]
    fn sampled_jitter_in_range() {
        for _ in 0..1000 {
            let j = sample_jitter();
            assert!((JITTER_MIN..JITTER_MAX).contains(&j));
        }
    }

    #[test]
    fn delays_never_decrease() {
        let p = policy(10);
        for attempt in 0..8 {
            let worst_now = p.max_delay_for(attempt);
            let best_next = p.delay_for(attempt + 1, JITTER_MIN);
            assert!(best_next >= worst_now);
        }
    }

    #[test]
    fn success_on_first_attempt() {
        let mut m = RetryMachine::new(policy(3));
        assert_eq!(m.state(), RetryState::Attempting(0));
        assert_eq!(m.on_success(), RetryState::Succeeded);
    }

    #[test]
    fn failure_backs_off_then_resumes() {
        let mut m = RetryMachine::new(policy(3));
        assert_eq!(
            m.on_failure(0.5),
            RetryState::Backoff {
                next_attempt: 1,
                delay: Duration::from_millis(500)
            }
        );
        assert_eq!(m.resume(), RetryState::Attempting(1));
        assert_eq!(
            m.on_failure(0.5),
            RetryState::Backoff {
                next_attempt: 2,
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(m.resume(), RetryState::Attempting(2));
        assert_eq!(m.on_success(), RetryState::Succeeded);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let mut m = RetryMachine::new(policy(3));
        let mut attempts = 0;
        loop {
            match m.state() {
                RetryState::Attempting(_) => {
                    attempts += 1;
                    m.on_failure(0.9);
                }
                RetryState::Backoff { .. } => {
                    m.resume();
                }
                RetryState::Exhausted { attempts: reported } => {
                    assert_eq!(reported, 3);
                    break;
                }
                RetryState::Succeeded => panic!("never succeeded"),
            }
        }
        assert_eq!(attempts, 3);
    }

    #[test]
    fn zero_policy_still_attempts_once() {
        let mut m = RetryMachine::new(policy(0));
        assert_eq!(m.on_failure(0.5), RetryState::Exhausted { attempts: 1 });
        assert!(policy(0).validate().is_err());
    }

    #[test]
    fn terminal_states_ignore_events() {
        let mut m = RetryMachine::new(policy(1));
        m.on_failure(0.5);
        assert_eq!(m.resume(), RetryState::Exhausted { attempts: 1 });
        assert_eq!(m.on_success(), RetryState::Exhausted { attempts: 1 });

        let mut m = RetryMachine::new(policy(3));
        m.on_success();
        assert_eq!(m.on_failure(0.5), RetryState::Succeeded);
    }
}
