//! Bounded retry with quadratic backoff.

use crate::domain::charge::ChargeResult;
use crate::domain::decision::Decision;
use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before attempt `i` (0-based) is `unit * i²`.
///
/// Non-linear but gentle for small `i`: with a one second unit the waits are
/// 0s, 1s, 4s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    unit: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::quadratic(Duration::from_secs(1))
    }
}

impl Backoff {
    pub const fn quadratic(unit: Duration) -> Self {
        Self { unit }
    }

    /// No waiting between attempts.
    pub const fn none() -> Self {
        Self::quadratic(Duration::ZERO)
    }

    pub fn delay(self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt.saturating_mul(attempt))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, Backoff::default())
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Progress of one charge through its attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeState {
    /// Waiting to run `attempt` (0-based).
    Pending { attempt: u32 },
    Finished(ChargeResult),
}

impl ChargeState {
    pub fn start() -> Self {
        Self::Pending { attempt: 0 }
    }

    /// Folds one attempt's decision into the state. Finished states are absorbing.
    pub fn advance(self, decision: Decision, policy: &RetryPolicy) -> Self {
        let Self::Pending { attempt } = self else {
            return self;
        };
        match decision {
            Decision::Success => Self::Finished(ChargeResult::Charged),
            Decision::Terminal { reason } => Self::Finished(ChargeResult::Declined { reason }),
            Decision::Retry { reason } if attempt + 1 >= policy.max_attempts => {
                Self::Finished(ChargeResult::Exhausted {
                    last_reason: reason,
                })
            }
            Decision::Retry { .. } => Self::Pending {
                attempt: attempt + 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(reason: &str) -> Decision {
        Decision::Retry {
            reason: Some(reason.to_string()),
        }
    }

    #[test]
    fn test_quadratic_backoff() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(0), Duration::ZERO);
        assert_eq!(backoff.delay(1), Duration::from_secs(1));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(9));
    }

    #[test]
    fn test_backoff_is_non_decreasing() {
        let backoff = Backoff::quadratic(Duration::from_millis(250));
        let delays: Vec<_> = (0..20).map(|i| backoff.delay(i)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(Backoff::none().delay(5), Duration::ZERO);
    }

    #[test]
    fn test_policy_requires_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Backoff::none()).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), MAX_ATTEMPTS);
    }

    #[test]
    fn test_retries_exhaust_after_max_attempts() {
        let policy = RetryPolicy::default();
        let mut state = ChargeState::start();
        for expected in 1..MAX_ATTEMPTS {
            state = state.advance(retry("Timeout"), &policy);
            assert_eq!(state, ChargeState::Pending { attempt: expected });
        }
        state = state.advance(retry("Timeout"), &policy);
        assert_eq!(
            state,
            ChargeState::Finished(ChargeResult::Exhausted {
                last_reason: Some("Timeout".to_string())
            })
        );
    }

    #[test]
    fn test_terminal_and_success_finish_immediately() {
        let policy = RetryPolicy::default();
        assert_eq!(
            ChargeState::start().advance(Decision::Success, &policy),
            ChargeState::Finished(ChargeResult::Charged)
        );
        assert_eq!(
            ChargeState::start().advance(
                Decision::Terminal {
                    reason: "Insufficient funds".to_string()
                },
                &policy
            ),
            ChargeState::Finished(ChargeResult::Declined {
                reason: "Insufficient funds".to_string()
            })
        );
    }

    #[test]
    fn test_finished_state_is_absorbing() {
        let policy = RetryPolicy::default();
        let done = ChargeState::Finished(ChargeResult::Charged);
        assert_eq!(done.clone().advance(retry("Timeout"), &policy), done);
    }
}
