//! Retry policy shared by every gateway call site: a retryability predicate
//! (`GatewayError::is_retryable`) plus a fixed escalating delay schedule.

use std::time::Duration;

/// Bounded retry schedule. `delays.len()` retries follow the initial
/// attempt, each preceded by its fixed delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Delay to sleep before retry number `retry` (0-based).
    pub fn delay_before_retry(&self, retry: usize) -> Option<Duration> {
        self.delays.get(retry).copied()
    }
}

impl Default for RetryPolicy {
    /// Two retries at 1.5s and 3s.
    fn default() -> Self {
        Self::new(vec![Duration::from_millis(1500), Duration::from_millis(3000)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_two_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(
            policy.delay_before_retry(0),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            policy.delay_before_retry(1),
            Some(Duration::from_millis(3000))
        );
        assert_eq!(policy.delay_before_retry(2), None);
    }

    #[test]
    fn test_empty_schedule_means_single_attempt() {
        let policy = RetryPolicy::new(vec![]);
        assert_eq!(policy.max_attempts(), 1);
    }
}
