//! Retry strategies and predicates for handling transient failures.
//!
//! The strategy decides *how long* to wait before a given retry attempt; the
//! predicate decides *whether* an error is worth retrying at all. The default
//! pairing retries transport errors (connection failures, timeouts) with
//! exponential backoff; HTTP status errors are surfaced immediately unless a
//! custom predicate opts in.

use crate::Error;
use rand::Rng;
use std::time::Duration;

/// Default backoff base delay. Attempt `n` waits `2^(n-1)` times this.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Default cap on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default number of retries for transient failures.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Defines when and how long to wait between retry attempts.
///
/// # Examples
///
/// ```
/// use fetchling::RetryStrategy;
/// use std::time::Duration;
///
/// // No retries
/// let no_retry = RetryStrategy::None;
///
/// // Exponential backoff: 100ms, 200ms, 400ms, 800ms... (plus jitter)
/// let exponential = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(10),
///     max_retries: 5,
///     jitter: true,
/// };
///
/// // Fixed delay: 1s, 1s, 1s
/// let linear = RetryStrategy::Linear {
///     delay: Duration::from_secs(1),
///     max_retries: 3,
/// };
/// ```
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Retry `n` waits `initial_delay * 2^(n-1)`, capped at `max_delay`.
    /// With `jitter` enabled a random 0–100ms is added to each delay to
    /// spread out simultaneous retries.
    ExponentialBackoff {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The cap on any single delay.
        max_delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
        /// Whether to add random jitter to each delay.
        jitter: bool,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        /// The delay between retry attempts.
        delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
    },

    /// Custom retry timing.
    ///
    /// The function receives the attempt number (1-indexed) and returns
    /// `Some(delay)` to retry after the delay, or `None` to stop.
    Custom {
        /// Function that determines retry delay.
        delay_fn: fn(attempt: usize) -> Option<Duration>,
    },
}

impl Default for RetryStrategy {
    /// Exponential backoff with the documented defaults: 100ms initial delay,
    /// doubling per attempt, 5 retries, jitter on.
    fn default() -> Self {
        RetryStrategy::ExponentialBackoff {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
            jitter: true,
        }
    }
}

impl RetryStrategy {
    /// Returns the delay before the given retry attempt, or `None` if retries
    /// are exhausted.
    ///
    /// `attempt` is 1-indexed: 1 means the first retry.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt > *max_retries {
                    return None;
                }

                let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1) as u32);
                let base_delay = initial_delay.saturating_mul(multiplier);
                let delay = base_delay.min(*max_delay);

                if *jitter {
                    let extra = rand::thread_rng().gen_range(0..=100);
                    Some(delay + Duration::from_millis(extra))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Linear { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::Custom { delay_fn } => delay_fn(attempt),
        }
    }

    /// Returns the maximum number of retries, if the strategy has a fixed cap.
    pub fn max_retries(&self) -> Option<usize> {
        match self {
            RetryStrategy::None => Some(0),
            RetryStrategy::ExponentialBackoff { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Linear { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Custom { .. } => None,
        }
    }
}

/// Trait for determining whether a failed request should be retried.
///
/// Implement this to retry on criteria beyond the default transport-error
/// classification.
///
/// # Examples
///
/// ```
/// use fetchling::{Error, RetryPredicate};
///
/// struct RetryOnRateLimit;
///
/// impl RetryPredicate for RetryOnRateLimit {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         matches!(
///             error,
///             Error::HttpError { status, .. } if status.as_u16() == 429
///         )
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Determines whether the request should be retried based on the error.
    ///
    /// `attempt` is the attempt number (1-indexed).
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry transport-level failures: network errors and timeouts.
///
/// This is the default predicate. HTTP status errors, redirect failures, and
/// decode failures are not retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTransport;

impl RetryPredicate for RetryOnTransport {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retry only on 5xx server errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::HttpError { status, .. } if status.is_server_error())
    }
}

/// Retry only on timeout errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTimeout;

impl RetryPredicate for RetryOnTimeout {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Timeout)
    }
}

/// Combine multiple retry predicates with OR logic.
///
/// Retries if ANY of the predicates return `true`.
///
/// # Examples
///
/// ```
/// use fetchling::retry::{OrPredicate, RetryOn5xx, RetryOnTransport};
///
/// // Retry on transport failures OR 5xx errors
/// let predicate = OrPredicate::new(vec![
///     Box::new(RetryOnTransport),
///     Box::new(RetryOn5xx),
/// ]);
/// ```
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    /// Creates a new `OrPredicate` from a list of predicates.
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(error, attempt))
    }
}

/// Combine multiple retry predicates with AND logic.
///
/// Retries only if ALL of the predicates return `true`.
pub struct AndPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl AndPredicate {
    /// Creates a new `AndPredicate` from a list of predicates.
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for AndPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .all(|p| p.should_retry(error, attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_per_attempt() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
            jitter: false,
        };

        assert_eq!(
            strategy.delay_for_attempt(1),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            strategy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            strategy.delay_for_attempt(3),
            Some(Duration::from_millis(400))
        );
        assert_eq!(
            strategy.delay_for_attempt(4),
            Some(Duration::from_millis(800))
        );
        assert_eq!(
            strategy.delay_for_attempt(5),
            Some(Duration::from_millis(1600))
        );
        assert_eq!(strategy.delay_for_attempt(6), None);
    }

    #[test]
    fn exponential_backoff_caps_at_max_delay() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            max_retries: 5,
            jitter: false,
        };

        assert_eq!(
            strategy.delay_for_attempt(3),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            strategy.delay_for_attempt(5),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn jitter_adds_at_most_100ms() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
            jitter: true,
        };

        for _ in 0..50 {
            let delay = strategy.delay_for_attempt(1).unwrap();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(200));
        }
    }

    #[test]
    fn linear_delays_are_fixed() {
        let strategy = RetryStrategy::Linear {
            delay: Duration::from_secs(1),
            max_retries: 3,
        };

        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(4), None);
    }

    #[test]
    fn no_retry_never_yields_a_delay() {
        let strategy = RetryStrategy::None;
        assert_eq!(strategy.delay_for_attempt(1), None);
    }

    #[test]
    fn default_strategy_allows_five_retries() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_retries(), Some(5));
        assert!(strategy.delay_for_attempt(5).is_some());
        assert!(strategy.delay_for_attempt(6).is_none());
    }

    #[test]
    fn transport_predicate_ignores_http_errors() {
        let predicate = RetryOnTransport;
        let err = Error::HttpError {
            method: http::Method::GET,
            url: "http://example.com/".to_string(),
            status: http::StatusCode::INTERNAL_SERVER_ERROR,
            raw_response: String::new(),
            headers: http::HeaderMap::new(),
        };
        assert!(!predicate.should_retry(&err, 1));
        assert!(predicate.should_retry(&Error::Timeout, 1));
    }

    #[test]
    fn timeout_predicate_only_matches_timeouts() {
        let predicate = RetryOnTimeout;
        let err = Error::HttpError {
            method: http::Method::GET,
            url: "http://example.com/".to_string(),
            status: http::StatusCode::SERVICE_UNAVAILABLE,
            raw_response: String::new(),
            headers: http::HeaderMap::new(),
        };
        assert!(predicate.should_retry(&Error::Timeout, 1));
        assert!(!predicate.should_retry(&err, 1));
    }

    #[test]
    fn and_predicate_requires_every_predicate_to_agree() {
        // A timeout is both a transport failure and a timeout
        let agree = AndPredicate::new(vec![
            Box::new(RetryOnTransport),
            Box::new(RetryOnTimeout),
        ]);
        assert!(agree.should_retry(&Error::Timeout, 1));

        // A timeout is not a 5xx, so the conjunction rejects it
        let disagree = AndPredicate::new(vec![
            Box::new(RetryOnTransport),
            Box::new(RetryOn5xx),
        ]);
        assert!(!disagree.should_retry(&Error::Timeout, 1));
    }
}
