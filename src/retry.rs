//! Retry logic with exponential backoff
//!
//! [`DigitStream`](crate::DigitStream) and [`PiClient`](crate::PiClient)
//! never retry internally; a failed `next_digit` call leaves the stream
//! retryable. This module is the layer above: wrap the call in
//! [`fetch_with_retry`] to retry transient failures with exponential
//! backoff and optional jitter.
//!
//! # Example
//!
//! ```no_run
//! use pi_digit_stream::config::RetryConfig;
//! use pi_digit_stream::retry::fetch_with_retry;
//! use pi_digit_stream::{DigitSource, PiClient};
//!
//! # async fn example() -> pi_digit_stream::Result<()> {
//! let client = PiClient::with_defaults()?;
//! let config = RetryConfig::default();
//! let batch = fetch_with_retry(&config, || client.fetch_digits(0, 1000)).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, connection resets) should return
/// `true`. Permanent failures (contract changes, bad configuration) should
/// return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Timeouts and connection failures are transient
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            // A body that no longer decodes means the service contract
            // changed; retrying returns the same body
            Error::Decode(_) => false,
            // Bad digit data is an upstream contract problem, not transient
            Error::InvalidDigit { .. } => false,
            // A short batch near the source's maximum stays short
            Error::OutOfRange { .. } => false,
            // Config errors are permanent
            Error::Config { .. } => false,
            // Unknown errors - be conservative and don't retry
            Error::Other(_) => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// Retries only errors whose [`IsRetryable`] classification is transient,
/// up to `config.max_attempts` retries, sleeping between attempts with
/// exponential backoff capped at `config.max_delay` and optional jitter.
///
/// Returns the successful result or the last error after all retry
/// attempts are exhausted.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                let jittered_delay = if config.jitter { add_jitter(delay) } else { delay };

                tokio::time::sleep(jittered_delay).await;

                // Exponential backoff for the next round
                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay is between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&fast_config(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn test_retry_transient_then_succeed() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = fetch_with_retry(&fast_config(), || {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = fetch_with_retry(&fast_config(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Permanent)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1, "no retry on permanent error");
    }

    #[tokio::test]
    async fn test_transient_error_exhausts_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = fetch_with_retry(&fast_config(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        // Initial attempt plus max_attempts retries
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_error_classification() {
        assert!(!Error::Other("boom".to_string()).is_retryable());
        assert!(
            !Error::OutOfRange { cursor: 5, len: 2 }.is_retryable(),
            "short batches are permanent"
        );
        assert!(
            !Error::Config {
                message: "bad".to_string(),
                key: None
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_add_jitter_bounds() {
        let base = Duration::from_millis(100);
        for _ in 0..50 {
            let jittered = add_jitter(base);
            assert!(jittered >= base);
            assert!(jittered <= base * 2);
        }
    }
}
