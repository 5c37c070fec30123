//! Fixed-delay retry for upstream API calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    5_000
}

impl RetryConfig {
    /// Set the total number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay between attempts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    /// Delay between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Execute an async operation, retrying retryable errors with a fixed delay
///
/// Errors for which [`SourceError::is_retryable`] is false are returned
/// immediately. After `max_attempts` retryable failures the last error is
/// returned; callers decide whether that is fatal.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut operation = operation;
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Err(error) if error.is_retryable() && attempts < max_attempts => {
                tracing::info!(
                    "Attempt {}/{} failed: {}, retrying in {:?}",
                    attempts,
                    max_attempts,
                    error,
                    config.delay()
                );
                sleep(config.delay()).await;
            }
            Err(error) => {
                if error.is_retryable() {
                    tracing::warn!("Operation failed after {} attempts: {}", attempts, error);
                }
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fast_config() -> RetryConfig {
        RetryConfig::default().with_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(fast_config(), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Ok("success")
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(fast_config(), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    if *call_count.borrow() < 3 {
                        Err(SourceError::Network("temporary error".to_string()))
                    } else {
                        Ok("success")
                    }
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*call_count.borrow(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<(), SourceError> = {
            let call_count = call_count.clone();
            with_retry(fast_config(), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SourceError::Parse("truncated body".to_string()))
                }
            })
        }
        .await;

        assert!(matches!(result, Err(SourceError::Parse(_))));
        assert_eq!(*call_count.borrow(), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_permanent_error() {
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<&str, SourceError> = {
            let call_count = call_count.clone();
            with_retry(fast_config(), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SourceError::NotFound("42".to_string()))
                }
            })
        }
        .await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_fixed_delay_between_attempts() {
        let start = tokio::time::Instant::now();

        let result: Result<(), SourceError> = with_retry(RetryConfig::default(), || async {
            Err(SourceError::Api("status 500".to_string()))
        })
        .await;

        assert!(result.is_err());
        // Three attempts, two sleeps of five seconds.
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let call_count = Rc::new(RefCell::new(0));
        let config = fast_config().with_max_attempts(0);

        let result: Result<(), SourceError> = {
            let call_count = call_count.clone();
            with_retry(config, move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SourceError::Network("down".to_string()))
                }
            })
        }
        .await;

        assert!(result.is_err());
        assert_eq!(*call_count.borrow(), 1);
    }
}
