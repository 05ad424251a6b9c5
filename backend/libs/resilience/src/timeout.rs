/// Request-scoped timeout wrapper for async operations
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub duration: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl TimeoutConfig {
    /// Zero is treated as "unset" and falls back to the default
    pub fn from_millis(millis: u64) -> Self {
        if millis == 0 {
            return Self::default();
        }
        Self {
            duration: Duration::from_millis(millis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeoutError {
    #[error("Operation timed out after {0:?}")]
    Elapsed(Duration),
}

/// Execute a future with timeout
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    timeout(duration, future).await.map_err(|_| {
        tracing::warn!(timeout_ms = duration.as_millis() as u64, "Operation timed out");
        TimeoutError::Elapsed(duration)
    })
}

/// Execute a fallible future with timeout, folding the elapsed case into the
/// caller's own error type
pub async fn with_timeout_result<F, T, E>(duration: Duration, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<TimeoutError>,
{
    match with_timeout(duration, future).await {
        Ok(result) => result,
        Err(elapsed) => Err(E::from(elapsed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum CallError {
        Failed(&'static str),
        TimedOut,
    }

    impl From<TimeoutError> for CallError {
        fn from(_: TimeoutError) -> Self {
            CallError::TimedOut
        }
    }

    #[tokio::test]
    async fn test_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), async { 42 }).await;
        assert_eq!(tokio_test::assert_ok!(result), 42);
    }

    #[test]
    fn test_timeout_outside_async_test() {
        // block_on drives a runtime with timers enabled
        let result = tokio_test::block_on(with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }));
        let err = tokio_test::assert_err!(result);
        assert_eq!(err, TimeoutError::Elapsed(Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn test_timeout_elapsed() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            42
        })
        .await;

        assert!(matches!(result, Err(TimeoutError::Elapsed(_))));
    }

    #[tokio::test]
    async fn test_timeout_result_keeps_inner_error() {
        let result: Result<i32, CallError> = with_timeout_result(Duration::from_secs(1), async {
            Err(CallError::Failed("refused"))
        })
        .await;

        assert_eq!(result, Err(CallError::Failed("refused")));
    }

    #[tokio::test]
    async fn test_timeout_result_maps_elapsed() {
        let result: Result<i32, CallError> =
            with_timeout_result(Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(1)
            })
            .await;

        assert_eq!(result, Err(CallError::TimedOut));
    }

    #[test]
    fn test_zero_millis_falls_back_to_default() {
        assert_eq!(TimeoutConfig::from_millis(0), TimeoutConfig::default());
        assert_eq!(
            TimeoutConfig::from_millis(250).duration,
            Duration::from_millis(250)
        );
    }
}
