/// Resilience helpers for the quote platform services
///
/// Every blocking point in a request (store operation, outbound HTTP call)
/// runs under a request-scoped deadline from [`timeout`].
///
/// # Example: Remote Lookup with Timeout
///
/// ```rust
/// use resilience::{with_timeout_result, TimeoutConfig, TimeoutError};
///
/// #[derive(Debug)]
/// enum LookupError { Unreachable(String) }
///
/// impl From<TimeoutError> for LookupError {
///     fn from(e: TimeoutError) -> Self { LookupError::Unreachable(e.to_string()) }
/// }
///
/// tokio_test::block_on(async {
///     let config = TimeoutConfig::default();
///     let result: Result<u32, LookupError> =
///         with_timeout_result(config.duration, async { Ok(7) }).await;
///     assert_eq!(result.unwrap(), 7);
/// });
/// ```
pub mod timeout;

pub use timeout::{with_timeout, with_timeout_result, TimeoutConfig, TimeoutError};
