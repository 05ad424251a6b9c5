pub mod accounts;
pub mod counters;

pub use accounts::AccountRepository;
pub use counters::CounterRepository;

use error_types::ServiceError;
use record_store::StoreError;
use resilience::with_timeout;
use std::future::Future;
use std::time::Duration;
use tracing::error;

/// Run one store operation under the request deadline
///
/// An elapsed deadline is an `Internal` error: the write may or may not have
/// landed, and every store write the services issue is safe to retry.
pub(crate) async fn guarded<T, F>(
    timeout: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match with_timeout(timeout, future).await {
        Ok(result) => result.map_err(|e| {
            error!(operation, error = %e, "Store operation failed");
            ServiceError::from(e)
        }),
        Err(elapsed) => {
            error!(operation, "Store operation timed out");
            Err(ServiceError::Internal(format!("{operation}: {elapsed}")))
        }
    }
}
