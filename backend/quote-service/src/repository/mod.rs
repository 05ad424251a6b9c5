pub mod quotes;

pub use quotes::QuoteRepository;

use error_types::ServiceError;
use record_store::StoreError;
use resilience::with_timeout;
use std::future::Future;
use std::time::Duration;
use tracing::error;

/// Run one store operation under the request deadline
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
