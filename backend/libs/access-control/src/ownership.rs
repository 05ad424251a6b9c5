//! Cross-service ownership verification
//!
//! Ownership of a quote is recorded by the quote service. Before an
//! ownership-gated mutation, the caller's account id is compared with the
//! creator that service reports. Any failure to obtain the creator denies
//! the mutation with `UpstreamUnavailable`; it never allows.

use crate::policy::{ownership_match, Decision};
use async_trait::async_trait;
use error_types::ServiceError;
use record_store::RecordId;
use resilience::{with_timeout_result, TimeoutError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Resource not found upstream: {0}")]
    NotFound(String),

    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// Upstream refused the change in its current state
    #[error("Upstream conflict: {0}")]
    Conflict(String),

    /// Upstream answered but the payload has no usable creator
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl From<TimeoutError> for LookupError {
    fn from(err: TimeoutError) -> Self {
        LookupError::Unreachable(err.to_string())
    }
}

impl From<LookupError> for ServiceError {
    fn from(err: LookupError) -> Self {
        ServiceError::UpstreamUnavailable(err.to_string())
    }
}

/// Port to the service that records resource creators
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// Fetch the `creator` of `resource_id`, sending `authorization` upstream if given
    async fn fetch_creator(
        &self,
        resource_id: &RecordId,
        authorization: Option<&str>,
    ) -> Result<String, LookupError>;
}

/// Whether the upstream read endpoint expects the caller's credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpstreamAuthMode {
    #[default]
    Anonymous,
    ForwardCaller,
}

impl FromStr for UpstreamAuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anonymous" | "none" => Ok(Self::Anonymous),
            "forward" | "forward_caller" | "forward-caller" => Ok(Self::ForwardCaller),
            other => Err(format!("unknown upstream auth mode: {other}")),
        }
    }
}

impl fmt::Display for UpstreamAuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::ForwardCaller => f.write_str("forward_caller"),
        }
    }
}

#[derive(Clone)]
pub struct OwnershipVerifier {
    lookup: Arc<dyn OwnershipLookup>,
    mode: UpstreamAuthMode,
    timeout: Duration,
}

impl fmt::Debug for OwnershipVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipVerifier")
            .field("mode", &self.mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OwnershipVerifier {
    pub fn new(lookup: Arc<dyn OwnershipLookup>, mode: UpstreamAuthMode, timeout: Duration) -> Self {
        Self {
            lookup,
            mode,
            timeout,
        }
    }

    /// Compare the upstream creator of `resource_id` with `caller_account_id`
    pub async fn verify_ownership(
        &self,
        resource_id: &RecordId,
        caller_account_id: &str,
        auth_header: Option<&str>,
    ) -> Result<Decision, ServiceError> {
        let forwarded = match self.mode {
            UpstreamAuthMode::Anonymous => None,
            UpstreamAuthMode::ForwardCaller => auth_header,
        };

        let creator = with_timeout_result(
            self.timeout,
            self.lookup.fetch_creator(resource_id, forwarded),
        )
        .await
        .map_err(|e| {
            warn!(
                resource_id = %resource_id,
                error = %e,
                "Ownership lookup failed, denying"
            );
            ServiceError::from(e)
        })?;

        let decision = ownership_match(&creator, caller_account_id);
        debug!(resource_id = %resource_id, ?decision, "Ownership decided");
        Ok(decision)
    }

    /// [`Self::verify_ownership`] with `Deny` turned into `Forbidden`
    pub async fn require_ownership(
        &self,
        resource_id: &RecordId,
        caller_account_id: &str,
        auth_header: Option<&str>,
    ) -> Result<(), ServiceError> {
        self.verify_ownership(resource_id, caller_account_id, auth_header)
            .await?
            .into_result("Caller is not the creator of this quote")
    }
}
