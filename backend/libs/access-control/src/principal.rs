//! Principal resolution
//!
//! Turns an untrusted `Authorization` header (or the `jwt` session cookie)
//! into a [`Principal`], and optionally binds it to the account record the
//! token's subject names. The subject string is the account's `_id`.

use async_trait::async_trait;
use crypto_core::jwt::TokenVerifier;
use error_types::ServiceError;
use record_store::RecordId;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const BEARER: &str = "bearer";

/// Trusted identity of the caller for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub subject_id: String,
    pub group: String,
    pub claims: BTreeMap<String, String>,
}

impl Principal {
    /// The subject as an account id; an unparseable subject is an invalid session
    pub fn account_id(&self) -> Result<RecordId, ServiceError> {
        RecordId::parse(&self.subject_id, "sub")
            .map_err(|_| ServiceError::unauthorized("Token subject is not an account id"))
    }
}

/// The minimum the resolver needs to know about an account record
pub trait AccountRecord {
    fn record_id(&self) -> RecordId;
    fn is_admin(&self) -> bool;
}

/// Lookup of account records by id
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    type Account: AccountRecord + Send;

    async fn find_account(&self, id: RecordId) -> Result<Option<Self::Account>, ServiceError>;
}

/// A principal bound to its current account record
#[derive(Debug, Clone)]
pub struct ResolvedAccount<A> {
    pub principal: Principal,
    pub account_id: RecordId,
    pub account: A,
}

impl<A: AccountRecord> ResolvedAccount<A> {
    pub fn is_admin(&self) -> bool {
        self.account.is_admin()
    }
}

/// Extract the token from an `Authorization` value
///
/// The scheme is matched case-insensitively and must be followed by
/// whitespace; surrounding whitespace is dropped.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim_start();
    let scheme = header.get(..BEARER.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return None;
    }
    let rest = &header[BEARER.len()..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Debug, Clone)]
pub struct PrincipalResolver {
    verifier: TokenVerifier,
}

impl PrincipalResolver {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Resolve an `Authorization` header value
    pub fn resolve(&self, auth_header: Option<&str>) -> Result<Principal, ServiceError> {
        let header =
            auth_header.ok_or_else(|| ServiceError::unauthorized("Missing Authorization header"))?;
        let token = bearer_token(header)
            .ok_or_else(|| ServiceError::unauthorized("Invalid Authorization header format"))?;
        self.resolve_token(token)
    }

    /// Resolve the raw token carried by the `jwt` session cookie
    pub fn resolve_session_token(&self, cookie_value: &str) -> Result<Principal, ServiceError> {
        let token = cookie_value.trim();
        if token.is_empty() {
            return Err(ServiceError::unauthorized("Empty session token"));
        }
        self.resolve_token(token)
    }

    fn resolve_token(&self, token: &str) -> Result<Principal, ServiceError> {
        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "Rejecting bearer token");
            ServiceError::unauthorized(format!("Invalid token: {e}"))
        })?;

        let subject_id = claims
            .subject
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::unauthorized("Token has no subject"))?;
        let group = claims
            .group
            .filter(|g| !g.is_empty())
            .ok_or_else(|| ServiceError::unauthorized("Token has no group"))?;

        Ok(Principal {
            subject_id,
            group,
            claims: claims.raw,
        })
    }

    /// Bind a principal to the account record fetched for its subject
    pub fn resolve_from_record<A: AccountRecord>(
        &self,
        principal: Principal,
        record: Option<A>,
    ) -> Result<ResolvedAccount<A>, ServiceError> {
        let account =
            record.ok_or_else(|| ServiceError::unauthorized("Account no longer exists"))?;
        let account_id = account.record_id();
        if account_id.to_string() != principal.subject_id {
            return Err(ServiceError::unauthorized(
                "Account record does not match token subject",
            ));
        }
        Ok(ResolvedAccount {
            principal,
            account_id,
            account,
        })
    }

    /// Header to verified principal to current account record
    pub async fn resolve_account<D: AccountDirectory + ?Sized>(
        &self,
        auth_header: Option<&str>,
        directory: &D,
    ) -> Result<ResolvedAccount<D::Account>, ServiceError> {
        let principal = self.resolve(auth_header)?;
        self.bind_account(principal, directory).await
    }

    /// Look up the subject's account and bind it
    pub async fn bind_account<D: AccountDirectory + ?Sized>(
        &self,
        principal: Principal,
        directory: &D,
    ) -> Result<ResolvedAccount<D::Account>, ServiceError> {
        let id = principal.account_id()?;
        let record = directory.find_account(id).await?;
        self.resolve_from_record(principal, record)
    }
}
