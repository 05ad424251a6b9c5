/// Shared JWT verification module for the quote platform services
///
/// Tokens are RS256 only. Symmetric algorithms are rejected to prevent
/// algorithm confusion attacks.
///
/// ## Usage
///
/// The verifier is an ordinary value built once at startup and handed to
/// whatever needs it; there is no process-global key.
///
/// ```rust,no_run
/// use crypto_core::jwt::TokenVerifier;
///
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM").unwrap();
/// let verifier = TokenVerifier::from_rsa_pem(&public_key).unwrap();
///
/// match verifier.verify("eyJ...") {
///     Ok(claims) => println!("subject: {:?}", claims.subject),
///     Err(e) => eprintln!("rejected: {e}"),
/// }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// JWT algorithm - MUST be RS256 for all services
pub const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

const SUBJECT_CLAIM: &str = "sub";
const GROUP_CLAIM: &str = "group";
const GROUPS_CLAIM: &str = "groups";

// ============================================================================
// Errors
// ============================================================================

/// Distinct failure modes of token verification
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a structurally valid compact JWT
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not validate, or the token is expired / not yet valid
    #[error("Invalid or expired token: {0}")]
    InvalidSignature(String),

    /// The verifier itself cannot be used (bad key material)
    #[error("Token verifier misconfigured: {0}")]
    Misconfigured(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed(msg),
            ErrorKind::InvalidSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject => TokenError::InvalidSignature(msg),
            _ => TokenError::Misconfigured(msg),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims extracted from a verified token
///
/// `subject` and `group` are optional here: a verified token that lacks them
/// is still a verified token. Deciding that such a token is not a session is
/// the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: Option<String>,
    pub group: Option<String>,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
    /// Every claim rendered as a string
    pub raw: BTreeMap<String, String>,
}

impl Claims {
    fn from_map(map: Map<String, Value>) -> Self {
        let subject = map
            .get(SUBJECT_CLAIM)
            .and_then(Value::as_str)
            .map(str::to_string);

        // MicroProfile-style tokens carry a `groups` array instead of `group`
        let group = map
            .get(GROUP_CLAIM)
            .and_then(Value::as_str)
            .or_else(|| {
                map.get(GROUPS_CLAIM)
                    .and_then(Value::as_array)
                    .and_then(|groups| groups.first())
                    .and_then(Value::as_str)
            })
            .map(str::to_string);

        let issued_at = map.get("iat").and_then(Value::as_i64);
        let expires_at = map.get("exp").and_then(Value::as_i64);

        let raw = map
            .into_iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, rendered)
            })
            .collect();

        Self {
            subject,
            group,
            issued_at,
            expires_at,
            raw,
        }
    }
}

/// Claims written by [`TokenIssuer`]
#[derive(Debug, Serialize, Deserialize)]
struct IssuedClaims {
    sub: String,
    group: String,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
}

// ============================================================================
// Verification
// ============================================================================

/// Pre-configured trust anchor for bearer tokens
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &JWT_ALGORITHM)
            .field("decoding_key", &"[REDACTED]")
            .field("issuer", &self.validation.iss)
            .finish()
    }
}

impl TokenVerifier {
    /// Build a verifier from an RSA public key in PEM format
    ///
    /// Fails with [`TokenError::Misconfigured`] if the PEM is not a usable RSA key.
    pub fn from_rsa_pem(public_key_pem: &str) -> Result<Self, TokenError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| TokenError::Misconfigured(format!("Failed to parse RSA public key: {e}")))?;

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Additionally require the `iss` claim to match
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Validate and decode a token (without the "Bearer " prefix)
    ///
    /// ## Security Guarantees
    ///
    /// - Verifies the RS256 signature
    /// - Checks expiration
    /// - NO fallback to weaker algorithms
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let err = TokenError::from(e);
                tracing::debug!(error = %err, "Token verification failed");
                err
            })?;

        Ok(Claims::from_map(token_data.claims))
    }
}

// ============================================================================
// Token Generation
// ============================================================================

/// Mints RS256 tokens
///
/// Only the login flow and tooling hold the private key; services that only
/// check tokens need nothing but a [`TokenVerifier`].
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: Option<String>,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("encoding_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenIssuer {
    pub fn from_rsa_pem(private_key_pem: &str) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
            TokenError::Misconfigured(format!("Failed to parse RSA private key: {e}"))
        })?;

        Ok(Self {
            encoding_key,
            issuer: None,
        })
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(issuer.to_string());
        self
    }

    /// Issue a token for `subject` in `group`, valid for `ttl`
    pub fn issue(&self, subject: &str, group: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = IssuedClaims {
            sub: subject.to_string(),
            group: group.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key).map_err(TokenError::from)
    }

    /// Sign an arbitrary claim set; used to produce incomplete or unusual tokens
    pub fn issue_claims(&self, claims: &Map<String, Value>) -> Result<String, TokenError> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.encoding_key).map_err(TokenError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
