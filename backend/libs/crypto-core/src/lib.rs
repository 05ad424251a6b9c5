//! Token cryptography shared by the quote platform services
//!
//! - `jwt`: RS256 bearer-token verification and issuance

pub mod jwt;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_keys;

pub use jwt::{Claims, TokenError, TokenIssuer, TokenVerifier};
