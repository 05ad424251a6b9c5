//! Authorization core shared by the account and quote services
//!
//! - `principal`: bearer header or session cookie to a trusted [`Principal`]
//! - `policy`: pure allow/deny decisions
//! - `ownership`: fail-closed creator check against the service that owns a resource

pub mod ownership;
pub mod policy;
pub mod principal;

pub use ownership::{LookupError, OwnershipLookup, OwnershipVerifier, UpstreamAuthMode};
pub use policy::{ownership_match, self_or_admin, Decision};
pub use principal::{
    bearer_token, AccountDirectory, AccountRecord, Principal, PrincipalResolver, ResolvedAccount,
};
