//! # Actix Middleware Library
//!
//! Middleware shared by the quote platform's Actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer-token resolution and the [`AuthenticatedPrincipal`] extractor
//! - `correlation_id`: `x-correlation-id` propagation

pub mod correlation_id;
pub mod jwt_auth;

pub use correlation_id::{get_correlation_id, CorrelationId, CorrelationIdMiddleware};
pub use jwt_auth::{AuthenticatedPrincipal, JwtAuthMiddleware};
