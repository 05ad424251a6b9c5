//! Account service
//!
//! Hosts accounts, their "my quotes" and bookmark lists, and the per-account
//! usage counters. Ownership of quotes is confirmed against the quote
//! service before an account may list a quote as its own.

pub mod app;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;

pub use app::{configure, AppState};
pub use config::Config;
pub use error_types::{Result, ServiceError};
