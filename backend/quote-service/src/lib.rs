//! Quote service
//!
//! Owns quotes and their bookmark counters. The `creator` of a quote is the
//! ownership claim other services check before acting on it.

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
