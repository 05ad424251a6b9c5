use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use db_pool::DbConfig;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub jwt: JwtConfig,
    pub account_service: AccountServiceConfig,
    pub request_timeout: Duration,
    pub database: Option<DbConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub public_key_pem: String,
    pub issuer: Option<String>,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("public_key_pem", &"[PEM]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    pub base_url: String,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    9082
}

fn default_account_service_url() -> String {
    "http://account-service:9081".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| default_app_env()),
            host: env::var("APP_HOST").unwrap_or_else(|_| default_app_host()),
            port: env::var("APP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_app_port),
        };

        let encoded = env::var("JWT_PUBLIC_KEY_PEM")
            .context("JWT_PUBLIC_KEY_PEM must be set (base64-encoded PEM)")?;
        let decoded = general_purpose::STANDARD
            .decode(encoded.trim())
            .context("Failed to decode JWT_PUBLIC_KEY_PEM from base64")?;
        let jwt = JwtConfig {
            public_key_pem: String::from_utf8(decoded)
                .context("JWT_PUBLIC_KEY_PEM is not valid UTF-8")?,
            issuer: env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
        };

        let account_service = AccountServiceConfig {
            base_url: env::var("ACCOUNT_SERVICE_URL")
                .unwrap_or_else(|_| default_account_service_url())
                .trim_end_matches('/')
                .to_string(),
        };

        let request_timeout = resilience::TimeoutConfig::from_millis(
            env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_request_timeout_ms),
        )
        .duration;

        Ok(Self {
            app,
            jwt,
            account_service,
            request_timeout,
            database: DbConfig::from_env("quote-service"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
