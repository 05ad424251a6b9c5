use access_control::UpstreamAuthMode;
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use db_pool::DbConfig;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub jwt: JwtConfig,
    pub quote_service: QuoteServiceConfig,
    /// Deadline for every store operation and outbound call
    pub request_timeout: Duration,
    /// `None` runs on the in-memory store
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
    /// RSA public key, PEM (env var holds it base64-encoded)
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
pub struct QuoteServiceConfig {
    pub base_url: String,
    /// Whether `GET /quotes/search/id/{id}` expects the caller's token
    pub read_auth_mode: UpstreamAuthMode,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    9081
}

fn default_quote_service_url() -> String {
    "http://quote-service:9082".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

/// Decode a base64-encoded PEM from `key`
pub(crate) fn decode_pem_var(key: &str) -> Result<String> {
    let encoded = env::var(key).with_context(|| format!("{key} must be set (base64-encoded PEM)"))?;
    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .with_context(|| format!("Failed to decode {key} from base64"))?;
    String::from_utf8(decoded).with_context(|| format!("{key} is not valid UTF-8"))
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

        let jwt = JwtConfig {
            public_key_pem: decode_pem_var("JWT_PUBLIC_KEY_PEM")?,
            issuer: env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
        };

        let read_auth_mode = match env::var("QUOTE_SERVICE_READ_AUTH") {
            Ok(raw) => raw
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid QUOTE_SERVICE_READ_AUTH")?,
            Err(_) => UpstreamAuthMode::default(),
        };

        let quote_service = QuoteServiceConfig {
            base_url: env::var("QUOTE_SERVICE_URL")
                .unwrap_or_else(|_| default_quote_service_url())
                .trim_end_matches('/')
                .to_string(),
            read_auth_mode,
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
            quote_service,
            request_timeout,
            database: DbConfig::from_env("account-service"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
