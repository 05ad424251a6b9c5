use access_control::PrincipalResolver;
use actix_middleware::{CorrelationIdMiddleware, JwtAuthMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use crypto_core::jwt::TokenVerifier;
use quote_service::clients::AccountClient;
use quote_service::{configure, AppState, Config};
use record_store::{DocumentStore, MemoryStore, PgDocumentStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,quote_service=debug,actix_web=info".into());

    if std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn DocumentStore>, &'static str)> {
    let Some(db) = config.database.clone() else {
        if config.is_production() {
            bail!("DATABASE_URL is required in production");
        }
        warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
        return Ok((Arc::new(MemoryStore::new()), "memory"));
    };

    db.log_config();
    let pool = db_pool::create_pool(db)
        .await
        .context("Failed to connect to database")?;
    let store = PgDocumentStore::new(pool);
    store.migrate().await.context("Failed to run migrations")?;
    Ok((Arc::new(store), "postgres"))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(env = %config.app.env, "Starting quote-service");

    let mut verifier = TokenVerifier::from_rsa_pem(&config.jwt.public_key_pem)
        .context("Failed to load JWT public key")?;
    if let Some(issuer) = &config.jwt.issuer {
        verifier = verifier.with_issuer(issuer);
    }
    let resolver = Arc::new(PrincipalResolver::new(verifier));

    let (store, store_kind) = open_store(&config).await?;

    let accounts = Arc::new(
        AccountClient::new(&config.account_service.base_url, config.request_timeout)
            .context("Failed to build account service client")?,
    );
    info!(url = %config.account_service.base_url, "Account service client ready");

    let state = AppState::new(store, store_kind, accounts, config.request_timeout);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!(address = %bind_address, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(JwtAuthMiddleware::new(Arc::clone(&resolver)))
            .wrap(CorrelationIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await?;

    Ok(())
}
