use crate::clients::AccountReferences;
use crate::handlers;
use crate::repository::QuoteRepository;
use crate::services::{BookmarkCounterGuard, QuoteService};
use actix_web::web;
use error_types::ServiceError;
use record_store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub quotes: QuoteService,
    pub bookmarks: BookmarkCounterGuard,
    pub store_kind: &'static str,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        store_kind: &'static str,
        accounts: Arc<dyn AccountReferences>,
        request_timeout: Duration,
    ) -> Self {
        let repository = QuoteRepository::new(store, request_timeout);
        Self {
            quotes: QuoteService::new(repository.clone(), accounts, request_timeout),
            bookmarks: BookmarkCounterGuard::new(repository),
            store_kind,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServiceError::BadInput(err.to_string()).into()),
    )
    .route("/health", web::get().to(handlers::health::health_check))
    .service(
        web::scope("/quotes")
            .route("/create", web::post().to(handlers::quotes::create))
            .route("/search/id/{id}", web::get().to(handlers::quotes::search))
            .route("/delete/{id}", web::delete().to(handlers::quotes::delete))
            .route(
                "/bookmark/increment/{id}",
                web::put().to(handlers::bookmarks::increment),
            )
            .route(
                "/bookmark/decrement/{id}",
                web::delete().to(handlers::bookmarks::decrement),
            ),
    );
}
