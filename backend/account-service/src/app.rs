//! Application state and route table

use crate::clients::QuoteBookmarks;
use crate::handlers;
use crate::models::Account;
use crate::repository::{AccountRepository, CounterRepository};
use crate::services::{AccountService, BookmarkService, UsageCounterEngine};
use access_control::{
    OwnershipLookup, OwnershipVerifier, Principal, PrincipalResolver, ResolvedAccount,
    UpstreamAuthMode,
};
use actix_web::web;
use error_types::ServiceError;
use record_store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;

/// Everything handlers need, shared through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PrincipalResolver>,
    pub accounts: AccountService,
    pub bookmarks: BookmarkService,
    pub usage: UsageCounterEngine,
    /// Backend name reported by `/health`
    pub store_kind: &'static str,
}

/// Remote collaborators of the account service
pub struct Upstreams {
    pub ownership: Arc<dyn OwnershipLookup>,
    pub ownership_mode: UpstreamAuthMode,
    pub bookmarks: Arc<dyn QuoteBookmarks>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        store_kind: &'static str,
        resolver: Arc<PrincipalResolver>,
        upstreams: Upstreams,
        request_timeout: Duration,
    ) -> Self {
        let accounts = AccountRepository::new(Arc::clone(&store), request_timeout);
        let counters = CounterRepository::new(store, request_timeout);
        let ownership = OwnershipVerifier::new(
            upstreams.ownership,
            upstreams.ownership_mode,
            request_timeout,
        );

        Self {
            resolver,
            accounts: AccountService::new(accounts.clone(), ownership),
            bookmarks: BookmarkService::new(accounts.clone(), upstreams.bookmarks, request_timeout),
            usage: UsageCounterEngine::new(accounts, counters),
            store_kind,
        }
    }

    /// Bind an authenticated principal to its account record
    pub async fn caller(&self, principal: Principal) -> Result<ResolvedAccount<Account>, ServiceError> {
        self.resolver
            .bind_account(principal, self.accounts.repository())
            .await
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServiceError::BadInput(err.to_string()).into()),
    )
    .route("/health", web::get().to(handlers::health::health_check))
    .service(
        web::scope("/users")
            .service(
                web::scope("/accounts")
                    .route("/create", web::post().to(handlers::accounts::create))
                    .route("/whoami", web::get().to(handlers::accounts::whoami))
                    .route(
                        "/search/email/{email}",
                        web::get().to(handlers::accounts::search_by_email),
                    )
                    .route("/search/{id}", web::get().to(handlers::accounts::search))
                    .route("/update/{id}", web::put().to(handlers::accounts::update))
                    .route("/delete/{id}", web::delete().to(handlers::accounts::delete))
                    .route(
                        "/insert/MyQuotes/{user_id}/{quote_id}",
                        web::put().to(handlers::accounts::insert_my_quote),
                    )
                    .route(
                        "/delete/MyQuotes/{user_id}/{quote_id}",
                        web::delete().to(handlers::accounts::remove_my_quote),
                    ),
            )
            .route(
                "/useQuote/use/{quote_id}",
                web::post().to(handlers::usage::use_quote),
            )
            .service(
                web::resource("/bookmarks/{quote_id}")
                    .route(web::put().to(handlers::bookmarks::add_bookmark))
                    .route(web::delete().to(handlers::bookmarks::remove_bookmark)),
            ),
    );
}
