//! Bookmark list with remote counter upkeep
//!
//! Adding a bookmark writes the account's `bookmarkedQuotes` first, then
//! bumps the quote's counter in the quote service. There is no transaction
//! spanning the two services: when the remote call fails the local write is
//! reverted, so a retry starts from a clean state. A definite answer from the
//! quote service (unknown quote, counter already at zero) keeps its kind;
//! anything else surfaces as `UpstreamUnavailable`.

use crate::clients::QuoteBookmarks;
use crate::models::{fields, Account};
use crate::repository::AccountRepository;
use access_control::{LookupError, ResolvedAccount};
use error_types::ServiceError;
use record_store::{Filter, RecordId, Update};
use resilience::with_timeout_result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Add,
    Remove,
}

impl Direction {
    fn inverse(self) -> Self {
        match self {
            Direction::Add => Direction::Remove,
            Direction::Remove => Direction::Add,
        }
    }
}

#[derive(Clone)]
pub struct BookmarkService {
    accounts: AccountRepository,
    quotes: Arc<dyn QuoteBookmarks>,
    timeout: Duration,
}

impl BookmarkService {
    pub fn new(
        accounts: AccountRepository,
        quotes: Arc<dyn QuoteBookmarks>,
        timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            quotes,
            timeout,
        }
    }

    pub async fn add(
        &self,
        caller: &ResolvedAccount<Account>,
        quote_id: RecordId,
        auth_header: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.apply(caller, quote_id, auth_header, Direction::Add).await
    }

    pub async fn remove(
        &self,
        caller: &ResolvedAccount<Account>,
        quote_id: RecordId,
        auth_header: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.apply(caller, quote_id, auth_header, Direction::Remove).await
    }

    async fn apply(
        &self,
        caller: &ResolvedAccount<Account>,
        quote_id: RecordId,
        auth_header: &str,
        direction: Direction,
    ) -> Result<Vec<String>, ServiceError> {
        let account_id = caller.account_id;
        let key = quote_id.to_string();

        let modified = self
            .accounts
            .update(
                &local_filter(account_id, &key, direction),
                &local_update(&key, direction),
            )
            .await?;
        if modified == 0 {
            return Err(match direction {
                Direction::Add => ServiceError::Conflict("Quote already bookmarked".into()),
                Direction::Remove => ServiceError::Conflict("Quote is not bookmarked".into()),
            });
        }

        if let Err(e) = self.call_remote(&quote_id, auth_header, direction).await {
            self.revert(account_id, &key, direction, &e).await;
            return Err(remote_failure(e));
        }

        info!(account_id = %account_id, quote_id = %quote_id, ?direction, "Bookmark updated");
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account not found"))?;
        Ok(account.bookmarked_quotes)
    }

    async fn call_remote(
        &self,
        quote_id: &RecordId,
        auth_header: &str,
        direction: Direction,
    ) -> Result<(), LookupError> {
        match direction {
            Direction::Add => {
                let call = self.quotes.increment_bookmark(quote_id, auth_header);
                with_timeout_result(self.timeout, call).await
            }
            Direction::Remove => {
                let call = self.quotes.decrement_bookmark(quote_id, auth_header);
                with_timeout_result(self.timeout, call).await
            }
        }
    }

    async fn revert(
        &self,
        account_id: RecordId,
        key: &str,
        direction: Direction,
        cause: &LookupError,
    ) {
        warn!(
            account_id = %account_id,
            quote_id = key,
            ?direction,
            error = %cause,
            "Quote service rejected bookmark change, reverting local write"
        );

        let inverse = direction.inverse();
        let reverted = self
            .accounts
            .update(
                &local_filter(account_id, key, inverse),
                &local_update(key, inverse),
            )
            .await;
        if let Err(e) = reverted {
            error!(
                account_id = %account_id,
                quote_id = key,
                error = %e,
                "Bookmark revert failed; account and quote counters disagree"
            );
        }
    }
}

/// Keep the quote service's own verdict where it has one
fn remote_failure(err: LookupError) -> ServiceError {
    match err {
        LookupError::NotFound(msg) => ServiceError::NotFound(msg),
        LookupError::Conflict(msg) => ServiceError::Conflict(msg),
        other => ServiceError::from(other),
    }
}

fn local_filter(account_id: RecordId, key: &str, direction: Direction) -> Filter {
    match direction {
        Direction::Add => Filter::by_id(account_id).not_contains(fields::BOOKMARKED_QUOTES, key),
        Direction::Remove => Filter::by_id(account_id).contains(fields::BOOKMARKED_QUOTES, key),
    }
}

fn local_update(key: &str, direction: Direction) -> Update {
    match direction {
        Direction::Add => Update::new().add_to_set(fields::BOOKMARKED_QUOTES, key),
        Direction::Remove => Update::new().pull(fields::BOOKMARKED_QUOTES, key),
    }
}
