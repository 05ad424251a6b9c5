//! Bookmark counter of a quote
//!
//! Each change is a single conditional update; the floor at zero is part of
//! the filter, so concurrent decrements can never take the counter negative.

use crate::models::fields;
use crate::repository::QuoteRepository;
use error_types::ServiceError;
use record_store::{Filter, RecordId, Update};
use tracing::debug;

#[derive(Clone)]
pub struct BookmarkCounterGuard {
    quotes: QuoteRepository,
}

impl BookmarkCounterGuard {
    pub fn new(quotes: QuoteRepository) -> Self {
        Self { quotes }
    }

    pub async fn increment(&self, quote_id: RecordId) -> Result<(), ServiceError> {
        let modified = self
            .quotes
            .update(&Filter::by_id(quote_id), &Update::new().inc(fields::BOOKMARKS, 1))
            .await?;
        if modified == 0 {
            return Err(ServiceError::not_found("Quote not found"));
        }
        debug!(quote_id = %quote_id, "Bookmark count incremented");
        Ok(())
    }

    pub async fn decrement(&self, quote_id: RecordId) -> Result<(), ServiceError> {
        let filter = Filter::by_id(quote_id).gte(fields::BOOKMARKS, 1);
        let modified = self
            .quotes
            .update(&filter, &Update::new().inc(fields::BOOKMARKS, -1))
            .await?;
        if modified == 1 {
            debug!(quote_id = %quote_id, "Bookmark count decremented");
            return Ok(());
        }

        // Nothing matched: either the quote is gone or the counter is at 0
        match self.quotes.find_by_id(quote_id).await? {
            None => Err(ServiceError::not_found("Quote not found")),
            Some(_) => Err(ServiceError::Conflict(
                "Bookmark count is already zero".into(),
            )),
        }
    }
}
