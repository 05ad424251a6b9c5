//! Quote lifecycle
//!
//! Creation and deletion also update the creator's `myQuotes` list in the
//! account service. That call is best effort: the quote write stands even
//! when the account service cannot be reached.

use crate::clients::AccountReferences;
use crate::models::{NewQuote, Quote};
use crate::repository::QuoteRepository;
use access_control::{ownership_match, LookupError};
use error_types::ServiceError;
use record_store::RecordId;
use resilience::with_timeout_result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct QuoteService {
    quotes: QuoteRepository,
    accounts: Arc<dyn AccountReferences>,
    timeout: Duration,
}

impl QuoteService {
    pub fn new(
        quotes: QuoteRepository,
        accounts: Arc<dyn AccountReferences>,
        timeout: Duration,
    ) -> Self {
        Self {
            quotes,
            accounts,
            timeout,
        }
    }

    pub fn repository(&self) -> &QuoteRepository {
        &self.quotes
    }

    pub async fn create(
        &self,
        creator: RecordId,
        body: NewQuote,
        auth_header: &str,
    ) -> Result<Quote, ServiceError> {
        let id = self.quotes.insert(body.into_document(creator)?).await?;
        info!(quote_id = %id, creator = %creator, "Quote created");

        let linked = with_timeout_result::<_, _, LookupError>(
            self.timeout,
            self.accounts
                .insert_reference(&creator.to_string(), &id, auth_header),
        )
        .await;
        if let Err(e) = linked {
            warn!(quote_id = %id, creator = %creator, error = %e, "Could not add quote to creator's list");
        }

        self.get(id).await
    }

    pub async fn get(&self, id: RecordId) -> Result<Quote, ServiceError> {
        self.quotes
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote not found"))
    }

    /// Delete a quote; only its creator may
    pub async fn delete(
        &self,
        caller: RecordId,
        id: RecordId,
        auth_header: &str,
    ) -> Result<(), ServiceError> {
        let quote = self.get(id).await?;
        ownership_match(&quote.creator, &caller.to_string())
            .into_result("Only the creator may delete this quote")?;

        if self.quotes.delete(id).await? == 0 {
            return Err(ServiceError::not_found("Quote not found"));
        }
        info!(quote_id = %id, "Quote deleted");

        let unlinked = with_timeout_result::<_, _, LookupError>(
            self.timeout,
            self.accounts
                .remove_reference(&quote.creator, &id, auth_header),
        )
        .await;
        if let Err(e) = unlinked {
            warn!(quote_id = %id, creator = %quote.creator, error = %e, "Could not remove quote from creator's list");
        }
        Ok(())
    }
}
