//! Usage counter engine
//!
//! Per (account, quote) there is at most one usage counter, reachable
//! through `account.usedQuotes[quoteId]`. The presence of that entry is the
//! whole state: absent means the quote was never used, present means every
//! later use increments the linked counter.
//!
//! A first use takes two single-document writes in two collections:
//!
//! 1. insert a counter `{count: 1, lastUsedAt: now}`
//! 2. link it with an insert-if-absent update on the account
//!
//! If step 2 matches nothing, another request linked first (or the account
//! disappeared). The unlinked counter is deleted and the use is applied to
//! the winner's counter, so concurrent first uses are both counted. If step 2
//! fails outright the counter stays orphaned; it is never reachable and only
//! costs storage, so it is logged rather than rolled back.

use crate::models::{fields, UsageRecord};
use crate::repository::{AccountRepository, CounterRepository};
use chrono::{DateTime, SubsecRound, Utc};
use error_types::ServiceError;
use record_store::{Filter, RecordId, Update};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct UsageCounterEngine {
    accounts: AccountRepository,
    counters: CounterRepository,
}

impl UsageCounterEngine {
    pub fn new(accounts: AccountRepository, counters: CounterRepository) -> Self {
        Self { accounts, counters }
    }

    /// Record one use of `quote_id` by `account_id`
    pub async fn record_use(
        &self,
        account_id: RecordId,
        quote_id: RecordId,
    ) -> Result<UsageRecord, ServiceError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account not found"))?;

        // Stored timestamps keep microseconds
        let now = Utc::now().trunc_subsecs(6);
        let key = quote_id.to_string();

        match account.used_quotes.get(&key) {
            Some(counter_id) => {
                let counter_id = parse_counter_id(counter_id)?;
                self.repeat_use(counter_id, now).await
            }
            None => self.first_use(account_id, &key, now).await,
        }
    }

    async fn first_use(
        &self,
        account_id: RecordId,
        quote_key: &str,
        now: DateTime<Utc>,
    ) -> Result<UsageRecord, ServiceError> {
        let counter_id = self.counters.insert_first_use(now).await?;

        let link_filter = Filter::by_id(account_id).key_absent(fields::USED_QUOTES, quote_key);
        let link = Update::new().set_entry(fields::USED_QUOTES, quote_key, counter_id.to_string());

        let linked = match self.accounts.update(&link_filter, &link).await {
            Ok(linked) => linked,
            Err(e) => {
                warn!(
                    counter_id = %counter_id,
                    account_id = %account_id,
                    quote_id = quote_key,
                    error = %e,
                    "Usage counter orphaned: link write failed"
                );
                return Err(e);
            }
        };

        if linked == 1 {
            debug!(counter_id = %counter_id, account_id = %account_id, quote_id = quote_key, "First use recorded");
            return Ok(UsageRecord {
                counter_id,
                count: 1,
                last_used_at: now,
                first_use: true,
            });
        }

        let current = self.accounts.find_by_id(account_id).await;
        self.discard_unlinked(counter_id).await;

        let Some(account) = current? else {
            return Err(ServiceError::not_found("Account not found"));
        };
        match account.used_quotes.get(quote_key) {
            Some(winner) => {
                let winner = parse_counter_id(winner)?;
                info!(
                    account_id = %account_id,
                    quote_id = quote_key,
                    winner = %winner,
                    "Lost first-use race, counting against the linked counter"
                );
                self.repeat_use(winner, now).await
            }
            // The link was added and removed again between our two reads
            None => Err(ServiceError::Conflict(
                "Usage link changed concurrently".to_string(),
            )),
        }
    }

    async fn repeat_use(
        &self,
        counter_id: RecordId,
        now: DateTime<Utc>,
    ) -> Result<UsageRecord, ServiceError> {
        let modified = self.counters.record_repeat_use(counter_id, now).await?;
        if modified == 0 {
            return Err(ServiceError::not_found("Usage counter not found"));
        }

        let counter = self
            .counters
            .find(counter_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Usage counter not found"))?;

        Ok(UsageRecord {
            counter_id,
            count: counter.count,
            last_used_at: counter.last_used_at,
            first_use: false,
        })
    }

    /// Compensating delete of a counter that never got linked
    async fn discard_unlinked(&self, counter_id: RecordId) {
        match self.counters.delete(counter_id).await {
            Ok(_) => debug!(counter_id = %counter_id, "Discarded unlinked usage counter"),
            Err(e) => warn!(
                counter_id = %counter_id,
                error = %e,
                "Usage counter orphaned: compensating delete failed"
            ),
        }
    }
}

fn parse_counter_id(raw: &str) -> Result<RecordId, ServiceError> {
    RecordId::parse(raw, fields::USED_QUOTES)
        .map_err(|e| ServiceError::Internal(format!("Stored usage link is malformed: {e}")))
}
