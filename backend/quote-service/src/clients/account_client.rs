//! HTTP client for the account service's "my quotes" list

use access_control::LookupError;
use async_trait::async_trait;
use error_types::ErrorKind;
use record_store::RecordId;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

/// Keeps the creator's `myQuotes` list in step with quote creation and deletion
#[async_trait]
pub trait AccountReferences: Send + Sync {
    async fn insert_reference(
        &self,
        account_id: &str,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError>;

    async fn remove_reference(
        &self,
        account_id: &str,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError>;
}

#[derive(Debug, Clone)]
pub struct AccountClient {
    client: Client,
    base_url: String,
}

impl AccountClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn my_quotes_url(&self, action: &str, account_id: &str, quote_id: &RecordId) -> String {
        format!(
            "{}/users/accounts/{}/MyQuotes/{}/{}",
            self.base_url, action, account_id, quote_id
        )
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<(), LookupError> {
        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Unreachable(format!("{what}: {e}")))?;

        let status = response.status();
        debug!(what, status = status.as_u16(), "Account service responded");
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(match ErrorKind::from_status(status.as_u16()) {
            ErrorKind::NotFound => LookupError::NotFound(format!("{what}: {body}")),
            ErrorKind::Conflict => LookupError::Conflict(format!("{what}: {body}")),
            _ => LookupError::Unreachable(format!("{what}: HTTP {status}: {body}")),
        })
    }
}

#[async_trait]
impl AccountReferences for AccountClient {
    async fn insert_reference(
        &self,
        account_id: &str,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError> {
        let request = self
            .client
            .put(self.my_quotes_url("insert", account_id, quote_id))
            .header(AUTHORIZATION, authorization);
        self.send(request, "insert quote reference").await
    }

    async fn remove_reference(
        &self,
        account_id: &str,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError> {
        let request = self
            .client
            .delete(self.my_quotes_url("delete", account_id, quote_id))
            .header(AUTHORIZATION, authorization);
        self.send(request, "remove quote reference").await
    }
}
