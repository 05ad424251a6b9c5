//! HTTP client for the quote service
//!
//! Serves two roles: the [`OwnershipLookup`] the ownership verifier calls,
//! and the bookmark counter calls made when an account bookmarks a quote.

use access_control::{LookupError, OwnershipLookup};
use async_trait::async_trait;
use error_types::ErrorKind;
use record_store::RecordId;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Remote bookmark counter of a quote
#[async_trait]
pub trait QuoteBookmarks: Send + Sync {
    async fn increment_bookmark(
        &self,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError>;

    async fn decrement_bookmark(
        &self,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError>;
}

#[derive(Debug, Deserialize)]
struct QuoteOwner {
    creator: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, LookupError> {
        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Unreachable(format!("{what}: {e}")))?;

        let status = response.status();
        debug!(what, status = status.as_u16(), "Quote service responded");
        if status.is_success() {
            return Ok(response);
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
impl OwnershipLookup for QuoteClient {
    async fn fetch_creator(
        &self,
        resource_id: &RecordId,
        authorization: Option<&str>,
    ) -> Result<String, LookupError> {
        let url = format!("{}/quotes/search/id/{}", self.base_url, resource_id);
        let mut request = self.client.get(url);
        if let Some(header) = authorization {
            request = request.header(AUTHORIZATION, header);
        }

        let response = self.send(request, "fetch quote").await?;
        let owner: QuoteOwner = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        owner
            .creator
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LookupError::Malformed("quote has no creator".into()))
    }
}

#[async_trait]
impl QuoteBookmarks for QuoteClient {
    async fn increment_bookmark(
        &self,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError> {
        let url = format!("{}/quotes/bookmark/increment/{}", self.base_url, quote_id);
        let request = self.client.put(url).header(AUTHORIZATION, authorization);
        self.send(request, "increment bookmark").await.map(|_| ())
    }

    async fn decrement_bookmark(
        &self,
        quote_id: &RecordId,
        authorization: &str,
    ) -> Result<(), LookupError> {
        let url = format!("{}/quotes/bookmark/decrement/{}", self.base_url, quote_id);
        let request = self.client.delete(url).header(AUTHORIZATION, authorization);
        self.send(request, "decrement bookmark").await.map(|_| ())
    }
}
