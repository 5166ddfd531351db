use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Used whenever the fact API cannot deliver a fact.
pub const FALLBACK_FACT: &str = "Cats are cool!";

pub const DEFAULT_FACT_URL: &str = "https://catfact.ninja/fact";

#[derive(thiserror::Error, Debug)]
pub enum FactError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request failed with status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Fact API returned an empty fact")]
    Empty,
}

/// Source of fact text for records created without one.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn fetch(&self) -> Result<String, FactError>;
}

/// Body of the catfact.ninja `/fact` endpoint; `length` is ignored.
#[derive(Debug, Deserialize)]
struct FactResponse {
    fact: String,
}

#[derive(Clone, Debug)]
pub struct HttpFactSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFactSource {
    /// `timeout` bounds the whole request, connect through body.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FactError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FactSource for HttpFactSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, FactError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FactError::Status(status));
        }
        let body: FactResponse = resp.json().await?;
        if body.fact.trim().is_empty() {
            return Err(FactError::Empty);
        }
        debug!(len = body.fact.len(), "fact fetched");
        Ok(body.fact)
    }
}
