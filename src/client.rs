use crate::models::IssueRecord;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors performing a search request
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to create HTTP client: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed search response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Anything that can answer an issue search for the widget
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<IssueRecord>, ClientError>;
}

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    issue_search_autocomplete: &'a str,
}

/// HTTP client for the issue search endpoint
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    url: String,
    session_token: Option<String>,
}

impl SearchClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            session_token: None,
        })
    }

    /// Send `token` as a bearer credential
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Search for issues matching `term`.
    ///
    /// An empty term returns no results without a request. A non-2xx status
    /// is logged and treated as no results.
    pub async fn search(&self, term: &str) -> Result<Vec<IssueRecord>, ClientError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(&SearchPayload {
                issue_search_autocomplete: term,
            });
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Error fetching issues");
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        let records: Vec<IssueRecord> = serde_json::from_str(&body)?;
        debug!(term, results = records.len(), "Issue search completed");

        Ok(records)
    }
}

#[async_trait]
impl IssueSource for SearchClient {
    async fn search(&self, term: &str) -> Result<Vec<IssueRecord>, ClientError> {
        SearchClient::search(self, term).await
    }
}
