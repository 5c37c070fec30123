//! Literature database clients.
//!
//! The [`LiteratureSource`] trait is the seam between the fetch pipeline and
//! the upstream database. [`PubMedSource`] talks to NCBI E-utilities;
//! [`MockSource`] serves canned data for tests.
//!
//! Implementations perform exactly one upstream attempt per call. Retrying
//! and the fail-soft policy live in [`LiteratureFetcher`](crate::fetcher::LiteratureFetcher).

mod pubmed;

pub mod mock;

pub use mock::MockSource;
pub use pubmed::{compose_date, extract_detail, PubMedSource, DEFAULT_EUTILS_BASE_URL};

use crate::models::{ArticleDetail, RecordId};
use crate::utils::XmlError;
use async_trait::async_trait;

/// A searchable literature database with per-record detail lookup
#[async_trait]
pub trait LiteratureSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for records matching the query, returning at most `max_results` ids
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RecordId>, SourceError>;

    /// Fetch and extract one record
    async fn fetch_detail(&self, id: &RecordId) -> Result<ArticleDetail, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API error: {0}")]
    Api(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Malformed response body (JSON or XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl SourceError {
    /// Whether the failure may go away on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::Network(_)
                | SourceError::Api(_)
                | SourceError::RateLimit
                | SourceError::Parse(_)
        )
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<XmlError> for SourceError {
    fn from(err: XmlError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
