//! The search → detail → classify pipeline.
//!
//! Upstream failures never abort a run: a search that keeps failing yields no
//! identifiers, and a record whose detail fetch keeps failing is skipped.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

use crate::classify::AffiliationClassifier;
use crate::config::Config;
use crate::models::{ArticleDetail, RecordId, ReportRow};
use crate::sources::LiteratureSource;
use crate::utils::{with_retry, RetryConfig};

/// Errors that abort a fetch before any request is made
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("search query must not be empty")]
    EmptyQuery,
}

/// Runs one query against a [`LiteratureSource`] and builds report rows
#[derive(Debug, Clone)]
pub struct LiteratureFetcher {
    source: Arc<dyn LiteratureSource>,
    classifier: AffiliationClassifier,
    retry: RetryConfig,
    max_results: usize,
    concurrency: usize,
}

impl LiteratureFetcher {
    /// Create a fetcher with default limits and retry policy
    pub fn new(source: Arc<dyn LiteratureSource>, classifier: AffiliationClassifier) -> Self {
        Self::from_config(source, &Config::default()).with_classifier(classifier)
    }

    /// Create a fetcher from application configuration
    pub fn from_config(source: Arc<dyn LiteratureSource>, config: &Config) -> Self {
        Self {
            source,
            classifier: AffiliationClassifier::from_config(&config.classifier),
            retry: config.retry,
            max_results: config.search.max_results,
            concurrency: config.fetch.concurrency,
        }
    }

    pub fn with_classifier(mut self, classifier: AffiliationClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Resolve a query to record ids; empty when the source keeps failing
    pub async fn search(&self, query: &str) -> Vec<RecordId> {
        tracing::info!(source = self.source.id(), "Fetching papers for query: {}", query);

        let result = with_retry(self.retry, || self.source.search(query, self.max_results)).await;

        match result {
            Ok(mut ids) => {
                ids.truncate(self.max_results);
                tracing::info!("Found {} papers", ids.len());
                ids
            }
            Err(e) => {
                tracing::warn!(
                    "Search on {} failed, continuing with no results: {}",
                    self.source.name(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Fetch one record; `None` when the source keeps failing
    pub async fn fetch_detail(&self, id: &RecordId) -> Option<ArticleDetail> {
        match with_retry(self.retry, || self.source.fetch_detail(id)).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!("Skipping record {}: {}", id, e);
                None
            }
        }
    }

    /// Classify a fetched record into a report row, if any author qualifies
    pub fn build_row(&self, id: RecordId, detail: &ArticleDetail) -> Option<ReportRow> {
        let classification = self.classifier.classify(&detail.authors);
        if classification.is_fallback() {
            tracing::debug!("Record {}: no keyword match, reporting all authors", id);
        }
        ReportRow::new(id, detail, classification)
    }

    /// Run the whole pipeline for one query
    ///
    /// Rows come back in search order, whatever the configured concurrency.
    pub async fn fetch_papers(&self, query: &str) -> Result<Vec<ReportRow>, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FetchError::EmptyQuery);
        }

        let ids = self.search(query).await;
        let total = ids.len();

        let rows: Vec<Option<ReportRow>> = stream::iter(ids.into_iter().enumerate())
            .map(|(index, id)| async move {
                tracing::info!("Fetching record {} ({}/{})", id, index + 1, total);
                let detail = self.fetch_detail(&id).await;
                detail.and_then(|detail| self.build_row(id, &detail))
            })
            .buffered(self.concurrency.max(1))
            .collect()
            .await;

        let rows: Vec<ReportRow> = rows.into_iter().flatten().collect();
        tracing::info!("{} of {} records produced report rows", rows.len(), total);

        Ok(rows)
    }
}
