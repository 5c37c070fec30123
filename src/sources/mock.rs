//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{ArticleDetail, AuthorRecord, RecordId};
use crate::sources::{LiteratureSource, SourceError};

/// A mock source for testing that returns predefined records.
///
/// Failures can be injected per stage: the next `n` calls of that stage fail
/// with a network error before the canned data is served again.
#[derive(Debug, Default)]
pub struct MockSource {
    ids: Mutex<Vec<RecordId>>,
    details: Mutex<HashMap<RecordId, ArticleDetail>>,
    search_failures: AtomicUsize,
    detail_failures: Mutex<HashMap<RecordId, usize>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record returned by search and by detail fetch.
    pub fn with_record(self, id: &str, detail: ArticleDetail) -> Self {
        let id = RecordId::from(id);
        self.ids.lock().unwrap().push(id.clone());
        self.details.lock().unwrap().insert(id, detail);
        self
    }

    /// Add an id returned by search that has no detail (fetch reports not found).
    pub fn with_missing_record(self, id: &str) -> Self {
        self.ids.lock().unwrap().push(RecordId::from(id));
        self
    }

    /// Fail the next `count` search calls.
    pub fn fail_search(self, count: usize) -> Self {
        self.search_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Fail the next `count` detail fetches of one record.
    pub fn fail_detail(self, id: &str, count: usize) -> Self {
        self.detail_failures
            .lock()
            .unwrap()
            .insert(RecordId::from(id), count);
        self
    }

    /// Number of search calls made so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of detail fetches made so far, across all records.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiteratureSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<RecordId>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.search_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.search_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SourceError::Network("mock search failure".to_string()));
        }

        let ids = self.ids.lock().unwrap();
        Ok(ids.iter().take(max_results).cloned().collect())
    }

    async fn fetch_detail(&self, id: &RecordId) -> Result<ArticleDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(remaining) = self.detail_failures.lock().unwrap().get_mut(id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SourceError::Network(format!("mock fetch failure for {}", id)));
            }
        }

        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

/// Helper function to create a record detail with one author per affiliation.
pub fn make_detail(title: &str, authors: &[(&str, &str)]) -> ArticleDetail {
    ArticleDetail {
        title: title.to_string(),
        publication_date: String::new(),
        authors: authors
            .iter()
            .map(|(name, affiliation)| AuthorRecord {
                name: name.to_string(),
                affiliation: affiliation.to_string(),
            })
            .collect(),
        email: String::new(),
    }
}
