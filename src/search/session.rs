/// Search session: current query, filters, results and history
use super::client::PageFetcher;
use super::extractor::ResultExtractor;
use super::intent::{QueryIntentAnalyzer, SearchFilters, SearchIntent};
use super::request::{build_search_url, DEFAULT_BASE_URL};
use super::{SearchError, VideoRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Session settings derived from configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Search-results endpoint
    pub base_url: String,
    /// Records kept per fetched batch
    pub max_results: usize,
    /// Infer filters from the query text
    pub smart_filters: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: 25,
            smart_filters: true,
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No search has run yet
    Idle,
    /// At least one search ran, possibly with zero results
    HasResults,
}

/// A completed search, kept for the `history` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    /// Filters actually sent with the request
    pub filters: SearchFilters,
    pub result_count: usize,
    /// Failure description when the search produced no batch
    pub error: Option<String>,
    pub searched_at: DateTime<Utc>,
}

/// Outcome of one fetch-and-extract round
#[derive(Debug)]
pub struct BatchReport {
    pub query: String,
    /// Filters actually sent with the request
    pub filters: SearchFilters,
    /// Inferred intent, when smart filters are on
    pub intent: Option<SearchIntent>,
    /// Records added by this batch
    pub added: usize,
    /// Records held by the session afterwards
    pub total: usize,
    /// Why the batch is empty, if it failed
    pub error: Option<SearchError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Orchestrates searches over a page fetcher.
///
/// Every operation leaves the session usable: failures become empty batches
/// described in the returned [`BatchReport`].
pub struct SearchSession<F: PageFetcher> {
    fetcher: F,
    extractor: ResultExtractor,
    analyzer: QueryIntentAnalyzer,
    options: SessionOptions,
    state: SessionState,
    query: String,
    /// Explicit filters only; inferred ones are recomputed per query
    filters: SearchFilters,
    last_intent: Option<SearchIntent>,
    results: Vec<VideoRecord>,
    offset: usize,
    history: Vec<HistoryEntry>,
}

impl<F: PageFetcher> SearchSession<F> {
    pub fn new(fetcher: F, options: SessionOptions) -> Self {
        Self {
            fetcher,
            extractor: ResultExtractor::new(),
            analyzer: QueryIntentAnalyzer::new(),
            options,
            state: SessionState::Idle,
            query: String::new(),
            filters: SearchFilters::new(),
            last_intent: None,
            results: Vec::new(),
            offset: 0,
            history: Vec::new(),
        }
    }

    /// Run a new search, replacing the current results
    pub async fn search(&mut self, query: &str, filters: Option<SearchFilters>) -> BatchReport {
        self.query = query.trim().to_string();
        self.filters = filters.unwrap_or_default();
        info!("Searching for '{}'", self.query);

        let (effective, intent) = self.effective_filters();
        let outcome = self.fetch_batch(&effective).await;

        self.results.clear();
        self.offset = 0;
        let (added, error) = match outcome {
            Ok(batch) => {
                let added = batch.len();
                self.results = batch;
                (added, None)
            }
            Err(e) => {
                warn!("Search for '{}' failed: {}", self.query, e);
                (0, Some(e))
            }
        };

        self.state = SessionState::HasResults;
        self.last_intent = intent.clone();
        self.history.push(HistoryEntry {
            query: self.query.clone(),
            filters: effective.clone(),
            result_count: added,
            error: error.as_ref().map(|e| e.to_string()),
            searched_at: Utc::now(),
        });

        BatchReport {
            query: self.query.clone(),
            filters: effective,
            intent,
            added,
            total: self.results.len(),
            error,
        }
    }

    /// Search again with extra terms appended to the current query
    pub async fn refine(&mut self, extra_terms: &str) -> BatchReport {
        let query = format!("{} {}", self.query, extra_terms.trim());
        let filters = self.filters.clone();
        self.search(query.trim(), Some(filters)).await
    }

    /// Fetch another batch for the current query and append it.
    ///
    /// Records are not deduplicated; the page may repeat entries.
    pub async fn load_more(&mut self) -> Result<BatchReport, SearchError> {
        if self.state == SessionState::Idle {
            return Err(SearchError::NoActiveSearch);
        }

        let (effective, intent) = self.effective_filters();
        let outcome = self.fetch_batch(&effective).await;

        let (added, error) = match outcome {
            Ok(batch) => {
                self.offset = self.results.len();
                let added = batch.len();
                self.results.extend(batch);
                (added, None)
            }
            Err(e) => {
                warn!("Loading more results for '{}' failed: {}", self.query, e);
                (0, Some(e))
            }
        };
        debug!("Session now holds {} records", self.results.len());

        Ok(BatchReport {
            query: self.query.clone(),
            filters: effective,
            intent,
            added,
            total: self.results.len(),
            error,
        })
    }

    /// Set one explicit filter and re-run the current query.
    ///
    /// Before any search the filter is only stored, and `None` is returned.
    pub async fn set_filter(&mut self, key: &str, value: &str) -> Result<Option<BatchReport>, SearchError> {
        self.filters.set(key, value)?;
        info!("Filters now: {}", self.filters);

        if self.state == SessionState::Idle {
            return Ok(None);
        }

        let query = self.query.clone();
        let filters = self.filters.clone();
        Ok(Some(self.search(&query, Some(filters)).await))
    }

    /// Replace explicit filters without searching again
    pub fn set_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
    }

    /// Drop explicit filters without searching again
    pub fn clear_filters(&mut self) {
        self.filters = SearchFilters::new();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn results(&self) -> &[VideoRecord] {
        &self.results
    }

    /// Number of records that preceded the most recent batch
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_intent(&self) -> Option<&SearchIntent> {
        self.last_intent.as_ref()
    }

    fn effective_filters(&self) -> (SearchFilters, Option<SearchIntent>) {
        if !self.options.smart_filters {
            return (self.filters.clone(), None);
        }

        let intent = self.analyzer.analyze(&self.query);
        let effective = SearchFilters::merge(&intent.filters, &self.filters);
        (effective, Some(intent))
    }

    async fn fetch_batch(&self, filters: &SearchFilters) -> Result<Vec<VideoRecord>, SearchError> {
        let url = build_search_url(&self.options.base_url, &self.query, filters)
            .map_err(|e| SearchError::Fetch(format!("{:#}", e)))?;

        let page = self
            .fetcher
            .fetch_page(&url)
            .await
            .map_err(|e| SearchError::Fetch(format!("{:#}", e)))?;

        Ok(self.extractor.try_extract(&page, self.options.max_results)?)
    }
}
