//! Debounced search state machine

use super::aggregator::MovieAggregator;
use super::history::{HistoryStore, SearchHistoryEntry};
use crate::config::SearchSettings;
use crate::providers::ProviderError;
use crate::results::{SearchFilters, SearchResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Read-only view of the orchestrator state for presentation
/// collaborators
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    pub query: String,
    pub filters: SearchFilters,
    pub results: Option<SearchResult>,
    pub is_loading: bool,
    pub error: Option<ProviderError>,
    pub history: Vec<SearchHistoryEntry>,
}

struct SearchState {
    query: String,
    filters: SearchFilters,
    results: Option<SearchResult>,
    is_loading: bool,
    error: Option<ProviderError>,
}

/// Owns the search state machine: staged query text, debounced issue,
/// in-flight tracking, settled results or error, and history.
///
/// Every issued search carries a monotonically increasing generation;
/// a settling response may write state only while its generation is
/// still the latest issued, so a slow stale response can never
/// overwrite fresh state. The orchestrator is the final error boundary:
/// failures land in the `error` slot, never in the caller's lap.
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    aggregator: Arc<MovieAggregator>,
    state: RwLock<SearchState>,
    history: HistoryStore,
    latest_generation: AtomicU64,
    debounce_timer: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
    min_query_len: usize,
}

impl SearchOrchestrator {
    pub fn new(
        aggregator: Arc<MovieAggregator>,
        history: HistoryStore,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            inner: Arc::new(OrchestratorInner {
                aggregator,
                state: RwLock::new(SearchState {
                    query: String::new(),
                    filters: SearchFilters::default(),
                    results: None,
                    is_loading: false,
                    error: None,
                }),
                history,
                latest_generation: AtomicU64::new(0),
                debounce_timer: Mutex::new(None),
                debounce: settings.debounce(),
                min_query_len: settings.min_query_len,
            }),
        }
    }

    /// Stage typed input. Each call cancels the previous pending
    /// debounce timer; once no further input arrives for the debounce
    /// interval and the trimmed text meets the minimum length, a search
    /// is issued. Shorter input clears the pending call without issuing.
    pub fn set_query(&self, text: &str) {
        self.cancel_debounce();
        self.inner.state.write().unwrap().query = text.to_string();

        if text.trim().chars().count() < self.inner.min_query_len {
            return;
        }

        let inner = self.inner.clone();
        let query = text.to_string();
        let debounce = self.inner.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // The generation is reserved here, at issue time, so any
            // later submission always outranks this search no matter
            // how the tasks get scheduled. Issued as its own task:
            // cancelling a later keystroke's timer must not cancel a
            // search already in flight.
            let generation = inner.next_generation();
            tokio::spawn(run_search(inner, query, generation));
        });

        *self.inner.debounce_timer.lock().unwrap() = Some(timer);
    }

    /// Explicit submission: bypasses the debounce, appends to history
    /// unconditionally, and resolves when the search settles.
    pub async fn submit(&self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            return;
        }

        self.cancel_debounce();
        self.inner.state.write().unwrap().query = query.to_string();
        self.inner.history.add(query);

        // Reserved before the first await: a submission outranks every
        // search issued before it
        let generation = self.inner.next_generation();
        run_search(self.inner.clone(), query.to_string(), generation).await;
    }

    /// Merge partial filters into the current filter set
    pub fn set_filters(&self, filters: SearchFilters) {
        self.inner.state.write().unwrap().filters.merge(filters);
    }

    /// Record a query in the history, independent of the state machine
    pub fn add_to_history(&self, query: &str) {
        self.inner.history.add(query);
    }

    /// Clear the persisted history
    pub fn clear_history(&self) {
        self.inner.history.clear();
    }

    /// Full read-only state snapshot
    pub fn snapshot(&self) -> SearchSnapshot {
        let state = self.inner.state.read().unwrap();
        SearchSnapshot {
            query: state.query.clone(),
            filters: state.filters.clone(),
            results: state.results.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            history: self.inner.history.entries(),
        }
    }

    pub fn query(&self) -> String {
        self.inner.state.read().unwrap().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().unwrap().is_loading
    }

    pub fn results(&self) -> Option<SearchResult> {
        self.inner.state.read().unwrap().results.clone()
    }

    pub fn error(&self) -> Option<ProviderError> {
        self.inner.state.read().unwrap().error.clone()
    }

    pub fn history(&self) -> Vec<SearchHistoryEntry> {
        self.inner.history.entries()
    }

    fn cancel_debounce(&self) {
        if let Some(timer) = self.inner.debounce_timer.lock().unwrap().take() {
            timer.abort();
        }
    }
}

impl OrchestratorInner {
    /// Reserve the next search generation. Must happen at issue time,
    /// before the search future is spawned or first awaited, so issue
    /// order and generation order always agree.
    fn next_generation(&self) -> u64 {
        self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Run one already-issued search and write its outcome back, unless a
/// newer search was issued while this one was in flight.
async fn run_search(inner: Arc<OrchestratorInner>, query: String, generation: u64) {
    let filters = {
        let mut state = inner.state.write().unwrap();
        state.is_loading = true;
        state.filters.clone()
    };

    let outcome = inner.aggregator.search_movies(&query, &filters, 1).await;

    let mut state = inner.state.write().unwrap();
    if inner.latest_generation.load(Ordering::SeqCst) != generation {
        debug!("discarding superseded search response for '{}'", query);
        return;
    }

    state.is_loading = false;
    match outcome {
        Ok(result) => {
            state.results = Some(result);
            state.error = None;
        }
        Err(err) => {
            // No stale data under a failed query
            state.results = None;
            state.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::config::{TmdbSettings, WatchmodeSettings};
    use crate::providers::{TmdbProvider, WatchmodeProvider};
    use crate::transport::ApiClient;
    use tempfile::TempDir;

    /// An aggregator with no availability key: every search settles
    /// quickly with `NoApiKey`, which is enough to drive the state
    /// machine without a network.
    fn keyless_orchestrator(dir: &TempDir) -> SearchOrchestrator {
        let client = ApiClient::new().unwrap();
        let aggregator = Arc::new(MovieAggregator::new(
            WatchmodeProvider::new(client.clone(), &WatchmodeSettings::default()),
            TmdbProvider::new(client, &TmdbSettings::default()),
            ResponseCache::default(),
        ));
        let history = HistoryStore::load(dir.path().join("history.json"), 10);
        SearchOrchestrator::new(aggregator, history, &SearchSettings::default())
    }

    #[tokio::test]
    async fn test_short_query_schedules_nothing() {
        let dir = TempDir::new().unwrap();
        let orchestrator = keyless_orchestrator(&dir);

        orchestrator.set_query("ab");
        tokio::time::sleep(Duration::from_millis(400)).await;

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.query, "ab");
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        assert!(snapshot.results.is_none());
    }

    #[tokio::test]
    async fn test_submit_is_the_error_boundary() {
        let dir = TempDir::new().unwrap();
        let orchestrator = keyless_orchestrator(&dir);

        orchestrator.submit("dune").await;

        let snapshot = orchestrator.snapshot();
        assert!(matches!(
            snapshot.error,
            Some(ProviderError::NoApiKey { .. })
        ));
        assert!(snapshot.results.is_none());
        assert!(!snapshot.is_loading);
        // Submission appends to history even when the search fails
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].query, "dune");
    }

    #[tokio::test]
    async fn test_submit_ignores_blank_input() {
        let dir = TempDir::new().unwrap();
        let orchestrator = keyless_orchestrator(&dir);

        orchestrator.submit("   ").await;
        assert!(orchestrator.history().is_empty());
        assert!(orchestrator.error().is_none());
    }

    #[tokio::test]
    async fn test_set_filters_merges() {
        let dir = TempDir::new().unwrap();
        let orchestrator = keyless_orchestrator(&dir);

        orchestrator.set_filters(SearchFilters {
            genre: Some("horror".to_string()),
            ..Default::default()
        });
        orchestrator.set_filters(SearchFilters {
            year: Some(1982),
            ..Default::default()
        });

        let filters = orchestrator.snapshot().filters;
        assert_eq!(filters.genre.as_deref(), Some("horror"));
        assert_eq!(filters.year, Some(1982));
    }

    #[tokio::test]
    async fn test_clear_history() {
        let dir = TempDir::new().unwrap();
        let orchestrator = keyless_orchestrator(&dir);

        orchestrator.add_to_history("dune");
        orchestrator.add_to_history("alien");
        assert_eq!(orchestrator.history().len(), 2);

        orchestrator.clear_history();
        assert!(orchestrator.history().is_empty());
    }
}
