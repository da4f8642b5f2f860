//! Search orchestrator integration tests: debounce, minimum length
//! gating, the stale-response ordering guarantee, history, and error
//! surfacing.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use streamseek::cache::ResponseCache;
use streamseek::config::{
    RetrySettings, SearchSettings, TmdbSettings, TransportSettings, WatchmodeSettings,
};
use streamseek::providers::{ProviderError, TmdbProvider, WatchmodeProvider};
use streamseek::search::{HistoryStore, MovieAggregator, SearchOrchestrator};
use streamseek::transport::{ApiClient, TransportError};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator_for(server: &MockServer, dir: &TempDir) -> SearchOrchestrator {
    orchestrator_with_transport(server, dir, &fast_transport())
}

fn fast_transport() -> TransportSettings {
    TransportSettings {
        retry: RetrySettings {
            max_attempts: 3,
            base_delay_ms: 10,
        },
        ..Default::default()
    }
}

fn orchestrator_with_transport(
    server: &MockServer,
    dir: &TempDir,
    transport: &TransportSettings,
) -> SearchOrchestrator {
    let client = ApiClient::with_settings(transport).unwrap();
    let aggregator = Arc::new(MovieAggregator::new(
        WatchmodeProvider::new(
            client.clone(),
            &WatchmodeSettings {
                base_url: server.uri(),
                api_key: Some("wm-key".to_string()),
            },
        ),
        TmdbProvider::new(
            client,
            &TmdbSettings {
                base_url: "https://api.tmdb.invalid/3".to_string(),
                image_base: "https://img.invalid/t/p".to_string(),
                api_key: None,
            },
        ),
        ResponseCache::default(),
    ));
    let history = HistoryStore::load(dir.path().join("history.json"), 10);
    let settings = SearchSettings {
        debounce_ms: 10,
        min_query_len: 3,
    };
    SearchOrchestrator::new(aggregator, history, &settings)
}

/// A search envelope with one title and no metadata cross-reference, so
/// no enrichment calls are needed
fn one_title(id: u64, title: &str) -> serde_json::Value {
    json!({
        "title_results": [{
            "id": id,
            "title": title,
            "year": 2005,
            "user_rating": 7.0
        }],
        "total_results": 1,
        "total_pages": 1,
        "page": 1
    })
}

async fn mount_query(server: &MockServer, value: &str, body: serde_json::Value, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("search_value", value))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_submit_populates_results_and_history() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_query(&server, "batman", one_title(1, "Batman Begins"), 0).await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.submit("batman").await;

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.is_loading);
    assert!(snapshot.error.is_none());
    let results = snapshot.results.expect("results populated");
    assert_eq!(results.movies[0].title, "Batman Begins");
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].query, "batman");
}

#[tokio::test]
async fn test_stale_response_never_overwrites_fresh_state() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    // The older query's response settles long after the newer one's
    mount_query(&server, "bat", one_title(1, "Bat Movie"), 300).await;
    mount_query(&server, "batman", one_title(2, "Batman Begins"), 0).await;

    let orchestrator = orchestrator_for(&server, &dir);

    orchestrator.set_query("bat");
    // Let the debounce fire so "bat" is actually in flight
    tokio::time::sleep(Duration::from_millis(50)).await;
    orchestrator.submit("batman").await;

    let snapshot = orchestrator.snapshot();
    assert_eq!(
        snapshot.results.as_ref().unwrap().movies[0].title,
        "Batman Begins"
    );

    // Let the stale "bat" response settle; it must be discarded
    tokio::time::sleep(Duration::from_millis(400)).await;
    let snapshot = orchestrator.snapshot();
    assert_eq!(
        snapshot.results.as_ref().unwrap().movies[0].title,
        "Batman Begins"
    );
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_submission_at_debounce_expiry_outranks_debounced_search() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_query(&server, "bat", one_title(1, "Bat Movie"), 200).await;
    mount_query(&server, "batman", one_title(2, "Batman Begins"), 0).await;

    let orchestrator = orchestrator_for(&server, &dir);

    // The submission lands right as the debounce timer fires. Whether
    // the timer's search got issued or was cancelled, the submission
    // reserves its generation at issue time and must win.
    orchestrator.set_query("bat");
    tokio::time::sleep(Duration::from_millis(10)).await;
    orchestrator.submit("batman").await;

    // Give the slow "bat" response time to settle and be discarded
    tokio::time::sleep(Duration::from_millis(300)).await;
    let snapshot = orchestrator.snapshot();
    assert_eq!(
        snapshot.results.as_ref().unwrap().movies[0].title,
        "Batman Begins"
    );
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_rapid_typing_coalesces_into_one_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_title(1, "The Matrix")))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.set_query("mat");
    orchestrator.set_query("matr");
    orchestrator.set_query("matrix");
    tokio::time::sleep(Duration::from_millis(150)).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("search_value=matrix"), "query was {query}");
}

#[tokio::test]
async fn test_short_input_clears_pending_call() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_title(1, "The Matrix")))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.set_query("matrix");
    // Erasing back below the minimum before the debounce fires cancels
    // the pending call
    orchestrator.set_query("ma");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!orchestrator.is_loading());
    assert_eq!(orchestrator.query(), "ma");
}

#[tokio::test]
async fn test_failed_search_clears_stale_results() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_query(&server, "batman", one_title(1, "Batman Begins"), 0).await;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("search_value", "joker"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.submit("batman").await;
    assert!(orchestrator.results().is_some());

    orchestrator.submit("joker").await;
    let snapshot = orchestrator.snapshot();
    assert!(snapshot.results.is_none());
    assert!(matches!(
        snapshot.error,
        Some(ProviderError::Transport(TransportError::Http { status: 500 }))
    ));
}

#[tokio::test]
async fn test_rate_limit_error_stays_distinguishable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_query(&server, "dune", one_title(1, "Dune"), 0).await;
    mount_query(&server, "alien", one_title(2, "Alien"), 0).await;

    let transport = TransportSettings {
        rate_limit: streamseek::config::RateLimitSettings {
            max_requests: 1,
            window_secs: 60,
        },
        ..fast_transport()
    };
    let orchestrator = orchestrator_with_transport(&server, &dir, &transport);

    orchestrator.submit("dune").await;
    assert!(orchestrator.error().is_none());

    orchestrator.submit("alien").await;
    match orchestrator.error() {
        Some(ProviderError::Transport(TransportError::RateLimited { retry_after })) => {
            assert!(retry_after <= Duration::from_secs(60));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_successful_search_clears_previous_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("search_value", "joker"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_query(&server, "batman", one_title(1, "Batman Begins"), 0).await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.submit("joker").await;
    assert!(orchestrator.error().is_some());

    orchestrator.submit("batman").await;
    let snapshot = orchestrator.snapshot();
    assert!(snapshot.error.is_none());
    assert!(snapshot.results.is_some());
}

#[tokio::test]
async fn test_history_persists_across_orchestrators() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_query(&server, "dune", one_title(1, "Dune"), 0).await;

    let orchestrator = orchestrator_for(&server, &dir);
    orchestrator.submit("dune").await;
    orchestrator.submit("dune").await;
    drop(orchestrator);

    // A fresh orchestrator over the same path sees the persisted history
    let reloaded = orchestrator_for(&server, &dir);
    let history = reloaded.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query, "dune");
}
