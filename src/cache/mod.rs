//! Response caching for aggregated results
//!
//! Each operation class has its own TTL: searches go stale quickly,
//! title details slowly, trending slowest. The cache sits above the
//! transport layer so its dedup and rate-limit behavior stay observable.

use crate::config::CacheSettings;
use crate::results::{Movie, SearchFilters, SearchResult};
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// TTL cache over the aggregation layer's responses
pub struct ResponseCache {
    search: Cache<String, SearchResult>,
    details: Cache<String, Movie>,
    trending: Cache<String, SearchResult>,
}

impl ResponseCache {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            search: build(settings.search_ttl_secs, settings.max_capacity),
            details: build(settings.details_ttl_secs, settings.max_capacity),
            trending: build(settings.trending_ttl_secs, settings.max_capacity),
        }
    }

    pub async fn get_search(&self, key: &str) -> Option<SearchResult> {
        self.search.get(key).await
    }

    pub async fn put_search(&self, key: String, result: SearchResult) {
        self.search.insert(key, result).await;
    }

    pub async fn get_details(&self, key: &str) -> Option<Movie> {
        self.details.get(key).await
    }

    pub async fn put_details(&self, key: String, movie: Movie) {
        self.details.insert(key, movie).await;
    }

    pub async fn get_trending(&self, key: &str) -> Option<SearchResult> {
        self.trending.get(key).await
    }

    pub async fn put_trending(&self, key: String, result: SearchResult) {
        self.trending.insert(key, result).await;
    }

    /// Drop every cached response
    pub fn clear(&self) {
        self.search.invalidate_all();
        self.details.invalidate_all();
        self.trending.invalidate_all();
    }
}

fn build<V: Clone + Send + Sync + 'static>(ttl_secs: u64, max_capacity: u64) -> Cache<String, V> {
    Cache::builder()
        .time_to_live(Duration::from_secs(ttl_secs))
        .max_capacity(max_capacity)
        .build()
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheSettings::default())
    }
}

/// Cache key for a search operation
pub fn search_key(query: &str, filters: &SearchFilters, page: u32) -> String {
    let filters = serde_json::to_string(filters).unwrap_or_default();
    digest(&["search", query, &filters, &page.to_string()])
}

/// Cache key for a title details operation
pub fn details_key(id: &str) -> String {
    digest(&["details", id])
}

/// Cache key for a trending listing
pub fn trending_key(page: u32) -> String {
    digest(&["trending", &page.to_string()])
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0]);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_stable_and_distinct() {
        let filters = SearchFilters::default();
        assert_eq!(search_key("dune", &filters, 1), search_key("dune", &filters, 1));
        assert_ne!(search_key("dune", &filters, 1), search_key("dune", &filters, 2));
        assert_ne!(search_key("dune", &filters, 1), trending_key(1));

        let filtered = SearchFilters {
            year: Some(2021),
            ..Default::default()
        };
        assert_ne!(search_key("dune", &filters, 1), search_key("dune", &filtered, 1));
    }

    #[tokio::test]
    async fn test_each_class_holds_its_own_value_type() {
        // One constructor builds all three caches, two different value
        // types between them
        let cache = ResponseCache::new(&CacheSettings::default());
        let movie = Movie {
            id: "42".to_string(),
            title: "Dune".to_string(),
            year: 2021,
            overview: "Desert planet.".to_string(),
            poster_url: String::new(),
            backdrop_url: String::new(),
            rating: 8.0,
            runtime_minutes: 155,
            genres: vec![],
            streaming_sources: vec![],
            imdb_id: None,
            metadata_id: None,
        };
        let result = SearchResult {
            movies: vec![movie.clone()],
            total_results: 1,
            page: 1,
            total_pages: 1,
        };

        cache.put_details(details_key("42"), movie.clone()).await;
        cache.put_search(search_key("dune", &SearchFilters::default(), 1), result.clone()).await;

        assert_eq!(cache.get_details(&details_key("42")).await, Some(movie));
        assert_eq!(
            cache
                .get_search(&search_key("dune", &SearchFilters::default(), 1))
                .await,
            Some(result)
        );
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = ResponseCache::default();
        let result = SearchResult {
            movies: vec![],
            total_results: 0,
            page: 1,
            total_pages: 0,
        };

        let key = trending_key(1);
        assert!(cache.get_trending(&key).await.is_none());
        cache.put_trending(key.clone(), result.clone()).await;
        assert_eq!(cache.get_trending(&key).await, Some(result));
    }
}
