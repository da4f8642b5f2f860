//! Two-provider aggregation and merge

use crate::cache::{self, ResponseCache};
use crate::providers::{ProviderError, TitlePartial, TitleProvider, TmdbProvider, WatchmodeProvider};
use crate::results::{Movie, SearchFilters, SearchResult, NO_OVERVIEW};
use futures::future::join_all;
use tracing::{debug, info};

/// Aggregation service that merges the availability and metadata
/// providers into canonical `Movie` records.
///
/// The availability call determines the result set and its ranking;
/// metadata enrichment is fetched concurrently per title and is never
/// allowed to fail the batch. A single title's enrichment failure
/// degrades that title to availability-only fields.
pub struct MovieAggregator {
    watchmode: WatchmodeProvider,
    tmdb: TmdbProvider,
    cache: ResponseCache,
}

impl MovieAggregator {
    pub fn new(watchmode: WatchmodeProvider, tmdb: TmdbProvider, cache: ResponseCache) -> Self {
        Self {
            watchmode,
            tmdb,
            cache,
        }
    }

    /// Search movies by text, with optional filters
    pub async fn search_movies(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<SearchResult, ProviderError> {
        let key = cache::search_key(query, filters, page);
        if let Some(cached) = self.cache.get_search(&key).await {
            debug!("search cache hit for '{}'", query);
            return Ok(cached);
        }

        let provider_page = self.watchmode.search_titles(query, filters, page).await?;
        info!(
            "search '{}' returned {} titles (page {} of {})",
            query,
            provider_page.titles.len(),
            provider_page.page,
            provider_page.total_pages
        );

        let result = SearchResult {
            movies: self.enrich_all(provider_page.titles).await,
            total_results: provider_page.total_results,
            page: provider_page.page,
            total_pages: provider_page.total_pages,
        };

        self.cache.put_search(key, result.clone()).await;
        Ok(result)
    }

    /// Fetch one movie's full record, including its streaming sources
    pub async fn movie_details(&self, id: &str) -> Result<Movie, ProviderError> {
        let key = cache::details_key(id);
        if let Some(cached) = self.cache.get_details(&key).await {
            debug!("details cache hit for {}", id);
            return Ok(cached);
        }

        // The source list lives on a separate endpoint; both records are
        // required, so either failing fails the call.
        let (mut partial, sources) = futures::try_join!(
            self.watchmode.title_details(id),
            self.watchmode.title_sources(id)
        )?;
        partial.sources = sources;

        let movie = self.enrich(partial).await;
        self.cache.put_details(key, movie.clone()).await;
        Ok(movie)
    }

    /// List trending movies
    pub async fn trending(&self, page: u32) -> Result<SearchResult, ProviderError> {
        let key = cache::trending_key(page);
        if let Some(cached) = self.cache.get_trending(&key).await {
            debug!("trending cache hit for page {}", page);
            return Ok(cached);
        }

        let provider_page = self.watchmode.trending(page).await?;
        info!("trending page {} has {} titles", page, provider_page.titles.len());

        let result = SearchResult {
            movies: self.enrich_all(provider_page.titles).await,
            total_results: provider_page.total_results,
            page: provider_page.page,
            total_pages: provider_page.total_pages,
        };

        self.cache.put_trending(key, result.clone()).await;
        Ok(result)
    }

    /// Enrich every title concurrently, preserving the availability
    /// provider's ordering exactly
    async fn enrich_all(&self, titles: Vec<TitlePartial>) -> Vec<Movie> {
        join_all(titles.into_iter().map(|title| self.enrich(title))).await
    }

    /// Merge one availability record with its metadata enrichment.
    /// Enrichment failure is absorbed here: the title degrades to
    /// availability-only data instead of failing its siblings.
    async fn enrich(&self, availability: TitlePartial) -> Movie {
        let metadata = match &availability.metadata_id {
            Some(metadata_id) => match self.tmdb.title_details(metadata_id).await {
                Ok(partial) => partial,
                Err(err) => {
                    debug!(
                        "enrichment failed for metadata id {}: {}",
                        metadata_id, err
                    );
                    TitlePartial::default()
                }
            },
            None => TitlePartial::default(),
        };

        merge(availability, metadata)
    }
}

/// Merge precedence: metadata overview/artwork/rating if present, then
/// the availability field, then the sentinel default.
fn merge(availability: TitlePartial, metadata: TitlePartial) -> Movie {
    Movie {
        id: availability.id.unwrap_or_default(),
        title: availability.title.or(metadata.title).unwrap_or_default(),
        year: availability.year.or(metadata.year).unwrap_or(0),
        overview: metadata
            .overview
            .or(availability.overview)
            .unwrap_or_else(|| NO_OVERVIEW.to_string()),
        poster_url: metadata
            .poster_url
            .or(availability.poster_url)
            .unwrap_or_default(),
        backdrop_url: metadata
            .backdrop_url
            .or(availability.backdrop_url)
            .unwrap_or_default(),
        rating: metadata.rating.or(availability.rating).unwrap_or(0.0),
        runtime_minutes: availability
            .runtime_minutes
            .or(metadata.runtime_minutes)
            .unwrap_or(0),
        genres: availability.genres,
        streaming_sources: availability.sources,
        imdb_id: availability.imdb_id.or(metadata.imdb_id),
        metadata_id: availability.metadata_id.or(metadata.metadata_id),
    }
}
