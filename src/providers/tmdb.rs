//! TMDB metadata/artwork adapter
//!
//! The metadata provider enriches availability records with overview
//! text, artwork, and audience ratings. A missing API key degrades
//! enrichment to an empty partial rather than failing, since the title
//! itself still exists without it.

use super::{
    non_empty, non_zero_f32, non_zero_u64, ProviderError, ProviderPage, TitlePartial,
    TitleProvider,
};
use crate::config::TmdbSettings;
use crate::results::SearchFilters;
use crate::transport::{ApiClient, ApiRequest};
use async_trait::async_trait;
use serde::Deserialize;

/// Poster artwork size variant
const POSTER_SIZE: &str = "w500";
/// Backdrop artwork size variant
const BACKDROP_SIZE: &str = "w1280";

/// TMDB adapter
#[derive(Clone)]
pub struct TmdbProvider {
    client: ApiClient,
    base_url: String,
    image_base: String,
    api_key: Option<String>,
}

/// Movie record as TMDB returns it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TmdbMovie {
    id: u64,
    title: String,
    overview: String,
    poster_path: String,
    backdrop_path: String,
    release_date: String,
    vote_average: f32,
    runtime: u32,
    imdb_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TmdbPageResponse {
    results: Vec<TmdbMovie>,
    total_results: u64,
    total_pages: u32,
    page: u32,
}

impl TmdbProvider {
    pub fn new(client: ApiClient, settings: &TmdbSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            image_base: settings.image_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    fn keyed_request(&self, path: &str) -> Result<ApiRequest, ProviderError> {
        let key = self.api_key.as_ref().ok_or_else(|| ProviderError::NoApiKey {
            provider: self.name().to_string(),
        })?;
        Ok(ApiRequest::get(format!("{}{}", self.base_url, path)).param("api_key", key))
    }

    /// Expand a relative artwork path against the image CDN
    fn image_url(&self, path: &str, size: &str) -> Option<String> {
        if path.is_empty() {
            None
        } else {
            Some(format!("{}/{}{}", self.image_base, size, path))
        }
    }

    fn to_partial(&self, movie: TmdbMovie) -> TitlePartial {
        TitlePartial {
            id: None,
            title: non_empty(movie.title),
            year: parse_release_year(&movie.release_date),
            overview: non_empty(movie.overview),
            poster_url: self.image_url(&movie.poster_path, POSTER_SIZE),
            backdrop_url: self.image_url(&movie.backdrop_path, BACKDROP_SIZE),
            rating: non_zero_f32(movie.vote_average),
            runtime_minutes: if movie.runtime > 0 {
                Some(movie.runtime)
            } else {
                None
            },
            genres: Vec::new(),
            sources: Vec::new(),
            imdb_id: non_empty(movie.imdb_id),
            metadata_id: non_zero_u64(movie.id).map(|id| id.to_string()),
        }
    }

    fn to_page(&self, response: TmdbPageResponse) -> ProviderPage {
        ProviderPage {
            titles: response
                .results
                .into_iter()
                .map(|movie| self.to_partial(movie))
                .collect(),
            total_results: response.total_results,
            page: response.page.max(1),
            total_pages: response.total_pages,
        }
    }
}

#[async_trait]
impl TitleProvider for TmdbProvider {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search_titles(
        &self,
        query: &str,
        _filters: &SearchFilters,
        page: u32,
    ) -> Result<ProviderPage, ProviderError> {
        let request = self
            .keyed_request("/search/movie")?
            .param("query", query)
            .param("page", page);

        let response = self.client.request(request).await?;
        let parsed: TmdbPageResponse = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        Ok(self.to_page(parsed))
    }

    /// Fetch enrichment for one title. Unlike search, a missing key
    /// degrades to an empty partial: the caller falls back to
    /// availability-only fields instead of seeing an error.
    async fn title_details(&self, id: &str) -> Result<TitlePartial, ProviderError> {
        if self.api_key.is_none() {
            return Ok(TitlePartial::default());
        }

        let request = self
            .keyed_request(&format!("/movie/{}", id))?
            .param("append_to_response", "credits,videos");

        let response = self.client.request(request).await?;
        let movie: TmdbMovie = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        Ok(self.to_partial(movie))
    }

    async fn trending(&self, page: u32) -> Result<ProviderPage, ProviderError> {
        let request = self.keyed_request("/trending/movie/day")?.param("page", page);

        let response = self.client.request(request).await?;
        let parsed: TmdbPageResponse = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        Ok(self.to_page(parsed))
    }
}

/// Parse the year out of a `YYYY-MM-DD` release date
fn parse_release_year(release_date: &str) -> Option<i32> {
    release_date
        .split('-')
        .next()
        .and_then(|year| year.parse().ok())
        .filter(|year| *year > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> TmdbProvider {
        TmdbProvider::new(
            ApiClient::new().unwrap(),
            &TmdbSettings {
                base_url: "https://api.tmdb.invalid/3".to_string(),
                image_base: "https://image.tmdb.invalid/t/p".to_string(),
                api_key: api_key.map(String::from),
            },
        )
    }

    #[test]
    fn test_image_url_expansion() {
        let provider = provider(Some("key"));
        assert_eq!(
            provider.image_url("/abc.jpg", POSTER_SIZE).as_deref(),
            Some("https://image.tmdb.invalid/t/p/w500/abc.jpg")
        );
        assert_eq!(provider.image_url("", BACKDROP_SIZE), None);
    }

    #[test]
    fn test_to_partial_converts_empty_fields() {
        let provider = provider(Some("key"));
        let partial = provider.to_partial(TmdbMovie {
            id: 603,
            title: "The Matrix".to_string(),
            overview: String::new(),
            release_date: "1999-03-31".to_string(),
            vote_average: 8.2,
            ..Default::default()
        });

        assert_eq!(partial.title.as_deref(), Some("The Matrix"));
        assert_eq!(partial.year, Some(1999));
        assert_eq!(partial.overview, None);
        assert_eq!(partial.poster_url, None);
        assert_eq!(partial.rating, Some(8.2));
        assert_eq!(partial.metadata_id.as_deref(), Some("603"));
    }

    #[test]
    fn test_parse_release_year() {
        assert_eq!(parse_release_year("2014-11-07"), Some(2014));
        assert_eq!(parse_release_year(""), None);
        assert_eq!(parse_release_year("soon"), None);
    }

    #[tokio::test]
    async fn test_details_without_key_degrades_to_empty_partial() {
        let partial = provider(None).title_details("603").await.unwrap();
        assert_eq!(partial, TitlePartial::default());
    }

    #[tokio::test]
    async fn test_search_without_key_fails() {
        let err = provider(None)
            .search_titles("matrix", &SearchFilters::default(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoApiKey { .. }));
    }
}
