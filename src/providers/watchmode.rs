//! Watchmode title/availability adapter
//!
//! The availability provider determines which titles exist, their
//! relevance ranking, and where they stream. Its API key is appended as
//! the `apiKey` query parameter on every call; without a key no titles
//! can be retrieved at all.

use super::{
    non_empty, non_zero_f32, non_zero_i32, non_zero_u32, non_zero_u64, sources, ProviderError,
    ProviderPage, TitlePartial, TitleProvider,
};
use crate::config::WatchmodeSettings;
use crate::results::{SearchFilters, StreamingSource};
use crate::transport::{ApiClient, ApiRequest};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Results requested per page
const PAGE_SIZE: u32 = 20;

/// Watchmode adapter
#[derive(Clone)]
pub struct WatchmodeProvider {
    client: ApiClient,
    base_url: String,
    api_key: Option<String>,
}

/// Title record as Watchmode returns it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WatchmodeTitle {
    id: u64,
    title: String,
    year: i32,
    imdb_id: String,
    tmdb_id: u64,
    genre_names: Vec<String>,
    user_rating: f32,
    runtime_minutes: u32,
    sources: Vec<WatchmodeSource>,
}

/// Streaming source record as Watchmode returns it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WatchmodeSource {
    source_id: u64,
    name: String,
    #[serde(rename = "type")]
    offer_type: String,
    web_url: String,
    format: String,
    price: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WatchmodeSearchResponse {
    title_results: Vec<WatchmodeTitle>,
    total_results: u64,
    total_pages: u32,
    page: u32,
}

impl WatchmodeProvider {
    pub fn new(client: ApiClient, settings: &WatchmodeSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Build a keyed GET request for the given endpoint path
    fn keyed_request(&self, path: &str) -> Result<ApiRequest, ProviderError> {
        let key = self.api_key.as_ref().ok_or_else(|| ProviderError::NoApiKey {
            provider: self.name().to_string(),
        })?;
        Ok(ApiRequest::get(format!("{}{}", self.base_url, path)).param("apiKey", key))
    }

    /// Fetch the per-title source list (separate endpoint from the basic
    /// title record)
    pub async fn title_sources(&self, id: &str) -> Result<Vec<StreamingSource>, ProviderError> {
        let request = self.keyed_request(&format!("/title/{}/sources/", id))?;
        let response = self.client.request(request).await?;
        let raw: Vec<WatchmodeSource> = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        Ok(map_sources(raw))
    }

    fn to_page(&self, response: WatchmodeSearchResponse) -> ProviderPage {
        ProviderPage {
            titles: response.title_results.into_iter().map(to_partial).collect(),
            total_results: response.total_results,
            page: response.page.max(1),
            total_pages: response.total_pages,
        }
    }
}

#[async_trait]
impl TitleProvider for WatchmodeProvider {
    fn name(&self) -> &str {
        "watchmode"
    }

    async fn search_titles(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<ProviderPage, ProviderError> {
        let request = self
            .keyed_request("/search/")?
            .param("search_field", "name")
            .param("search_value", query)
            .param("page", page)
            .param("limit", PAGE_SIZE)
            .opt_param("genres", filters.genre.as_deref())
            .opt_param("year", filters.year)
            .opt_param("min_rating", filters.min_rating);

        let response = self.client.request(request).await?;
        let parsed: WatchmodeSearchResponse = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        Ok(self.to_page(parsed))
    }

    async fn title_details(&self, id: &str) -> Result<TitlePartial, ProviderError> {
        let request = self.keyed_request(&format!("/title/{}/details/", id))?;
        let response = self.client.request(request).await?;
        let title: WatchmodeTitle = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        Ok(to_partial(title))
    }

    async fn trending(&self, page: u32) -> Result<ProviderPage, ProviderError> {
        let request = self
            .keyed_request("/list-titles/")?
            .param("types", "movie")
            .param("sort_by", "popularity_desc")
            .param("page", page)
            .param("limit", PAGE_SIZE);

        let response = self.client.request(request).await?;
        // This endpoint returns a bare title array, not a search envelope
        let titles: Vec<WatchmodeTitle> = response
            .json()
            .map_err(|e| ProviderError::parse(self.name(), e))?;

        let partials: Vec<TitlePartial> = titles.into_iter().map(to_partial).collect();
        Ok(ProviderPage {
            total_results: partials.len() as u64,
            titles: partials,
            page,
            total_pages: 1,
        })
    }
}

fn to_partial(title: WatchmodeTitle) -> TitlePartial {
    TitlePartial {
        id: non_zero_u64(title.id).map(|id| id.to_string()),
        title: non_empty(title.title),
        year: non_zero_i32(title.year),
        overview: None,
        poster_url: None,
        backdrop_url: None,
        rating: non_zero_f32(title.user_rating),
        runtime_minutes: non_zero_u32(title.runtime_minutes),
        genres: title.genre_names,
        sources: map_sources(title.sources),
        imdb_id: non_empty(title.imdb_id),
        metadata_id: non_zero_u64(title.tmdb_id).map(|id| id.to_string()),
    }
}

/// Map raw provider sources to canonical ones. Sources with an unknown
/// service identity or unrecognized offer type are filtered out of the
/// canonical list; they are logged for adapter maintenance.
fn map_sources(raw: Vec<WatchmodeSource>) -> Vec<StreamingSource> {
    raw.into_iter()
        .filter_map(|source| {
            let Some(service) = sources::lookup(&source.name) else {
                debug!("dropping source with unknown service: {}", source.name);
                return None;
            };
            let Some((offer, price)) = sources::parse_offer(&source.offer_type, source.price)
            else {
                debug!(
                    "dropping source {} with unrecognized offer type: {}",
                    source.name, source.offer_type
                );
                return None;
            };

            Some(StreamingSource {
                id: source.source_id.to_string(),
                name: service.name.to_string(),
                offer,
                price,
                quality: sources::parse_quality(&source.format),
                link: source.web_url,
                logo: Some(service.logo.to_string()),
            })
        })
        .collect()
}
