//! Provider adapters
//!
//! Each adapter translates domain queries into its provider's request
//! shape and parses the provider's response into partial canonical
//! records. Absent optional fields map to `None` at the adapter
//! boundary, never to a failed call, unless the transport call itself
//! failed.

pub mod sources;
pub mod tmdb;
pub mod watchmode;

pub use tmdb::TmdbProvider;
pub use watchmode::WatchmodeProvider;

use crate::results::{SearchFilters, StreamingSource};
use crate::transport::TransportError;
use async_trait::async_trait;
use thiserror::Error;

/// A provider's optional-field view of a title, before merging.
///
/// Adapters convert "present but empty/zero" provider values to `None`
/// so the merge only ever sees meaningful data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitlePartial {
    pub id: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub rating: Option<f32>,
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub sources: Vec<StreamingSource>,
    pub imdb_id: Option<String>,
    /// Cross-reference id into the metadata provider
    pub metadata_id: Option<String>,
}

/// One page of partial titles from a provider
#[derive(Debug, Clone, Default)]
pub struct ProviderPage {
    pub titles: Vec<TitlePartial>,
    pub total_results: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// Operations every upstream title provider exposes
#[async_trait]
pub trait TitleProvider: Send + Sync {
    /// Provider name, used in errors and logs
    fn name(&self) -> &str;

    /// Search titles by text, with optional filters
    async fn search_titles(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<ProviderPage, ProviderError>;

    /// Fetch one title's record
    async fn title_details(&self, id: &str) -> Result<TitlePartial, ProviderError>;

    /// List trending titles
    async fn trending(&self, page: u32) -> Result<ProviderPage, ProviderError>;
}

/// Provider failure taxonomy. Transport kinds pass through unchanged so
/// callers can distinguish a rate limit from a generic network failure.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider responded but the payload did not parse
    #[error("{provider} returned a malformed response: {message}")]
    Parse { provider: String, message: String },

    /// Distinct configuration state: "unreachable because no credential"
    /// has a different remedy than a transient failure
    #[error("{provider} is unreachable: no API key configured")]
    NoApiKey { provider: String },
}

impl ProviderError {
    pub(crate) fn parse(provider: &str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}

/// Keep a string only if it is non-empty after trimming
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Keep a number only if it is non-zero
pub(crate) fn non_zero_f32(value: f32) -> Option<f32> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn non_zero_i32(value: i32) -> Option<i32> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn non_zero_u32(value: u32) -> Option<u32> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn non_zero_u64(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}
