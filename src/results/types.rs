//! Canonical entity definitions

use serde::{Deserialize, Serialize};

/// Sentinel overview text standing in for "unknown", distinct from an error
pub const NO_OVERVIEW: &str = "No description available.";

/// The merged, provider-agnostic movie record.
///
/// Constructed exclusively by the aggregation layer and immutable once
/// returned; callers that want updated data re-request. Unknown fields
/// hold sentinel defaults (empty string, zero, empty list) rather than
/// failing the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Stable id assigned by the availability provider
    pub id: String,
    pub title: String,
    /// Release year; 0 when unknown
    pub year: i32,
    /// Description; [`NO_OVERVIEW`] when unavailable
    pub overview: String,
    /// Poster image URL; empty string when unavailable
    pub poster_url: String,
    /// Backdrop image URL; empty string when unavailable
    pub backdrop_url: String,
    /// Audience rating; 0.0 is the documented "unknown" sentinel
    pub rating: f32,
    /// Runtime in minutes; 0 when unknown
    pub runtime_minutes: u32,
    /// Genre names in provider order; may be empty
    pub genres: Vec<String>,
    /// Where the title can be streamed, owned as a value
    pub streaming_sources: Vec<StreamingSource>,
    pub imdb_id: Option<String>,
    /// Cross-reference id into the metadata provider
    pub metadata_id: Option<String>,
}

/// One place a title can be watched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingSource {
    /// Provider-assigned source id
    pub id: String,
    /// Canonical display name
    pub name: String,
    pub offer: OfferType,
    /// Present only for rent/buy offers
    pub price: Option<f32>,
    pub quality: Quality,
    /// Deep link into the service
    pub link: String,
    pub logo: Option<String>,
}

/// How a streaming source offers a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    Subscription,
    Rent,
    Buy,
    Free,
}

/// Stream quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "4K")]
    FourK,
}

/// One page of search results. Ordering is the availability provider's
/// relevance ranking, preserved exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub movies: Vec<Movie>,
    pub total_results: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// Caller-supplied search filters. `genre`, `year` and `min_rating` are
/// mapped onto the availability provider's query parameters;
/// `streaming_service` and `sort_by` are part of the public contract
/// consumed by presentation collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub min_rating: Option<f32>,
    pub streaming_service: Option<String>,
    pub sort_by: Option<SortBy>,
}

impl SearchFilters {
    /// Merge another filter set into this one; fields present in `other`
    /// win, absent fields keep their current value
    pub fn merge(&mut self, other: SearchFilters) {
        if other.genre.is_some() {
            self.genre = other.genre;
        }
        if other.year.is_some() {
            self.year = other.year;
        }
        if other.min_rating.is_some() {
            self.min_rating = other.min_rating;
        }
        if other.streaming_service.is_some() {
            self.streaming_service = other.streaming_service;
        }
        if other.sort_by.is_some() {
            self.sort_by = other.sort_by;
        }
    }
}

/// Requested result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Relevance,
    Rating,
    Year,
    Title,
}
