//! StreamSeek: a two-provider movie search core
//!
//! Searches a movie catalog by delegating to a title/availability provider
//! (Watchmode-shaped) and a metadata/artwork provider (TMDB-shaped), and
//! presents a unified, rate-limited view of the merged result. The request
//! client deduplicates concurrent identical calls, retries transient
//! failures with exponential backoff, and enforces a per-endpoint rate
//! limit window.

pub mod cache;
pub mod config;
pub mod providers;
pub mod results;
pub mod search;
pub mod suggest;
pub mod transport;

pub use config::Settings;
pub use providers::{ProviderError, TitleProvider};
pub use results::{Movie, SearchFilters, SearchResult};
pub use search::{MovieAggregator, SearchOrchestrator};
pub use transport::{ApiClient, TransportError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default per-call timeout for provider requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;
