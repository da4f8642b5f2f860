//! Settings structures for StreamSeek configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub providers: ProviderSettings,
    pub transport: TransportSettings,
    pub search: SearchSettings,
    pub cache: CacheSettings,
    pub history: HistorySettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (STREAMSEEK_* prefix, plus the
    /// provider key variables)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("WATCHMODE_API_KEY") {
            if !val.is_empty() {
                self.providers.watchmode.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("TMDB_API_KEY") {
            if !val.is_empty() {
                self.providers.tmdb.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("STREAMSEEK_HISTORY_PATH") {
            self.history.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("STREAMSEEK_REQUEST_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.transport.request_timeout_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("STREAMSEEK_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.search.debounce_ms = ms;
            }
        }
    }
}

/// Upstream provider settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderSettings {
    pub watchmode: WatchmodeSettings,
    pub tmdb: TmdbSettings,
}

/// Title/availability provider (Watchmode) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchmodeSettings {
    /// API base URL
    pub base_url: String,
    /// API key; absent means no titles can be retrieved at all
    pub api_key: Option<String>,
}

impl Default for WatchmodeSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.watchmode.com/v1".to_string(),
            api_key: None,
        }
    }
}

/// Metadata/artwork provider (TMDB) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbSettings {
    /// API base URL
    pub base_url: String,
    /// Image CDN base URL, size variant appended per artwork kind
    pub image_base: String,
    /// API key; absent degrades enrichment to sentinel defaults
    pub api_key: Option<String>,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base: "https://image.tmdb.org/t/p".to_string(),
            api_key: None,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Default per-call timeout in seconds
    pub request_timeout_secs: u64,
    /// Per-endpoint rate limit window
    pub rate_limit: RateLimitSettings,
    /// Retry behavior for transient failures
    pub retry: RetrySettings,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            rate_limit: RateLimitSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl TransportSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Fixed-window rate limit settings, applied per endpoint key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 60,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Exponential backoff retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Base delay in milliseconds; delay = base * 2^(attempt-1)
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetrySettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// Search orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiescence interval before a typed query is issued, in milliseconds
    pub debounce_ms: u64,
    /// Minimum trimmed query length before a debounced search is scheduled
    pub min_query_len: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 3,
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Response cache TTLs per operation class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub search_ttl_secs: u64,
    pub details_ttl_secs: u64,
    pub trending_ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            search_ttl_secs: 300,       // 5 minutes
            details_ttl_secs: 3600,     // 1 hour
            trending_ttl_secs: 86_400,  // 24 hours
            max_capacity: 10_000,
        }
    }
}

/// Search history persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Storage file path; defaults to the platform data dir
    pub path: Option<PathBuf>,
    /// Maximum retained entries, newest first
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            path: None,
            max_entries: 10,
        }
    }
}

impl HistorySettings {
    /// Resolve the history file path, falling back to the platform data dir
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("streamseek")
                .join("search_history.json")
        })
    }
}
