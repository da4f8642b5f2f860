//! HTTP transport layer
//!
//! Issues outbound requests with per-call timeouts, exponential-backoff
//! retry, a per-endpoint rate limit window, and de-duplication of
//! concurrent identical requests. Carries no movie semantics; the
//! provider adapters sit on top of it.

mod client;
mod request;

pub use client::ApiClient;
pub use request::{ApiRequest, ApiResponse, HttpMethod};

use std::time::Duration;
use thiserror::Error;

/// Transport failure taxonomy. All variants are terminal to the calling
/// `request()` invocation; `RateLimited` is recoverable by waiting.
///
/// Errors are `Clone` because a deduplicated request shares one settled
/// result between every caller that joined it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The per-endpoint window is exhausted; no network I/O was performed
    #[error("rate limit exceeded, retry in {} seconds", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    /// The remote responded with a non-2xx status after retry exhaustion
    #[error("upstream responded with HTTP {status}")]
    Http { status: u16 },

    /// Connection or DNS failure after retry exhaustion
    #[error("network error: {0}")]
    Network(String),

    /// The per-call budget was exceeded; the attempt was aborted and is
    /// never retried
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request URL could not be parsed
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}
