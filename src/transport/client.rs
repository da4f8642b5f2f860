//! Deduplicating, rate-limited, retrying HTTP client

use super::request::{canonical_key, endpoint_key, ApiRequest, ApiResponse, HttpMethod};
use super::TransportError;
use crate::config::TransportSettings;
use anyhow::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Shared handle to an in-flight request; every caller that joins an
/// identical request awaits a clone of the same settled result.
type SharedResponse = Shared<BoxFuture<'static, Result<ApiResponse, TransportError>>>;

/// Per-endpoint request window
struct RateLimitWindow {
    count: u32,
    reset_at: Instant,
}

/// HTTP client wrapper enforcing deduplication, rate limiting, retry
/// with exponential backoff, and per-call timeouts.
///
/// Cloning is cheap; clones share the same rate-limit table and
/// pending-request registry. The client emits no logs; observability is
/// a collaborator concern.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    settings: TransportSettings,
    windows: Mutex<HashMap<String, RateLimitWindow>>,
    pending: Mutex<HashMap<String, SharedResponse>>,
}

impl ApiClient {
    /// Create a new client with default transport settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&TransportSettings::default())
    }

    /// Create a new client with custom transport settings
    pub fn with_settings(settings: &TransportSettings) -> Result<Self> {
        // The per-call timeout is enforced around each attempt, so the
        // underlying client carries no request timeout of its own.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                settings: settings.clone(),
                windows: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Issue a request, joining any identical request already in flight.
    ///
    /// The canonical key is the method plus the resolved URL with sorted
    /// query parameters; at most one network call is outstanding per key
    /// at any instant. The registry entry is removed when the shared
    /// result settles, success or failure, so a later call starts fresh.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.resolved_url()?;
        let key = canonical_key(request.method, &url);
        let timeout = request
            .timeout
            .unwrap_or_else(|| self.inner.settings.request_timeout());

        let shared = {
            let mut pending = self.inner.pending.lock().unwrap();
            if let Some(existing) = pending.get(&key) {
                existing.clone()
            } else {
                let client = self.clone();
                let entry_key = key.clone();
                // Spawned so the call runs to completion even if every
                // caller stops polling before it settles.
                let handle = tokio::spawn(async move {
                    let result = client
                        .perform(request.method, url, request.headers, request.body, timeout)
                        .await;
                    client.inner.pending.lock().unwrap().remove(&entry_key);
                    result
                });
                let shared: SharedResponse = async move {
                    match handle.await {
                        Ok(result) => result,
                        Err(err) => {
                            Err(TransportError::Network(format!("request task failed: {err}")))
                        }
                    }
                }
                .boxed()
                .shared();
                pending.insert(key, shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Run the rate-limit check and the retry loop for one logical request
    async fn perform(
        &self,
        method: HttpMethod,
        url: Url,
        headers: Vec<(String, String)>,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError> {
        self.check_rate_limit(&endpoint_key(&url))?;

        let max_attempts = self.inner.settings.retry.max_attempts.max(1);
        let base_delay = self.inner.settings.retry.base_delay();
        let mut last_error = TransportError::Network("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                // delay = base * 2^(n-1) after the n-th attempt fails
                let delay = base_delay * 2u32.pow(attempt - 2);
                tokio::time::sleep(delay).await;
            }

            match self.attempt(method, &url, &headers, &body, timeout).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    last_error = TransportError::Http {
                        status: response.status,
                    };
                }
                Err(TransportError::Timeout(d)) => {
                    // An abort of our own making, not a remote failure
                    return Err(TransportError::Timeout(d));
                }
                Err(err) => last_error = err,
            }
        }

        Err(last_error)
    }

    /// Issue a single attempt bounded by the per-call timeout
    async fn attempt(
        &self,
        method: HttpMethod,
        url: &Url,
        headers: &[(String, String)],
        body: &Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError> {
        let mut builder = match method {
            HttpMethod::Get => self.inner.http.get(url.clone()),
            HttpMethod::Post => self.inner.http.post(url.clone()),
        };

        builder = builder.header("Accept", "application/json");
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        if let Some(json) = body {
            builder = builder.json(json);
        }

        let bounded = tokio::time::timeout(timeout, async move {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>(ApiResponse {
                status,
                url: final_url,
                text,
            })
        });

        match bounded.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(TransportError::Network(err.to_string())),
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Check and consume one slot of the endpoint's rate limit window.
    ///
    /// A rejected call does not consume a slot and performs no network
    /// I/O; backpressure is pushed to the caller explicitly.
    fn check_rate_limit(&self, key: &str) -> Result<(), TransportError> {
        let now = Instant::now();
        let window_len = self.inner.settings.rate_limit.window();
        let max_requests = self.inner.settings.rate_limit.max_requests;

        let mut windows = self.inner.windows.lock().unwrap();
        let window = windows.entry(key.to_string()).or_insert(RateLimitWindow {
            count: 0,
            reset_at: now + window_len,
        });

        if now >= window.reset_at {
            window.count = 0;
            window.reset_at = now + window_len;
        }

        if window.count >= max_requests {
            return Err(TransportError::RateLimited {
                retry_after: window.reset_at.saturating_duration_since(now),
            });
        }

        window.count += 1;
        Ok(())
    }
}
