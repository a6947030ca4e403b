//! Public client surface + builder.
//! Internals are split into `constants` (UA + default endpoints) and `retry` (backoff and cache policy).

mod constants;
mod retry;

pub use retry::{Backoff, CacheMode, RetryConfig};

use crate::core::services::{BoxFuture, Transport};
use crate::core::{QfError, net};
use chrono_tz::Tz;
use constants::{
    DEFAULT_BASE_HISTORY, DEFAULT_BASE_PRICES, DEFAULT_BASE_QUOTES_CSV,
    DEFAULT_BASE_SNAPSHOT_HEAVY, DEFAULT_BASE_SNAPSHOT_LIGHT, LIGHT_PREAMBLE_LEN, USER_AGENT,
};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

/// Upstream endpoint bases. Fixed once the client is built.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub(crate) prices: Url,
    pub(crate) snapshot_light: Url,
    pub(crate) snapshot_heavy: Url,
    pub(crate) quotes_csv: Url,
    pub(crate) history: Url,
}

/// Entry point for every fetch: endpoint configuration, output timezone, the transport and
/// the response cache.
///
/// Cloning is cheap; clones share the transport and the cache.
#[derive(Clone)]
pub struct QfClient {
    endpoints: Arc<Endpoints>,
    timezone: Tz,
    light_preamble: usize,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<CacheStore>>,
}

impl std::fmt::Debug for QfClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QfClient")
            .field("endpoints", &self.endpoints)
            .field("timezone", &self.timezone)
            .field("light_preamble", &self.light_preamble)
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for QfClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl QfClient {
    /// Create a new builder.
    pub fn builder() -> QfClientBuilder {
        QfClientBuilder::default()
    }

    /// Timezone bars are localized to unless a builder overrides it.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) {
        if let Some(store) = &self.cache {
            store.map.write().await.clear();
        }
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn light_preamble(&self) -> usize {
        self.light_preamble
    }

    async fn cache_get(&self, url: &Url) -> Option<Vec<u8>> {
        let store = self.cache.as_ref()?;
        let guard = store.map.read().await;
        if let Some(entry) = guard.get(url.as_str())
            && Instant::now() <= entry.expires_at
        {
            return Some(entry.body.clone());
        }
        None
    }

    async fn cache_put(&self, url: &Url, body: &[u8]) {
        let Some(store) = &self.cache else {
            return;
        };
        let entry = CacheEntry {
            body: body.to_vec(),
            expires_at: Instant::now() + store.default_ttl,
        };
        store.map.write().await.insert(url.to_string(), entry);
    }

    /// Fetch `url` through the configured transport, honoring `cache_mode`.
    ///
    /// `endpoint`/`key`/`ext` only name the fixture written in `test-mode` recordings.
    /// Failed fetches are never cached.
    pub(crate) async fn get_bytes(
        &self,
        url: &Url,
        call: &CallOptions<'_>,
    ) -> Result<Vec<u8>, QfError> {
        if call.cache_mode == CacheMode::Use
            && let Some(body) = self.cache_get(url).await
        {
            tracing::debug!(%url, "cache hit");
            return Ok(body);
        }

        let body = self.transport.fetch_with_retry(url, call.retry).await?;
        net::capture(&body, call.endpoint, call.key, call.ext);

        if call.cache_mode != CacheMode::Bypass {
            self.cache_put(url, &body).await;
        }
        Ok(body)
    }
}

/// Per-request settings threaded from a fetch builder down to [`QfClient::get_bytes`].
pub(crate) struct CallOptions<'a> {
    pub(crate) endpoint: &'a str,
    pub(crate) key: &'a str,
    pub(crate) ext: &'a str,
    pub(crate) cache_mode: CacheMode,
    pub(crate) retry: Option<&'a RetryConfig>,
}

#[derive(Debug)]
struct CacheEntry {
    body: Vec<u8>,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheStore {
    map: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

/* ----------------------- HTTP transport ----------------------- */

/// Default [`Transport`]: `reqwest` with the client-wide retry policy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    retry: RetryConfig,
}

impl HttpTransport {
    async fn get(&self, url: &Url, retry: Option<&RetryConfig>) -> Result<Vec<u8>, QfError> {
        let cfg = retry.unwrap_or(&self.retry);
        let resp = retry::send_with_retry(self.http.get(url.clone()), cfg).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(QfError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl Transport for HttpTransport {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, QfError>> {
        Box::pin(self.get(url, None))
    }

    fn fetch_with_retry<'a>(
        &'a self,
        url: &'a Url,
        retry: Option<&'a RetryConfig>,
    ) -> BoxFuture<'a, Result<Vec<u8>, QfError>> {
        Box::pin(self.get(url, retry))
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct QfClientBuilder {
    user_agent: Option<String>,
    base_prices: Option<Url>,
    base_snapshot_light: Option<Url>,
    base_snapshot_heavy: Option<Url>,
    base_quotes_csv: Option<Url>,
    base_history: Option<Url>,

    timezone: Option<Tz>,
    light_preamble: Option<usize>,
    transport: Option<Arc<dyn Transport>>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
    cache_ttl: Option<Duration>,
}

impl QfClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the minute-bar stream base (e.g., `http://www.google.com/finance/getprices`).
    pub fn base_prices(mut self, url: Url) -> Self {
        self.base_prices = Some(url);
        self
    }

    /// Override the light (JSON) snapshot base.
    pub fn base_snapshot_light(mut self, url: Url) -> Self {
        self.base_snapshot_light = Some(url);
        self
    }

    /// Override the heavy (XML) snapshot base.
    pub fn base_snapshot_heavy(mut self, url: Url) -> Self {
        self.base_snapshot_heavy = Some(url);
        self
    }

    /// Override the field-query (CSV) base.
    pub fn base_quotes_csv(mut self, url: Url) -> Self {
        self.base_quotes_csv = Some(url);
        self
    }

    /// Override the daily history CSV base.
    pub fn base_history(mut self, url: Url) -> Self {
        self.base_history = Some(url);
        self
    }

    /// Timezone bars are localized to. Default: UTC.
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    /// Number of bytes stripped from the light snapshot body before JSON parsing. Default: 3.
    pub fn light_preamble_len(mut self, len: usize) -> Self {
        self.light_preamble = Some(len);
        self
    }

    /// Replace the HTTP transport entirely. Timeout and retry settings are then ignored; the
    /// cache still applies.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set a global request timeout (overall). Default: none.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Replace the retry policy.
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Turn retries on or off without touching the rest of the policy.
    pub fn retry_enabled(mut self, yes: bool) -> Self {
        self.retry.get_or_insert_with(RetryConfig::default).enabled = yes;
        self
    }

    /// Enable in-memory caching with a default TTL.
    /// If not set, caching is disabled.
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    pub fn build(self) -> Result<QfClient, QfError> {
        let endpoints = Endpoints {
            prices: resolve_base(self.base_prices, DEFAULT_BASE_PRICES)?,
            snapshot_light: resolve_base(self.base_snapshot_light, DEFAULT_BASE_SNAPSHOT_LIGHT)?,
            snapshot_heavy: resolve_base(self.base_snapshot_heavy, DEFAULT_BASE_SNAPSHOT_HEAVY)?,
            quotes_csv: resolve_base(self.base_quotes_csv, DEFAULT_BASE_QUOTES_CSV)?,
            history: resolve_base(self.base_history, DEFAULT_BASE_HISTORY)?,
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => {
                let mut httpb = reqwest::Client::builder()
                    .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
                if let Some(t) = self.timeout {
                    httpb = httpb.timeout(t);
                }
                if let Some(ct) = self.connect_timeout {
                    httpb = httpb.connect_timeout(ct);
                }

                Arc::new(HttpTransport {
                    http: httpb.build()?,
                    retry: self.retry.unwrap_or_default(),
                })
            }
        };

        Ok(QfClient {
            endpoints: Arc::new(endpoints),
            timezone: self.timezone.unwrap_or(Tz::UTC),
            light_preamble: self.light_preamble.unwrap_or(LIGHT_PREAMBLE_LEN),
            transport,
            cache: self.cache_ttl.map(|ttl| {
                Arc::new(CacheStore {
                    map: RwLock::new(HashMap::new()),
                    default_ttl: ttl,
                })
            }),
        })
    }
}

fn resolve_base(url: Option<Url>, default: &str) -> Result<Url, QfError> {
    match url {
        Some(u) => Ok(u),
        None => Ok(Url::parse(default)?),
    }
}
