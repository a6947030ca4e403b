use std::time::Duration;

use rand::Rng;

use crate::core::QfError;

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
        /// Whether to apply random jitter (+/- 50%) to the delay.
        jitter: bool,
    },
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(d) => *d,
            Backoff::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let raw = base.as_secs_f64() * factor.powi(exp);
                let capped = raw.min(max.as_secs_f64());
                let secs = if *jitter {
                    capped * jitter_factor()
                } else {
                    capped
                };
                if secs.is_finite() && secs > 0.0 {
                    Duration::from_secs_f64(secs)
                } else {
                    Duration::ZERO
                }
            }
        }
    }
}

fn jitter_factor() -> f64 {
    rand::thread_rng().gen_range(0.5..1.5)
}

/// Defines the behavior of the in-memory cache for an API call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present; otherwise, fetch and write the
    /// response to the cache. (Default)
    #[default]
    Use,
    /// Always fetch, bypassing any cached entry, and write the new response to the cache.
    Refresh,
    /// Always fetch and do not read from or write to the cache.
    Bypass,
}

/// Configuration for the automatic retry mechanism.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// A list of HTTP status codes that should trigger a retry.
    pub retry_on_status: Vec<u16>,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection errors.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 4,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(200),
                factor: 2.0,
                max: Duration::from_secs(3),
                jitter: true,
            },
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

/// Send `req`, retrying according to `cfg`.
///
/// The last response is returned as-is once retries are exhausted, so callers still see
/// the final status code.
pub(crate) async fn send_with_retry(
    req: reqwest::RequestBuilder,
    cfg: &RetryConfig,
) -> Result<reqwest::Response, QfError> {
    let mut attempt = 0u32;
    loop {
        // Streaming bodies cannot be cloned; send them once.
        let Some(this) = req.try_clone() else {
            return Ok(req.send().await?);
        };

        match this.send().await {
            Ok(resp) => {
                let code = resp.status().as_u16();
                if cfg.enabled && attempt < cfg.max_retries && cfg.retry_on_status.contains(&code)
                {
                    tracing::debug!(status = code, attempt, "retrying after status");
                    tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
                return Ok(resp);
            }
            Err(e) => {
                let retryable = (e.is_timeout() && cfg.retry_on_timeout)
                    || (e.is_connect() && cfg.retry_on_connect);
                if cfg.enabled && retryable && attempt < cfg.max_retries {
                    tracing::debug!(error = %e, attempt, "retrying after transport error");
                    tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
                return Err(e.into());
            }
        }
    }
}
