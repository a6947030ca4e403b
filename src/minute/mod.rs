//! Minute-level bars from the line-oriented price stream.

mod wire;

pub use wire::{MinuteRecord, parse_minute_feed};

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

use crate::core::client::{CacheMode, CallOptions, RetryConfig};
use crate::core::models::volume_from_f64;
use crate::core::{Bar, BarFrame, QfClient, QfError, SampleIndex};
use crate::history::adapt;

/// Builder for one symbol's intraday bars over a caller-supplied [`SampleIndex`].
///
/// The index only drives the request: its span gives the number of days asked for and its
/// frequency the sampling interval. Supported frequency units are `S`, `T` and `H`.
pub struct MinuteBarsBuilder<'a> {
    client: &'a QfClient,
    symbol: String,
    market: String,
    index: &'a SampleIndex,
    timezone: Option<Tz>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl<'a> MinuteBarsBuilder<'a> {
    pub fn new(
        client: &'a QfClient,
        symbol: impl Into<String>,
        market: impl Into<String>,
        index: &'a SampleIndex,
    ) -> Self {
        Self {
            client,
            symbol: symbol.into(),
            market: market.into(),
            index,
            timezone: None,
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    /// Localize bar timestamps to `tz` instead of the client's timezone.
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    /// Sets the cache mode for this specific API call.
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this specific API call.
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Fetch and parse the stream.
    ///
    /// # Errors
    /// Only [`QfError::UnsupportedFrequency`]. Transport and payload failures are logged and
    /// yield an empty frame, so one symbol never aborts a batch.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol, market = %self.market))]
    pub async fn fetch(self) -> Result<BarFrame, QfError> {
        let interval = self.index.freq().interval_seconds()?;
        let days = self.index.span_days();
        // The stream expects one more second than the sampling interval.
        let step = i64::from(interval) + 1;

        let mut url = self.client.endpoints().prices.clone();
        url.query_pairs_mut()
            .append_pair("q", &self.symbol)
            .append_pair("x", &self.market)
            .append_pair("p", &format!("{days}d"))
            .append_pair("i", &step.to_string());

        tracing::info!(days, interval, "requesting minute bars");

        let call = CallOptions {
            endpoint: "prices",
            key: &self.symbol,
            ext: "txt",
            cache_mode: self.cache_mode,
            retry: self.retry_override.as_ref(),
        };
        let body = match self.client.get_bytes(&url, &call).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, %url, "unable to fetch minute bars");
                return Ok(BarFrame::empty(&self.symbol));
            }
        };

        let records = match parse_minute_feed(body.as_slice(), step) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "unable to parse minute bars");
                return Ok(BarFrame::empty(&self.symbol));
            }
        };

        let mut bars = Vec::with_capacity(records.len());
        for r in records {
            let Some(ts) = Utc.timestamp_opt(r.ts, 0).single() else {
                tracing::error!(ts = r.ts, "timestamp out of range in minute bars");
                return Ok(BarFrame::empty(&self.symbol));
            };
            bars.push(Bar {
                ts: ts.with_timezone(&Tz::UTC),
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: volume_from_f64(r.volume),
                adj_close: None,
            });
        }

        let tz = self.timezone.unwrap_or(self.client.timezone());
        Ok(adapt::localize(BarFrame::new(self.symbol, bars), tz))
    }
}
