//! Daily OHLCV history, normalized onto the caller's index and timezone.

pub mod adapt;
mod wire;

pub use wire::{DailyRow, parse_daily_csv};

use chrono::{Datelike, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::core::client::{CacheMode, CallOptions, RetryConfig};
use crate::core::models::volume_from_f64;
use crate::core::{Bar, BarFrame, QfClient, QfError, SampleIndex};

/// Builder for one symbol's daily history over the span of a [`SampleIndex`].
///
/// Bars are stamped at local midnight in the target timezone. When the index is not
/// daily (or business-daily) the result is reindexed onto the index timestamps.
pub struct HistoryBuilder<'a> {
    client: &'a QfClient,
    symbol: String,
    index: &'a SampleIndex,
    timezone: Option<Tz>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl<'a> HistoryBuilder<'a> {
    pub fn new(client: &'a QfClient, symbol: impl Into<String>, index: &'a SampleIndex) -> Self {
        Self {
            client,
            symbol: symbol.into(),
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

    /// Fetch the history. Transport and payload failures are logged and give an empty frame.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn fetch(self) -> Result<BarFrame, QfError> {
        let tz = self.timezone.unwrap_or(self.client.timezone());
        let (start, end) = (self.index.first(), self.index.last());

        let mut url = self.client.endpoints().history.clone();
        url.query_pairs_mut()
            .append_pair("s", &self.symbol)
            .append_pair("a", &start.month0().to_string())
            .append_pair("b", &start.day().to_string())
            .append_pair("c", &start.year().to_string())
            .append_pair("d", &end.month0().to_string())
            .append_pair("e", &end.day().to_string())
            .append_pair("f", &end.year().to_string())
            .append_pair("g", "d")
            .append_pair("ignore", ".csv");

        tracing::info!(%start, %end, "requesting daily history");

        let call = CallOptions {
            endpoint: "history",
            key: &self.symbol,
            ext: "csv",
            cache_mode: self.cache_mode,
            retry: self.retry_override.as_ref(),
        };
        let body = match self.client.get_bytes(&url, &call).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, %url, "could not get quotes");
                return Ok(BarFrame::empty(&self.symbol));
            }
        };

        let rows = match parse_daily_csv(&body) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "could not parse quotes");
                return Ok(BarFrame::empty(&self.symbol));
            }
        };

        let bars = rows
            .into_iter()
            .filter_map(|r| {
                let ts = tz
                    .from_local_datetime(&r.date.and_time(NaiveTime::MIN))
                    .earliest()?;
                Some(Bar {
                    ts,
                    open: r.open,
                    high: r.high,
                    low: r.low,
                    close: r.close,
                    volume: volume_from_f64(r.volume),
                    adj_close: r.adj_close,
                })
            })
            .collect();

        Ok(adapt::adapt(
            BarFrame::new(self.symbol, bars),
            self.index,
            tz,
        ))
    }
}
