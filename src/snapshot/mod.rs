//! Point-in-time quote snapshots at three detail levels.
//!
//! | level | source | shape |
//! |-------|--------|-------|
//! | 0 | field query | one quoted CSV line per symbol, caller-chosen fields |
//! | 1 | light | JSON array behind a 3-byte guard |
//! | 2 | heavy | XML, one `finance` element per symbol |
//!
//! Whatever the level, the result is keyed by the caller's symbols in the caller's order.

mod heavy;
mod light;
mod query;

pub use heavy::{parse_heavy, parse_heavy_raw};
pub use light::parse_light;
pub use query::{FieldSelection, parse_csv, select_fields};

use crate::core::client::{CacheMode, CallOptions, RetryConfig};
use crate::core::{QfClient, QfError, QuoteRecord, Snapshot, SnapshotSource};
use crate::fields::{CsvField, FieldTable, HeavyField, empty_record};

/// Requested richness of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    /// Level 0: field query (CSV).
    FieldQuery,
    /// Level 1: light quote info (JSON).
    Light,
    /// Level 2: heavy quote feed (XML).
    Heavy,
}

impl TryFrom<u8> for DetailLevel {
    type Error = QfError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(DetailLevel::FieldQuery),
            1 => Ok(DetailLevel::Light),
            2 => Ok(DetailLevel::Heavy),
            other => Err(QfError::InvalidDetailLevel(other)),
        }
    }
}

impl From<DetailLevel> for SnapshotSource {
    fn from(level: DetailLevel) -> Self {
        match level {
            DetailLevel::FieldQuery => SnapshotSource::FieldQuery,
            DetailLevel::Light => SnapshotSource::Light,
            DetailLevel::Heavy => SnapshotSource::Heavy,
        }
    }
}

/// Strip a two-letter market suffix (`BNP.PA` → `BNP`) for sources that reject it.
pub fn strip_market_suffix(symbol: &str) -> &str {
    match symbol.rfind('.') {
        Some(pos)
            if pos > 0
                && symbol.len() - pos == 3
                && symbol[pos + 1..].chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            &symbol[..pos]
        }
        _ => symbol,
    }
}

/// Builder for a multi-symbol snapshot.
///
/// ```no_run
/// # use quotefeed_rs::{QfClient, SnapshotBuilder};
/// # #[tokio::main]
/// # async fn main() -> Result<(), quotefeed_rs::QfError> {
/// let client = QfClient::default();
/// let snap = SnapshotBuilder::new(&client)
///     .symbols(["AAPL", "MSFT"])
///     .level(0)
///     .fields(["price", "change_pct"])
///     .fetch()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SnapshotBuilder<'a> {
    client: &'a QfClient,
    symbols: Vec<String>,
    level: u8,
    fields: Option<Vec<String>>,
    markets: Option<Vec<String>>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(client: &'a QfClient) -> Self {
        Self {
            client,
            symbols: Vec::new(),
            level: 0,
            fields: None,
            markets: None,
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    /// Set the symbols to query. Output keys are exactly these strings, in this order.
    pub fn symbols<I, S>(mut self, syms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = syms.into_iter().map(Into::into).collect();
        self
    }

    /// Add a single symbol.
    pub fn add_symbol(mut self, sym: impl Into<String>) -> Self {
        self.symbols.push(sym.into());
        self
    }

    /// Detail level: 0 (field query, default), 1 (light) or 2 (heavy).
    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Field names for level 0. Defaults to [`CsvField::DEFAULTS`].
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Exchange codes for level 1, one per symbol, sent as `SYMBOL:MARKET`.
    pub fn markets<I, S>(mut self, markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markets = Some(markets.into_iter().map(Into::into).collect());
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

    /// Execute the request.
    ///
    /// Returns `Ok(None)` when the source produced no data (transport failure, malformed
    /// payload, records that cannot be matched to the symbols).
    ///
    /// # Errors
    /// [`QfError::InvalidDetailLevel`], [`QfError::EmptyFieldSet`] and
    /// [`QfError::InvalidParams`] (no symbols, or a market list of the wrong length).
    #[tracing::instrument(skip(self), err, fields(level = self.level, symbols = self.symbols.len()))]
    pub async fn fetch(self) -> Result<Option<Snapshot>, QfError> {
        let level = DetailLevel::try_from(self.level)?;
        if self.symbols.is_empty() {
            return Err(QfError::InvalidParams(
                "snapshot: at least one symbol required".into(),
            ));
        }

        let records = match level {
            DetailLevel::FieldQuery => self.fetch_field_query().await?,
            DetailLevel::Light => self.fetch_light().await?,
            DetailLevel::Heavy => self.fetch_heavy().await,
        };

        let Some(records) = records else {
            tracing::error!("no stock information");
            return Ok(None);
        };

        let entries = self.symbols.iter().cloned().zip(records).collect();
        Ok(Some(Snapshot::new(level.into(), entries)))
    }

    fn google_symbols(&self) -> Vec<String> {
        self.symbols
            .iter()
            .map(|s| strip_market_suffix(s).to_string())
            .collect()
    }

    async fn fetch_field_query(&self) -> Result<Option<Vec<QuoteRecord>>, QfError> {
        let selection = match &self.fields {
            Some(requested) => select_fields(requested.as_slice())?,
            None => {
                let defaults: Vec<&str> = CsvField::DEFAULTS.iter().map(|f| f.name()).collect();
                select_fields(defaults.as_slice())?
            }
        };

        let mut url = self.client.endpoints().quotes_csv.clone();
        url.query_pairs_mut()
            .append_pair("s", &self.symbols.join(" "))
            .append_pair("f", &selection.format_tags());

        tracing::info!(%url, "retrieving field-query snapshot");
        let key = fixture_key(&self.symbols);
        let body = match self
            .client
            .get_bytes(&url, &self.call("snapshot_fields", &key, "csv"))
            .await
        {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "field query failed");
                return Ok(None);
            }
        };

        Ok(parse_csv(&body, &self.symbols, &selection)
            .inspect_err(|e| tracing::error!(error = %e, "parsing field query response"))
            .ok())
    }

    async fn fetch_light(&self) -> Result<Option<Vec<QuoteRecord>>, QfError> {
        let symbols = self.google_symbols();
        let query: Vec<String> = match &self.markets {
            Some(markets) if markets.len() != symbols.len() => {
                return Err(QfError::InvalidParams(format!(
                    "snapshot: {} markets for {} symbols",
                    markets.len(),
                    symbols.len()
                )));
            }
            Some(markets) => symbols
                .iter()
                .zip(markets)
                .map(|(s, m)| format!("{s}:{m}"))
                .collect(),
            None => symbols.clone(),
        };

        let mut url = self.client.endpoints().snapshot_light.clone();
        url.query_pairs_mut()
            .append_pair("client", "ig")
            .append_pair("q", &query.join(","));

        tracing::info!(%url, "retrieving light snapshot");
        let key = fixture_key(&symbols);
        let body = match self
            .client
            .get_bytes(&url, &self.call("snapshot_light", &key, "json"))
            .await
        {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "light snapshot request failed");
                return Ok(None);
            }
        };

        Ok(parse_light(&body, &symbols, self.client.light_preamble())
            .inspect_err(|e| tracing::error!(error = %e, "parsing light snapshot"))
            .ok())
    }

    /// One batched request; if it fails for a multi-symbol batch, each symbol is retried on
    /// its own so the others still get data. Symbols that fail alone get an all-missing
    /// record. `None` only when nothing at all came back.
    async fn fetch_heavy(&self) -> Option<Vec<QuoteRecord>> {
        let symbols = self.google_symbols();
        let err = match self.heavy_batch(&symbols).await {
            Ok(records) => return Some(records),
            Err(e) => e,
        };

        if symbols.len() == 1 {
            tracing::error!(error = %err, "heavy snapshot failed");
            return None;
        }
        tracing::warn!(error = %err, "heavy snapshot batch failed, retrying per symbol");

        let mut out = Vec::with_capacity(symbols.len());
        let mut any_ok = false;
        for symbol in &symbols {
            let single = std::slice::from_ref(symbol);
            match self.heavy_batch(single).await {
                Ok(records) if !records.is_empty() => {
                    any_ok = true;
                    out.extend(records);
                }
                Ok(_) => out.push(empty_record(HeavyField::ALL)),
                Err(e) => {
                    tracing::error!(error = %e, symbol = symbol.as_str(), "heavy snapshot failed for symbol");
                    out.push(empty_record(HeavyField::ALL));
                }
            }
        }
        any_ok.then_some(out)
    }

    async fn heavy_batch(&self, symbols: &[String]) -> Result<Vec<QuoteRecord>, QfError> {
        let mut url = self.client.endpoints().snapshot_heavy.clone();
        {
            let mut qp = url.query_pairs_mut();
            for s in symbols {
                qp.append_pair("stock", s);
            }
        }

        tracing::info!(%url, "retrieving heavy snapshot");
        let key = fixture_key(symbols);
        let body = self
            .client
            .get_bytes(&url, &self.call("snapshot_heavy", &key, "xml"))
            .await?;
        parse_heavy(&body, symbols)
    }

    fn call<'b>(&'b self, endpoint: &'b str, key: &'b str, ext: &'b str) -> CallOptions<'b> {
        CallOptions {
            endpoint,
            key,
            ext,
            cache_mode: self.cache_mode,
            retry: self.retry_override.as_ref(),
        }
    }
}

fn fixture_key(symbols: &[String]) -> String {
    match symbols {
        [one] => one.clone(),
        _ => "MULTI".to_string(),
    }
}
