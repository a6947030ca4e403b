//! Name-resolving facade over the fetch builders.
//!
//! Callers hand in whatever they call an equity (a ticker, an alias, a company name); a
//! [`SymbolResolver`] turns each into a provider symbol once per request, and results come
//! back keyed by the caller's names.

use std::sync::Arc;

use crate::core::{
    BarFrame, IdentityResolver, QfClient, QfError, SampleIndex, Snapshot, SymbolResolver,
};
use crate::history::HistoryBuilder;
use crate::minute::MinuteBarsBuilder;
use crate::snapshot::SnapshotBuilder;

/// Entry point for name-based access to remote data.
#[derive(Clone)]
pub struct Remote {
    client: QfClient,
    resolver: Arc<dyn SymbolResolver>,
}

impl Remote {
    /// A facade that uses names as provider symbols.
    pub fn new(client: &QfClient) -> Self {
        Self::with_resolver(client, IdentityResolver)
    }

    pub fn with_resolver(client: &QfClient, resolver: impl SymbolResolver + 'static) -> Self {
        Self {
            client: client.clone(),
            resolver: Arc::new(resolver),
        }
    }

    fn resolve<S: AsRef<str>>(&self, equities: &[S]) -> Vec<String> {
        equities
            .iter()
            .map(|e| self.resolver.guess_name(e.as_ref()))
            .collect()
    }

    /// Snapshot `equities` at `level` (see [`SnapshotBuilder::level`]).
    ///
    /// The snapshot is keyed by `equities`, not by the resolved symbols.
    pub async fn fetch_equities_snapshot<S: AsRef<str>>(
        &self,
        equities: &[S],
        level: u8,
    ) -> Result<Option<Snapshot>, QfError> {
        let symbols = self.resolve(equities);
        let snap = SnapshotBuilder::new(&self.client)
            .symbols(symbols)
            .level(level)
            .fetch()
            .await?;
        Ok(snap.map(|s| s.rekey(equities)))
    }

    /// Daily history for each equity, in input order. An empty input gives an empty result.
    pub async fn fetch_equities_daily<S: AsRef<str>>(
        &self,
        equities: &[S],
        index: &SampleIndex,
    ) -> Result<Vec<(String, BarFrame)>, QfError> {
        let symbols = self.resolve(equities);
        let mut out = Vec::with_capacity(equities.len());
        for (name, symbol) in equities.iter().zip(symbols) {
            let mut frame = HistoryBuilder::new(&self.client, symbol, index).fetch().await?;
            frame.symbol = name.as_ref().to_string();
            out.push((name.as_ref().to_string(), frame));
        }
        Ok(out)
    }

    /// Intraday bars for one equity on `market`.
    pub async fn fetch_minutely(
        &self,
        equity: &str,
        market: &str,
        index: &SampleIndex,
    ) -> Result<BarFrame, QfError> {
        let symbol = self.resolver.guess_name(equity);
        let mut frame = MinuteBarsBuilder::new(&self.client, symbol, market, index)
            .fetch()
            .await?;
        frame.symbol = equity.to_string();
        Ok(frame)
    }
}
