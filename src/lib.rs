//! quotefeed-rs: normalizes public finance feeds into one data model.
//!
//! Three upstream shapes are covered:
//! - a line-oriented minute-bar stream ([`MinuteBarsBuilder`]),
//! - a daily history CSV ([`HistoryBuilder`]),
//! - three snapshot endpoints of increasing detail ([`SnapshotBuilder`]): a quoted CSV
//!   field query (level 0), a JSON quote-info feed (level 1) and an XML quote feed (level 2).
//!
//! Every source ends up as either a [`BarFrame`] or a [`Snapshot`] keyed by the caller's
//! own symbol strings, in the caller's order.
//!
//! ```no_run
//! # use quotefeed_rs::{QfClient, SnapshotBuilder};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = QfClient::default();
//! let snap = SnapshotBuilder::new(&client)
//!     .symbols(["AAPL", "GOOG"])
//!     .level(1)
//!     .fetch()
//!     .await?;
//! if let Some(snap) = snap {
//!     for (symbol, record) in snap.iter() {
//!         println!("{symbol}: {:?}", record.get("change_perc"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod fields;
pub mod history;
pub mod minute;
pub mod remote;
pub mod snapshot;

pub use crate::core::client::{Backoff, CacheMode, HttpTransport, RetryConfig};
pub use crate::core::{
    Bar, BarFrame, BoxFuture, FieldValue, Frequency, IdentityResolver, QfClient, QfClientBuilder,
    QfError, QuoteRecord, SampleIndex, Snapshot, SnapshotSource, SymbolResolver, Transport,
};
pub use history::HistoryBuilder;
pub use minute::MinuteBarsBuilder;
pub use remote::Remote;
pub use snapshot::{DetailLevel, SnapshotBuilder};

#[cfg(feature = "dataframe")]
pub use crate::core::dataframe::ToDataFrame;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Meant for demos and tests; calling it more than once is harmless.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
