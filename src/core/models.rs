use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/* ----- BARS (shared by minute/ and history/) ----- */

/// One OHLCV sample. `adj_close` is `None` when the source has no adjusted close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub ts: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: Option<f64>,
}

/// Time-indexed bars for one symbol.
///
/// The column set is fixed ([`BarFrame::COLUMNS`]) whatever the source: a feed without
/// adjusted closes still yields an `adj_close` column, full of `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarFrame {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl BarFrame {
    pub const COLUMNS: [&'static str; 6] = ["open", "high", "low", "close", "volume", "adj_close"];

    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// The "no data" result.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn index(&self) -> Vec<DateTime<Tz>> {
        self.bars.iter().map(|b| b.ts).collect()
    }

    /// A column by canonical name, one entry per row; `None` marks a missing value.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let pick: fn(&Bar) -> Option<f64> = match name {
            "open" => |b| Some(b.open),
            "high" => |b| Some(b.high),
            "low" => |b| Some(b.low),
            "close" => |b| Some(b.close),
            #[allow(clippy::cast_precision_loss)]
            "volume" => |b| Some(b.volume as f64),
            "adj_close" => |b| b.adj_close,
            _ => return None,
        };
        Some(self.bars.iter().map(pick).collect())
    }

    /// Per-row returns on `close`, `(c[t] - c[t-1]) / c[t]`.
    ///
    /// The first row and any row with a zero close have no value of their own and take the
    /// next available one; trailing gaps stay `None`.
    pub fn returns(&self) -> Vec<Option<f64>> {
        let mut out: Vec<Option<f64>> = Vec::with_capacity(self.bars.len());
        out.push(None);
        for w in self.bars.windows(2) {
            let (prev, cur) = (w[0].close, w[1].close);
            let r = (cur - prev) / cur;
            out.push(r.is_finite().then_some(r));
        }
        out.truncate(self.bars.len());

        let mut next = None;
        for r in out.iter_mut().rev() {
            match r {
                Some(v) => next = Some(*v),
                None => *r = next,
            }
        }
        out
    }
}

/// Volumes arrive as decimals on some feeds; negative or non-finite ones read as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn volume_from_f64(v: f64) -> u64 {
    if v.is_finite() && v >= 0.0 {
        v.round() as u64
    } else {
        0
    }
}

/* ----- SNAPSHOTS ----- */

/// A coerced field value.
///
/// `Missing` stands for a field the upstream did not send (or sent as `N/A`);
/// `Invalid` keeps the raw text of a value that failed coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Int(i64),
    Missing,
    Invalid { raw: String },
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldValue::Invalid { .. })
    }
}

/// Canonical field name → value, for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuoteRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl QuoteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Which upstream a [`Snapshot`] came from. A snapshot never mixes sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapshotSource {
    FieldQuery,
    Light,
    Heavy,
}

/// Per-symbol quote records, in the order the caller asked for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    source: SnapshotSource,
    entries: Vec<(String, QuoteRecord)>,
}

impl Snapshot {
    pub(crate) fn new(source: SnapshotSource, entries: Vec<(String, QuoteRecord)>) -> Self {
        Self { source, entries }
    }

    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in caller order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn get(&self, symbol: &str) -> Option<&QuoteRecord> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QuoteRecord)> {
        self.entries.iter().map(|(s, r)| (s.as_str(), r))
    }

    pub fn into_entries(self) -> Vec<(String, QuoteRecord)> {
        self.entries
    }

    /// Replace the keys positionally with `names`. Lengths must match; extra names are ignored.
    pub(crate) fn rekey<S: AsRef<str>>(self, names: &[S]) -> Self {
        let entries = self
            .entries
            .into_iter()
            .zip(names)
            .map(|((_, record), name)| (name.as_ref().to_string(), record))
            .collect();
        Self {
            source: self.source,
            entries,
        }
    }
}
