//! Declarative mapping from provider keys to canonical fields.
//!
//! Each upstream has a static table (a field enum implementing [`FieldTable`]) that pairs
//! every canonical field with the provider key it is read from and the [`Coercer`] applied
//! to the raw text. [`apply_mapping`] runs one raw record through a table.

mod tables;

pub use tables::{CsvField, HeavyField, LightField};

use std::collections::BTreeMap;

use crate::core::{FieldValue, QuoteRecord};

/// Provider key → raw text, as read off the wire for one symbol.
pub type RawRecord = BTreeMap<String, String>;

/// How raw text becomes a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercer {
    /// Trimmed text; `N/A` is missing.
    Text,
    /// Decimal number. Thousands separators, a trailing `%` and a leading `+` are tolerated.
    Float,
    /// Integer. Thousands separators are tolerated.
    Int,
    /// The raw text, untouched.
    Raw,
}

impl Coercer {
    /// Coerce `raw`. Unparseable numbers become [`FieldValue::Invalid`] instead of failing.
    pub fn coerce(self, raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        match self {
            Coercer::Raw => FieldValue::Text(raw.to_string()),
            _ if trimmed.eq_ignore_ascii_case("N/A") => FieldValue::Missing,
            Coercer::Text => FieldValue::Text(trimmed.to_string()),
            Coercer::Float | Coercer::Int if trimmed.is_empty() || trimmed == "-" => {
                FieldValue::Missing
            }
            Coercer::Float => numeric_text(trimmed.trim_end_matches('%'))
                .parse::<f64>()
                .map(FieldValue::Float)
                .unwrap_or_else(|_| invalid(raw)),
            Coercer::Int => numeric_text(trimmed)
                .parse::<i64>()
                .map(FieldValue::Int)
                .unwrap_or_else(|_| invalid(raw)),
        }
    }
}

fn numeric_text(s: &str) -> String {
    s.trim_start_matches('+').replace(',', "")
}

fn invalid(raw: &str) -> FieldValue {
    FieldValue::Invalid {
        raw: raw.to_string(),
    }
}

/// A static provider mapping table, expressed as a field enum.
pub trait FieldTable: Copy + 'static {
    /// Every field of the table, in declaration order.
    const ALL: &'static [Self];

    /// Canonical field name.
    fn name(self) -> &'static str;

    /// Provider key the value is read from.
    fn key(self) -> &'static str;

    fn coercer(self) -> Coercer;
}

/// Map one raw record through `fields`.
///
/// Every field yields a key: absent provider keys become [`FieldValue::Missing`], failed
/// coercions become [`FieldValue::Invalid`] (and are logged against `symbol`).
pub fn apply_mapping<F: FieldTable>(raw: &RawRecord, fields: &[F], symbol: &str) -> QuoteRecord {
    let mut record = QuoteRecord::new();
    for &field in fields {
        let value = match raw.get(field.key()) {
            Some(text) => field.coercer().coerce(text),
            None => FieldValue::Missing,
        };
        if let FieldValue::Invalid { raw } = &value {
            tracing::warn!(
                symbol,
                field = field.name(),
                raw = raw.as_str(),
                "field failed coercion"
            );
        }
        record.insert(field.name(), value);
    }
    record
}

/// A record with every field of `fields` set to missing.
pub fn empty_record<F: FieldTable>(fields: &[F]) -> QuoteRecord {
    let mut record = QuoteRecord::new();
    for &field in fields {
        record.insert(field.name(), FieldValue::Missing);
    }
    record
}
