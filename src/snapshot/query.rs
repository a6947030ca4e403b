use csv::{ReaderBuilder, Trim};

use crate::core::{QfError, QuoteRecord};
use crate::fields::{CsvField, FieldTable, RawRecord, apply_mapping};

/// Requested field-query fields after validation against the [`CsvField`] table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<CsvField>,
    rejected: Vec<String>,
}

impl FieldSelection {
    /// Supported fields in request order, without the implicit status column.
    pub fn fields(&self) -> &[CsvField] {
        &self.fields
    }

    /// Names that were removed from the request.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// The response columns: the selected fields followed by [`CsvField::Status`].
    pub fn columns(&self) -> Vec<CsvField> {
        let mut cols = self.fields.clone();
        cols.push(CsvField::Status);
        cols
    }

    /// The `f` query value: every column's format tag, concatenated.
    pub fn format_tags(&self) -> String {
        self.columns().iter().map(|f| f.key()).collect()
    }
}

/// Validate `requested` against the supported-field table.
///
/// Unknown names are removed and logged; duplicates and an explicit `status` are folded
/// away since the status column is always appended. If nothing supported is left the whole
/// request fails with [`QfError::EmptyFieldSet`].
pub fn select_fields<S: AsRef<str>>(requested: &[S]) -> Result<FieldSelection, QfError> {
    let mut fields = Vec::new();
    let mut rejected = Vec::new();
    for name in requested {
        let name = name.as_ref();
        match CsvField::from_name(name) {
            Some(CsvField::Status) => {}
            Some(f) if !fields.contains(&f) => fields.push(f),
            Some(_) => {}
            None => {
                tracing::warn!(field = name, "removing unsupported field from request");
                rejected.push(name.to_string());
            }
        }
    }

    if fields.is_empty() {
        return Err(QfError::EmptyFieldSet { rejected });
    }
    Ok(FieldSelection { fields, rejected })
}

/// Parse a field-query response: one quoted CSV line per symbol, in request order.
///
/// Values are matched positionally against `selection.columns()`. Short lines leave the
/// trailing fields missing; surplus values are logged and ignored. A line count different
/// from the symbol count is a [`QfError::ProtocolMismatch`].
pub fn parse_csv(
    body: &[u8],
    symbols: &[String],
    selection: &FieldSelection,
) -> Result<Vec<QuoteRecord>, QfError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body);

    let columns = selection.columns();
    let mut raws = Vec::with_capacity(symbols.len());
    for rec in rdr.records() {
        let rec = rec.map_err(|e| QfError::Parse(format!("field query csv: {e}")))?;
        if rec.iter().all(str::is_empty) {
            continue;
        }
        if rec.len() > columns.len() {
            tracing::warn!(
                expected = columns.len(),
                got = rec.len(),
                "field query line has surplus values"
            );
        }
        let raw: RawRecord = columns
            .iter()
            .zip(rec.iter())
            .map(|(f, v)| (f.key().to_string(), v.to_string()))
            .collect();
        raws.push(raw);
    }

    if raws.len() != symbols.len() {
        return Err(QfError::ProtocolMismatch(format!(
            "field query returned {} lines for {} symbols",
            raws.len(),
            symbols.len()
        )));
    }

    Ok(raws
        .iter()
        .zip(symbols)
        .map(|(raw, symbol)| apply_mapping(raw, &columns, symbol))
        .collect())
}
