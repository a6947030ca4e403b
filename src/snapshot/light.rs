use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::core::{QfError, QuoteRecord};
use crate::fields::{FieldTable, LightField, RawRecord, apply_mapping};

/// Parse a light snapshot body.
///
/// The first `preamble` bytes are a non-JSON guard and are dropped. The rest is a JSON
/// array with one object per requested symbol, in request order; records are matched to
/// `symbols` by position, so a length mismatch is a [`QfError::ProtocolMismatch`].
pub fn parse_light(
    body: &[u8],
    symbols: &[String],
    preamble: usize,
) -> Result<Vec<QuoteRecord>, QfError> {
    let json = body.get(preamble..).ok_or_else(|| {
        QfError::Parse(format!(
            "light snapshot body ({} bytes) shorter than its {preamble}-byte preamble",
            body.len()
        ))
    })?;
    let text = decode_text(json);
    let items: Vec<Map<String, Value>> = serde_json::from_str(&text)
        .map_err(|e| QfError::Parse(format!("light snapshot json: {e}")))?;

    if items.len() != symbols.len() {
        return Err(QfError::ProtocolMismatch(format!(
            "light snapshot returned {} records for {} symbols",
            items.len(),
            symbols.len()
        )));
    }

    Ok(items
        .iter()
        .zip(symbols)
        .map(|(item, symbol)| apply_mapping(&raw_record(item), LightField::ALL, symbol))
        .collect())
}

/// UTF-8 when valid, otherwise latin-1 (one char per byte).
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            tracing::warn!(
                valid_up_to = e.valid_up_to(),
                "light snapshot body is not utf-8, decoding as latin-1"
            );
            Cow::Owned(bytes.iter().map(|&b| b as char).collect())
        }
    }
}

fn raw_record(item: &Map<String, Value>) -> RawRecord {
    item.iter()
        .filter_map(|(k, v)| {
            let text = match v {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((k.clone(), text))
        })
        .collect()
}
