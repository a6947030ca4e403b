use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::{FieldValue, QfError, QuoteRecord};
use crate::fields::{FieldTable, HeavyField, RawRecord, apply_mapping};

const RECORD_ELEMENT: &[u8] = b"finance";
const VALUE_ATTRIBUTE: &str = "data";

/// Parse a heavy snapshot document into raw records, one per `finance` element, in
/// document order. Each child element contributes `name → data attribute`.
pub fn parse_heavy_raw(body: &[u8]) -> Result<Vec<RawRecord>, QfError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<RawRecord> = None;
    let mut records = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| QfError::Parse(format!("heavy snapshot xml: {e}")))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                open_element(&e, depth, &mut current)?;
            }
            Event::Empty(e) => {
                if depth + 1 == 2 && e.name().as_ref() == RECORD_ELEMENT {
                    records.push(RawRecord::new());
                } else {
                    open_element(&e, depth + 1, &mut current)?;
                }
            }
            Event::End(_) => {
                if depth == 2
                    && let Some(done) = current.take()
                {
                    records.push(done);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(QfError::Parse("heavy snapshot xml: unexpected end of document".into()));
    }
    Ok(records)
}

// depth 1 is the document root, 2 a record, 3 a record field.
fn open_element(
    e: &BytesStart<'_>,
    depth: usize,
    current: &mut Option<RawRecord>,
) -> Result<(), QfError> {
    match depth {
        2 if e.name().as_ref() == RECORD_ELEMENT => *current = Some(RawRecord::new()),
        3 => {
            if let Some(record) = current.as_mut() {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                record.insert(name, data_attribute(e)?);
            }
        }
        _ => {}
    }
    Ok(())
}

fn data_attribute(e: &BytesStart<'_>) -> Result<String, QfError> {
    let attr = e
        .try_get_attribute(VALUE_ATTRIBUTE)
        .map_err(|err| QfError::Parse(format!("heavy snapshot attribute: {err}")))?;
    match attr {
        Some(a) => a
            .unescape_value()
            .map(|v| v.into_owned())
            .map_err(|err| QfError::Parse(format!("heavy snapshot attribute value: {err}"))),
        None => Ok(String::new()),
    }
}

/// Parse a heavy snapshot and match its records to `symbols`.
///
/// Records carry no reliable key, so they are matched by position. The match is checked
/// twice: the record count must equal the symbol count, and a record whose own `symbol`
/// field is present must name the symbol at its position (ignoring ASCII case).
/// Either failure is a [`QfError::ProtocolMismatch`].
///
/// Child elements outside the [`HeavyField`] table are kept as text under their own name.
pub fn parse_heavy(body: &[u8], symbols: &[String]) -> Result<Vec<QuoteRecord>, QfError> {
    let raws = parse_heavy_raw(body)?;
    if raws.len() != symbols.len() {
        return Err(QfError::ProtocolMismatch(format!(
            "heavy snapshot returned {} records for {} symbols",
            raws.len(),
            symbols.len()
        )));
    }

    let mut out = Vec::with_capacity(raws.len());
    for (raw, symbol) in raws.iter().zip(symbols) {
        if let Some(echoed) = raw.get(HeavyField::Symbol.key())
            && !echoed.is_empty()
            && !echoed.eq_ignore_ascii_case(symbol)
        {
            return Err(QfError::ProtocolMismatch(format!(
                "heavy snapshot record for '{echoed}' at the position of '{symbol}'"
            )));
        }

        let mut record = apply_mapping(raw, HeavyField::ALL, symbol);
        for (name, value) in raw {
            if !record.contains(name) {
                record.insert(name.clone(), FieldValue::Text(value.clone()));
            }
        }
        out.push(record);
    }
    Ok(out)
}
