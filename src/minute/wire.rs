use std::io::BufRead;

use crate::core::QfError;

/// Data lines start once a line begins with this marker.
pub(crate) const START_MARKER: char = 'a';

const INTERVAL_HEADER: &str = "INTERVAL=";
const TIMEZONE_HEADER: &str = "TIMEZONE_OFFSET=";

/// One decoded stream record, timestamp already made absolute (epoch seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinuteRecord {
    pub ts: i64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub volume: f64,
}

/// Parse the minute-bar stream.
///
/// Header lines are skipped until the first line starting with `a`. From there every line
/// is a record `timestamp,close,high,low,open,volume` until a blank line or end of input.
/// An `a`-prefixed timestamp is an absolute epoch and becomes the anchor; a bare number is
/// a step count from the last anchor, one step being the header `INTERVAL=` (or
/// `default_interval` when the header is absent). `TIMEZONE_OFFSET=` lines inside the data
/// are ignored.
pub fn parse_minute_feed<R: BufRead>(
    reader: R,
    default_interval: i64,
) -> Result<Vec<MinuteRecord>, QfError> {
    let mut interval = default_interval;
    let mut anchor: Option<i64> = None;
    let mut in_data = false;
    let mut out = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| QfError::Parse(format!("minute feed read: {e}")))?;
        let line = line.trim_end_matches('\r');

        if !in_data {
            if let Some(v) = line.strip_prefix(INTERVAL_HEADER) {
                interval = v.trim().parse().map_err(|e| {
                    QfError::Parse(format!("minute feed INTERVAL header '{v}': {e}"))
                })?;
            }
            if !line.starts_with(START_MARKER) {
                continue;
            }
            in_data = true;
        }

        if line.trim().is_empty() {
            break;
        }
        if line.starts_with(TIMEZONE_HEADER) {
            continue;
        }

        let record = parse_record(line, interval, &mut anchor)
            .map_err(|e| QfError::Parse(format!("minute feed line {}: {e}", lineno + 1)))?;
        out.push(record);
    }

    Ok(out)
}

fn parse_record(line: &str, interval: i64, anchor: &mut Option<i64>) -> Result<MinuteRecord, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let [ts, close, high, low, open, volume] = parts.as_slice() else {
        return Err(format!("expected 6 fields, got {}", parts.len()));
    };

    let ts = match ts.strip_prefix(START_MARKER) {
        Some(epoch) => {
            let epoch = epoch
                .parse::<i64>()
                .map_err(|e| format!("anchor '{ts}': {e}"))?;
            *anchor = Some(epoch);
            epoch
        }
        None => {
            let base = anchor.ok_or_else(|| format!("offset '{ts}' before any anchor"))?;
            let steps = ts
                .parse::<i64>()
                .map_err(|e| format!("offset '{ts}': {e}"))?;
            steps
                .checked_mul(interval)
                .and_then(|d| base.checked_add(d))
                .ok_or_else(|| format!("offset '{ts}' out of range"))?
        }
    };

    let num = |s: &str| s.parse::<f64>().map_err(|e| format!("value '{s}': {e}"));
    Ok(MinuteRecord {
        ts,
        close: num(*close)?,
        high: num(*high)?,
        low: num(*low)?,
        open: num(*open)?,
        volume: num(*volume)?,
    })
}
