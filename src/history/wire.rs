use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::core::QfError;

/// One row of the daily history CSV (`Date,Open,High,Low,Close,Volume,Adj Close`).
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: Option<f64>,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
    adj_close: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, QfError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let need = |name: &str| {
            find(name).ok_or_else(|| QfError::Parse(format!("history csv: missing '{name}' column")))
        };
        Ok(Self {
            date: need("Date")?,
            open: need("Open")?,
            high: need("High")?,
            low: need("Low")?,
            close: need("Close")?,
            volume: need("Volume")?,
            adj_close: find("Adj Close"),
        })
    }
}

/// Parse the daily history CSV into rows sorted by ascending date.
///
/// Rows with a missing or unparseable OHLC value are dropped (and logged); a missing
/// adjusted close only leaves `adj_close` empty.
pub fn parse_daily_csv(body: &[u8]) -> Result<Vec<DailyRow>, QfError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(body);

    let headers = rdr
        .headers()
        .map_err(|e| QfError::Parse(format!("history csv header: {e}")))?
        .clone();
    let cols = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| QfError::Parse(format!("history csv: {e}")))?;
        match decode_row(&rec, &cols) {
            Some(row) => rows.push(row),
            None => tracing::warn!(row = ?rec, "dropping incomplete history row"),
        }
    }

    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

fn decode_row(rec: &StringRecord, cols: &Columns) -> Option<DailyRow> {
    let num = |i: usize| rec.get(i).and_then(|s| s.parse::<f64>().ok());
    Some(DailyRow {
        date: NaiveDate::parse_from_str(rec.get(cols.date)?, "%Y-%m-%d").ok()?,
        open: num(cols.open)?,
        high: num(cols.high)?,
        low: num(cols.low)?,
        close: num(cols.close)?,
        volume: num(cols.volume)?,
        adj_close: cols.adj_close.and_then(num),
    })
}
