use polars::prelude::*;
use std::collections::BTreeSet;

use crate::core::{BarFrame, FieldValue, Snapshot};

/// Conversion of crate data structures into Polars DataFrames.
pub trait ToDataFrame {
    /// Converts the object into a Polars DataFrame.
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

impl ToDataFrame for BarFrame {
    /// One row per bar: `ts` (epoch seconds) followed by [`BarFrame::COLUMNS`].
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let ts: Vec<i64> = self.bars.iter().map(|b| b.ts.timestamp()).collect();
        let mut columns = vec![Column::new("ts".into(), ts)];
        for name in BarFrame::COLUMNS {
            let values = self.column(name).unwrap_or_default();
            columns.push(Column::new(name.into(), values));
        }
        DataFrame::new(columns)
    }
}

impl ToDataFrame for Snapshot {
    /// One row per symbol, one string column per field seen in any record.
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names: BTreeSet<&str> = self.iter().flat_map(|(_, r)| r.field_names()).collect();

        let symbols: Vec<&str> = self.symbols().collect();
        let mut columns = vec![Column::new("symbol".into(), symbols)];
        for name in names {
            let values: Vec<Option<String>> = self
                .iter()
                .map(|(_, r)| r.get(name).and_then(render))
                .collect();
            columns.push(Column::new(name.into(), values));
        }
        DataFrame::new(columns)
    }
}

fn render(v: &FieldValue) -> Option<String> {
    match v {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Float(f) => Some(f.to_string()),
        FieldValue::Int(i) => Some(i.to_string()),
        FieldValue::Missing | FieldValue::Invalid { .. } => None,
    }
}
