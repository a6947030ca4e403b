//! Reindexing and timezone normalization shared by every bar source.

use chrono_tz::Tz;

use crate::core::{Bar, BarFrame, SampleIndex};

/// Express every bar timestamp in `tz`.
pub fn localize(mut frame: BarFrame, tz: Tz) -> BarFrame {
    for bar in &mut frame.bars {
        bar.ts = bar.ts.with_timezone(&tz);
    }
    frame
}

/// Sort, then either localize (daily index) or reindex onto the index grid.
///
/// Reindexing is as-of: each index timestamp takes the last bar at or before it. Index
/// timestamps earlier than the first bar produce no row.
pub fn adapt(mut frame: BarFrame, index: &SampleIndex, tz: Tz) -> BarFrame {
    frame.bars.sort_by_key(|b| b.ts.timestamp());
    if index.freq().is_daily() {
        return localize(frame, tz);
    }

    let mut out = Vec::with_capacity(index.len());
    let mut next = 0;
    for t in index.timestamps() {
        while next < frame.bars.len() && frame.bars[next].ts.timestamp() <= t.timestamp() {
            next += 1;
        }
        if next == 0 {
            continue;
        }
        let src = &frame.bars[next - 1];
        out.push(Bar {
            ts: t.with_timezone(&tz),
            ..src.clone()
        });
    }
    BarFrame::new(frame.symbol, out)
}
