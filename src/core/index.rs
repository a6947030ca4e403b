use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use std::fmt;

use crate::core::QfError;

/// Sampling frequency of a [`SampleIndex`]: a multiplier and a unit code.
///
/// Unit codes follow the usual offset aliases: `S` (seconds), `T` (minutes), `H` (hours),
/// `D` (calendar days), `B` (business days). `min`, `s` and `h` are accepted as spellings of
/// `T`, `S` and `H`. Anything else is kept verbatim so it can be reported back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frequency {
    multiplier: u32,
    unit: String,
}

impl Frequency {
    pub fn new(multiplier: u32, unit: impl AsRef<str>) -> Self {
        Self {
            multiplier,
            unit: normalize_unit(unit.as_ref()),
        }
    }

    pub fn seconds(n: u32) -> Self {
        Self::new(n, "S")
    }

    pub fn minutes(n: u32) -> Self {
        Self::new(n, "T")
    }

    pub fn hours(n: u32) -> Self {
        Self::new(n, "H")
    }

    pub fn daily() -> Self {
        Self::new(1, "D")
    }

    pub fn business_daily() -> Self {
        Self::new(1, "B")
    }

    /// Parse a frequency string such as `"5T"`, `"30S"`, `"H"` or `"15min"`.
    /// A missing multiplier means 1.
    pub fn parse(s: &str) -> Result<Self, QfError> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        if unit.is_empty() {
            return Err(QfError::InvalidParams(format!(
                "frequency '{s}' has no unit"
            )));
        }
        let multiplier = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|e| QfError::InvalidParams(format!("frequency '{s}': {e}")))?
        };
        if multiplier == 0 {
            return Err(QfError::InvalidParams(format!(
                "frequency '{s}' has a zero multiplier"
            )));
        }
        Ok(Self::new(multiplier, unit))
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Sampling interval sent to the minute-bar stream.
    ///
    /// The stream samples one step late, so seconds get `+1` and minutes/hours are scaled by
    /// 61 and 3601 instead of 60 and 3600. Only `S`, `T` and `H` have a minute-feed
    /// interval; every other unit is [`QfError::UnsupportedFrequency`].
    pub fn interval_seconds(&self) -> Result<u32, QfError> {
        let m = self.multiplier;
        if m == 0 {
            return Err(QfError::UnsupportedFrequency(format!(
                "{self} has a zero multiplier"
            )));
        }
        let interval = match self.unit.as_str() {
            "S" => m.checked_add(1),
            "T" => m.checked_mul(61),
            "H" => m.checked_mul(3601),
            _ => return Err(QfError::UnsupportedFrequency(self.to_string())),
        };
        interval.ok_or_else(|| QfError::UnsupportedFrequency(format!("{self} overflows")))
    }

    /// Wall-clock length of one step, when the unit has a fixed one.
    pub(crate) fn nominal_seconds(&self) -> Option<i64> {
        let unit_secs = match self.unit.as_str() {
            "S" => 1,
            "T" => 60,
            "H" => 3_600,
            "D" | "B" => 86_400,
            _ => return None,
        };
        Some(unit_secs * i64::from(self.multiplier))
    }

    /// Daily or business-daily sampling, the native resolution of the history endpoint.
    pub fn is_daily(&self) -> bool {
        self.multiplier == 1 && matches!(self.unit.as_str(), "D" | "B")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.multiplier, self.unit)
    }
}

fn normalize_unit(unit: &str) -> String {
    match unit {
        "S" | "s" => "S".into(),
        "T" | "min" => "T".into(),
        "H" | "h" => "H".into(),
        "D" | "d" => "D".into(),
        other => other.to_string(),
    }
}

/// The caller's ordered sampling grid.
///
/// Fetchers only read it: the span in days and the frequency drive the upstream request,
/// and the timestamps are the reindexing target for daily history.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleIndex {
    timestamps: Vec<DateTime<Utc>>,
    freq: Frequency,
}

impl SampleIndex {
    /// Wrap an existing grid. Timestamps must be non-empty and ascending.
    pub fn new(timestamps: Vec<DateTime<Utc>>, freq: Frequency) -> Result<Self, QfError> {
        if timestamps.is_empty() {
            return Err(QfError::InvalidParams("index has no timestamps".into()));
        }
        if timestamps.windows(2).any(|w| w[0] > w[1]) {
            return Err(QfError::InvalidParams(
                "index timestamps must be ascending".into(),
            ));
        }
        Ok(Self { timestamps, freq })
    }

    /// Build a regular grid from `start` to `end` inclusive. Business-daily grids skip weekends.
    pub fn date_range(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        freq: Frequency,
    ) -> Result<Self, QfError> {
        if start > end {
            return Err(QfError::InvalidParams(
                "invalid date range: start must be before end".into(),
            ));
        }
        let step = freq.nominal_seconds().ok_or_else(|| {
            QfError::InvalidParams(format!("no fixed step for frequency {freq}"))
        })?;
        if step <= 0 {
            return Err(QfError::InvalidParams(format!(
                "frequency {freq} does not advance"
            )));
        }
        let step = Duration::seconds(step);

        let mut timestamps = Vec::new();
        let mut t = start;
        while t <= end {
            let weekend = matches!(t.weekday(), Weekday::Sat | Weekday::Sun);
            if !(freq.unit() == "B" && weekend) {
                timestamps.push(t);
            }
            t += step;
        }
        Self::new(timestamps, freq)
    }

    pub fn first(&self) -> DateTime<Utc> {
        self.timestamps[0]
    }

    pub fn last(&self) -> DateTime<Utc> {
        self.timestamps[self.timestamps.len() - 1]
    }

    pub fn freq(&self) -> &Frequency {
        &self.freq
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Whole days between the first and last timestamp.
    pub fn span_days(&self) -> i64 {
        (self.last() - self.first()).num_days().abs()
    }
}
