//! Bar interval parsing ("5m", "1h", "1d").

use crate::domain::error::QuantbtError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeframeUnit {
    Minute,
    Hour,
    Day,
}

/// A bar interval such as `5m`, `1h` or `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe {
    pub count: u32,
    pub unit: TimeframeUnit,
}

impl Timeframe {
    pub fn duration_ms(&self) -> i64 {
        let unit_ms: i64 = match self.unit {
            TimeframeUnit::Minute => 60_000,
            TimeframeUnit::Hour => 3_600_000,
            TimeframeUnit::Day => 86_400_000,
        };
        self.count as i64 * unit_ms
    }
}

impl FromStr for Timeframe {
    type Err = QuantbtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || QuantbtError::BadTimeframe { value: s.to_string() };

        let (digits, unit) = if let Some(d) = s.strip_suffix('m') {
            (d, TimeframeUnit::Minute)
        } else if let Some(d) = s.strip_suffix('h') {
            (d, TimeframeUnit::Hour)
        } else if let Some(d) = s.strip_suffix('d') {
            (d, TimeframeUnit::Day)
        } else {
            return Err(bad());
        };
        let count: u32 = digits.parse().map_err(|_| bad())?;
        if count == 0 {
            return Err(bad());
        }
        Ok(Timeframe { count, unit })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            TimeframeUnit::Minute => "m",
            TimeframeUnit::Hour => "h",
            TimeframeUnit::Day => "d",
        };
        write!(f, "{}{}", self.count, suffix)
    }
}
