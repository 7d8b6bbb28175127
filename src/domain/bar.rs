//! OHLCV bar representation.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// One time step of market data, stamped with epoch milliseconds (UTC).
///
/// Bars handed to the core are expected to be sorted by strictly
/// increasing `timestamp_ms` with no duplicates; the store adapter
/// enforces this on load, the core assumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp_ms)
            .single()
            .unwrap_or_default()
    }

    /// UTC calendar day the bar falls on, used for daily resampling of
    /// returns in the metrics engine.
    pub fn utc_day(&self) -> NaiveDate {
        self.datetime().date_naive()
    }
}

/// True when timestamps are strictly ascending (implies no duplicates).
pub fn is_strictly_ordered(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms)
}
