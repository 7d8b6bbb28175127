//! Bar repository port trait.
//!
//! The core never performs I/O; everything it consumes arrives through
//! this trait as a fully materialized, timestamp-ordered bar sequence.

use crate::domain::bar::Bar;
use crate::domain::error::QuantbtError;
use crate::domain::timeframe::Timeframe;

/// Selection of stored history to load.
#[derive(Debug, Clone)]
pub struct BarFilter {
    pub exchange: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Inclusive epoch-ms bounds; `None` means unbounded.
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    /// Resample loaded bars to a coarser timeframe before returning.
    pub resample: Option<Timeframe>,
}

pub trait BarStore {
    /// Load, deduplicate and sort matching history. Guarantees the
    /// returned bars have strictly ascending unique timestamps.
    fn load(&self, filter: &BarFilter) -> Result<Vec<Bar>, QuantbtError>;

    /// Persist bars, merging with any already-stored history for the
    /// same (exchange, symbol, timeframe).
    fn save(
        &self,
        bars: &[Bar],
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(), QuantbtError>;

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, QuantbtError>;

    /// First timestamp, last timestamp and bar count for a symbol, or
    /// `None` when nothing is stored.
    fn data_range(
        &self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<(i64, i64, usize)>, QuantbtError>;
}
