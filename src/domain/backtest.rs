//! Backtest simulation: signal series in, equity curve out.
//!
//! Everything is computed strictly left-to-right with each value
//! depending only on the current and previous bar. The position held
//! during bar t is the signal as of bar t-1's close: a signal computed
//! on bar t's close cannot be acted on until t+1, which is what keeps
//! lookahead bias out of the results.

use crate::domain::bar::Bar;
use crate::domain::signal::Signal;

/// Default transaction cost in basis points of notional per unit of
/// position change.
pub const DEFAULT_FEE_BP: f64 = 5.0;

/// Strategy and simulation parameters, validated before use by
/// `config_validation`.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub fast: usize,
    pub slow: usize,
    pub fee_bp: f64,
    pub periods_per_year: f64,
}

/// Per-bar derived fields, index-aligned 1:1 with the input bars.
///
/// One record per bar rather than parallel columns, so the fields can
/// never be reordered or filtered independently of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRecord {
    pub timestamp_ms: i64,
    /// close_t / close_{t-1} - 1; zero on the first bar.
    pub ret: f64,
    /// Position held during the bar: previous bar's signal.
    pub position: f64,
    /// |position_t - position_{t-1}|.
    pub trade_size: f64,
    pub cost: f64,
    pub net_return: f64,
    pub equity: f64,
}

/// Immutable result of a single simulation run.
#[derive(Debug, Clone, Default)]
pub struct BacktestSeries {
    pub records: Vec<BacktestRecord>,
}

impl BacktestSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ordered (timestamp, equity) pairs, the output contract consumed
    /// by presentation collaborators.
    pub fn equity_curve(&self) -> Vec<(i64, f64)> {
        self.records
            .iter()
            .map(|r| (r.timestamp_ms, r.equity))
            .collect()
    }

    pub fn equity(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.equity).collect()
    }

    pub fn net_returns(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.net_return).collect()
    }
}

/// Simulate one signal path over `bars`, paying `fee_bp` basis points
/// of notional per unit of position change.
///
/// Deterministic, no I/O; output length and order mirror the input.
/// If some net return reaches -100% the equity goes to zero or below
/// and every later value stays non-positive; compounding behaves that
/// way and the simulator does not clamp or floor it.
pub fn run_backtest(bars: &[Bar], signals: &[Signal], fee_bp: f64) -> BacktestSeries {
    debug_assert_eq!(bars.len(), signals.len());

    let cost_per_unit = fee_bp / 10_000.0;
    let mut records = Vec::with_capacity(bars.len());
    let mut prev_close = 0.0_f64;
    let mut prev_signal = Signal::Flat;
    let mut prev_position = 0.0_f64;
    let mut equity = 1.0_f64;

    for (i, (bar, signal)) in bars.iter().zip(signals.iter()).enumerate() {
        let ret = if i == 0 { 0.0 } else { bar.close / prev_close - 1.0 };

        // One-bar lag: trade this bar on the previous bar's signal.
        let position = if i == 0 { 0.0 } else { prev_signal.position() };

        // On the first bar the prior position is taken as zero, so
        // trade_size_0 = |position_0|. Always 0 under the lag rule, but
        // kept so a change of lag policy cannot silently skip the
        // entry cost of an initial position.
        let trade_size = (position - prev_position).abs();
        let cost = trade_size * cost_per_unit;
        let net_return = position * ret - cost;
        equity *= 1.0 + net_return;

        records.push(BacktestRecord {
            timestamp_ms: bar.timestamp_ms,
            ret,
            position,
            trade_size,
            cost,
            net_return,
            equity,
        });

        prev_close = bar.close;
        prev_signal = *signal;
        prev_position = position;
    }

    BacktestSeries { records }
}
