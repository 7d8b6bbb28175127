//! SMA crossover signal generation.

use crate::domain::bar::Bar;
use crate::domain::indicator::sma;

/// Directional signal for one bar: long (+1), flat (0) or short (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Long,
    Flat,
    Short,
}

impl Signal {
    /// Position size implied by the signal, in units of notional.
    pub fn position(self) -> f64 {
        match self {
            Signal::Long => 1.0,
            Signal::Flat => 0.0,
            Signal::Short => -1.0,
        }
    }
}

/// One signal per bar from a fast/slow SMA crossover.
///
/// Long when fast > slow, short when fast < slow, flat when they are
/// exactly equal or when either average is still in its warm-up span.
/// Undefined and no-edge deliberately collapse to the same flat state;
/// the `Option` match keeps that decision explicit instead of leaning
/// on NaN comparison semantics.
///
/// Pure: `fast == slow` is all-flat everywhere both averages exist, a
/// window longer than the series is all-flat outright.
pub fn generate_signals(bars: &[Bar], fast: usize, slow: usize) -> Vec<Signal> {
    let fast_sma = sma(bars, fast);
    let slow_sma = sma(bars, slow);

    fast_sma
        .iter()
        .zip(slow_sma.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) if f > s => Signal::Long,
            (Some(f), Some(s)) if f < s => Signal::Short,
            _ => Signal::Flat,
        })
        .collect()
}
