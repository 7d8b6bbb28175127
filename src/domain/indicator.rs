//! Simple moving average over bar closes.
//!
//! O(n) sliding window sum. The first (period - 1) positions are the
//! warm-up span and carry no value; they are `None` rather than a NaN
//! or a flagged zero, so downstream comparisons have to deal with the
//! undefined case explicitly.

use crate::domain::bar::Bar;

/// Trailing SMA of `close` over `period` bars, index-aligned with the
/// input. `None` until a full window is available; `period == 0` or
/// `period > bars.len()` yields all-`None`.
pub fn sma(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0_f64;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }
        if i >= period - 1 {
            values.push(Some(window_sum / period as f64));
        } else {
            values.push(None);
        }
    }

    values
}
