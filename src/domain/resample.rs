//! Resampling bars to a coarser timeframe.
//!
//! Right-closed, right-labeled buckets: a bar with timestamp t belongs
//! to the bucket ending at the smallest multiple of the target width
//! that is >= t. Aggregation is the usual OHLCV rule: open from the
//! first bar, high/low extremes, close from the last, volume summed.
//! Empty buckets are dropped, so the output is not gap-free.

use crate::domain::bar::Bar;
use crate::domain::timeframe::Timeframe;

/// Label of the bucket containing `timestamp_ms` for width `width_ms`.
/// Timestamps on a boundary label the bucket that ends there.
fn bucket_end(timestamp_ms: i64, width_ms: i64) -> i64 {
    let q = timestamp_ms.div_euclid(width_ms);
    if timestamp_ms == q * width_ms {
        timestamp_ms
    } else {
        (q + 1) * width_ms
    }
}

/// Aggregate timestamp-ordered bars into `target`-sized buckets.
/// Expects input already sorted ascending; bars of one bucket are then
/// contiguous, and the output stays ordered.
pub fn resample(bars: &[Bar], target: Timeframe) -> Vec<Bar> {
    let width_ms = target.duration_ms();
    let mut out: Vec<Bar> = Vec::new();

    for bar in bars {
        let label = bucket_end(bar.timestamp_ms, width_ms);
        match out.last_mut() {
            Some(last) if last.timestamp_ms == label => {
                last.high = last.high.max(bar.high);
                last.low = last.low.min(bar.low);
                last.close = bar.close;
                last.volume += bar.volume;
            }
            _ => out.push(Bar {
                timestamp_ms: label,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            }),
        }
    }

    out
}
