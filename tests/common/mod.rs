#![allow(dead_code)]

use quantbt::domain::bar::Bar;

pub const HOUR_MS: i64 = 3_600_000;

/// 2024-01-01T00:00:00Z.
pub const JAN_2024_MS: i64 = 1_704_067_200_000;

pub fn make_bar(timestamp_ms: i64, close: f64) -> Bar {
    Bar {
        timestamp_ms,
        open: close,
        high: close,
        low: close,
        close,
        volume: 100.0,
    }
}

/// `n` hourly bars starting at `JAN_2024_MS` with closes interpolated
/// linearly from `first_close` to `last_close`.
pub fn linear_hourly_bars(n: usize, first_close: f64, last_close: f64) -> Vec<Bar> {
    let step = if n > 1 {
        (last_close - first_close) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n)
        .map(|i| {
            make_bar(
                JAN_2024_MS + i as i64 * HOUR_MS,
                first_close + step * i as f64,
            )
        })
        .collect()
}
