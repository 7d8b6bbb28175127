//! Performance metrics over a backtest series.
//!
//! Every function here is a total reduction: degenerate inputs (empty
//! series, fewer than two points, zero variance, non-positive starting
//! equity) yield 0.0 rather than an error, because short or tiny
//! datasets are an expected edge of the domain, not a failure.

use crate::domain::backtest::BacktestSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Annualization factor for the calendar-day return series that feeds
/// Sharpe and Sortino.
const DAYS_PER_YEAR: f64 = 252.0;

/// The fixed-shape result consumed by presentation collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub sortino: f64,
}

/// Compound annual growth rate of an equity series.
///
/// `periods_per_year` must match the bar frequency (252 for daily,
/// proportionally more for intraday); it is not inferred from the data.
pub fn compute_cagr(equity: &[f64], periods_per_year: f64) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let first = equity[0];
    let last = equity[equity.len() - 1];
    if first <= 0.0 {
        // Growth from non-positive equity is undefined.
        return 0.0;
    }
    let years = equity.len() as f64 / periods_per_year;
    (last / first).powf(1.0 / years) - 1.0
}

/// Most negative peak-to-trough decline, e.g. -0.25 for -25%. 0.0 for
/// an empty series or one that never declines.
pub fn compute_max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &value in equity {
        if value > peak {
            peak = value;
        }
        let dd = value / peak - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Annualized Sharpe ratio at zero risk-free rate. 0.0 when fewer than
/// two observations exist or the returns have no variance.
pub fn compute_sharpe(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let vol = sample_stdev(returns);
    if vol == 0.0 {
        return 0.0;
    }
    periods_per_year.sqrt() * mean(returns) / vol
}

/// Sortino ratio: like Sharpe but the denominator is the deviation of
/// the strictly-negative returns only. 0.0 when no negative returns
/// exist or their deviation is undefined/zero.
pub fn compute_sortino(returns: &[f64], periods_per_year: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_vol = sample_stdev(&downside);
    if downside.is_empty() || downside_vol == 0.0 {
        return 0.0;
    }
    periods_per_year.sqrt() * mean(returns) / downside_vol
}

/// Reduce a backtest series to the five summary statistics.
///
/// Sharpe and Sortino are computed on net returns summed per UTC
/// calendar day, which normalizes them across bar frequencies; they
/// annualize with 252 trading days. CAGR and max drawdown use the raw
/// per-bar equity curve, so CAGR annualizes with the caller's
/// `periods_per_year`.
pub fn summarize_performance(series: &BacktestSeries, periods_per_year: f64) -> PerformanceSummary {
    let equity = series.equity();
    let daily = daily_net_returns(series);

    let total_return = equity.last().map(|e| e - 1.0).unwrap_or(0.0);

    PerformanceSummary {
        total_return,
        cagr: compute_cagr(&equity, periods_per_year),
        max_drawdown: compute_max_drawdown(&equity),
        sharpe: compute_sharpe(&daily, DAYS_PER_YEAR),
        sortino: compute_sortino(&daily, DAYS_PER_YEAR),
    }
}

/// Net returns summed per UTC calendar day, in chronological order.
/// Relies on the records being timestamp-ordered, so each day forms a
/// contiguous run.
pub fn daily_net_returns(series: &BacktestSeries) -> Vec<f64> {
    let mut daily = Vec::new();
    let mut current_day: Option<NaiveDate> = None;
    let mut day_sum = 0.0_f64;

    for record in &series.records {
        let day = chrono::DateTime::from_timestamp_millis(record.timestamp_ms)
            .unwrap_or_default()
            .date_naive();

        match current_day {
            Some(d) if d == day => day_sum += record.net_return,
            Some(_) => {
                daily.push(day_sum);
                current_day = Some(day);
                day_sum = record.net_return;
            }
            None => {
                current_day = Some(day);
                day_sum = record.net_return;
            }
        }
    }

    if current_day.is_some() {
        daily.push(day_sum);
    }

    daily
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator); 0.0 below two points.
fn sample_stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
