//! Report output port trait.

use crate::domain::backtest::BacktestSeries;
use crate::domain::error::QuantbtError;
use crate::domain::metrics::PerformanceSummary;

/// Port for persisting backtest output: the equity curve plus the
/// five-field performance summary.
pub trait ReportPort {
    fn write(
        &self,
        series: &BacktestSeries,
        summary: &PerformanceSummary,
        output_path: &str,
    ) -> Result<(), QuantbtError>;
}
