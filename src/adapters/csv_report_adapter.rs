//! CSV report adapter.
//!
//! Writes the equity curve to `output_path` as
//! `timestamp,datetime,equity` rows and the performance summary to a
//! sibling file with `_summary` appended to the stem, as `metric,value`
//! rows. Two flat files any spreadsheet or dashboard can ingest.

use crate::domain::backtest::BacktestSeries;
use crate::domain::error::QuantbtError;
use crate::domain::metrics::PerformanceSummary;
use crate::ports::report_port::ReportPort;
use chrono::DateTime;
use std::path::Path;

pub struct CsvReportAdapter;

fn summary_path(output_path: &str) -> std::path::PathBuf {
    let path = Path::new(output_path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!("{stem}_summary.csv"))
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        series: &BacktestSeries,
        summary: &PerformanceSummary,
        output_path: &str,
    ) -> Result<(), QuantbtError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| QuantbtError::Storage {
            reason: format!("failed to create {output_path}: {e}"),
        })?;

        wtr.write_record(["timestamp", "datetime", "equity"])
            .map_err(write_err)?;
        for (timestamp_ms, equity) in series.equity_curve() {
            let datetime = DateTime::from_timestamp_millis(timestamp_ms)
                .unwrap_or_default()
                .to_rfc3339();
            wtr.write_record([timestamp_ms.to_string(), datetime, equity.to_string()])
                .map_err(write_err)?;
        }
        wtr.flush().map_err(|e| QuantbtError::Storage {
            reason: format!("failed to flush {output_path}: {e}"),
        })?;

        let summary_path = summary_path(output_path);
        let mut wtr = csv::Writer::from_path(&summary_path).map_err(|e| QuantbtError::Storage {
            reason: format!("failed to create {}: {}", summary_path.display(), e),
        })?;

        wtr.write_record(["metric", "value"]).map_err(write_err)?;
        for (metric, value) in [
            ("total_return", summary.total_return),
            ("cagr", summary.cagr),
            ("max_drawdown", summary.max_drawdown),
            ("sharpe", summary.sharpe),
            ("sortino", summary.sortino),
        ] {
            wtr.write_record([metric.to_string(), value.to_string()])
                .map_err(write_err)?;
        }
        wtr.flush().map_err(|e| QuantbtError::Storage {
            reason: format!("failed to flush {}: {}", summary_path.display(), e),
        })
    }
}

fn write_err(e: csv::Error) -> QuantbtError {
    QuantbtError::Storage {
        reason: format!("failed to write report: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::BacktestRecord;
    use std::fs;
    use tempfile::TempDir;

    fn sample_series() -> BacktestSeries {
        let records = (0..3)
            .map(|i| BacktestRecord {
                timestamp_ms: 1_704_067_200_000 + i as i64 * 3_600_000,
                ret: 0.0,
                position: 0.0,
                trade_size: 0.0,
                cost: 0.0,
                net_return: 0.01,
                equity: 1.0 + i as f64 * 0.01,
            })
            .collect();
        BacktestSeries { records }
    }

    fn sample_summary() -> PerformanceSummary {
        PerformanceSummary {
            total_return: 0.02,
            cagr: 0.1,
            max_drawdown: -0.05,
            sharpe: 1.2,
            sortino: 1.8,
        }
    }

    #[test]
    fn writes_equity_and_summary_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.csv");

        CsvReportAdapter
            .write(&sample_series(), &sample_summary(), out.to_str().unwrap())
            .unwrap();

        let equity = fs::read_to_string(&out).unwrap();
        assert!(equity.starts_with("timestamp,datetime,equity\n"));
        assert_eq!(equity.lines().count(), 4);
        assert!(equity.contains("1704067200000"));
        assert!(equity.contains("2024-01-01T00:00:00+00:00"));

        let summary = fs::read_to_string(dir.path().join("report_summary.csv")).unwrap();
        assert!(summary.starts_with("metric,value\n"));
        assert!(summary.contains("total_return,0.02"));
        assert!(summary.contains("max_drawdown,-0.05"));
        assert_eq!(summary.lines().count(), 6);
    }

    #[test]
    fn empty_series_still_writes_headers() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.csv");

        CsvReportAdapter
            .write(&BacktestSeries::default(), &sample_summary(), out.to_str().unwrap())
            .unwrap();

        let equity = fs::read_to_string(&out).unwrap();
        assert_eq!(equity.trim(), "timestamp,datetime,equity");
    }
}
