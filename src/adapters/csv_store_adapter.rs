//! Partitioned CSV bar store.
//!
//! Layout: `root/exchange/SYMBOL/timeframe/YYYY-MM.csv`, one file per
//! UTC month, header `timestamp,open,high,low,close,volume` with epoch
//! milliseconds. `/` in symbols becomes `-` on disk (`BTC/USDT` ->
//! `BTC-USDT`). Loads concatenate every partition, dedupe by timestamp
//! (first occurrence wins) and sort ascending, so the bars handed to
//! the core always satisfy its ordering contract. Saves merge with the
//! existing partition rather than overwrite, so re-saving overlapping
//! history never duplicates rows.

use crate::domain::bar::Bar;
use crate::domain::error::QuantbtError;
use crate::domain::resample::resample;
use crate::domain::timeframe::Timeframe;
use crate::ports::bar_store::{BarFilter, BarStore};
use chrono::{DateTime, Datelike};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvStoreAdapter {
    root: PathBuf,
}

impl CsvStoreAdapter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn symbol_dir(&self, exchange: &str, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.root
            .join(exchange)
            .join(symbol.replace('/', "-"))
            .join(timeframe.to_string())
    }

    fn partition_path(
        &self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
        month: &str,
    ) -> PathBuf {
        self.symbol_dir(exchange, symbol, timeframe)
            .join(format!("{month}.csv"))
    }
}

fn month_key(timestamp_ms: i64) -> String {
    let dt = DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_default();
    format!("{:04}-{:02}", dt.year(), dt.month())
}

fn read_partition(path: &Path) -> Result<Vec<Bar>, QuantbtError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| QuantbtError::Storage {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    let mut bars = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| QuantbtError::Storage {
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        })?;
        bars.push(parse_record(&record, path)?);
    }
    Ok(bars)
}

fn parse_record(record: &csv::StringRecord, path: &Path) -> Result<Bar, QuantbtError> {
    fn field<T: std::str::FromStr>(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        path: &Path,
    ) -> Result<T, QuantbtError>
    where
        T::Err: std::fmt::Display,
    {
        record
            .get(index)
            .ok_or_else(|| QuantbtError::Storage {
                reason: format!("missing {} column in {}", name, path.display()),
            })?
            .parse()
            .map_err(|e| QuantbtError::Storage {
                reason: format!("invalid {} value in {}: {}", name, path.display(), e),
            })
    }

    Ok(Bar {
        timestamp_ms: field(record, 0, "timestamp", path)?,
        open: field(record, 1, "open", path)?,
        high: field(record, 2, "high", path)?,
        low: field(record, 3, "low", path)?,
        close: field(record, 4, "close", path)?,
        volume: field(record, 5, "volume", path)?,
    })
}

fn write_partition(path: &Path, bars: &[Bar]) -> Result<(), QuantbtError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| QuantbtError::Storage {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;

    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])
        .map_err(|e| QuantbtError::Storage {
            reason: format!("failed to write header: {e}"),
        })?;
    for bar in bars {
        wtr.write_record([
            bar.timestamp_ms.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])
        .map_err(|e| QuantbtError::Storage {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;
    }
    wtr.flush().map_err(|e| QuantbtError::Storage {
        reason: format!("failed to flush {}: {}", path.display(), e),
    })
}

/// Sort ascending and drop duplicate timestamps, keeping the earliest
/// occurrence in the input.
fn dedupe_sorted(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp_ms);
    bars.dedup_by_key(|b| b.timestamp_ms);
    bars
}

impl BarStore for CsvStoreAdapter {
    fn load(&self, filter: &BarFilter) -> Result<Vec<Bar>, QuantbtError> {
        let dir = self.symbol_dir(&filter.exchange, &filter.symbol, filter.timeframe);
        if !dir.is_dir() {
            return Err(QuantbtError::NoData {
                symbol: filter.symbol.clone(),
                exchange: filter.exchange.clone(),
            });
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|e| QuantbtError::Storage {
                reason: format!("failed to read {}: {}", dir.display(), e),
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        paths.sort();

        let mut bars = Vec::new();
        for path in &paths {
            bars.extend(read_partition(path)?);
        }
        let mut bars = dedupe_sorted(bars);

        if let Some(start) = filter.start_ms {
            bars.retain(|b| b.timestamp_ms >= start);
        }
        if let Some(end) = filter.end_ms {
            bars.retain(|b| b.timestamp_ms <= end);
        }
        if let Some(target) = filter.resample {
            bars = resample(&bars, target);
        }

        Ok(bars)
    }

    fn save(
        &self,
        bars: &[Bar],
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<(), QuantbtError> {
        if bars.is_empty() {
            return Ok(());
        }

        let mut by_month: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
        for bar in bars {
            by_month
                .entry(month_key(bar.timestamp_ms))
                .or_default()
                .push(bar.clone());
        }

        for (month, chunk) in by_month {
            let path = self.partition_path(exchange, symbol, timeframe, &month);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            // Existing rows take precedence over re-fetched ones.
            let mut merged = if path.exists() {
                read_partition(&path)?
            } else {
                Vec::new()
            };
            merged.extend(chunk);
            write_partition(&path, &dedupe_sorted(merged))?;
        }

        Ok(())
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, QuantbtError> {
        let dir = self.root.join(exchange);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut symbols: Vec<String> = fs::read_dir(&dir)
            .map_err(|e| QuantbtError::Storage {
                reason: format!("failed to read {}: {}", dir.display(), e),
            })?
            .filter_map(|entry| entry.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<(i64, i64, usize)>, QuantbtError> {
        let filter = BarFilter {
            exchange: exchange.to_string(),
            symbol: symbol.to_string(),
            timeframe,
            start_ms: None,
            end_ms: None,
            resample: None,
        };
        let bars = match self.load(&filter) {
            Ok(bars) => bars,
            Err(QuantbtError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => {
                Some((first.timestamp_ms, last.timestamp_ms, bars.len()))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HOUR: i64 = 3_600_000;
    // 2024-01-31T22:00:00Z: two hourly bars later is February.
    const NEAR_MONTH_END: i64 = 1_706_738_400_000;

    fn hourly_bars(start_ms: i64, n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                timestamp_ms: start_ms + i as i64 * HOUR,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64,
                volume: 10.0,
            })
            .collect()
    }

    fn store() -> (TempDir, CsvStoreAdapter) {
        let dir = TempDir::new().unwrap();
        let adapter = CsvStoreAdapter::new(dir.path().to_path_buf());
        (dir, adapter)
    }

    fn filter(tf: &str) -> BarFilter {
        BarFilter {
            exchange: "binance".into(),
            symbol: "BTC/USDT".into(),
            timeframe: tf.parse().unwrap(),
            start_ms: None,
            end_ms: None,
            resample: None,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let (_dir, store) = store();
        let bars = hourly_bars(NEAR_MONTH_END, 5);
        let tf: Timeframe = "1h".parse().unwrap();

        store.save(&bars, "binance", "BTC/USDT", tf).unwrap();
        let loaded = store.load(&filter("1h")).unwrap();

        assert_eq!(loaded, bars);
    }

    #[test]
    fn save_splits_across_month_partitions() {
        let (dir, store) = store();
        let bars = hourly_bars(NEAR_MONTH_END, 5);
        let tf: Timeframe = "1h".parse().unwrap();

        store.save(&bars, "binance", "BTC/USDT", tf).unwrap();

        let base = dir.path().join("binance").join("BTC-USDT").join("1h");
        assert!(base.join("2024-01.csv").exists());
        assert!(base.join("2024-02.csv").exists());
    }

    #[test]
    fn resave_does_not_duplicate() {
        let (_dir, store) = store();
        let bars = hourly_bars(NEAR_MONTH_END, 5);
        let tf: Timeframe = "1h".parse().unwrap();

        store.save(&bars, "binance", "BTC/USDT", tf).unwrap();
        store.save(&bars[2..], "binance", "BTC/USDT", tf).unwrap();

        let loaded = store.load(&filter("1h")).unwrap();
        assert_eq!(loaded.len(), 5);
    }

    #[test]
    fn load_dedupes_and_sorts() {
        let (_dir, store) = store();
        let tf: Timeframe = "1h".parse().unwrap();
        let mut bars = hourly_bars(NEAR_MONTH_END, 4);
        bars.reverse();
        bars.push(bars[0].clone());

        store.save(&bars, "binance", "BTC/USDT", tf).unwrap();
        let loaded = store.load(&filter("1h")).unwrap();

        assert_eq!(loaded.len(), 4);
        assert!(crate::domain::bar::is_strictly_ordered(&loaded));
    }

    #[test]
    fn load_applies_time_range() {
        let (_dir, store) = store();
        let tf: Timeframe = "1h".parse().unwrap();
        let bars = hourly_bars(NEAR_MONTH_END, 6);
        store.save(&bars, "binance", "BTC/USDT", tf).unwrap();

        let mut f = filter("1h");
        f.start_ms = Some(NEAR_MONTH_END + HOUR);
        f.end_ms = Some(NEAR_MONTH_END + 3 * HOUR);
        let loaded = store.load(&f).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].timestamp_ms, NEAR_MONTH_END + HOUR);
    }

    #[test]
    fn load_resamples_when_requested() {
        let (_dir, store) = store();
        let tf: Timeframe = "1h".parse().unwrap();
        // Aligned to a 4h boundary so buckets are full.
        let start = (NEAR_MONTH_END / (4 * HOUR)) * 4 * HOUR + HOUR;
        store
            .save(&hourly_bars(start, 8), "binance", "BTC/USDT", tf)
            .unwrap();

        let mut f = filter("1h");
        f.resample = Some("4h".parse().unwrap());
        let loaded = store.load(&f).unwrap();

        assert_eq!(loaded.len(), 2);
        assert!((loaded[0].volume - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_symbol_is_no_data() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load(&filter("1h")),
            Err(QuantbtError::NoData { .. })
        ));
    }

    #[test]
    fn list_symbols_sorted() {
        let (_dir, store) = store();
        let tf: Timeframe = "1h".parse().unwrap();
        let bars = hourly_bars(NEAR_MONTH_END, 1);
        store.save(&bars, "binance", "ETH/USDT", tf).unwrap();
        store.save(&bars, "binance", "BTC/USDT", tf).unwrap();
        store.save(&bars, "kraken", "SOL/USD", tf).unwrap();

        assert_eq!(
            store.list_symbols("binance").unwrap(),
            vec!["BTC-USDT", "ETH-USDT"]
        );
        assert_eq!(store.list_symbols("kraken").unwrap(), vec!["SOL-USD"]);
        assert!(store.list_symbols("bitmex").unwrap().is_empty());
    }

    #[test]
    fn data_range_reports_bounds() {
        let (_dir, store) = store();
        let tf: Timeframe = "1h".parse().unwrap();
        store
            .save(&hourly_bars(NEAR_MONTH_END, 5), "binance", "BTC/USDT", tf)
            .unwrap();

        let range = store.data_range("binance", "BTC/USDT", tf).unwrap();
        assert_eq!(
            range,
            Some((NEAR_MONTH_END, NEAR_MONTH_END + 4 * HOUR, 5))
        );

        assert_eq!(store.data_range("binance", "XRP/USDT", tf).unwrap(), None);
    }
}
