//! CLI definition and dispatch.

use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_store_adapter::CsvStoreAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, DEFAULT_FEE_BP};
use crate::domain::config_validation::{
    parse_utc_ms, validate_data_config, validate_strategy_config,
};
use crate::domain::error::QuantbtError;
use crate::domain::metrics::summarize_performance;
use crate::domain::signal::generate_signals;
use crate::domain::timeframe::Timeframe;
use crate::ports::bar_store::{BarFilter, BarStore};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantbt", about = "SMA crossover strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        /// Write the equity curve and summary as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate configuration without loading data
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the stored data range for the configured symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols stored for an exchange
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        exchange: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            exchange,
            output,
            dry_run,
        } => run_backtest_command(
            &config,
            symbol.as_deref(),
            exchange.as_deref(),
            output.as_deref(),
            dry_run,
        ),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::ListSymbols { config, exchange } => {
            run_list_symbols(&config, exchange.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn validated_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = load_config(path)?;
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return Err(ExitCode::from(&e));
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return Err(ExitCode::from(&e));
    }
    Ok(adapter)
}

/// Strategy parameters from the `[strategy]` section. Assumes the
/// config already passed validation.
pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        fast: config.get_int("strategy", "fast", 0).max(0) as usize,
        slow: config.get_int("strategy", "slow", 0).max(0) as usize,
        fee_bp: config.get_double("strategy", "fee_bp", DEFAULT_FEE_BP),
        periods_per_year: config.get_double("strategy", "periods_per_year", 0.0),
    }
}

/// Bar selection from the `[data]` section, with CLI overrides.
pub fn build_bar_filter(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    exchange_override: Option<&str>,
) -> Result<BarFilter, QuantbtError> {
    let symbol = symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .ok_or_else(|| QuantbtError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        })?;
    let exchange = exchange_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "exchange"))
        .ok_or_else(|| QuantbtError::ConfigMissing {
            section: "data".to_string(),
            key: "exchange".to_string(),
        })?;

    let timeframe: Timeframe = config
        .get_string("data", "timeframe")
        .ok_or_else(|| QuantbtError::ConfigMissing {
            section: "data".to_string(),
            key: "timeframe".to_string(),
        })?
        .parse()?;

    let start_ms = config
        .get_string("data", "start")
        .map(|s| parse_utc_ms(&s, "start"))
        .transpose()?;
    let end_ms = config
        .get_string("data", "end")
        .map(|s| parse_utc_ms(&s, "end"))
        .transpose()?;
    let resample = config
        .get_string("data", "resample")
        .map(|s| s.parse::<Timeframe>())
        .transpose()?;

    Ok(BarFilter {
        exchange,
        symbol,
        timeframe,
        start_ms,
        end_ms,
        resample,
    })
}

fn open_store(config: &dyn ConfigPort) -> Result<CsvStoreAdapter, QuantbtError> {
    let root = config
        .get_string("data", "root")
        .ok_or_else(|| QuantbtError::ConfigMissing {
            section: "data".to_string(),
            key: "root".to_string(),
        })?;
    Ok(CsvStoreAdapter::new(PathBuf::from(root)))
}

fn run_backtest_command(
    config_path: &std::path::Path,
    symbol: Option<&str>,
    exchange: Option<&str>,
    output: Option<&std::path::Path>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if dry_run {
        eprintln!("Config OK (dry run, no data loaded)");
        return ExitCode::SUCCESS;
    }

    match run_pipeline(&adapter, symbol, exchange, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_pipeline(
    adapter: &FileConfigAdapter,
    symbol: Option<&str>,
    exchange: Option<&str>,
    output: Option<&std::path::Path>,
) -> Result<(), QuantbtError> {
    let bt_config = build_backtest_config(adapter);
    let filter = build_bar_filter(adapter, symbol, exchange)?;
    let store = open_store(adapter)?;

    eprintln!(
        "Loading {} {} bars from {}...",
        filter.symbol, filter.timeframe, filter.exchange
    );
    let bars = store.load(&filter)?;
    if bars.is_empty() {
        return Err(QuantbtError::NoData {
            symbol: filter.symbol,
            exchange: filter.exchange,
        });
    }
    eprintln!("Loaded {} bars", bars.len());

    let signals = generate_signals(&bars, bt_config.fast, bt_config.slow);
    let series = run_backtest(&bars, &signals, bt_config.fee_bp);
    let summary = summarize_performance(&series, bt_config.periods_per_year);

    let final_equity = series.records.last().map(|r| r.equity).unwrap_or(1.0);
    println!("bars            {}", series.len());
    println!("final equity    {final_equity:.6}");
    println!("total return    {:>10.4}%", summary.total_return * 100.0);
    println!("cagr            {:>10.4}%", summary.cagr * 100.0);
    println!("max drawdown    {:>10.4}%", summary.max_drawdown * 100.0);
    println!("sharpe          {:>10.4}", summary.sharpe);
    println!("sortino         {:>10.4}", summary.sortino);

    if let Some(path) = output {
        let path_str = path.display().to_string();
        CsvReportAdapter.write(&series, &summary, &path_str)?;
        eprintln!("Report written to {path_str}");
    }

    Ok(())
}

fn run_info(config_path: &std::path::Path, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), QuantbtError> {
        let filter = build_bar_filter(&adapter, symbol, None)?;
        let store = open_store(&adapter)?;

        match store.data_range(&filter.exchange, &filter.symbol, filter.timeframe)? {
            Some((first_ms, last_ms, count)) => {
                let first = DateTime::from_timestamp_millis(first_ms).unwrap_or_default();
                let last = DateTime::from_timestamp_millis(last_ms).unwrap_or_default();
                println!(
                    "{} on {} ({}): {} bars, {} to {}",
                    filter.symbol,
                    filter.exchange,
                    filter.timeframe,
                    count,
                    first.to_rfc3339(),
                    last.to_rfc3339()
                );
            }
            None => println!(
                "{} on {}: no data stored",
                filter.symbol, filter.exchange
            ),
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_list_symbols(config_path: &std::path::Path, exchange: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), QuantbtError> {
        let exchange = exchange
            .map(str::to_string)
            .or_else(|| adapter.get_string("data", "exchange"))
            .ok_or_else(|| QuantbtError::ConfigMissing {
                section: "data".to_string(),
                key: "exchange".to_string(),
            })?;
        let store = open_store(&adapter)?;
        for symbol in store.list_symbols(&exchange)? {
            println!("{symbol}");
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    match validated_config(config_path) {
        Ok(_) => {
            println!("Config OK");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}
