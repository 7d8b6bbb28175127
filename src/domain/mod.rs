//! Core domain types and logic.

pub mod bar;
pub mod timeframe;
pub mod resample;
pub mod indicator;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
