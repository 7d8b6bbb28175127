//! quantbt — SMA crossover strategy backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`]. The pipeline is
//! a strict one-way flow: bars -> signals -> backtest series ->
//! performance summary, each stage a pure transform over immutable
//! input.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
