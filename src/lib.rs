//! # nanorevert
//!
//! Online mean-reversion portfolio selection: Passive-Aggressive Mean
//! Reversion (PAMR) weight updates driven by pluggable price-relative
//! predictors.
//!
//! ## Features
//!
//! - **PAMR engine**: bounded, passive-aggressive weight updates
//! - **Simplex projection**: exact Euclidean projection (Duchi et al.)
//! - **Predictors**: last-ratio, or reversion toward a DTW barycenter
//! - **Deterministic**: single-threaded, seeded randomness, replayable
//!
//! ## Quick Start
//!
//! ```
//! use nanorevert::{Insight, MarketData, PamrConfig, PortfolioController, Predictor, Resolution, Symbol};
//!
//! struct Closes(Vec<(Symbol, Vec<f64>)>);
//!
//! impl MarketData for Closes {
//!     fn history(&mut self, symbol: &Symbol, count: usize, _: Resolution) -> nanorevert::Result<Vec<f64>> {
//!         let (_, c) = self.0.iter().find(|(s, _)| s == symbol).unwrap();
//!         Ok(c[c.len().saturating_sub(count)..].to_vec())
//!     }
//! }
//!
//! let (aapl, msft) = (Symbol::new("AAPL"), Symbol::new("MSFT"));
//! let mut feed = Closes(vec![(aapl, vec![100.0, 120.0]), (msft, vec![100.0, 80.0])]);
//!
//! let mut ctl = PortfolioController::new(PamrConfig::default(), Predictor::LastRatio).unwrap();
//! ctl.on_instruments_added(&mut feed, &[aapl, msft]).unwrap();
//!
//! // b·x̃ = 0.5·1.2 + 0.5·0.8 = 1 does not exceed ε = 1: weights stay put.
//! let targets = ctl.rebalance(&[Insight::new(aapl), Insight::new(msft)]);
//! assert!((targets[0].1 - 0.5).abs() < 1e-9);
//! ```
//!
//! ## Streaming
//!
//! After backfill, each close goes through
//! [`PortfolioController::on_price_tick`]. A rebalance with any instrument
//! whose window is not yet full returns no targets:
//!
//! ```
//! use nanorevert::{Insight, MarketData, PamrConfig, PortfolioController, Predictor, Resolution, Symbol};
//!
//! struct Empty;
//! impl MarketData for Empty {
//!     fn history(&mut self, _: &Symbol, _: usize, _: Resolution) -> nanorevert::Result<Vec<f64>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let spy = Symbol::new("SPY");
//! let mut ctl = PortfolioController::new(PamrConfig::default(), Predictor::LastRatio).unwrap();
//! ctl.on_instruments_added(&mut Empty, &[spy]).unwrap();
//!
//! ctl.on_price_tick(&spy, 400.0).unwrap();
//! assert!(ctl.rebalance(&[Insight::new(spy)]).is_empty());
//!
//! ctl.on_price_tick(&spy, 404.0).unwrap();
//! assert_eq!(ctl.rebalance(&[Insight::new(spy)])[0].1, 1.0);
//! ```
//!
//! ## Replay
//!
//! [`backtest::run_backtest`] drives a controller over an in-memory
//! [`backtest::PricePanel`] and reports wealth, drawdown and Sharpe ratio.

pub mod backtest;
pub mod config;
pub mod controller;
pub mod dtw;
mod error;
pub mod pamr;
pub mod predictor;
pub mod simplex;
pub mod stats;
mod types;
pub mod window;

// Re-export public API
pub use backtest::{BacktestConfig, BacktestReport, PricePanel, run_backtest};
pub use config::{BarycenterConfig, PamrConfig, Resolution};
pub use controller::{MarketData, PortfolioController, Targets};
pub use error::{Error, Result};
pub use pamr::{PamrUpdate, pamr_update};
pub use predictor::Predictor;
pub use simplex::project_simplex;
pub use types::{Insight, Symbol};
pub use window::TrackedInstrument;
