//! Error types for the mean-reversion engine.

use crate::types::Symbol;

/// Errors surfaced by configuration, price tracking, and market-data collaborators.
///
/// Rebalances themselves never fail: a rebalance that cannot run yields an
/// empty target list instead (see [`PortfolioController::rebalance`]).
///
/// [`PortfolioController::rebalance`]: crate::PortfolioController::rebalance
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// A configuration field is out of range.
    #[error("invalid config: {0}")]
    Config(String),

    /// A price pushed into a tracker was zero, negative, or not finite.
    #[error("price for {symbol} must be positive and finite, got {price}")]
    InvalidPrice { symbol: Symbol, price: f64 },

    /// The historical price query failed for an instrument being added.
    #[error("history unavailable for {symbol}: {reason}")]
    History { symbol: Symbol, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
