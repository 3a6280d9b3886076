//! In-memory replay backtest.
//!
//! Replays a panel of closes through a [`PortfolioController`] bar by bar:
//! every symbol is added at the first bar (backfilled from the panel), each
//! later bar is delivered as ticks, and a rebalance runs at every bar that
//! has a successor. Target weights are held over the next bar and drift with
//! prices until the next successful rebalance. Whatever is not invested sits
//! in cash at zero return.

use std::fmt;

use log::debug;
use rustc_hash::FxHashSet;

use crate::config::{PamrConfig, Resolution};
use crate::controller::{MarketData, PortfolioController};
use crate::error::{Error, Result};
use crate::predictor::Predictor;
use crate::stats::{mean, sample_std};
use crate::types::{Insight, Symbol};

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Aligned closes for a fixed set of symbols.
///
/// `closes[t][i]` is the close of `symbols[i]` at bar `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct PricePanel {
    pub symbols: Vec<Symbol>,
    pub closes: Vec<Vec<f64>>,
}

impl PricePanel {
    /// Build a validated panel.
    pub fn new(symbols: Vec<Symbol>, closes: Vec<Vec<f64>>) -> Result<Self> {
        let panel = Self { symbols, closes };
        panel.validate()?;
        Ok(panel)
    }

    /// Reject empty panels, ragged bars, non-positive prices and duplicate
    /// symbols.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::Config("panel has no symbols".into()));
        }
        if self.closes.is_empty() {
            return Err(Error::Config("panel has no bars".into()));
        }

        let mut seen = FxHashSet::default();
        for symbol in &self.symbols {
            if !seen.insert(*symbol) {
                return Err(Error::Config(format!("duplicate symbol {symbol}")));
            }
        }

        for (t, bar) in self.closes.iter().enumerate() {
            if bar.len() != self.symbols.len() {
                return Err(Error::Config(format!(
                    "bar {t} has {} closes, expected {}",
                    bar.len(),
                    self.symbols.len()
                )));
            }
            for (symbol, &price) in self.symbols.iter().zip(bar) {
                if !(price.is_finite() && price > 0.0) {
                    return Err(Error::InvalidPrice {
                        symbol: *symbol,
                        price,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn num_bars(&self) -> usize {
        self.closes.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    fn index_of(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// [`MarketData`] over a panel, exposing bars strictly before the cursor.
#[derive(Debug)]
pub struct PanelFeed<'a> {
    panel: &'a PricePanel,
    cursor: usize,
    subscribed: Vec<Symbol>,
}

impl<'a> PanelFeed<'a> {
    /// Feed with the first `visible` bars available as history.
    pub fn new(panel: &'a PricePanel, visible: usize) -> Self {
        Self {
            panel,
            cursor: visible.min(panel.num_bars()),
            subscribed: Vec::new(),
        }
    }

    /// Make one more bar visible. Returns `false` at the end of the panel.
    pub fn advance(&mut self) -> bool {
        if self.cursor >= self.panel.num_bars() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_subscribed(&self, symbol: &Symbol) -> bool {
        self.subscribed.contains(symbol)
    }
}

impl MarketData for PanelFeed<'_> {
    fn history(&mut self, symbol: &Symbol, count: usize, _resolution: Resolution) -> Result<Vec<f64>> {
        let i = self.panel.index_of(symbol).ok_or_else(|| Error::History {
            symbol: *symbol,
            reason: "not in panel".into(),
        })?;
        let start = self.cursor.saturating_sub(count);
        Ok(self.panel.closes[start..self.cursor]
            .iter()
            .map(|bar| bar[i])
            .collect())
    }

    fn subscribe(&mut self, symbol: &Symbol, _resolution: Resolution) {
        if !self.subscribed.contains(symbol) {
            self.subscribed.push(*symbol);
        }
    }

    fn unsubscribe(&mut self, symbol: &Symbol) {
        self.subscribed.retain(|s| s != symbol);
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Trading-cost and benchmark settings for a replay.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BacktestConfig {
    /// Cost per unit of turnover, in basis points.
    pub cost_bps: f64,
    /// Risk-free rate per period, subtracted in the Sharpe ratio.
    pub risk_free: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            cost_bps: 0.0,
            risk_free: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.cost_bps.is_finite() && self.cost_bps >= 0.0) {
            return Err(Error::Config(format!(
                "cost_bps must be finite and >= 0, got {}",
                self.cost_bps
            )));
        }
        if !self.risk_free.is_finite() {
            return Err(Error::Config("risk_free must be finite".into()));
        }
        Ok(())
    }
}

/// Outcome of a replay.
#[derive(Clone, Debug)]
pub struct BacktestReport {
    /// Target weights from the last successful rebalance (empty if none).
    pub weights: Vec<(Symbol, f64)>,
    /// Simple return of each holding period (`num_bars - 1` entries).
    pub returns: Vec<f64>,
    /// Terminal wealth per unit invested.
    pub final_wealth: f64,
    /// Largest peak-to-trough loss of wealth, as a positive fraction.
    pub max_drawdown: f64,
    /// Annualized Sharpe ratio (0 when returns have no dispersion).
    pub sharpe: f64,
    /// Bars whose rebalance returned no targets.
    pub skipped: usize,
    /// Sum of absolute weight changes over all rebalances.
    pub turnover: f64,
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Replay Summary")?;
        writeln!(f, "  Periods:         {:>8}", self.returns.len())?;
        writeln!(f, "  Final wealth:    {:>8.4}", self.final_wealth)?;
        writeln!(f, "  Total return:    {:>8.2}%", (self.final_wealth - 1.0) * 100.0)?;
        writeln!(f, "  Sharpe:          {:>8.2}", self.sharpe)?;
        writeln!(f, "  Max drawdown:    {:>8.2}%", self.max_drawdown * 100.0)?;
        writeln!(f, "  Turnover:        {:>8.2}", self.turnover)?;
        writeln!(f, "  Skipped bars:    {:>8}", self.skipped)?;
        for (symbol, w) in &self.weights {
            writeln!(f, "  {symbol:<8} {:>8.2}%", w * 100.0)?;
        }
        Ok(())
    }
}

/// Replay `panel` through a fresh controller.
///
/// Return of the period `t -> t+1` is `Σ w_i · p_{t+1}/p_t + cash - 1`,
/// minus `cost_bps` times the turnover of the rebalance at `t`. The cost is
/// paid out of cash, so the weights carried into the next period are taken
/// against wealth net of it.
pub fn run_backtest(
    config: PamrConfig,
    predictor: Predictor,
    panel: &PricePanel,
    costs: &BacktestConfig,
) -> Result<BacktestReport> {
    panel.validate()?;
    costs.validate()?;

    let resolution = config.resolution;
    let mut controller = PortfolioController::new(config, predictor)?;
    let mut feed = PanelFeed::new(panel, 1);
    controller.on_instruments_added(&mut feed, &panel.symbols)?;

    let insights: Vec<Insight> = panel.symbols.iter().copied().map(Insight::new).collect();
    let n = panel.num_bars();
    let cost_rate = costs.cost_bps / 10_000.0;

    let mut held = vec![0.0_f64; panel.num_symbols()];
    let mut targets: Vec<(Symbol, f64)> = Vec::new();
    let mut returns = Vec::with_capacity(n.saturating_sub(1));
    let mut skipped = 0;
    let mut total_turnover = 0.0;

    for t in 0..n.saturating_sub(1) {
        if t > 0 {
            feed.advance();
            for (symbol, &price) in panel.symbols.iter().zip(&panel.closes[t]) {
                controller.on_price_tick(symbol, price)?;
            }
        }

        let assignment = controller.rebalance(&insights);
        let mut cost = 0.0;
        if assignment.is_empty() {
            skipped += 1;
        } else {
            let turnover: f64 = held
                .iter()
                .zip(&assignment)
                .map(|(h, (_, w))| (w - h).abs())
                .sum();
            total_turnover += turnover;
            cost = turnover * cost_rate;
            for (h, (_, w)) in held.iter_mut().zip(&assignment) {
                *h = *w;
            }
            targets = assignment.iter().map(|(i, w)| (i.symbol, *w)).collect();
        }

        let (now, next) = (&panel.closes[t], &panel.closes[t + 1]);
        let cash = 1.0 - held.iter().sum::<f64>();
        let invested: f64 = held
            .iter()
            .zip(now.iter().zip(next))
            .map(|(w, (p0, p1))| w * p1 / p0)
            .sum();
        // The trading cost is paid out of cash.
        let net = invested + cash - cost;
        returns.push(net - 1.0);

        // Let holdings drift with prices until the next rebalance.
        if net > 0.0 {
            for (h, (p0, p1)) in held.iter_mut().zip(now.iter().zip(next)) {
                *h = *h * p1 / p0 / net;
            }
        }
    }

    debug!(
        "Replayed {} bars over {} symbols, {skipped} skipped",
        n,
        panel.num_symbols()
    );

    let (final_wealth, max_drawdown) = wealth_and_drawdown(&returns);
    Ok(BacktestReport {
        weights: targets,
        sharpe: annualized_sharpe(&returns, resolution.periods_per_year(), costs.risk_free),
        returns,
        final_wealth,
        max_drawdown,
        skipped,
        turnover: total_turnover,
    })
}

/// Compound `returns` from unit wealth; also track the worst drawdown.
fn wealth_and_drawdown(returns: &[f64]) -> (f64, f64) {
    let mut wealth = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    for r in returns {
        wealth *= 1.0 + r;
        peak = peak.max(wealth);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - wealth) / peak);
        }
    }
    (wealth, max_dd)
}

fn annualized_sharpe(returns: &[f64], periods_per_year: f64, risk_free: f64) -> f64 {
    let sd = sample_std(returns);
    if !sd.is_finite() || sd <= 0.0 {
        return 0.0;
    }
    (mean(returns) - risk_free) / sd * periods_per_year.sqrt()
}
