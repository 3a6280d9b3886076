//! Portfolio controller: owns per-instrument windows and the weight vector.
//!
//! The host drives the controller through four calls:
//!
//! - [`on_instruments_added`](PortfolioController::on_instruments_added) and
//!   [`on_instruments_removed`](PortfolioController::on_instruments_removed)
//!   for universe changes,
//! - [`on_price_tick`](PortfolioController::on_price_tick) for streaming closes,
//! - [`rebalance`](PortfolioController::rebalance) to obtain target weights.
//!
//! Everything runs synchronously on the caller's thread.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;

use crate::config::{PamrConfig, Resolution};
use crate::error::Result;
use crate::pamr::{pamr_update, uniform_weights};
use crate::predictor::Predictor;
use crate::types::{Insight, Symbol};
use crate::window::TrackedInstrument;

/// Market-data collaborator: historical backfill and streaming subscriptions.
///
/// Subscriptions are bookkeeping for the host; the host still delivers each
/// close through [`PortfolioController::on_price_tick`].
pub trait MarketData {
    /// Up to `count` most recent closes for `symbol`, oldest first.
    fn history(&mut self, symbol: &Symbol, count: usize, resolution: Resolution) -> Result<Vec<f64>>;

    /// Start streaming closes for `symbol`.
    fn subscribe(&mut self, _symbol: &Symbol, _resolution: Resolution) {}

    /// Stop streaming closes for `symbol`.
    fn unsubscribe(&mut self, _symbol: &Symbol) {}
}

/// Target weight per insight, in insight order. Empty means "no action".
pub type Targets = Vec<(Insight, f64)>;

/// Online mean-reversion portfolio controller.
///
/// Generic over the random source used by barycenter restarts; the default
/// is a [`StdRng`] seeded from [`PamrConfig::seed`].
#[derive(Clone, Debug)]
pub struct PortfolioController<R = StdRng> {
    config: PamrConfig,
    predictor: Predictor,
    trackers: FxHashMap<Symbol, TrackedInstrument>,
    /// Weights from the last successful rebalance; its length is `m`.
    weights: Vec<f64>,
    rng: R,
}

impl PortfolioController<StdRng> {
    /// Create a controller with a seeded default random source.
    pub fn new(config: PamrConfig, predictor: Predictor) -> Result<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, predictor, rng)
    }
}

impl<R: rand::Rng> PortfolioController<R> {
    /// Create a controller with an injected random source.
    pub fn with_rng(config: PamrConfig, predictor: Predictor, rng: R) -> Result<Self> {
        config.validate()?;
        predictor.validate()?;
        Ok(Self {
            config,
            predictor,
            trackers: FxHashMap::default(),
            weights: Vec::new(),
            rng,
        })
    }

    // === Queries ===

    pub fn config(&self) -> &PamrConfig {
        &self.config
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Weights from the last successful rebalance (empty before the first).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Window for `symbol`, if it is in the active set.
    pub fn tracker(&self, symbol: &Symbol) -> Option<&TrackedInstrument> {
        self.trackers.get(symbol)
    }

    /// True if `symbol` is tracked and its window is full.
    pub fn is_ready(&self, symbol: &Symbol) -> bool {
        self.trackers.get(symbol).is_some_and(|t| t.is_ready())
    }

    /// Active instruments, sorted.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut syms: Vec<Symbol> = self.trackers.keys().copied().collect();
        syms.sort();
        syms
    }

    // === Events ===

    /// Start tracking newly added instruments.
    ///
    /// Each new window is backfilled from `feed.history` and subscribed to
    /// streaming updates. Already-tracked symbols are left alone. A history
    /// failure is returned as-is; instruments processed before it stay added.
    pub fn on_instruments_added<F: MarketData + ?Sized>(
        &mut self,
        feed: &mut F,
        symbols: &[Symbol],
    ) -> Result<()> {
        let capacity = self.predictor.window_capacity();
        let resolution = self.config.resolution;

        for &symbol in symbols {
            if self.trackers.contains_key(&symbol) {
                continue;
            }
            let history = feed.history(&symbol, capacity, resolution)?;
            let tracker = TrackedInstrument::with_history(symbol, capacity, &history)?;
            feed.subscribe(&symbol, resolution);

            info!(
                "Tracking {symbol} ({}/{} closes backfilled)",
                tracker.len(),
                capacity
            );
            self.trackers.insert(symbol, tracker);
        }
        Ok(())
    }

    /// Stop tracking removed instruments: release the subscription and drop
    /// the window. Unknown symbols are ignored.
    pub fn on_instruments_removed<F: MarketData + ?Sized>(&mut self, feed: &mut F, symbols: &[Symbol]) {
        for symbol in symbols {
            if let Some(mut tracker) = self.trackers.remove(symbol) {
                feed.unsubscribe(symbol);
                tracker.reset();
                info!("Stopped tracking {symbol}");
            }
        }
    }

    /// Push a streaming close into the instrument's window.
    ///
    /// Ticks for untracked symbols are ignored. Invalid prices are rejected
    /// and leave the window unchanged.
    pub fn on_price_tick(&mut self, symbol: &Symbol, price: f64) -> Result<()> {
        match self.trackers.get_mut(symbol) {
            Some(tracker) => tracker.push(price),
            None => {
                debug!("Ignoring tick for untracked {symbol}");
                Ok(())
            }
        }
    }

    /// Compute target weights for `insights`.
    ///
    /// Returns an empty list (no action) when `insights` is empty or any
    /// insight's instrument is untracked or not ready. When the number of
    /// insights differs from the previous successful rebalance the carried
    /// weights restart from uniform.
    ///
    /// If the predictor yields a non-finite relative (e.g. a constant window
    /// under the barycenter strategy) or the update yields non-finite weights,
    /// the rebalance is skipped and the carried weights are kept.
    pub fn rebalance(&mut self, insights: &[Insight]) -> Targets {
        if insights.is_empty() {
            return Vec::new();
        }

        let mut windows = Vec::with_capacity(insights.len());
        for insight in insights {
            match self.trackers.get(&insight.symbol) {
                Some(t) if t.is_ready() => windows.push(t.closes().collect::<Vec<f64>>()),
                _ => {
                    debug!("Skipping rebalance: {} not ready", insight.symbol);
                    return Vec::new();
                }
            }
        }

        let m = insights.len();
        let current = if self.weights.len() == m {
            self.weights.clone()
        } else {
            debug!("Dimension changed {} -> {m}, resetting to uniform", self.weights.len());
            uniform_weights(m)
        };

        let magnitudes: Vec<Option<f64>> = insights.iter().map(|i| i.magnitude).collect();
        let relatives = self.predictor.predict(&windows, &magnitudes, &mut self.rng);
        if relatives.iter().any(|x| !x.is_finite()) {
            warn!("Skipping rebalance: non-finite price relatives {relatives:?}");
            return Vec::new();
        }

        let update = pamr_update(&current, &relatives, self.config.epsilon);
        if update.weights.iter().any(|w| !w.is_finite()) {
            warn!("Skipping rebalance: non-finite weights from relatives {relatives:?}");
            return Vec::new();
        }
        debug!("PAMR step {:.6} over {m} instruments", update.step);

        self.weights = update.weights;
        insights
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .collect()
    }
}
