//! TOML configuration loading and validation.

use std::path::Path;

use nanorevert::{BacktestConfig, PamrConfig, Predictor};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration. Every section is optional and falls back to the
/// engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub strategy: PamrConfig,
    #[serde(default)]
    pub predictor: Predictor,
    #[serde(default)]
    pub backtest: BacktestConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section, reporting which one failed.
    pub fn validate(&self) -> Result<()> {
        self.strategy
            .validate()
            .map_err(|e| Error::Config(format!("[strategy] {e}")))?;
        self.predictor
            .validate()
            .map_err(|e| Error::Config(format!("[predictor] {e}")))?;
        self.backtest
            .validate()
            .map_err(|e| Error::Config(format!("[backtest] {e}")))?;
        Ok(())
    }

    /// Human-readable summary of the resolved strategy.
    pub fn describe(&self) -> String {
        let predictor = match &self.predictor {
            Predictor::LastRatio => "last_ratio".to_string(),
            Predictor::Barycenter(b) => format!(
                "barycenter (window_size={}, max_iter={}, tol={:e}, n_init={})",
                b.window_size, b.max_iter, b.tol, b.n_init
            ),
        };
        format!(
            "epsilon={} resolution={:?} seed={}\npredictor: {predictor}\ncost_bps={} risk_free={}",
            self.strategy.epsilon,
            self.strategy.resolution,
            self.strategy.seed,
            self.backtest.cost_bps,
            self.backtest.risk_free,
        )
    }
}
