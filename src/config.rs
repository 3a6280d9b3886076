//! Construction-time configuration.
//!
//! Everything here is fixed once a [`PortfolioController`] is built; there is
//! no runtime mutation.
//!
//! [`PortfolioController`]: crate::PortfolioController

use crate::error::{Error, Result};

/// Sampling resolution of the price feed and of rebalancing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Resolution {
    Minute,
    Hour,
    #[default]
    Daily,
}

impl Resolution {
    /// Annualization factor for return statistics (US equity session hours).
    pub fn periods_per_year(self) -> f64 {
        match self {
            Resolution::Minute => 252.0 * 390.0,
            Resolution::Hour => 252.0 * 7.0,
            Resolution::Daily => 252.0,
        }
    }
}

/// PAMR parameters shared by every predictor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PamrConfig {
    /// Reversion threshold ε. The portfolio only moves when `b·x̃ > ε`.
    pub epsilon: f64,
    /// Resolution requested from the market-data collaborator.
    pub resolution: Resolution,
    /// Seed for the default random source used by barycenter restarts.
    pub seed: u64,
}

impl Default for PamrConfig {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            resolution: Resolution::Daily,
            seed: 0,
        }
    }
}

impl PamrConfig {
    /// Validate the config.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "epsilon must be >= 0 and finite, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Parameters of the DTW barycenter predictor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BarycenterConfig {
    /// Closes kept per instrument (the length of every DTW sequence).
    pub window_size: usize,
    /// Upper bound on DBA refinement iterations per restart.
    pub max_iter: usize,
    /// Squared barycenter movement below which DBA stops early.
    pub tol: f64,
    /// Number of DBA restarts; the first starts from the elementwise mean,
    /// the rest from randomly chosen input sequences.
    pub n_init: usize,
}

impl Default for BarycenterConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            max_iter: 5,
            tol: 1e-5,
            n_init: 1,
        }
    }
}

impl BarycenterConfig {
    /// Validate the config.
    pub fn validate(&self) -> Result<()> {
        // Sample standard deviation needs at least two points.
        if self.window_size < 2 {
            return Err(Error::Config(format!(
                "window_size must be >= 2, got {}",
                self.window_size
            )));
        }
        if self.max_iter == 0 {
            return Err(Error::Config("max_iter must be >= 1".into()));
        }
        if self.n_init == 0 {
            return Err(Error::Config("n_init must be >= 1".into()));
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(Error::Config(format!(
                "tol must be >= 0 and finite, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let pamr = PamrConfig::default();
        assert_eq!(pamr.epsilon, 1.0);
        assert_eq!(pamr.resolution, Resolution::Daily);
        assert_eq!(pamr.seed, 0);

        let bary = BarycenterConfig::default();
        assert_eq!(bary.window_size, 20);
        assert_eq!(bary.max_iter, 5);
        assert_eq!(bary.n_init, 1);
    }

    #[test]
    fn defaults_validate() {
        assert!(PamrConfig::default().validate().is_ok());
        assert!(BarycenterConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_epsilon() {
        for epsilon in [-0.1, f64::NAN, f64::INFINITY] {
            let cfg = PamrConfig {
                epsilon,
                ..PamrConfig::default()
            };
            assert!(cfg.validate().is_err(), "epsilon={epsilon} accepted");
        }
    }

    #[test]
    fn rejects_short_window() {
        let cfg = BarycenterConfig {
            window_size: 1,
            ..BarycenterConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_zero_iterations() {
        let cfg = BarycenterConfig {
            max_iter: 0,
            ..BarycenterConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = BarycenterConfig {
            n_init: 0,
            ..BarycenterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn periods_per_year() {
        assert_eq!(Resolution::Daily.periods_per_year(), 252.0);
        assert!(Resolution::Minute.periods_per_year() > Resolution::Hour.periods_per_year());
    }
}
