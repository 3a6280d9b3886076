//! Price-relative predictors.
//!
//! A predictor turns each instrument's window of closes into a predicted
//! price relative (`next / current`). Two strategies are available:
//!
//! - [`Predictor::LastRatio`]: the latest single-period ratio, assuming an
//!   instant repeat of the last move.
//! - [`Predictor::Barycenter`]: reversion toward the DTW barycenter of all
//!   instruments' standardized log-price paths.
//!
//! In both cases an externally supplied magnitude `g` overrides the estimate
//! for that instrument with `1 + g`.

use rand::Rng;

use crate::config::BarycenterConfig;
use crate::dtw::dba;
use crate::error::Result;
use crate::stats::{ln_all, standardize};

/// Price-relative prediction strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Predictor {
    /// `newest / previous` close.
    #[default]
    LastRatio,
    /// Standardized latest log price over the un-standardized barycenter tip.
    Barycenter(BarycenterConfig),
}

impl Predictor {
    /// Barycenter predictor with default parameters.
    pub fn barycenter() -> Self {
        Predictor::Barycenter(BarycenterConfig::default())
    }

    /// Number of closes each instrument window must hold to be ready.
    pub fn window_capacity(&self) -> usize {
        match self {
            Predictor::LastRatio => 2,
            Predictor::Barycenter(cfg) => cfg.window_size,
        }
    }

    /// Validate strategy parameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            Predictor::LastRatio => Ok(()),
            Predictor::Barycenter(cfg) => cfg.validate(),
        }
    }

    /// Predict one price relative per instrument.
    ///
    /// `windows[i]` holds instrument `i`'s closes, oldest first, and must be
    /// full (`window_capacity()` values). `magnitudes[i]`, when present,
    /// overrides the estimate with `1 + magnitude`. Output order matches input.
    pub fn predict<R: Rng + ?Sized>(
        &self,
        windows: &[Vec<f64>],
        magnitudes: &[Option<f64>],
        rng: &mut R,
    ) -> Vec<f64> {
        debug_assert_eq!(windows.len(), magnitudes.len());

        let estimates = match self {
            Predictor::LastRatio => last_ratio(windows),
            Predictor::Barycenter(cfg) => barycenter_relatives(windows, cfg, rng),
        };

        estimates
            .into_iter()
            .zip(magnitudes)
            .map(|(estimate, magnitude)| match magnitude {
                Some(g) => 1.0 + g,
                None => estimate,
            })
            .collect()
    }
}

/// `newest / second-newest` close of each window.
fn last_ratio(windows: &[Vec<f64>]) -> Vec<f64> {
    windows
        .iter()
        .map(|w| match w.as_slice() {
            [.., prev, last] => last / prev,
            _ => f64::NAN,
        })
        .collect()
}

/// Barycenter reversion signal.
///
/// 1. log closes, 2. z-score each row (sample std), 3. DBA over the rows,
/// 4. un-standardize the barycenter's last point per row (non-finite → 0),
/// 5. relative = latest z-score / un-standardized value.
///
/// A constant row has zero deviation, so its z-scores are NaN and the
/// resulting relative is NaN as well; nothing here repairs that.
pub fn barycenter_relatives<R: Rng + ?Sized>(
    windows: &[Vec<f64>],
    cfg: &BarycenterConfig,
    rng: &mut R,
) -> Vec<f64> {
    let rows: Vec<_> = windows.iter().map(|w| standardize(&ln_all(w))).collect();
    let z: Vec<Vec<f64>> = rows.iter().map(|r| r.values.clone()).collect();

    let barycenter = dba(&z, cfg, rng);
    let Some(&tip) = barycenter.last() else {
        return vec![f64::NAN; windows.len()];
    };

    rows.iter()
        .map(|row| {
            let level = row.restore(tip);
            let level = if level.is_finite() { level } else { 0.0 };
            let latest = row.values.last().copied().unwrap_or(f64::NAN);
            latest / level
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    fn small_barycenter(window_size: usize) -> Predictor {
        Predictor::Barycenter(BarycenterConfig {
            window_size,
            ..BarycenterConfig::default()
        })
    }

    #[test]
    fn window_capacity() {
        assert_eq!(Predictor::LastRatio.window_capacity(), 2);
        assert_eq!(Predictor::barycenter().window_capacity(), 20);
    }

    #[test]
    fn last_ratio_basic() {
        let x = Predictor::LastRatio.predict(&[vec![100.0, 110.0]], &[None], &mut rng());
        assert!((x[0] - 1.1).abs() < 1e-12);
    }

    #[test]
    fn last_ratio_uses_newest_pair() {
        let x = Predictor::LastRatio.predict(&[vec![50.0, 100.0, 90.0]], &[None], &mut rng());
        assert!((x[0] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn magnitude_overrides_estimate() {
        let windows = vec![vec![100.0, 110.0], vec![100.0, 90.0]];
        let x = Predictor::LastRatio.predict(&windows, &[Some(-0.05), None], &mut rng());
        assert!((x[0] - 0.95).abs() < 1e-12);
        assert!((x[1] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn magnitude_overrides_barycenter_estimate() {
        let windows = vec![vec![10.0, 11.0, 12.0, 11.5], vec![20.0, 19.0, 21.0, 22.0]];
        let x = small_barycenter(4).predict(&windows, &[None, Some(0.02)], &mut rng());
        assert!((x[1] - 1.02).abs() < 1e-12);
    }

    #[test]
    fn barycenter_of_identical_paths() {
        // Same shape, different levels: z-scores coincide, so the barycenter
        // equals the shared z-path and each relative is z_last / log(p_last).
        let a = vec![100.0, 102.0, 101.0, 104.0, 103.0];
        let b: Vec<f64> = a.iter().map(|p| p * 2.0).collect();
        let x = small_barycenter(5).predict(&[a.clone(), b.clone()], &[None, None], &mut rng());

        let za = standardize(&ln_all(&a));
        let z_last = *za.values.last().unwrap();
        let expect_a = z_last / a.last().unwrap().ln();
        assert!((x[0] - expect_a).abs() < 1e-9, "got {} expected {expect_a}", x[0]);

        let expect_b = z_last / b.last().unwrap().ln();
        assert!((x[1] - expect_b).abs() < 1e-9);
    }

    #[test]
    fn barycenter_relatives_are_finite_for_varied_rows() {
        let windows = vec![
            vec![10.0, 10.5, 10.2, 10.8, 11.0, 10.7],
            vec![50.0, 49.0, 51.0, 52.5, 52.0, 53.0],
            vec![5.0, 5.2, 5.1, 4.9, 5.3, 5.4],
        ];
        let x = small_barycenter(6).predict(&windows, &[None; 3], &mut rng());
        assert_eq!(x.len(), 3);
        assert!(x.iter().all(|v| v.is_finite()), "{x:?}");
    }

    #[test]
    fn zero_variance_row_does_not_panic() {
        let windows = vec![vec![1.0; 4], vec![10.0, 11.0, 10.5, 12.0]];
        let x = small_barycenter(4).predict(&windows, &[None, None], &mut rng());
        assert_eq!(x.len(), 2);
        // The constant row's z-scores are undefined, so is its relative.
        assert!(x[0].is_nan());
    }

    #[test]
    fn validate_delegates() {
        assert!(Predictor::LastRatio.validate().is_ok());
        assert!(small_barycenter(1).validate().is_err());
    }
}
