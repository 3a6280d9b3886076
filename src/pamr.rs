//! Passive-Aggressive Mean Reversion (PAMR) weight update.
//!
//! Given predicted price relatives `x̃` and the current weights `b`, the
//! update is passive while the expected growth `b·x̃` stays at or below the
//! reversion threshold `ε`, and aggressive otherwise: it moves weight away
//! from the instruments predicted to outperform, proportionally to the
//! violation, then projects back onto the simplex.
//!
//! ```text
//! x̄      = mean(x̃)
//! dev    = x̃ - x̄
//! step   = max(0, (b·x̃ - ε) / ||dev||²)     (0 when ||dev||² == 0)
//! b_next = project_simplex(b - step * dev)
//! ```
//!
//! # References
//!
//! - Li, Zhao, Hoi, Gopalkrishnan (2012), "PAMR: Passive aggressive mean
//!   reversion strategy for portfolio selection", Machine Learning 87(2).

use crate::simplex::project_simplex;

/// Result of one PAMR update.
#[derive(Clone, Debug, PartialEq)]
pub struct PamrUpdate {
    /// New weights on the unit simplex.
    pub weights: Vec<f64>,
    /// Lagrange step size (never negative).
    pub step: f64,
}

/// Uniform weights `1/m`. Empty for `m == 0`.
pub fn uniform_weights(m: usize) -> Vec<f64> {
    if m == 0 {
        return Vec::new();
    }
    vec![1.0 / m as f64; m]
}

/// Passive-aggressive step size.
///
/// Zero when all relatives are equal (no deviation to move along), and
/// clamped at zero when `b·x̃ <= ε`.
pub fn step_size(weights: &[f64], relatives: &[f64], epsilon: f64) -> f64 {
    debug_assert_eq!(weights.len(), relatives.len());
    let dev = mean_deviation(relatives);
    let denom: f64 = dev.iter().map(|d| d * d).sum();
    if denom == 0.0 {
        return 0.0;
    }
    ((dot(weights, relatives) - epsilon) / denom).max(0.0)
}

/// One PAMR update of `weights` against predicted `relatives`.
///
/// `weights` and `relatives` must have the same length.
///
/// ```
/// use nanorevert::pamr::pamr_update;
///
/// // b·x̃ = 1.0 does not exceed ε = 1, so the update is passive.
/// let out = pamr_update(&[0.5, 0.5], &[1.2, 0.8], 1.0);
/// assert_eq!(out.step, 0.0);
/// assert!((out.weights[0] - 0.5).abs() < 1e-12);
/// ```
pub fn pamr_update(weights: &[f64], relatives: &[f64], epsilon: f64) -> PamrUpdate {
    let step = step_size(weights, relatives, epsilon);
    let dev = mean_deviation(relatives);

    let candidate: Vec<f64> = weights
        .iter()
        .zip(&dev)
        .map(|(b, d)| b - step * d)
        .collect();

    PamrUpdate {
        weights: project_simplex(&candidate, 1.0),
        step,
    }
}

fn mean_deviation(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    x.iter().map(|v| v - mean).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
