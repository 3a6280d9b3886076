//! Row statistics for the barycenter predictor.
//!
//! Standard deviation follows the sample convention (divisor `n - 1`).
//!
//! No guards are applied here: a constant row yields a zero standard
//! deviation and a NaN z-score. Callers decide how to treat that.

// ---------------------------------------------------------------------------
// Moments
// ---------------------------------------------------------------------------

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divisor `n - 1`). NaN for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mu = mean(values);
    let ss: f64 = values.iter().map(|v| (v - mu) * (v - mu)).sum();
    (ss / (n - 1) as f64).sqrt()
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// A z-scored row together with the moments used to produce it.
#[derive(Clone, Debug)]
pub struct Standardized {
    pub values: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl Standardized {
    /// Map a standardized value back to the original scale.
    #[inline]
    pub fn restore(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }
}

/// Z-score `values`: `(v - mean) / sample_std`.
pub fn standardize(values: &[f64]) -> Standardized {
    let mean = mean(values);
    let std = sample_std(values);
    Standardized {
        values: values.iter().map(|v| (v - mean) / std).collect(),
        mean,
        std,
    }
}

/// Natural log of every element.
pub fn ln_all(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.ln()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
