//! Euclidean projection onto the probability simplex.
//!
//! # References
//!
//! - Duchi, Shalev-Shwartz, Singer, Chandra (2008), "Efficient projections onto
//!   the l1-ball for learning in high dimensions", ICML.

/// Project `v` onto `{w : w_i >= 0, sum(w) = b}` in Euclidean distance.
///
/// Sorts `v` descending into `u`, finds the largest index `rho` with
/// `u[rho] > (cumsum(u)[rho] - b) / (rho + 1)`, and shifts every component by
/// the resulting threshold, clamping at zero.
///
/// - Empty input returns an empty vector.
/// - For finite `v` and `b > 0` a valid `rho` always exists (index 0 qualifies).
///   Otherwise the uniform vector `b / n` is returned.
///
/// # Example
///
/// ```
/// use nanorevert::simplex::project_simplex;
///
/// let w = project_simplex(&[0.8, 0.6, -0.4], 1.0);
/// assert!((w[0] - 0.6).abs() < 1e-12);
/// assert!((w[1] - 0.4).abs() < 1e-12);
/// assert_eq!(w[2], 0.0);
/// ```
pub fn project_simplex(v: &[f64], b: f64) -> Vec<f64> {
    let n = v.len();
    if n == 0 {
        return Vec::new();
    }

    let mut u = v.to_vec();
    u.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumsum = 0.0_f64;
    let mut theta = None;
    for (i, ui) in u.iter().enumerate() {
        cumsum += *ui;
        let candidate = (cumsum - b) / (i as f64 + 1.0);
        if *ui > candidate {
            theta = Some(candidate);
        }
    }

    let Some(theta) = theta else {
        return vec![b / n as f64; n];
    };

    v.iter().map(|x| (x - theta).max(0.0)).collect()
}

/// True if `w` is non-negative and sums to `b` within `tol`.
pub fn is_on_simplex(w: &[f64], b: f64, tol: f64) -> bool {
    !w.is_empty()
        && w.iter().all(|x| x.is_finite() && *x >= -tol)
        && (w.iter().sum::<f64>() - b).abs() <= tol
}
