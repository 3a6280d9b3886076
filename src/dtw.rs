//! Dynamic Time Warping and DTW Barycenter Averaging (DBA).
//!
//! DTW aligns two sequences under monotonic, contiguous warping (steps
//! `(1,0)`, `(0,1)`, `(1,1)`) and minimizes the cumulative squared pointwise
//! distance. DBA refines a single representative sequence so that its total
//! DTW cost to a set of inputs decreases.
//!
//! Complexity is `O(n * m)` per alignment, so one DBA call costs
//! `O(restarts * iterations * series * len^2)`. The accumulated-cost buffer is
//! allocated once per call and reused for every alignment.
//!
//! # References
//!
//! - Petitjean, Ketterlin, Gançarski (2011), "A global averaging method for
//!   dynamic time warping, with applications to clustering", Pattern Recognition.

use rand::Rng;

use crate::config::BarycenterConfig;

// ---------------------------------------------------------------------------
// DTW
// ---------------------------------------------------------------------------

/// Fill `acc` (row-major, `a.len() x b.len()`) with accumulated DTW costs.
fn accumulate(acc: &mut Vec<f64>, a: &[f64], b: &[f64]) {
    let (n, m) = (a.len(), b.len());
    acc.clear();
    acc.resize(n * m, f64::INFINITY);

    for i in 0..n {
        for j in 0..m {
            let d = (a[i] - b[j]) * (a[i] - b[j]);
            let prev = if i == 0 && j == 0 {
                0.0
            } else {
                let mut best = f64::INFINITY;
                if i > 0 && j > 0 {
                    best = best.min(acc[(i - 1) * m + j - 1]);
                }
                if i > 0 {
                    best = best.min(acc[(i - 1) * m + j]);
                }
                if j > 0 {
                    best = best.min(acc[i * m + j - 1]);
                }
                best
            };
            acc[i * m + j] = d + prev;
        }
    }
}

/// Walk the optimal path from `(n-1, m-1)` back to `(0, 0)`, calling `visit`
/// on every cell. Ties prefer the diagonal, then the step in `a`.
fn backtrack(acc: &[f64], n: usize, m: usize, mut visit: impl FnMut(usize, usize)) {
    let (mut i, mut j) = (n - 1, m - 1);
    visit(i, j);
    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diag = acc[(i - 1) * m + j - 1];
            let up = acc[(i - 1) * m + j];
            let left = acc[i * m + j - 1];
            if diag <= up && diag <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        visit(i, j);
    }
}

/// Cumulative squared DTW cost between `a` and `b`.
///
/// Returns `0.0` if either sequence is empty.
///
/// ```
/// use nanorevert::dtw::dtw_cost;
///
/// // Repeating a point is free under warping.
/// assert_eq!(dtw_cost(&[0.0, 1.0, 2.0], &[0.0, 0.0, 1.0, 2.0]), 0.0);
/// ```
pub fn dtw_cost(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut acc = Vec::new();
    accumulate(&mut acc, a, b);
    acc[a.len() * b.len() - 1]
}

/// Optimal alignment path between `a` and `b` as `(index_in_a, index_in_b)`
/// pairs from `(0, 0)` to `(a.len()-1, b.len()-1)`, plus its cost.
pub fn dtw_path(a: &[f64], b: &[f64]) -> (Vec<(usize, usize)>, f64) {
    if a.is_empty() || b.is_empty() {
        return (Vec::new(), 0.0);
    }
    let (n, m) = (a.len(), b.len());
    let mut acc = Vec::new();
    accumulate(&mut acc, a, b);

    let mut path = Vec::with_capacity(n + m);
    backtrack(&acc, n, m, |i, j| path.push((i, j)));
    path.reverse();
    (path, acc[n * m - 1])
}

// ---------------------------------------------------------------------------
// DBA
// ---------------------------------------------------------------------------

/// DTW barycenter of equal-length `series`.
///
/// The first restart starts from the elementwise mean; each further restart
/// (`cfg.n_init > 1`) starts from an input sequence drawn from `rng`. The
/// restart with the lowest mean alignment cost wins.
///
/// Each restart runs at most `cfg.max_iter` refinements and stops early when
/// the squared barycenter movement drops below `cfg.tol`, or when the
/// alignment cost rises (the previous barycenter is kept).
///
/// Returns an empty vector for empty or ragged input.
pub fn dba<R: Rng + ?Sized>(series: &[Vec<f64>], cfg: &BarycenterConfig, rng: &mut R) -> Vec<f64> {
    let Some(len) = common_len(series) else {
        return Vec::new();
    };

    let mut acc = Vec::with_capacity(len * len);
    let mut best: Option<(Vec<f64>, f64)> = None;

    for restart in 0..cfg.n_init.max(1) {
        let init = if restart == 0 {
            elementwise_mean(series, len)
        } else {
            series[rng.gen_range(0..series.len())].clone()
        };

        let (barycenter, cost) = refine(series, init, cfg, &mut acc);
        if best.as_ref().is_none_or(|(_, best_cost)| cost < *best_cost) {
            best = Some((barycenter, cost));
        }
    }

    best.map(|(barycenter, _)| barycenter).unwrap_or_default()
}

/// Run DBA refinements from `barycenter`. Returns the result and its mean
/// alignment cost.
fn refine(
    series: &[Vec<f64>],
    mut barycenter: Vec<f64>,
    cfg: &BarycenterConfig,
    acc: &mut Vec<f64>,
) -> (Vec<f64>, f64) {
    let len = barycenter.len();
    let mut sums = vec![0.0_f64; len];
    let mut counts = vec![0_usize; len];
    let mut cost = assign(series, &barycenter, acc, &mut sums, &mut counts);

    for _ in 0..cfg.max_iter {
        // The path is contiguous, so every barycenter index has count >= 1.
        let next: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| s / c as f64)
            .collect();

        let next_cost = assign(series, &next, acc, &mut sums, &mut counts);
        if next_cost > cost {
            return (barycenter, cost);
        }

        let moved = squared_distance(&next, &barycenter);
        barycenter = next;
        cost = next_cost;

        if moved < cfg.tol {
            break;
        }
    }

    (barycenter, cost)
}

/// Align every series to `barycenter`, accumulating the aligned points per
/// barycenter index into `sums`/`counts`. Returns the mean alignment cost.
fn assign(
    series: &[Vec<f64>],
    barycenter: &[f64],
    acc: &mut Vec<f64>,
    sums: &mut [f64],
    counts: &mut [usize],
) -> f64 {
    let len = barycenter.len();
    sums.fill(0.0);
    counts.fill(0);

    let mut cost = 0.0;
    for s in series {
        accumulate(acc, s, barycenter);
        cost += acc[s.len() * len - 1];
        backtrack(acc.as_slice(), s.len(), len, |i, j| {
            sums[j] += s[i];
            counts[j] += 1;
        });
    }
    cost / series.len() as f64
}

fn common_len(series: &[Vec<f64>]) -> Option<usize> {
    let len = series.first()?.len();
    if len == 0 || series.iter().any(|s| s.len() != len) {
        return None;
    }
    Some(len)
}

fn elementwise_mean(series: &[Vec<f64>], len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    for s in series {
        for (o, v) in out.iter_mut().zip(s) {
            *o += v;
        }
    }
    let k = series.len() as f64;
    out.iter_mut().for_each(|o| *o /= k);
    out
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
}
