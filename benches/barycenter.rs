//! Barycenter benchmarks: DTW, DBA, and a full controller rebalance.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nanorevert::dtw::{dba, dtw_cost};
use nanorevert::{
    BarycenterConfig, Insight, MarketData, PamrConfig, PortfolioController, Predictor, Resolution,
    Symbol,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Generate `n_stocks` close series of `len` bars.
///
/// Prices start at 100 and drift using a simple deterministic RNG.
fn generate_closes(len: usize, n_stocks: usize) -> Vec<Vec<f64>> {
    // Simple deterministic PRNG (xorshift32)
    let mut rng_state: u32 = 42;

    (0..n_stocks)
        .map(|_| {
            let mut price = 100.0_f64;
            (0..len)
                .map(|_| {
                    rng_state ^= rng_state << 13;
                    rng_state ^= rng_state >> 17;
                    rng_state ^= rng_state << 5;

                    // Random return between -2% and +2%
                    let ret = f64::from(rng_state % 401) - 200.0;
                    price = (price * (1.0 + ret / 10_000.0)).max(1.0);
                    price
                })
                .collect()
        })
        .collect()
}

struct BenchFeed {
    symbols: Vec<Symbol>,
    closes: Vec<Vec<f64>>,
}

impl MarketData for BenchFeed {
    fn history(&mut self, symbol: &Symbol, count: usize, _: Resolution) -> nanorevert::Result<Vec<f64>> {
        let i = self.symbols.iter().position(|s| s == symbol).unwrap_or(0);
        let c = &self.closes[i];
        Ok(c[c.len().saturating_sub(count)..].to_vec())
    }
}

/// Benchmark: DTW cost between two series of growing length
fn bench_dtw(c: &mut Criterion) {
    let mut group = c.benchmark_group("barycenter/dtw_cost");

    for len in [20, 60, 250] {
        let series = generate_closes(len, 2);
        group.bench_with_input(BenchmarkId::from_parameter(len), &series, |b, s| {
            b.iter(|| black_box(dtw_cost(&s[0], &s[1])));
        });
    }

    group.finish();
}

/// Benchmark: DBA over a universe of standardized-length windows
fn bench_dba(c: &mut Criterion) {
    let mut group = c.benchmark_group("barycenter/dba");
    let cfg = BarycenterConfig::default();

    for n_stocks in [10, 50, 100] {
        let series = generate_closes(cfg.window_size, n_stocks);
        group.bench_with_input(BenchmarkId::from_parameter(n_stocks), &series, |b, s| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(0);
                black_box(dba(s, &cfg, &mut rng))
            });
        });
    }

    group.finish();
}

/// Benchmark: one full rebalance (predict + PAMR) on a warmed controller
fn bench_rebalance(c: &mut Criterion) {
    let mut group = c.benchmark_group("barycenter/rebalance");

    for (name, predictor) in [
        ("last_ratio", Predictor::LastRatio),
        ("barycenter", Predictor::barycenter()),
    ] {
        let n_stocks = 50;
        let symbols: Vec<Symbol> = (0..n_stocks)
            .map(|i| Symbol::new(&format!("S{i:03}")))
            .collect();
        let mut feed = BenchFeed {
            symbols: symbols.clone(),
            closes: generate_closes(predictor.window_capacity(), n_stocks),
        };
        let insights: Vec<Insight> = symbols.iter().copied().map(Insight::new).collect();

        let mut ctl = PortfolioController::new(PamrConfig::default(), predictor).unwrap();
        ctl.on_instruments_added(&mut feed, &symbols).unwrap();

        group.bench_function(name, |b| {
            b.iter(|| black_box(ctl.rebalance(&insights)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dtw, bench_dba, bench_rebalance);
criterion_main!(benches);
