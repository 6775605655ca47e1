//! Criterion benchmarks for the pricing engines.
//!
//! Measures one full pricing call per engine on the same European call, plus
//! the lattice and PDE engines across grid sizes to characterize scaling.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vp_engines::{price, BinomialConfig, Engine, FdConfig, McConfig};
use vp_instruments::{OptionType, VanillaOption};
use vp_processes::{BsmProcess, HestonProcess, Process};
use vp_termstructures::{BlackConstantVol, FlatForward, MarketTermStructure};
use vp_time::{Actual365Fixed, Date};

fn market() -> MarketTermStructure {
    let d = Date::from_ymd(2014, 3, 7).unwrap();
    MarketTermStructure::new(
        d,
        Arc::new(Actual365Fixed),
        Arc::new(FlatForward::new(d, 0.05)),
        Arc::new(FlatForward::new(d, 0.01)),
        Arc::new(BlackConstantVol::new(d, 0.2).unwrap()),
    )
    .unwrap()
}

fn european_call() -> VanillaOption {
    let expiry = Date::from_ymd(2015, 3, 7).unwrap();
    VanillaOption::european(OptionType::Call, 100.0, expiry).unwrap()
}

fn bench_analytic(c: &mut Criterion) {
    let m = market();
    let option = european_call();
    let bsm = Process::BlackScholesMerton(BsmProcess::new(100.0).unwrap());
    let heston = Process::Heston(HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.3, -0.5).unwrap());

    let mut group = c.benchmark_group("analytic");
    group.bench_function("bsm", |b| {
        b.iter(|| price(&Engine::analytic(), black_box(&option), &bsm, &m).unwrap());
    });
    group.bench_function("heston", |b| {
        b.iter(|| price(&Engine::analytic(), black_box(&option), &heston, &m).unwrap());
    });
    group.finish();
}

fn bench_binomial(c: &mut Criterion) {
    let m = market();
    let expiry = Date::from_ymd(2015, 3, 7).unwrap();
    let option = VanillaOption::american(OptionType::Put, 100.0, expiry).unwrap();
    let bsm = Process::BlackScholesMerton(BsmProcess::new(100.0).unwrap());

    let mut group = c.benchmark_group("binomial_american_put");
    for steps in [100, 400, 1600] {
        let engine = Engine::Binomial(BinomialConfig { steps });
        group.bench_with_input(BenchmarkId::from_parameter(steps), &engine, |b, engine| {
            b.iter(|| price(engine, black_box(&option), &bsm, &m).unwrap());
        });
    }
    group.finish();
}

fn bench_finite_difference(c: &mut Criterion) {
    let m = market();
    let expiry = Date::from_ymd(2015, 3, 7).unwrap();
    let option = VanillaOption::american(OptionType::Put, 100.0, expiry).unwrap();
    let bsm = Process::BlackScholesMerton(BsmProcess::new(100.0).unwrap());

    let mut group = c.benchmark_group("fd_american_put");
    for points in [100, 200, 400] {
        let engine = Engine::FiniteDifference(FdConfig {
            time_steps: points,
            grid_points: points,
            ..FdConfig::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(points), &engine, |b, engine| {
            b.iter(|| price(engine, black_box(&option), &bsm, &m).unwrap());
        });
    }
    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let m = market();
    let option = european_call();
    let bsm = Process::BlackScholesMerton(BsmProcess::new(100.0).unwrap());

    let mut group = c.benchmark_group("mc_european_call");
    group.sample_size(10);
    for paths in [10_000, 100_000] {
        let engine = Engine::MonteCarlo(McConfig {
            paths,
            time_steps: 1,
            ..McConfig::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(paths), &engine, |b, engine| {
            b.iter(|| price(engine, black_box(&option), &bsm, &m).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_analytic,
    bench_binomial,
    bench_finite_difference,
    bench_monte_carlo
);
criterion_main!(benches);
