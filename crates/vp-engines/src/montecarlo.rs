//! Monte Carlo engine.
//!
//! Paths are split over a fixed number of workers; worker `w` owns an
//! MT19937-64 generator seeded with `substream_seed(master, w)` and a fixed
//! share of the paths, so the estimate depends only on `(seed, paths,
//! time_steps, workers)` and never on thread scheduling.  Per-worker partial
//! statistics are merged in worker order.
//!
//! European contracts are priced from discounted terminal payoffs with the
//! standard error of the sample mean as the error estimate.  Early-exercise
//! contracts use Longstaff-Schwartz: a backward regression of realized
//! continuation values on polynomial basis functions of moneyness decides
//! exercise path by path.  The fitted rule is necessarily suboptimal, so the
//! estimator is biased low; the result carries `low_biased = 1` to say so.

use rayon::prelude::*;
use tracing::debug;
use vp_core::{
    ensure,
    errors::{Error, Result},
    CancellationToken, Rate, Real, Size, Time,
};
use vp_instruments::{Exercise, VanillaOption};
use vp_math::{substream_seed, InverseCumulativeNormalRng, LinearLeastSquaresRegression, Statistics};
use vp_processes::Process;
use vp_termstructures::MarketTermStructure;

use crate::results::PricingResult;
use crate::schedule::ExerciseSchedule;

const CANCELLATION_BATCH: Size = 1_024;

/// Simulation configuration.
#[derive(Debug, Clone, Copy)]
pub struct McConfig {
    /// Total number of paths across all workers.
    pub paths: Size,
    /// Number of time steps per path.
    pub time_steps: Size,
    /// Master seed; worker seeds are derived from it.
    pub seed: u64,
    /// Number of workers.  Part of the reproducibility contract: the same
    /// seed with a different worker count is a different path set.
    pub workers: Size,
}

impl Default for McConfig {
    fn default() -> Self {
        Self {
            paths: 100_000,
            time_steps: 100,
            seed: 42,
            workers: 4,
        }
    }
}

/// Deterministic per-step market data, read off the curves once up front so
/// workers never touch the term structures.
#[derive(Debug, Clone, Copy)]
struct StepData {
    r: Rate,
    q: Rate,
    /// Forward Black volatility over the step; only meaningful for BSM.
    sigma: Real,
    dt: Time,
    discount: Real,
}

fn build_steps(
    market: &MarketTermStructure,
    strike: Real,
    maturity: Time,
    n: Size,
) -> Result<Vec<StepData>> {
    let dt = maturity / n as Real;
    let mut steps = Vec::with_capacity(n);
    for i in 0..n {
        let (t0, t1) = (i as Real * dt, (i + 1) as Real * dt);
        let r = market.forward_rate(t0, t1)?;
        let q = market.dividend_forward_rate(t0, t1)?;
        let forward_variance = market.variance(t1, strike)? - market.variance(t0, strike)?;
        ensure!(
            forward_variance >= 0.0,
            "total variance must be non-decreasing in time (step {i})"
        );
        steps.push(StepData {
            r,
            q,
            sigma: (forward_variance / dt).sqrt(),
            dt,
            discount: (-r * dt).exp(),
        });
    }
    Ok(steps)
}

/// How many paths worker `w` of `workers` simulates.  The remainder of the
/// division goes to the lowest-indexed workers.
fn worker_share(paths: Size, workers: Size, w: Size) -> Size {
    paths / workers + usize::from(w < paths % workers)
}

/// Price a contract by simulation.
pub(crate) fn price(
    contract: &VanillaOption,
    process: &Process,
    market: &MarketTermStructure,
    config: McConfig,
    token: &CancellationToken,
) -> Result<PricingResult> {
    ensure!(config.paths >= 2, "need at least two paths");
    ensure!(config.time_steps >= 1, "need at least one time step");
    ensure!(config.workers >= 1, "need at least one worker");

    let maturity = market.time_to(contract.expiry())?;
    ensure!(maturity > 0.0, "option has already expired");
    let steps = build_steps(market, contract.strike(), maturity, config.time_steps)?;

    let mut result = match contract.exercise() {
        Exercise::European { .. } => price_european(contract, process, &steps, config, token),
        _ => price_early_exercise(contract, process, market, maturity, &steps, config, token),
    }?;
    if let Process::Heston(heston) = process {
        result = result.with_result("feller", if heston.feller_condition() { 1.0 } else { 0.0 });
    }
    Ok(result)
}

// ── European ──────────────────────────────────────────────────────────────────

fn price_european(
    contract: &VanillaOption,
    process: &Process,
    steps: &[StepData],
    config: McConfig,
    token: &CancellationToken,
) -> Result<PricingResult> {
    let payoff = contract.payoff();
    let total_discount: Real = steps.iter().map(|s| s.discount).product();

    let partials: Vec<Statistics> = (0..config.workers)
        .into_par_iter()
        .map(|w| {
            let mut rng = InverseCumulativeNormalRng::new(substream_seed(config.seed, w as u64));
            let mut stats = Statistics::new();
            let share = worker_share(config.paths, config.workers, w);
            for p in 0..share {
                if p % CANCELLATION_BATCH == 0 && token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let terminal = simulate_terminal(process, steps, &mut rng);
                stats.add(total_discount * payoff.value(terminal));
            }
            Ok(stats)
        })
        .collect::<Result<_>>()?;

    // Merge in worker order
    let mut stats = Statistics::new();
    for partial in &partials {
        stats.merge(partial);
    }

    let npv = stats.mean().ok_or_else(|| {
        Error::Convergence("simulation produced no samples".into())
    })?;
    if !npv.is_finite() {
        return Err(Error::Convergence("simulation mean is non-finite".into()));
    }
    let error = stats
        .error_estimate()
        .ok_or_else(|| Error::Convergence("too few samples for an error estimate".into()))?;
    debug!(npv, error, paths = config.paths, "Monte Carlo European price");

    Ok(PricingResult::from_npv(npv)
        .with_error_estimate(error)
        .with_result("samples", stats.samples() as Real))
}

fn simulate_terminal(
    process: &Process,
    steps: &[StepData],
    rng: &mut InverseCumulativeNormalRng,
) -> Real {
    match process {
        Process::BlackScholesMerton(bsm) => {
            let mut x = bsm.spot().ln();
            for s in steps {
                x = bsm.evolve(x, s.r, s.q, s.sigma, s.dt, rng.next_real());
            }
            x.exp()
        }
        Process::Heston(heston) => {
            let mut x = heston.spot().ln();
            let mut v = heston.v0();
            for s in steps {
                let z1 = rng.next_real();
                let z2 = rng.next_real();
                let (nx, nv) = heston.evolve(x, v, s.r, s.q, s.dt, z1, z2);
                x = nx;
                v = nv;
            }
            x.exp()
        }
    }
}

// ── Longstaff-Schwartz ────────────────────────────────────────────────────────

fn price_early_exercise(
    contract: &VanillaOption,
    process: &Process,
    market: &MarketTermStructure,
    maturity: Time,
    steps: &[StepData],
    config: McConfig,
    token: &CancellationToken,
) -> Result<PricingResult> {
    let n = config.time_steps;
    let schedule = ExerciseSchedule::build(contract.exercise(), market, maturity, n)?;
    let payoff = contract.payoff();
    let strike = contract.strike();

    // Simulate full paths in parallel; worker blocks concatenate in worker
    // order so the path set is reproducible
    let blocks: Vec<Vec<Vec<Real>>> = (0..config.workers)
        .into_par_iter()
        .map(|w| {
            let mut rng = InverseCumulativeNormalRng::new(substream_seed(config.seed, w as u64));
            let share = worker_share(config.paths, config.workers, w);
            let mut block = Vec::with_capacity(share);
            for p in 0..share {
                if p % CANCELLATION_BATCH == 0 && token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                block.push(simulate_path(process, steps, &mut rng));
            }
            Ok(block)
        })
        .collect::<Result<_>>()?;
    let paths: Vec<Vec<Real>> = blocks.into_iter().flatten().collect();

    // Backward pass: fit one continuation-value regression per exercisable
    // layer.  `values[p]` holds the pathwise cash flow discounted to the
    // current layer; the regression target is the realized continuation.
    let mut values: Vec<Real> = paths.iter().map(|path| payoff.value(path[n])).collect();
    let mut regressions: Vec<Option<LinearLeastSquaresRegression>> = vec![None; n];

    let basis: [fn(Real) -> Real; 3] = [|_| 1.0, |s| s, |s| s * s];
    for i in (1..n).rev() {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        for value in values.iter_mut() {
            *value *= steps[i].discount;
        }
        if !schedule.exercisable[i] {
            continue;
        }

        // Regress realized continuation on moneyness over in-the-money paths
        let mut x = Vec::new();
        let mut y = Vec::new();
        for (path, &value) in paths.iter().zip(values.iter()) {
            if payoff.value(path[i]) > 0.0 {
                x.push(path[i] / strike);
                y.push(value);
            }
        }
        // Too few in-the-money paths to fit: no exercise at this layer
        if x.len() <= basis.len() {
            continue;
        }
        let regression = LinearLeastSquaresRegression::new(&x, &y, &basis)?;

        for (path, value) in paths.iter().zip(values.iter_mut()) {
            let exercise = payoff.value(path[i]);
            if exercise > 0.0 && exercise >= regression.predict(path[i] / strike, &basis) {
                *value = exercise;
            }
        }
        regressions[i] = Some(regression);
    }

    // Forward pass on a fresh path set (worker substreams offset past the
    // regression set) applying the fitted stopping rule.  The rule is
    // necessarily suboptimal and evaluated out of sample, so this estimator
    // is biased low.
    let mut discount_to: Vec<Real> = Vec::with_capacity(n + 1);
    discount_to.push(1.0);
    for s in steps {
        let last = *discount_to.last().unwrap_or(&1.0);
        discount_to.push(last * s.discount);
    }

    let partials: Vec<Statistics> = (0..config.workers)
        .into_par_iter()
        .map(|w| {
            let seed = substream_seed(config.seed, (config.workers + w) as u64);
            let mut rng = InverseCumulativeNormalRng::new(seed);
            let mut stats = Statistics::new();
            let share = worker_share(config.paths, config.workers, w);
            for p in 0..share {
                if p % CANCELLATION_BATCH == 0 && token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let path = simulate_path(process, steps, &mut rng);
                let mut cash_flow = discount_to[n] * payoff.value(path[n]);
                for i in 1..n {
                    let Some(regression) = &regressions[i] else {
                        continue;
                    };
                    let exercise = payoff.value(path[i]);
                    if exercise > 0.0
                        && exercise >= regression.predict(path[i] / strike, &basis)
                    {
                        cash_flow = discount_to[i] * exercise;
                        break;
                    }
                }
                stats.add(cash_flow);
            }
            Ok(stats)
        })
        .collect::<Result<_>>()?;

    let mut stats = Statistics::new();
    for partial in &partials {
        stats.merge(partial);
    }

    let npv = stats
        .mean()
        .ok_or_else(|| Error::Convergence("simulation produced no samples".into()))?;
    if !npv.is_finite() {
        return Err(Error::Convergence("simulation mean is non-finite".into()));
    }
    let error = stats
        .error_estimate()
        .ok_or_else(|| Error::Convergence("too few samples for an error estimate".into()))?;
    debug!(npv, error, paths = config.paths, "Longstaff-Schwartz price");

    let mut result = PricingResult::from_npv(npv)
        .with_error_estimate(error)
        .with_result("samples", stats.samples() as Real)
        .with_result("low_biased", 1.0);
    if let Some(snap) = schedule.max_snap {
        result = result.with_result("bermudan_max_snap", snap);
    }
    Ok(result)
}

fn simulate_path(
    process: &Process,
    steps: &[StepData],
    rng: &mut InverseCumulativeNormalRng,
) -> Vec<Real> {
    let mut path = Vec::with_capacity(steps.len() + 1);
    match process {
        Process::BlackScholesMerton(bsm) => {
            let mut x = bsm.spot().ln();
            path.push(x.exp());
            for s in steps {
                x = bsm.evolve(x, s.r, s.q, s.sigma, s.dt, rng.next_real());
                path.push(x.exp());
            }
        }
        Process::Heston(heston) => {
            let mut x = heston.spot().ln();
            let mut v = heston.v0();
            path.push(x.exp());
            for s in steps {
                let z1 = rng.next_real();
                let z2 = rng.next_real();
                let (nx, nv) = heston.evolve(x, v, s.r, s.q, s.dt, z1, z2);
                x = nx;
                v = nv;
                path.push(x.exp());
            }
        }
    }
    path
}
