//! Cox-Ross-Rubinstein binomial lattice engine.
//!
//! Builds a recombining tree with `steps` time layers over [evaluation date,
//! expiry].  Up/down multipliers come from the CRR parameterization
//! `u = e^{σ√Δt}`, `d = 1/u`; the risk-neutral up-probability and the
//! one-step discount are read off the curves per step, so term structure in
//! the rates flows through the tree.  Backward induction keeps one layer at a
//! time: O(N²) work, O(N) space.
//!
//! Exercise dates that fall between layers (Bermudan) are snapped to the
//! nearest layer; the largest snap distance is reported in the result as
//! `bermudan_max_snap` (in years, at most Δt/2) instead of being hidden.

use tracing::debug;
use vp_core::{
    ensure,
    errors::{Error, Result},
    CancellationToken, Real, Size,
};
use vp_instruments::VanillaOption;
use vp_processes::Process;
use vp_termstructures::MarketTermStructure;

use crate::results::PricingResult;
use crate::schedule::ExerciseSchedule;

/// Lattice configuration.
#[derive(Debug, Clone, Copy)]
pub struct BinomialConfig {
    /// Number of time steps.
    pub steps: Size,
}

impl Default for BinomialConfig {
    fn default() -> Self {
        Self { steps: 400 }
    }
}

/// Price a contract on a CRR lattice.
pub(crate) fn price(
    contract: &VanillaOption,
    process: &Process,
    market: &MarketTermStructure,
    config: BinomialConfig,
    token: &CancellationToken,
) -> Result<PricingResult> {
    let spot = match process {
        Process::BlackScholesMerton(bsm) => bsm.spot(),
        other => {
            return Err(Error::UnsupportedProcess(format!(
                "binomial lattice requires a single deterministic volatility; \
                 {} dynamics have none",
                other.name()
            )));
        }
    };

    let steps = config.steps;
    ensure!(steps >= 1, "binomial lattice needs at least one step");

    let strike = contract.strike();
    let maturity = market.time_to(contract.expiry())?;
    ensure!(maturity > 0.0, "option has already expired");

    let dt = maturity / steps as Real;
    // CRR volatility from the total variance to expiry at the strike
    let sigma = (market.variance(maturity, strike)? / maturity).sqrt();
    ensure!(sigma > 0.0, "binomial lattice requires positive volatility");

    let up = (sigma * dt.sqrt()).exp();
    let down = 1.0 / up;

    // Per-step growth and discount factors from the curves
    let mut growth = Vec::with_capacity(steps);
    let mut discount = Vec::with_capacity(steps);
    let mut probability = Vec::with_capacity(steps);
    for i in 0..steps {
        let (t0, t1) = (i as Real * dt, (i + 1) as Real * dt);
        let r = market.forward_rate(t0, t1)?;
        let q = market.dividend_forward_rate(t0, t1)?;
        let g = ((r - q) * dt).exp();
        let p = (g - down) / (up - down);
        ensure!(
            (0.0..=1.0).contains(&p),
            "risk-neutral probability {p:.6} outside [0, 1] at step {i}; \
             increase the step count"
        );
        growth.push(g);
        discount.push((-r * dt).exp());
        probability.push(p);
    }

    let schedule = ExerciseSchedule::build(contract.exercise(), market, maturity, steps)?;

    // Terminal layer
    let payoff = contract.payoff();
    let mut values: Vec<Real> = (0..=steps)
        .map(|j| {
            let s = spot * up.powi(j as i32) * down.powi((steps - j) as i32);
            payoff.value(s)
        })
        .collect();

    // Backward induction with a rolling layer
    for i in (0..steps).rev() {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let p = probability[i];
        let df = discount[i];
        for j in 0..=i {
            let continuation = df * (p * values[j + 1] + (1.0 - p) * values[j]);
            values[j] = if schedule.exercisable[i] {
                let s = spot * up.powi(j as i32) * down.powi((i - j) as i32);
                continuation.max(payoff.value(s))
            } else {
                continuation
            };
        }
        values.truncate(i + 1);
    }

    let npv = values[0];
    if !npv.is_finite() {
        return Err(Error::Convergence(
            "binomial lattice produced a non-finite value".into(),
        ));
    }
    debug!(npv, steps, sigma, "binomial price");

    let mut result = PricingResult::from_npv(npv);
    if let Some(snap) = schedule.max_snap {
        result = result.with_result("bermudan_max_snap", snap);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic::black_scholes_merton;
    use std::sync::Arc;
    use vp_instruments::{Exercise, OptionType};
    use vp_processes::BsmProcess;
    use vp_termstructures::{BlackConstantVol, FlatForward};
    use vp_time::{Actual365Fixed, Date};

    fn eval_date() -> Date {
        Date::from_ymd(2014, 3, 7).unwrap()
    }

    fn flat_market(r: f64, q: f64, vol: f64) -> MarketTermStructure {
        let d = eval_date();
        MarketTermStructure::new(
            d,
            Arc::new(Actual365Fixed),
            Arc::new(FlatForward::new(d, r)),
            Arc::new(FlatForward::new(d, q)),
            Arc::new(BlackConstantVol::new(d, vol).unwrap()),
        )
        .unwrap()
    }

    fn bsm_process() -> Process {
        Process::BlackScholesMerton(BsmProcess::new(100.0).unwrap())
    }

    #[test]
    fn european_call_converges_to_closed_form() {
        let market = flat_market(0.05, 0.0, 0.20);
        let expiry = eval_date().add_days(365).unwrap();
        let option = VanillaOption::european(OptionType::Call, 100.0, expiry).unwrap();
        let (bs, _) = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);

        let token = CancellationToken::new();
        let coarse = price(&option, &bsm_process(), &market, BinomialConfig { steps: 50 }, &token)
            .unwrap()
            .npv;
        let fine = price(&option, &bsm_process(), &market, BinomialConfig { steps: 800 }, &token)
            .unwrap()
            .npv;
        assert!((fine - bs).abs() < (coarse - bs).abs() + 1e-9);
        assert!((fine - bs).abs() < 0.01, "fine={fine}, bs={bs}");
    }

    #[test]
    fn american_put_worth_at_least_european() {
        let market = flat_market(0.08, 0.0, 0.25);
        let expiry = eval_date().add_days(365).unwrap();
        let token = CancellationToken::new();
        let config = BinomialConfig { steps: 400 };

        let european = VanillaOption::european(OptionType::Put, 110.0, expiry).unwrap();
        let american = VanillaOption::american(OptionType::Put, 110.0, expiry).unwrap();
        let pe = price(&european, &bsm_process(), &market, config, &token).unwrap().npv;
        let pa = price(&american, &bsm_process(), &market, config, &token).unwrap().npv;
        assert!(pa >= pe - 1e-10, "american {pa} < european {pe}");
        // With a high carry rate the early-exercise premium is material
        assert!(pa > pe + 0.01, "american {pa} too close to european {pe}");
    }

    #[test]
    fn bermudan_between_european_and_american() {
        let market = flat_market(0.08, 0.0, 0.25);
        let expiry = eval_date().add_days(365).unwrap();
        let token = CancellationToken::new();
        let config = BinomialConfig { steps: 400 };

        let dates: Vec<Date> = (1..=4)
            .map(|i| eval_date().add_months(3 * i).unwrap())
            .collect();
        let bermudan = VanillaOption::new(
            vp_instruments::VanillaPayoff::new(OptionType::Put, 110.0).unwrap(),
            Exercise::bermudan(dates).unwrap(),
        );
        let european = VanillaOption::european(OptionType::Put, 110.0, expiry).unwrap();
        let american = VanillaOption::american(OptionType::Put, 110.0, expiry).unwrap();

        let pe = price(&european, &bsm_process(), &market, config, &token).unwrap().npv;
        let pa = price(&american, &bsm_process(), &market, config, &token).unwrap().npv;
        let result = price(&bermudan, &bsm_process(), &market, config, &token).unwrap();
        let pb = result.npv;
        assert!(pb >= pe - 1e-10, "bermudan {pb} < european {pe}");
        assert!(pb <= pa + 1e-10, "bermudan {pb} > american {pa}");

        // Snapping happened and is bounded by half a step
        let dt = market.time_to(expiry).unwrap() / 400.0;
        let snap = result.result("bermudan_max_snap").unwrap();
        assert!(snap <= dt / 2.0 + 1e-12, "snap {snap} > dt/2 {}", dt / 2.0);
    }

    #[test]
    fn heston_rejected() {
        let market = flat_market(0.05, 0.0, 0.20);
        let expiry = eval_date().add_days(365).unwrap();
        let option = VanillaOption::european(OptionType::Call, 100.0, expiry).unwrap();
        let heston = Process::Heston(
            vp_processes::HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.3, -0.5).unwrap(),
        );
        let err = price(
            &option,
            &heston,
            &market,
            BinomialConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedProcess(_)));
    }

    #[test]
    fn cancellation_observed() {
        let market = flat_market(0.05, 0.0, 0.20);
        let expiry = eval_date().add_days(365).unwrap();
        let option = VanillaOption::american(OptionType::Put, 100.0, expiry).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = price(
            &option,
            &bsm_process(),
            &market,
            BinomialConfig { steps: 100 },
            &token,
        )
        .unwrap_err();
        assert_eq!(err, Error::Cancelled);
    }
}
