//! Closed-form and semi-closed-form pricers.
//!
//! European + Black-Scholes-Merton has the classic closed form with analytic
//! Greeks.  European + Heston is priced by numerical integration of the
//! characteristic function; integration failure is reported as
//! [`Error::Convergence`](vp_core::Error::Convergence), never smoothed over.
//! Any early-exercise style is rejected here: no closed form exists.

use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;
use vp_core::{
    errors::{Error, Result},
    Rate, Real, Time, Volatility,
};
use vp_instruments::{Exercise, OptionType, VanillaOption};
use vp_math::{normal_cdf, normal_pdf, Integrator, SimpsonIntegral};
use vp_processes::{HestonProcess, Process};
use vp_termstructures::MarketTermStructure;

use crate::results::PricingResult;

/// Greeks produced alongside the Black-Scholes-Merton price.
#[derive(Debug, Clone, Copy)]
pub struct BsmGreeks {
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
    /// ∂V/∂σ (per unit of absolute vol).
    pub vega: Real,
    /// ∂V/∂t (per year).
    pub theta: Real,
    /// ∂V/∂r (per unit rate shift).
    pub rho: Real,
}

/// Black-Scholes-Merton price and Greeks for a European option.
///
/// `C = S·e^{-qT}·N(d₁) − K·e^{-rT}·N(d₂)`,
/// `d₁,₂ = [ln(S/K) + (r − q ± σ²/2)·T] / (σ√T)`.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    t: Time,
) -> (Real, BsmGreeks) {
    let phi = option_type.sign();

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return (
            intrinsic,
            BsmGreeks {
                delta: 0.0,
                gamma: 0.0,
                vega: 0.0,
                theta: 0.0,
                rho: 0.0,
            },
        );
    }

    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        // Degenerate deterministic case: the option is either surely in or
        // surely out of the money at expiry
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let vega = spot * df_q * npd1 * sqrt_t;
    let theta = {
        let term1 = if sqrt_t > 0.0 {
            -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t)
        } else {
            0.0
        };
        let term2 = -phi * r * strike * df_r * nd2;
        let term3 = phi * q * spot * df_q * nd1;
        term1 + term2 + term3
    };
    let rho = phi * strike * t * df_r * nd2;

    (
        price,
        BsmGreeks {
            delta,
            gamma,
            vega,
            theta,
            rho,
        },
    )
}

// ── Heston characteristic function pricer ─────────────────────────────────────

/// Heston characteristic function fⱼ(φ) in the Albrecher et al. formulation,
/// with the numerically stable `g_m = (c − d)/(c + d)` branch.
fn heston_char_func(phi: Real, t: Time, model: &HestonProcess, j: usize) -> Complex64 {
    let i = Complex64::new(0.0, 1.0);
    let kappa = model.kappa();
    let theta = model.theta();
    let sigma = model.sigma();
    let rho = model.rho();
    let v0 = model.v0();
    let sigma2 = sigma * sigma;

    // j = 1: u = ½, b = κ − ρσ; j = 2: u = −½, b = κ
    let (u, b) = if j == 1 {
        (0.5, kappa - rho * sigma)
    } else {
        (-0.5, kappa)
    };

    let c = Complex64::new(b, -rho * sigma * phi);
    let mut d = ((i * (rho * sigma * phi) - b).powi(2)
        - sigma2 * Complex64::new(-phi * phi, 2.0 * u * phi))
    .sqrt();
    // Stable branch: Re(d) >= 0 so exp(-d·t) decays
    if d.re < 0.0 {
        d = -d;
    }

    let g_m = (c - d) / (c + d);
    let emdt = (-d * t).exp();

    let big_d = (c - d) / sigma2 * (Complex64::new(1.0, 0.0) - emdt)
        / (Complex64::new(1.0, 0.0) - g_m * emdt);
    let big_c = kappa * theta / sigma2
        * ((c - d) * t
            - 2.0
                * ((Complex64::new(1.0, 0.0) - g_m * emdt)
                    / (Complex64::new(1.0, 0.0) - g_m))
                .ln());

    (big_c + big_d * v0).exp()
}

/// `Pⱼ = ½ + (1/π)·∫₀^∞ Re[e^{iφx}·fⱼ(φ) / (iφ)] dφ` with `x` the forward
/// log-moneyness, truncated at `truncation` and integrated adaptively.
fn heston_probability(
    j: usize,
    forward_log_moneyness: Real,
    t: Time,
    model: &HestonProcess,
    truncation: Real,
    tolerance: Real,
    max_evaluations: usize,
) -> Result<Real> {
    let x = forward_log_moneyness;
    let integrand = |phi: Real| -> Real {
        if phi < 1e-12 {
            return 0.0;
        }
        let cf = heston_char_func(phi, t, model, j);
        // Re[cf · e^{iφx} / (iφ)] = Im[cf · e^{iφx}] / φ
        let rotated = cf * Complex64::new(0.0, phi * x).exp();
        rotated.im / phi
    };

    let integrator = SimpsonIntegral::new(tolerance, max_evaluations);
    let integral = integrator.integrate(integrand, 1e-8, truncation)?;
    let p = 0.5 + integral / PI;
    if !p.is_finite() {
        return Err(Error::Convergence(format!(
            "Heston probability P{j} is not finite"
        )));
    }
    Ok(p)
}

/// Semi-analytic Heston price of a European option.
///
/// `C = S·e^{-qT}·P₁ − K·e^{-rT}·P₂`; the put follows from parity.
#[allow(clippy::too_many_arguments)]
pub fn heston_price(
    option_type: OptionType,
    model: &HestonProcess,
    strike: Real,
    r: Rate,
    q: Rate,
    t: Time,
    truncation: Real,
    tolerance: Real,
    max_evaluations: usize,
) -> Result<Real> {
    let spot = model.spot();
    let x = spot.ln() + (r - q) * t - strike.ln();

    let p1 = heston_probability(1, x, t, model, truncation, tolerance, max_evaluations)?;
    let p2 = heston_probability(2, x, t, model, truncation, tolerance, max_evaluations)?;

    let df_q = (-q * t).exp();
    let df_r = (-r * t).exp();
    let call = spot * df_q * p1 - strike * df_r * p2;

    Ok(match option_type {
        OptionType::Call => call,
        // Parity: P = C − S·e^{-qT} + K·e^{-rT}
        OptionType::Put => call - spot * df_q + strike * df_r,
    })
}

/// Configuration for the characteristic-function integration.
#[derive(Debug, Clone, Copy)]
pub struct HestonIntegration {
    /// Upper truncation bound of the half-line integral.
    pub truncation: Real,
    /// Absolute accuracy target of the adaptive quadrature.
    pub tolerance: Real,
    /// Evaluation budget before reporting non-convergence.
    pub max_evaluations: usize,
}

impl Default for HestonIntegration {
    fn default() -> Self {
        Self {
            truncation: 400.0,
            tolerance: 1e-9,
            max_evaluations: 200_000,
        }
    }
}

/// Price a contract with the analytic engine.
pub(crate) fn price(
    contract: &VanillaOption,
    process: &Process,
    market: &MarketTermStructure,
    integration: HestonIntegration,
) -> Result<PricingResult> {
    match contract.exercise() {
        Exercise::European { .. } => {}
        other => {
            return Err(Error::UnsupportedExercise(format!(
                "analytic engine has no closed form for {} exercise",
                other.name()
            )));
        }
    }

    let strike = contract.strike();
    let t = market.time_to(contract.expiry())?;
    let r = market.zero_rate(t)?;
    let q = market.dividend_rate(t)?;

    match process {
        Process::BlackScholesMerton(bsm) => {
            let sigma = market.volatility(t, strike)?;
            let (npv, greeks) =
                black_scholes_merton(contract.option_type(), bsm.spot(), strike, r, q, sigma, t);
            debug!(npv, t, sigma, "analytic BSM price");
            Ok(PricingResult::from_npv(npv)
                .with_result("delta", greeks.delta)
                .with_result("gamma", greeks.gamma)
                .with_result("vega", greeks.vega)
                .with_result("theta", greeks.theta)
                .with_result("rho", greeks.rho))
        }
        Process::Heston(heston) => {
            let npv = heston_price(
                contract.option_type(),
                heston,
                strike,
                r,
                q,
                t,
                integration.truncation,
                integration.tolerance,
                integration.max_evaluations,
            )?;
            debug!(npv, t, "analytic Heston price");
            Ok(PricingResult::from_npv(npv).with_result(
                "feller",
                if heston.feller_condition() { 1.0 } else { 0.0 },
            ))
        }
    }
}
