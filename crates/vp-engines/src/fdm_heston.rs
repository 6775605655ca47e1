//! Two-factor finite-difference solver for Heston dynamics.
//!
//! The grid is log-price × variance.  Each backward time step is split:
//! the mixed ρσv ∂²V/∂x∂v term is applied explicitly, then the x-direction
//! operator (½v V_xx + (r−q−½v)V_x − rV) is solved implicitly row by row,
//! then the v-direction operator (½σ²v V_vv + κ(θ−v)V_v) column by column.
//! Each one-dimensional solve is a tridiagonal system, so a step costs
//! O(nx·nv).
//!
//! Operator splitting is unconditionally stable in each direction, which is
//! why the forward-Euler scheme is not offered here: with two diffusion
//! directions and a cross term its stability region is too small to be
//! useful, and asking for it is an input error rather than a grid problem.

use tracing::debug;
use vp_core::{
    ensure,
    errors::{Error, Result},
    CancellationToken, Real,
};
use vp_instruments::VanillaOption;
use vp_processes::HestonProcess;
use vp_termstructures::MarketTermStructure;

use crate::fdm::{interpolate_log_linear, FdConfig, FdScheme, TridiagonalOperator};
use crate::results::PricingResult;
use crate::schedule::ExerciseSchedule;

pub(crate) fn price(
    contract: &VanillaOption,
    heston: &HestonProcess,
    market: &MarketTermStructure,
    config: FdConfig,
    token: &CancellationToken,
) -> Result<PricingResult> {
    ensure!(
        config.scheme != FdScheme::Explicit,
        "the two-factor solver is operator-split; the explicit scheme is not available"
    );
    let nt = config.time_steps;
    let nx = config.grid_points;
    let nv = config.variance_points;
    ensure!(nt >= 1, "need at least one time step");
    ensure!(nx >= 3 && nv >= 3, "need at least three grid points per axis");

    let maturity = market.time_to(contract.expiry())?;
    ensure!(maturity > 0.0, "option has already expired");

    let spot = heston.spot();
    let v0 = heston.v0();
    let kappa = heston.kappa();
    let theta = heston.theta();
    let sigma = heston.sigma();
    let rho = heston.rho();

    let dt = maturity / nt as Real;

    // Log-price axis centered at the spot, width from the larger of the
    // initial and long-run volatility
    let vol_scale = v0.max(theta).sqrt();
    let x_center = spot.ln();
    let x_half_width = 4.0 * vol_scale * maturity.sqrt();
    let x_min = x_center - x_half_width;
    let dx = 2.0 * x_half_width / (nx - 1) as Real;

    // Variance axis from zero up to a multiple of the larger level
    let v_max = 5.0 * v0.max(theta);
    let dv = v_max / (nv - 1) as Real;

    let s_grid: Vec<Real> = (0..nx).map(|i| (x_min + i as Real * dx).exp()).collect();
    let payoff = contract.payoff();
    let intrinsic: Vec<Real> = s_grid.iter().map(|&s| payoff.value(s)).collect();

    // values[k][i]: variance layer k, log-price node i
    let mut values: Vec<Vec<Real>> = vec![intrinsic.clone(); nv];

    let schedule = ExerciseSchedule::build(contract.exercise(), market, maturity, nt)?;

    for step in (0..nt).rev() {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let (t0, t1) = (step as Real * dt, (step + 1) as Real * dt);
        let r = market.forward_rate(t0, t1)?;
        let q = market.dividend_forward_rate(t0, t1)?;

        // 1. Explicit mixed derivative: ρσv ∂²V/∂x∂v with a centered
        //    four-point stencil on interior nodes
        let mut after_cross = values.clone();
        let cross_coeff = rho * sigma / (4.0 * dx * dv);
        for k in 1..nv - 1 {
            let v = k as Real * dv;
            let c = cross_coeff * v * dt;
            for i in 1..nx - 1 {
                let mixed = values[k + 1][i + 1] - values[k + 1][i - 1] - values[k - 1][i + 1]
                    + values[k - 1][i - 1];
                after_cross[k][i] = values[k][i] + c * mixed;
            }
        }

        // 2. Implicit x-sweep per variance row
        let mut after_x = after_cross.clone();
        for k in 0..nv {
            let v = k as Real * dv;
            let alpha = 0.5 * v;
            let beta = r - q - 0.5 * v;
            let a = alpha / (dx * dx) - beta / (2.0 * dx);
            let b = -2.0 * alpha / (dx * dx) - r;
            let c = alpha / (dx * dx) + beta / (2.0 * dx);

            let mut op = TridiagonalOperator::new(nx);
            for i in 1..nx - 1 {
                op.lower[i] = -dt * a;
                op.diag[i] = 1.0 - dt * b;
                op.upper[i] = -dt * c;
            }
            op.diag[0] = 1.0;
            op.diag[nx - 1] = 1.0;
            after_x[k] = op.solve(&after_cross[k]);
        }

        // 3. Implicit v-sweep per log-price column.  At v = 0 the diffusion
        //    vanishes and the drift κθ points up the axis, so the boundary row
        //    uses a one-sided (upwind) first derivative; v = v_max is far
        //    field and keeps its value within the sweep.
        let mut after_v = after_x.clone();
        let mut column = vec![0.0; nv];
        for i in 0..nx {
            for (k, row) in after_x.iter().enumerate() {
                column[k] = row[i];
            }

            let mut op = TridiagonalOperator::new(nv);
            for k in 1..nv - 1 {
                let v = k as Real * dv;
                let gamma = 0.5 * sigma * sigma * v;
                let drift = kappa * (theta - v);
                let a = gamma / (dv * dv) - drift / (2.0 * dv);
                let b = -2.0 * gamma / (dv * dv);
                let c = gamma / (dv * dv) + drift / (2.0 * dv);
                op.lower[k] = -dt * a;
                op.diag[k] = 1.0 - dt * b;
                op.upper[k] = -dt * c;
            }
            // v = 0: pure upwind drift κθ/dv
            let drift0 = kappa * theta / dv;
            op.diag[0] = 1.0 + dt * drift0;
            op.upper[0] = -dt * drift0;
            op.diag[nv - 1] = 1.0;

            let solved = op.solve(&column);
            for (k, &value) in solved.iter().enumerate() {
                after_v[k][i] = value;
            }
        }
        values = after_v;

        if values
            .iter()
            .any(|row| row.iter().any(|value| !value.is_finite()))
        {
            return Err(Error::Convergence(format!(
                "two-factor PDE solution became non-finite at layer {step}"
            )));
        }

        if schedule.exercisable[step] {
            for row in values.iter_mut() {
                for (value, &obstacle) in row.iter_mut().zip(intrinsic.iter()) {
                    if obstacle > *value {
                        *value = obstacle;
                    }
                }
            }
        }
    }

    // Bilinear read-off at (ln spot, v0)
    let k_low = ((v0 / dv).floor() as usize).min(nv - 2);
    let frac = ((v0 - k_low as Real * dv) / dv).clamp(0.0, 1.0);
    let low = interpolate_log_linear(&values[k_low], x_center, x_min, dx);
    let high = interpolate_log_linear(&values[k_low + 1], x_center, x_min, dx);
    let npv = low * (1.0 - frac) + high * frac;
    debug!(npv, v0, kappa, theta, "finite-difference Heston price");

    let mut result = PricingResult::from_npv(npv)
        .with_result("interp_order", 1.0)
        .with_result("feller", if heston.feller_condition() { 1.0 } else { 0.0 });
    if let Some(snap) = schedule.max_snap {
        result = result.with_result("bermudan_max_snap", snap);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic::{heston_price, HestonIntegration};
    use std::sync::Arc;
    use vp_instruments::OptionType;
    use vp_termstructures::{BlackConstantVol, FlatForward};
    use vp_time::{Actual365Fixed, Date};

    fn eval_date() -> Date {
        Date::from_ymd(2014, 3, 7).unwrap()
    }

    fn flat_market(r: f64, q: f64) -> MarketTermStructure {
        let d = eval_date();
        MarketTermStructure::new(
            d,
            Arc::new(Actual365Fixed),
            Arc::new(FlatForward::new(d, r)),
            Arc::new(FlatForward::new(d, q)),
            Arc::new(BlackConstantVol::new(d, 0.2).unwrap()),
        )
        .unwrap()
    }

    fn heston() -> HestonProcess {
        // Feller satisfied: 2·2·0.04 = 0.16 ≥ 0.3² = 0.09
        HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.3, -0.5).unwrap()
    }

    #[test]
    fn european_call_near_semi_analytic() {
        let market = flat_market(0.03, 0.0);
        let expiry = eval_date().add_days(365).unwrap();
        let option = VanillaOption::european(OptionType::Call, 100.0, expiry).unwrap();
        let model = heston();

        let integration = HestonIntegration::default();
        let reference = heston_price(
            OptionType::Call,
            &model,
            100.0,
            0.03,
            0.0,
            1.0,
            integration.truncation,
            integration.tolerance,
            integration.max_evaluations,
        )
        .unwrap();

        let config = FdConfig {
            time_steps: 200,
            grid_points: 200,
            variance_points: 80,
            scheme: FdScheme::Implicit,
        };
        let npv = price(&option, &model, &market, config, &CancellationToken::new())
            .unwrap()
            .npv;
        assert!(
            (npv - reference).abs() < 0.15,
            "fd={npv}, semi-analytic={reference}"
        );
    }

    #[test]
    fn american_put_above_european() {
        let market = flat_market(0.06, 0.0);
        let expiry = eval_date().add_days(365).unwrap();
        let european = VanillaOption::european(OptionType::Put, 110.0, expiry).unwrap();
        let american = VanillaOption::american(OptionType::Put, 110.0, expiry).unwrap();
        let model = heston();
        let token = CancellationToken::new();
        let config = FdConfig {
            time_steps: 150,
            grid_points: 150,
            variance_points: 60,
            scheme: FdScheme::Implicit,
        };

        let pe = price(&european, &model, &market, config, &token).unwrap().npv;
        let pa = price(&american, &model, &market, config, &token).unwrap().npv;
        assert!(pa > pe, "american {pa} not above european {pe}");
    }

    #[test]
    fn explicit_scheme_rejected() {
        let market = flat_market(0.03, 0.0);
        let expiry = eval_date().add_days(365).unwrap();
        let option = VanillaOption::european(OptionType::Call, 100.0, expiry).unwrap();
        let config = FdConfig {
            scheme: FdScheme::Explicit,
            ..FdConfig::default()
        };
        let err = price(&option, &heston(), &market, config, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn feller_flag_reported() {
        let market = flat_market(0.03, 0.0);
        let expiry = eval_date().add_days(180).unwrap();
        let option = VanillaOption::european(OptionType::Call, 100.0, expiry).unwrap();
        // Feller violated: 2·0.5·0.04 = 0.04 < 0.6² = 0.36
        let model = HestonProcess::new(100.0, 0.04, 0.5, 0.04, 0.6, -0.7).unwrap();
        let config = FdConfig {
            time_steps: 50,
            grid_points: 80,
            variance_points: 40,
            scheme: FdScheme::Implicit,
        };
        let result =
            price(&option, &model, &market, config, &CancellationToken::new()).unwrap();
        assert_eq!(result.result("feller"), Some(0.0));
    }
}
