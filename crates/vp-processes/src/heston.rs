//! Heston stochastic volatility process.
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```

use vp_core::{ensure, errors::Result, Rate, Real, Time};

/// The Heston square-root stochastic variance model.
///
/// * `v0`    — initial variance
/// * `kappa` — mean-reversion speed of variance
/// * `theta` — long-run variance level
/// * `sigma` — vol-of-vol
/// * `rho`   — correlation between the two Brownian motions
#[derive(Debug, Clone, PartialEq)]
pub struct HestonProcess {
    spot: Real,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonProcess {
    /// Create a new Heston process, validating every parameter.
    pub fn new(
        spot: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(
            spot.is_finite() && spot > 0.0,
            "spot must be positive, got {spot}"
        );
        ensure!(
            v0.is_finite() && v0 >= 0.0,
            "initial variance must be non-negative, got {v0}"
        );
        ensure!(
            kappa.is_finite() && kappa > 0.0,
            "mean reversion speed must be positive, got {kappa}"
        );
        ensure!(
            theta.is_finite() && theta >= 0.0,
            "long-run variance must be non-negative, got {theta}"
        );
        ensure!(
            sigma.is_finite() && sigma > 0.0,
            "vol-of-vol must be positive, got {sigma}"
        );
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation must be in [-1, 1], got {rho}"
        );
        Ok(Self {
            spot,
            v0,
            kappa,
            theta,
            sigma,
            rho,
        })
    }

    /// Spot price.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed of variance.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance level.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation between the spot and variance Brownian motions.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Whether the Feller condition `2κθ ≥ σ²` holds.
    ///
    /// When it fails the variance process can touch zero; the simulation
    /// schemes here remain usable (full truncation keeps the variance
    /// non-negative), but callers may want the diagnostic.
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }

    /// Evolve `(log S, v)` over a step of length `dt` with the full
    /// truncation Euler scheme, given correlated standard normals
    /// `z1` (spot) and `z2` (variance).
    ///
    /// `v` is floored at zero inside the diffusion coefficients, which keeps
    /// the variance path non-negative without reflecting probability mass.
    pub fn evolve(
        &self,
        log_spot: Real,
        v: Real,
        r: Rate,
        q: Rate,
        dt: Time,
        z1: Real,
        z2: Real,
    ) -> (Real, Real) {
        let v_plus = v.max(0.0);
        let sqrt_v = v_plus.sqrt();
        let sqrt_dt = dt.sqrt();

        let w2 = self.rho * z1 + (1.0 - self.rho * self.rho).sqrt() * z2;

        let new_log_spot =
            log_spot + (r - q - 0.5 * v_plus) * dt + sqrt_v * sqrt_dt * z1;
        let new_v = v + self.kappa * (self.theta - v_plus) * dt
            + self.sigma * sqrt_v * sqrt_dt * w2;
        (new_log_spot, new_v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn process() -> HestonProcess {
        HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.5, -0.7).unwrap()
    }

    #[test]
    fn validates_parameters() {
        assert!(HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.5, -0.7).is_ok());
        assert!(HestonProcess::new(-1.0, 0.04, 2.0, 0.04, 0.5, 0.0).is_err());
        assert!(HestonProcess::new(100.0, -0.01, 2.0, 0.04, 0.5, 0.0).is_err());
        assert!(HestonProcess::new(100.0, 0.04, 0.0, 0.04, 0.5, 0.0).is_err());
        assert!(HestonProcess::new(100.0, 0.04, 2.0, -0.04, 0.5, 0.0).is_err());
        assert!(HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.0, 0.0).is_err());
        assert!(HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.5, -1.5).is_err());
    }

    #[test]
    fn feller_condition() {
        // 2*2*0.04 = 0.16 >= 0.25? no
        assert!(!process().feller_condition());
        // 2*2*0.04 = 0.16 >= 0.09? yes
        let p = HestonProcess::new(100.0, 0.04, 2.0, 0.04, 0.3, -0.7).unwrap();
        assert!(p.feller_condition());
    }

    #[test]
    fn zero_noise_step_follows_drift() {
        let p = process();
        let (log_s, v) = p.evolve(100.0_f64.ln(), 0.04, 0.05, 0.0, 0.25, 0.0, 0.0);
        assert_relative_eq!(
            log_s,
            100.0_f64.ln() + (0.05 - 0.02) * 0.25,
            epsilon = 1e-14
        );
        // Variance at its long-run level stays put
        assert_relative_eq!(v, 0.04, epsilon = 1e-14);
    }

    #[test]
    fn negative_variance_is_truncated_in_coefficients() {
        let p = process();
        let (_, v) = p.evolve(100.0_f64.ln(), -0.01, 0.0, 0.0, 0.1, 1.0, 1.0);
        // Drift pulls toward theta from 0, diffusion is shut off at v <= 0
        assert_relative_eq!(v, -0.01 + 2.0 * 0.04 * 0.1, epsilon = 1e-14);
    }
}
