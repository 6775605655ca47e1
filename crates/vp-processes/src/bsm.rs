//! Black-Scholes-Merton process.
//!
//! `dS/S = (r(t) − q(t)) dt + σ(t) dW`
//!
//! Rates and volatility come from the market snapshot at pricing time; the
//! process itself carries only the spot.

use vp_core::{ensure, errors::Result, Rate, Real, Time, Volatility};

/// Geometric Brownian motion with deterministic rates and volatility.
#[derive(Debug, Clone, PartialEq)]
pub struct BsmProcess {
    spot: Real,
}

impl BsmProcess {
    /// Create a process with the given spot price.  The spot must be
    /// positive and finite.
    pub fn new(spot: Real) -> Result<Self> {
        ensure!(
            spot.is_finite() && spot > 0.0,
            "spot must be positive, got {spot}"
        );
        Ok(Self { spot })
    }

    /// The spot price.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Evolve the log-spot exactly over a step of length `dt` under the
    /// risk-neutral measure, given the per-step drift inputs and a standard
    /// normal deviate `z`.
    ///
    /// `ln S' = ln S + (r − q − σ²/2)·dt + σ·√dt·z`
    ///
    /// The lognormal step is exact for deterministic coefficients, so path
    /// discretization introduces no bias for European payoffs.
    pub fn evolve(
        &self,
        log_spot: Real,
        r: Rate,
        q: Rate,
        sigma: Volatility,
        dt: Time,
        z: Real,
    ) -> Real {
        log_spot + (r - q - 0.5 * sigma * sigma) * dt + sigma * dt.sqrt() * z
    }
}
