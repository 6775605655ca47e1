//! Black volatility term structures.
//!
//! A Black vol structure answers for the volatility σ(t, K) and the total
//! variance σ²(t, K)·t.  Negative volatilities are rejected at construction,
//! so engines never have to re-validate what they read.

use vp_core::{ensure, errors::Result, Real, Time, Volatility};
use vp_time::Date;

/// A Black volatility term structure.
pub trait BlackVolTermStructure: std::fmt::Debug + Send + Sync {
    /// The date to which times are measured.
    fn reference_date(&self) -> Date;

    /// The largest time the structure can answer for.
    fn max_time(&self) -> Time;

    /// Black volatility for time `t` and strike `strike`.
    fn black_vol(&self, t: Time, strike: Real) -> Result<Volatility>;

    /// Black total variance `σ²·t` for time `t` and strike `strike`.
    fn black_variance(&self, t: Time, strike: Real) -> Result<Real> {
        let vol = self.black_vol(t, strike)?;
        Ok(vol * vol * t)
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

/// A flat (constant) Black volatility surface.
///
/// `σ(t, K) = constant` for all `t ≥ 0` and all strikes.
#[derive(Debug, Clone)]
pub struct BlackConstantVol {
    reference_date: Date,
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Create a constant Black vol surface.  The volatility must be
    /// non-negative and finite.
    pub fn new(reference_date: Date, volatility: Volatility) -> Result<Self> {
        ensure!(
            volatility.is_finite() && volatility >= 0.0,
            "volatility must be non-negative, got {volatility}"
        );
        Ok(Self {
            reference_date,
            volatility,
        })
    }

    /// The constant volatility value.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl BlackVolTermStructure for BlackConstantVol {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn max_time(&self) -> Time {
        f64::INFINITY
    }

    fn black_vol(&self, t: Time, _strike: Real) -> Result<Volatility> {
        ensure!(t >= 0.0, "negative time {t} in volatility query");
        Ok(self.volatility)
    }
}

// ── BlackVarianceCurve ────────────────────────────────────────────────────────

/// A strike-independent Black volatility curve defined by volatilities at
/// known times.
///
/// Interpolation is linear in **total variance**, which keeps the implied
/// forward variance between pillars non-negative when the input variances
/// are non-decreasing.  Queries past the last pillar fail.
#[derive(Debug, Clone)]
pub struct BlackVarianceCurve {
    reference_date: Date,
    times: Vec<Time>,
    variances: Vec<Real>,
}

impl BlackVarianceCurve {
    /// Build a variance curve from pillar times and Black volatilities.
    ///
    /// Times must be positive and strictly increasing; volatilities must be
    /// non-negative.
    pub fn new(reference_date: Date, times: Vec<Time>, vols: Vec<Volatility>) -> Result<Self> {
        ensure!(!times.is_empty(), "variance curve needs at least one pillar");
        ensure!(
            times.len() == vols.len(),
            "variance curve: {} times but {} vols",
            times.len(),
            vols.len()
        );
        ensure!(times[0] > 0.0, "first pillar time must be positive, got {}", times[0]);
        for w in times.windows(2) {
            ensure!(
                w[1] > w[0],
                "pillar times must be strictly increasing, got {} then {}",
                w[0],
                w[1]
            );
        }
        for &v in &vols {
            ensure!(
                v.is_finite() && v >= 0.0,
                "volatility must be non-negative, got {v}"
            );
        }
        let variances = times
            .iter()
            .zip(vols.iter())
            .map(|(&t, &v)| v * v * t)
            .collect();
        Ok(Self {
            reference_date,
            times,
            variances,
        })
    }

    fn variance_at(&self, t: Time) -> Result<Real> {
        ensure!(t >= 0.0, "negative time {t} in volatility query");
        let last = self.max_time();
        ensure!(
            t <= last,
            "time {t} is past the last pillar {last}; refusing to extrapolate"
        );
        if t <= self.times[0] {
            // Flat vol up to the first pillar
            return Ok(self.variances[0] * t / self.times[0]);
        }
        let i = self
            .times
            .partition_point(|&pillar| pillar < t);
        if self.times[i] == t {
            return Ok(self.variances[i]);
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.variances[i - 1], self.variances[i]);
        Ok(v0 + (v1 - v0) * (t - t0) / (t1 - t0))
    }
}

impl BlackVolTermStructure for BlackVarianceCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn max_time(&self) -> Time {
        *self.times.last().unwrap_or(&0.0)
    }

    fn black_vol(&self, t: Time, strike: Real) -> Result<Volatility> {
        let var = self.black_variance(t, strike)?;
        if t <= 0.0 {
            return Ok(0.0);
        }
        Ok((var / t).sqrt())
    }

    fn black_variance(&self, t: Time, _strike: Real) -> Result<Real> {
        self.variance_at(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> Date {
        Date::from_ymd(2014, 3, 7).unwrap()
    }

    #[test]
    fn constant_vol() {
        let vol = BlackConstantVol::new(reference(), 0.20).unwrap();
        assert_relative_eq!(vol.black_vol(1.0, 100.0).unwrap(), 0.20, epsilon = 1e-15);
        assert_relative_eq!(vol.black_variance(2.0, 50.0).unwrap(), 0.08, epsilon = 1e-15);
        assert!(vol.black_vol(-0.1, 100.0).is_err());
    }

    #[test]
    fn negative_vol_rejected() {
        assert!(BlackConstantVol::new(reference(), -0.01).is_err());
        assert!(BlackConstantVol::new(reference(), f64::NAN).is_err());
        assert!(BlackVarianceCurve::new(reference(), vec![1.0], vec![-0.2]).is_err());
    }

    #[test]
    fn variance_curve_interpolates_in_variance() {
        let curve =
            BlackVarianceCurve::new(reference(), vec![1.0, 2.0], vec![0.20, 0.25]).unwrap();
        // Pillar values exact
        assert_relative_eq!(curve.black_vol(1.0, 0.0).unwrap(), 0.20, epsilon = 1e-12);
        assert_relative_eq!(curve.black_vol(2.0, 0.0).unwrap(), 0.25, epsilon = 1e-12);
        // Between pillars: variance is the linear blend
        let var_mid = curve.black_variance(1.5, 0.0).unwrap();
        assert_relative_eq!(var_mid, 0.5 * (0.04 + 0.125), epsilon = 1e-12);
        // Before first pillar: flat vol
        assert_relative_eq!(curve.black_vol(0.5, 0.0).unwrap(), 0.20, epsilon = 1e-12);
    }

    #[test]
    fn variance_curve_refuses_extrapolation() {
        let curve =
            BlackVarianceCurve::new(reference(), vec![1.0, 2.0], vec![0.20, 0.25]).unwrap();
        assert!(curve.black_vol(2.0, 0.0).is_ok());
        assert!(curve.black_vol(2.01, 0.0).is_err());
    }
}
