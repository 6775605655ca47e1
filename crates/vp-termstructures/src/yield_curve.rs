//! Yield (interest-rate) term structures.
//!
//! A yield curve answers three questions: the discount factor `P(0,t)`, the
//! continuously-compounded zero rate `z(t)`, and the forward rate between two
//! times.  The three are connected by `P(t) = exp(-z(t)·t)` and
//! `f(t₁,t₂) = (z(t₂)·t₂ − z(t₁)·t₁) / (t₂ − t₁)`.

use vp_core::{ensure, errors::Result, DiscountFactor, Rate, Time};
use vp_time::Date;

/// A yield (interest-rate) term structure.
///
/// Implementors provide the zero rate; discount factors and forward rates
/// are derived.  Queries outside the curve's domain (`t < 0` or past the
/// last pillar) fail rather than extrapolate.
pub trait YieldTermStructure: std::fmt::Debug + Send + Sync {
    /// The date to which times are measured.
    fn reference_date(&self) -> Date;

    /// The largest time the curve can answer for.
    fn max_time(&self) -> Time;

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Result<Rate>;

    /// Discount factor `P(0,t) = exp(-z(t)·t)`.
    fn discount(&self, t: Time) -> Result<DiscountFactor> {
        if t == 0.0 {
            return Ok(1.0);
        }
        let z = self.zero_rate(t)?;
        Ok((-z * t).exp())
    }

    /// Continuously-compounded forward rate between `t1` and `t2`.
    fn forward_rate(&self, t1: Time, t2: Time) -> Result<Rate> {
        ensure!(t2 > t1, "forward rate requires t2 > t1, got [{t1}, {t2}]");
        let z1t1 = if t1 == 0.0 { 0.0 } else { self.zero_rate(t1)? * t1 };
        let z2t2 = self.zero_rate(t2)? * t2;
        Ok((z2t2 - z1t1) / (t2 - t1))
    }
}

// ── FlatForward ───────────────────────────────────────────────────────────────

/// A flat (constant) continuously-compounded yield curve.
///
/// `P(t) = exp(-r·t)` for all maturities.
#[derive(Debug, Clone)]
pub struct FlatForward {
    reference_date: Date,
    rate: Rate,
}

impl FlatForward {
    /// Create a flat curve from a continuously-compounded rate.
    pub fn new(reference_date: Date, rate: Rate) -> Self {
        Self {
            reference_date,
            rate,
        }
    }

    /// The flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl YieldTermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn max_time(&self) -> Time {
        f64::INFINITY
    }

    fn zero_rate(&self, t: Time) -> Result<Rate> {
        ensure!(t >= 0.0, "negative time {t} in zero rate query");
        Ok(self.rate)
    }
}

// ── ZeroCurve ─────────────────────────────────────────────────────────────────

/// A yield curve defined by zero rates at known times, interpolated linearly
/// in the zero rate.
///
/// Queries before the first pillar use the first pillar's rate (the short
/// end is flat); queries past the last pillar fail.
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    reference_date: Date,
    times: Vec<Time>,
    rates: Vec<Rate>,
}

impl ZeroCurve {
    /// Build a zero-rate curve from pillar times and corresponding rates.
    ///
    /// Times must be positive and strictly increasing.
    pub fn new(reference_date: Date, times: Vec<Time>, rates: Vec<Rate>) -> Result<Self> {
        ensure!(!times.is_empty(), "zero curve needs at least one pillar");
        ensure!(
            times.len() == rates.len(),
            "zero curve: {} times but {} rates",
            times.len(),
            rates.len()
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
        for &r in &rates {
            ensure!(r.is_finite(), "zero rate {r} is not finite");
        }
        Ok(Self {
            reference_date,
            times,
            rates,
        })
    }

    /// The pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The pillar zero rates.
    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }
}

impl YieldTermStructure for ZeroCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn max_time(&self) -> Time {
        *self.times.last().unwrap_or(&0.0)
    }

    fn zero_rate(&self, t: Time) -> Result<Rate> {
        ensure!(t >= 0.0, "negative time {t} in zero rate query");
        let last = self.max_time();
        ensure!(
            t <= last,
            "time {t} is past the last pillar {last}; refusing to extrapolate"
        );
        if t <= self.times[0] {
            return Ok(self.rates[0]);
        }
        // Linear interpolation between bracketing pillars
        let i = match self
            .times
            .binary_search_by(|probe| probe.partial_cmp(&t).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(i) => return Ok(self.rates[i]),
            Err(i) => i,
        };
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (r0, r1) = (self.rates[i - 1], self.rates[i]);
        Ok(r0 + (r1 - r0) * (t - t0) / (t1 - t0))
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
    fn flat_forward_discounts() {
        let curve = FlatForward::new(reference(), 0.05);
        assert_relative_eq!(curve.discount(0.0).unwrap(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(curve.discount(2.0).unwrap(), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(0.5, 1.5).unwrap(), 0.05, epsilon = 1e-15);
        assert!(curve.discount(-1.0).is_err());
    }

    #[test]
    fn zero_curve_interpolates() {
        let curve = ZeroCurve::new(reference(), vec![0.5, 1.0, 2.0], vec![0.02, 0.03, 0.05]).unwrap();
        assert_relative_eq!(curve.zero_rate(0.25).unwrap(), 0.02, epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rate(0.75).unwrap(), 0.025, epsilon = 1e-12);
        assert_relative_eq!(curve.zero_rate(1.0).unwrap(), 0.03, epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rate(1.5).unwrap(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn zero_curve_refuses_extrapolation() {
        let curve = ZeroCurve::new(reference(), vec![1.0, 2.0], vec![0.02, 0.03]).unwrap();
        assert!(curve.zero_rate(2.0).is_ok());
        let err = curve.zero_rate(2.0001).unwrap_err();
        assert!(matches!(err, vp_core::Error::InvalidParameter(_)));
        assert!(curve.discount(3.0).is_err());
        assert!(curve.forward_rate(1.0, 2.5).is_err());
    }

    #[test]
    fn zero_curve_validates_pillars() {
        assert!(ZeroCurve::new(reference(), vec![], vec![]).is_err());
        assert!(ZeroCurve::new(reference(), vec![1.0, 1.0], vec![0.02, 0.03]).is_err());
        assert!(ZeroCurve::new(reference(), vec![-0.5, 1.0], vec![0.02, 0.03]).is_err());
        assert!(ZeroCurve::new(reference(), vec![1.0], vec![0.02, 0.03]).is_err());
    }

    #[test]
    fn forward_rate_recovers_discount_ratio() {
        let curve = ZeroCurve::new(reference(), vec![0.5, 1.0, 2.0], vec![0.02, 0.03, 0.05]).unwrap();
        let (t1, t2) = (0.5, 1.5);
        let f = curve.forward_rate(t1, t2).unwrap();
        let implied = curve.discount(t1).unwrap() / curve.discount(t2).unwrap();
        assert_relative_eq!((f * (t2 - t1)).exp(), implied, epsilon = 1e-12);
    }
}
