//! The market snapshot consumed by pricing engines.
//!
//! A [`MarketTermStructure`] bundles the risk-free curve, the dividend curve,
//! and the volatility structure under one explicit evaluation date.  Engines
//! receive the snapshot as an argument; there is no ambient global date, so
//! two snapshots with different evaluation dates can coexist in one process.

use crate::vol_surface::BlackVolTermStructure;
use crate::yield_curve::YieldTermStructure;
use std::sync::Arc;
use vp_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time, Volatility};
use vp_time::{Date, DayCounter};

/// A consistent snapshot of market data at one evaluation date.
#[derive(Debug, Clone)]
pub struct MarketTermStructure {
    evaluation_date: Date,
    day_counter: Arc<dyn DayCounter>,
    risk_free: Arc<dyn YieldTermStructure>,
    dividend: Arc<dyn YieldTermStructure>,
    volatility: Arc<dyn BlackVolTermStructure>,
}

impl MarketTermStructure {
    /// Assemble a snapshot.  All curves must share the evaluation date as
    /// their reference date.
    pub fn new(
        evaluation_date: Date,
        day_counter: Arc<dyn DayCounter>,
        risk_free: Arc<dyn YieldTermStructure>,
        dividend: Arc<dyn YieldTermStructure>,
        volatility: Arc<dyn BlackVolTermStructure>,
    ) -> Result<Self> {
        ensure!(
            risk_free.reference_date() == evaluation_date,
            "risk-free curve reference date {} does not match evaluation date {}",
            risk_free.reference_date(),
            evaluation_date
        );
        ensure!(
            dividend.reference_date() == evaluation_date,
            "dividend curve reference date {} does not match evaluation date {}",
            dividend.reference_date(),
            evaluation_date
        );
        ensure!(
            volatility.reference_date() == evaluation_date,
            "volatility structure reference date {} does not match evaluation date {}",
            volatility.reference_date(),
            evaluation_date
        );
        Ok(Self {
            evaluation_date,
            day_counter,
            risk_free,
            dividend,
            volatility,
        })
    }

    /// The evaluation date of the snapshot.
    pub fn evaluation_date(&self) -> Date {
        self.evaluation_date
    }

    /// The day counter used to turn dates into year fractions.
    pub fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    /// Year fraction from the evaluation date to `date`.  Dates before the
    /// evaluation date are rejected.
    pub fn time_to(&self, date: Date) -> Result<Time> {
        ensure!(
            date >= self.evaluation_date,
            "date {} is before the evaluation date {}",
            date,
            self.evaluation_date
        );
        Ok(self.day_counter.year_fraction(self.evaluation_date, date))
    }

    /// Risk-free discount factor `P(0,t)`.
    pub fn discount(&self, t: Time) -> Result<DiscountFactor> {
        self.risk_free.discount(t)
    }

    /// Dividend-yield discount factor.
    pub fn dividend_discount(&self, t: Time) -> Result<DiscountFactor> {
        self.dividend.discount(t)
    }

    /// Continuously-compounded risk-free zero rate for maturity `t`.
    pub fn zero_rate(&self, t: Time) -> Result<Rate> {
        self.risk_free.zero_rate(t)
    }

    /// Continuously-compounded dividend zero rate for maturity `t`.
    pub fn dividend_rate(&self, t: Time) -> Result<Rate> {
        self.dividend.zero_rate(t)
    }

    /// Risk-free forward rate between `t1` and `t2`.
    pub fn forward_rate(&self, t1: Time, t2: Time) -> Result<Rate> {
        self.risk_free.forward_rate(t1, t2)
    }

    /// Dividend forward rate between `t1` and `t2`.
    pub fn dividend_forward_rate(&self, t1: Time, t2: Time) -> Result<Rate> {
        self.dividend.forward_rate(t1, t2)
    }

    /// Black volatility σ(t, K).
    pub fn volatility(&self, t: Time, strike: Real) -> Result<Volatility> {
        self.volatility.black_vol(t, strike)
    }

    /// Black total variance σ²(t, K)·t.
    pub fn variance(&self, t: Time, strike: Real) -> Result<Real> {
        self.volatility.black_variance(t, strike)
    }

    /// The largest time every curve in the snapshot can answer for.
    pub fn max_time(&self) -> Time {
        self.risk_free
            .max_time()
            .min(self.dividend.max_time())
            .min(self.volatility.max_time())
    }
}
