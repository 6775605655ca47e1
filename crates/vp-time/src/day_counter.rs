//! `DayCounter` trait and built-in day-count conventions.
//!
//! A day counter computes the **day count fraction** — the fraction of a year
//! between two dates — used to turn the gap between the evaluation date and a
//! cash-flow or exercise date into the `t` that curves and engines consume.

use crate::date::Date;
use vp_core::{Real, Time};

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64;

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;
}

/// Actual/365 (Fixed) day counter.
///
/// `year_fraction = actual_days / 365`
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2.serial() - d1.serial()) as i64
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// Actual/360 day counter.
///
/// `year_fraction = actual_days / 360`
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2.serial() - d1.serial()) as i64
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// Thirty/360 day counter (Bond Basis / US).
///
/// `year_fraction = [360(Y2−Y1) + 30(M2−M1) + (D2−D1)] / 360`
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360;

impl DayCounter for Thirty360 {
    fn name(&self) -> &str {
        "30/360"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        let y1 = d1.year() as i64;
        let m1 = d1.month() as i64;
        let mut dd1 = d1.day_of_month() as i64;
        let y2 = d2.year() as i64;
        let m2 = d2.month() as i64;
        let mut dd2 = d2.day_of_month() as i64;

        if dd2 == 31 && dd1 < 30 {
            dd2 = 1;
        }
        if dd1 == 31 {
            dd1 = 30;
        }

        360 * (y2 - y1) + 30 * (m2 - m1) + (dd2 - dd1)
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}
