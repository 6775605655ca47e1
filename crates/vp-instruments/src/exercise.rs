//! Exercise styles.
//!
//! Exercise is a tagged enum: engines match on the variant and reject what
//! they cannot handle with
//! [`Error::UnsupportedExercise`](vp_core::Error::UnsupportedExercise).

use vp_core::{ensure, errors::Result};
use vp_time::{BusinessDayConvention, Calendar, Date};

/// When the option may be exercised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exercise {
    /// Exercise only at expiry.
    European {
        /// The expiry date.
        expiry: Date,
    },
    /// Exercise at any time up to and including expiry.
    American {
        /// The expiry date.
        expiry: Date,
    },
    /// Exercise on a fixed schedule of dates, the last being expiry.
    Bermudan {
        /// Strictly increasing exercise dates; the last one is expiry.
        dates: Vec<Date>,
    },
}

impl Exercise {
    /// European exercise at `expiry`.
    pub fn european(expiry: Date) -> Self {
        Exercise::European { expiry }
    }

    /// American exercise up to `expiry`.
    pub fn american(expiry: Date) -> Self {
        Exercise::American { expiry }
    }

    /// Bermudan exercise on the given dates, which must be non-empty and
    /// strictly increasing.
    pub fn bermudan(dates: Vec<Date>) -> Result<Self> {
        ensure!(!dates.is_empty(), "Bermudan exercise needs at least one date");
        for w in dates.windows(2) {
            ensure!(
                w[1] > w[0],
                "Bermudan exercise dates must be strictly increasing, got {} then {}",
                w[0],
                w[1]
            );
        }
        Ok(Exercise::Bermudan { dates })
    }

    /// Build a Bermudan schedule of `n` dates ending at `expiry`, spaced
    /// `step_months` apart and rolled onto business days of `calendar`.
    ///
    /// Dates are generated backwards from expiry, adjusted with the given
    /// convention, and deduplicated (adjacent candidates can collide after
    /// adjustment on short steps).
    pub fn bermudan_schedule(
        expiry: Date,
        n: usize,
        step_months: i32,
        calendar: &dyn Calendar,
        convention: BusinessDayConvention,
    ) -> Result<Self> {
        ensure!(n > 0, "Bermudan schedule needs at least one date");
        ensure!(step_months > 0, "schedule step must be positive, got {step_months}");
        let mut dates = Vec::with_capacity(n);
        for i in (0..n).rev() {
            let candidate = expiry.add_months(-(i as i32) * step_months)?;
            let adjusted = calendar.adjust(candidate, convention);
            if dates.last() != Some(&adjusted) {
                dates.push(adjusted);
            }
        }
        Self::bermudan(dates)
    }

    /// The last date on which exercise is possible.
    pub fn last_date(&self) -> Date {
        match self {
            Exercise::European { expiry } | Exercise::American { expiry } => *expiry,
            // Constructors guarantee a non-empty, sorted list
            Exercise::Bermudan { dates } => *dates.last().unwrap_or(&Date::MIN),
        }
    }

    /// Whether early exercise (before expiry) is possible.
    pub fn is_early(&self) -> bool {
        match self {
            Exercise::European { .. } => false,
            Exercise::American { .. } => true,
            Exercise::Bermudan { dates } => dates.len() > 1,
        }
    }

    /// Short human-readable style name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Exercise::European { .. } => "European",
            Exercise::American { .. } => "American",
            Exercise::Bermudan { .. } => "Bermudan",
        }
    }
}
