//! # vp-time
//!
//! Date, day counter, and calendar types.
//!
//! These are the collaborator contracts consumed by the pricing library: a
//! day-count fraction (`DayCounter::year_fraction`), a business-day predicate
//! (`Calendar::is_business_day`), and a date adjustment
//! (`Calendar::adjust`) used when building Bermudan exercise schedules.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Calendar trait, built-in calendars, and business-day conventions.
pub mod calendar;

/// `Date` type.
pub mod date;

/// `DayCounter` trait and built-in day-count conventions.
pub mod day_counter;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use calendar::{BusinessDayConvention, Calendar, NullCalendar, WeekendsOnly};
pub use date::{Date, Weekday};
pub use day_counter::{Actual360, Actual365Fixed, DayCounter, Thirty360};
