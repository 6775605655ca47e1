//! `Calendar` trait, built-in calendars, and business-day conventions.
//!
//! A calendar knows which dates are business days and can adjust dates
//! according to a [`BusinessDayConvention`].  Bermudan exercise schedules use
//! this to roll candidate exercise dates off weekends.

use crate::date::{Date, Weekday};

/// How to adjust a date that falls on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusinessDayConvention {
    /// Leave the date as is, even on a holiday.
    Unadjusted,
    /// Move to the first business day after the given date.
    #[default]
    Following,
    /// Move to the first business day after the given date, unless that
    /// crosses into the next month; then move backwards instead.
    ModifiedFollowing,
    /// Move to the first business day before the given date.
    Preceding,
}

/// A financial calendar.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"Weekends only"`).
    fn name(&self) -> &str;

    /// Return `true` if `date` is a business day in this calendar.
    fn is_business_day(&self, date: Date) -> bool;

    /// Return `true` if `date` is a holiday (non-business) day.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjust `date` according to the given business-day convention.
    ///
    /// The date is never moved outside the valid date range in practice:
    /// business days are at most a few days apart in every calendar here.
    fn adjust(&self, mut date: Date, convention: BusinessDayConvention) -> Date {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => {
                while self.is_holiday(date) {
                    date = date + 1;
                }
                date
            }
            BusinessDayConvention::ModifiedFollowing => {
                let adjusted = self.adjust(date, BusinessDayConvention::Following);
                if adjusted.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Preceding)
                } else {
                    adjusted
                }
            }
            BusinessDayConvention::Preceding => {
                while self.is_holiday(date) {
                    date = date - 1;
                }
                date
            }
        }
    }

    /// Advance `date` by `n` business days (`n` may be negative).
    fn advance_business_days(&self, mut date: Date, n: i32) -> Date {
        let step: i32 = if n >= 0 { 1 } else { -1 };
        let mut remaining = n.abs();
        while remaining > 0 {
            date = date + step;
            if self.is_business_day(date) {
                remaining -= 1;
            }
        }
        date
    }
}

/// A null calendar — treats every day as a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

/// A calendar that treats only Saturdays and Sundays as non-business days,
/// with no additional holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn null_calendar_never_adjusts() {
        let cal = NullCalendar;
        let saturday = date(2014, 3, 8);
        assert!(cal.is_business_day(saturday));
        assert_eq!(cal.adjust(saturday, BusinessDayConvention::Following), saturday);
    }

    #[test]
    fn weekends_only_following() {
        let cal = WeekendsOnly;
        let saturday = date(2014, 3, 8);
        let monday = date(2014, 3, 10);
        assert!(cal.is_holiday(saturday));
        assert_eq!(cal.adjust(saturday, BusinessDayConvention::Following), monday);
        assert_eq!(cal.adjust(monday, BusinessDayConvention::Following), monday);
    }

    #[test]
    fn weekends_only_modified_following_rolls_back_at_month_end() {
        let cal = WeekendsOnly;
        // Aug 31, 2014 is a Sunday; Following would land on Sep 1
        let sunday = date(2014, 8, 31);
        let friday = date(2014, 8, 29);
        assert_eq!(
            cal.adjust(sunday, BusinessDayConvention::ModifiedFollowing),
            friday
        );
    }

    #[test]
    fn advance_business_days_skips_weekends() {
        let cal = WeekendsOnly;
        let friday = date(2014, 3, 7);
        assert_eq!(cal.advance_business_days(friday, 1), date(2014, 3, 10));
        assert_eq!(cal.advance_business_days(friday, 5), date(2014, 3, 14));
        assert_eq!(cal.advance_business_days(friday, -1), date(2014, 3, 6));
    }
}
