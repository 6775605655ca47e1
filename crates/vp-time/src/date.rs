//! `Date` — a calendar date represented as a serial day number.
//!
//! Serial 1 corresponds to January 1, 1900; the valid range runs through
//! December 31, 2199.  Serial arithmetic makes day counting and weekday
//! computation trivial, which is all the pricing code needs from a date.

use vp_core::errors::{Error, Result};

/// Day of the week, Monday = 1 through Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    /// Monday.
    Monday = 1,
    /// Tuesday.
    Tuesday = 2,
    /// Wednesday.
    Wednesday = 3,
    /// Thursday.
    Thursday = 4,
    /// Friday.
    Friday = 5,
    /// Saturday.
    Saturday = 6,
    /// Sunday.
    Sunday = 7,
}

impl Weekday {
    /// Whether this is a Monday-to-Friday day.
    pub fn is_weekday(self) -> bool {
        !matches!(self, Weekday::Saturday | Weekday::Sunday)
    }

    fn from_ordinal(w: u8) -> Self {
        match w {
            1 => Weekday::Monday,
            2 => Weekday::Tuesday,
            3 => Weekday::Wednesday,
            4 => Weekday::Thursday,
            5 => Weekday::Friday,
            6 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }
}

/// A calendar date as a serial number of days since December 31, 1899.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Date(i32);

impl Date {
    /// Minimum valid date: January 1, 1900.
    pub const MIN: Date = Date(1);

    /// Maximum valid date: December 31, 2199.
    pub const MAX: Date = Date(109_573);

    /// Create a date from year, month (1–12), and day-of-month.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self> {
        if !(1900..=2199).contains(&year) {
            return Err(Error::InvalidParameter(format!(
                "year {year} out of range [1900, 2199]"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidParameter(format!(
                "month {month} out of range [1, 12]"
            )));
        }
        let days_in = days_in_month(year, month);
        if day == 0 || day > days_in {
            return Err(Error::InvalidParameter(format!(
                "day {day} out of range [1, {days_in}] for {year}-{month:02}"
            )));
        }
        Ok(Date(serial_from_ymd(year, month, day)))
    }

    /// Create a date from a serial number.
    pub fn from_serial(serial: i32) -> Result<Self> {
        if serial < Self::MIN.0 || serial > Self::MAX.0 {
            return Err(Error::InvalidParameter(format!(
                "date serial {serial} out of range"
            )));
        }
        Ok(Date(serial))
    }

    /// The serial number.
    pub fn serial(&self) -> i32 {
        self.0
    }

    /// The year (1900–2199).
    pub fn year(&self) -> u16 {
        ymd_from_serial(self.0).0
    }

    /// The month (1–12).
    pub fn month(&self) -> u8 {
        ymd_from_serial(self.0).1
    }

    /// The day of the month (1–31).
    pub fn day_of_month(&self) -> u8 {
        ymd_from_serial(self.0).2
    }

    /// The weekday.  Serial 1 (January 1, 1900) is a Monday.
    pub fn weekday(&self) -> Weekday {
        Weekday::from_ordinal(((self.0 - 1).rem_euclid(7) + 1) as u8)
    }

    /// Advance by `n` calendar days (may be negative).
    pub fn add_days(self, n: i32) -> Result<Self> {
        Date::from_serial(self.0 + n)
    }

    /// Advance by `n` calendar months, clamping the day-of-month to the
    /// target month's length (e.g. Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(self, n: i32) -> Result<Self> {
        let (y, m, d) = ymd_from_serial(self.0);
        let total = y as i32 * 12 + (m as i32 - 1) + n;
        let new_y = total.div_euclid(12);
        let new_m = (total.rem_euclid(12) + 1) as u8;
        if !(1900..=2199).contains(&new_y) {
            return Err(Error::InvalidParameter(format!(
                "year {new_y} out of range"
            )));
        }
        let new_y = new_y as u16;
        let new_d = d.min(days_in_month(new_y, new_m));
        Ok(Date(serial_from_ymd(new_y, new_m, new_d)))
    }

    /// Calendar days from `self` to `other` (positive if `other` is later).
    pub fn days_until(self, other: Date) -> i32 {
        other.0 - self.0
    }
}

impl std::ops::Add<i32> for Date {
    type Output = Self;
    fn add(self, rhs: i32) -> Self {
        Date(self.0 + rhs)
    }
}

impl std::ops::Sub<i32> for Date {
    type Output = Self;
    fn sub(self, rhs: i32) -> Self {
        Date(self.0 - rhs)
    }
}

impl std::ops::Sub<Date> for Date {
    type Output = i32;
    fn sub(self, rhs: Date) -> i32 {
        self.0 - rhs.0
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = ymd_from_serial(self.0);
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

impl std::fmt::Debug for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = ymd_from_serial(self.0);
        write!(f, "Date({y:04}-{m:02}-{d:02})")
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Whether a given year is a leap year (Gregorian rules).
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a given month/year.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn days_in_year(year: u16) -> i32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn serial_from_ymd(year: u16, month: u8, day: u8) -> i32 {
    let mut serial: i32 = 0;
    for y in 1900..year {
        serial += days_in_year(y);
    }
    for m in 1..month {
        serial += days_in_month(year, m) as i32;
    }
    serial + day as i32
}

fn ymd_from_serial(serial: i32) -> (u16, u8, u8) {
    let mut rem = serial;
    let mut year: u16 = 1900;
    while rem > days_in_year(year) {
        rem -= days_in_year(year);
        year += 1;
    }
    let mut month: u8 = 1;
    while rem > days_in_month(year, month) as i32 {
        rem -= days_in_month(year, month) as i32;
        month += 1;
    }
    (year, month, rem as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_round_trip() {
        for &(y, m, d) in &[
            (1900u16, 1u8, 1u8),
            (1999, 12, 31),
            (2000, 2, 29),
            (2014, 3, 7),
            (2199, 12, 31),
        ] {
            let date = Date::from_ymd(y, m, d).unwrap();
            assert_eq!((date.year(), date.month(), date.day_of_month()), (y, m, d));
        }
    }

    #[test]
    fn epoch_is_monday() {
        assert_eq!(Date::from_ymd(1900, 1, 1).unwrap().weekday(), Weekday::Monday);
        // 2014-03-07 was a Friday
        assert_eq!(Date::from_ymd(2014, 3, 7).unwrap().weekday(), Weekday::Friday);
    }

    #[test]
    fn day_arithmetic() {
        let d = Date::from_ymd(2014, 3, 7).unwrap();
        let later = d.add_days(366).unwrap();
        assert_eq!(later, Date::from_ymd(2015, 3, 8).unwrap());
        assert_eq!(d.days_until(later), 366);
        assert_eq!(later - d, 366);
    }

    #[test]
    fn month_arithmetic_clamps() {
        let d = Date::from_ymd(2014, 1, 31).unwrap();
        assert_eq!(d.add_months(1).unwrap(), Date::from_ymd(2014, 2, 28).unwrap());
        assert_eq!(d.add_months(13).unwrap(), Date::from_ymd(2015, 2, 28).unwrap());
        // 10.5-month style schedules step by whole months
        let eval = Date::from_ymd(2014, 3, 7).unwrap();
        assert_eq!(eval.add_months(10).unwrap(), Date::from_ymd(2015, 1, 7).unwrap());
    }

    #[test]
    fn invalid_dates_rejected() {
        assert!(Date::from_ymd(2014, 2, 30).is_err());
        assert!(Date::from_ymd(2014, 13, 1).is_err());
        assert!(Date::from_ymd(1899, 12, 31).is_err());
        assert!(Date::from_serial(0).is_err());
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2014));
    }

    proptest::proptest! {
        #[test]
        fn serial_ymd_roundtrip(serial in 1..=109_573i32) {
            let date = Date::from_serial(serial).unwrap();
            let back = Date::from_ymd(date.year(), date.month(), date.day_of_month()).unwrap();
            proptest::prop_assert_eq!(back.serial(), serial);
        }

        #[test]
        fn weekday_advances_by_one(serial in 1..109_573i32) {
            let today = Date::from_serial(serial).unwrap();
            let tomorrow = Date::from_serial(serial + 1).unwrap();
            let expected = (today.weekday() as i32 % 7) + 1;
            proptest::prop_assert_eq!(tomorrow.weekday() as i32, expected);
        }
    }
}
