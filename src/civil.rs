// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! Civil (zone-free) calendar types and arithmetic.
//!
//! A [`CivilSecond`] is the tuple (year, month, day, hour, minute, second)
//! on the proleptic Gregorian calendar. Construction normalizes arbitrary
//! field values, and adding or subtracting seconds produces a normalized
//! result. The year is a full `i64`; arithmetic that would leave that range
//! saturates to the [`CivilSecond::MIN`]/[`CivilSecond::MAX`] sentinels.

use core::fmt;
use core::ops::{Add, Sub};

use num_integer::{div_floor, div_mod_floor, mod_floor};

const SECONDS_PER_DAY: i128 = 86_400;

/// The day of the week.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Weekday {
    /// Sunday.
    Sun = 0,
    /// Monday.
    Mon = 1,
    /// Tuesday.
    Tue = 2,
    /// Wednesday.
    Wed = 3,
    /// Thursday.
    Thu = 4,
    /// Friday.
    Fri = 5,
    /// Saturday.
    Sat = 6,
}

impl Weekday {
    /// Returns the day of the week numbered from Sunday, i.e. `Sun` is 0.
    #[inline]
    pub fn num_days_from_sunday(self) -> u32 {
        self as u32
    }

    fn from_days_from_sunday(n: u8) -> Weekday {
        match n {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }
}

/// A second on the civil calendar, without any time zone attached.
///
/// `CivilSecond` is totally ordered by its fields, supports addition and
/// subtraction of a number of seconds, and normalizes on construction:
///
/// ```
/// use femtime::CivilSecond;
///
/// // September 31 normalizes to October 1.
/// let cs = CivilSecond::new(2023, 9, 31, 12, 0, 0);
/// assert_eq!((cs.month(), cs.day()), (10, 1));
///
/// // A minute before the epoch.
/// let cs = CivilSecond::new(1970, 1, 1, 0, 0, -60);
/// assert_eq!(cs.to_string(), "1969-12-31T23:59:00");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CivilSecond {
    year: i64,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CivilSecond {
    /// The smallest representable civil second.
    pub const MIN: CivilSecond =
        CivilSecond { year: i64::MIN, month: 1, day: 1, hour: 0, minute: 0, second: 0 };

    /// The largest representable civil second.
    pub const MAX: CivilSecond =
        CivilSecond { year: i64::MAX, month: 12, day: 31, hour: 23, minute: 59, second: 59 };

    /// Makes a new `CivilSecond` from possibly denormalized fields.
    ///
    /// Fields carry into one another the way clock arithmetic does: seconds
    /// into minutes, minutes into hours, hours into days, months into
    /// years, and out-of-range days roll into the following month(s). A
    /// result whose year cannot be represented saturates to
    /// [`CivilSecond::MIN`] or [`CivilSecond::MAX`].
    pub fn new(year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64) -> CivilSecond {
        let (carry, second) = div_mod_floor(i128::from(second), 60);
        let (carry, minute) = div_mod_floor(i128::from(minute) + carry, 60);
        let (carry, hour) = div_mod_floor(i128::from(hour) + carry, 24);
        let (years, month0) = div_mod_floor(i128::from(month) - 1, 12);
        let year = i128::from(year) + years;
        let days = days_from_civil(year, month0 + 1, 1) + (i128::from(day) - 1) + carry;
        CivilSecond::from_parts(days, hour, minute, second)
    }

    /// The year.
    #[inline]
    pub fn year(&self) -> i64 {
        self.year
    }

    /// The month, 1--12.
    #[inline]
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The day of the month, 1--31.
    #[inline]
    pub fn day(&self) -> u8 {
        self.day
    }

    /// The hour, 0--23.
    #[inline]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// The minute, 0--59.
    #[inline]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The second, 0--59.
    #[inline]
    pub fn second(&self) -> u8 {
        self.second
    }

    /// The day of the week.
    pub fn weekday(&self) -> Weekday {
        let days = days_from_civil(i128::from(self.year), self.month.into(), self.day.into());
        // 1970-01-01 (day zero) was a Thursday.
        Weekday::from_days_from_sunday(mod_floor(days + 4, 7) as u8)
    }

    /// The day of the year, 1--366.
    pub fn yearday(&self) -> i32 {
        let days = days_from_civil(i128::from(self.year), self.month.into(), self.day.into());
        let jan1 = days_from_civil(i128::from(self.year), 1, 1);
        (days - jan1 + 1) as i32
    }

    /// Seconds since the Unix epoch on this calendar, ignoring any zone.
    ///
    /// Wide enough that no representable `CivilSecond` can overflow it.
    pub(crate) fn epoch_seconds(&self) -> i128 {
        let days = days_from_civil(i128::from(self.year), self.month.into(), self.day.into());
        days * SECONDS_PER_DAY
            + i128::from(self.hour) * 3600
            + i128::from(self.minute) * 60
            + i128::from(self.second)
    }

    /// The inverse of `epoch_seconds`, saturating on year overflow.
    pub(crate) fn from_epoch_seconds(seconds: i128) -> CivilSecond {
        let (days, rem) = div_mod_floor(seconds, SECONDS_PER_DAY);
        CivilSecond::from_parts(days, rem / 3600, (rem / 60) % 60, rem % 60)
    }

    /// Builds from a day count and in-range time-of-day fields.
    fn from_parts(days: i128, hour: i128, minute: i128, second: i128) -> CivilSecond {
        let (year, month, day) = civil_from_days(days);
        if year > i128::from(i64::MAX) {
            return CivilSecond::MAX;
        }
        if year < i128::from(i64::MIN) {
            return CivilSecond::MIN;
        }
        CivilSecond {
            year: year as i64,
            month: month as u8,
            day: day as u8,
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
        }
    }
}

impl Add<i64> for CivilSecond {
    type Output = CivilSecond;

    /// Adds a number of seconds, normalizing and saturating.
    fn add(self, seconds: i64) -> CivilSecond {
        CivilSecond::from_epoch_seconds(self.epoch_seconds() + i128::from(seconds))
    }
}

impl Sub<i64> for CivilSecond {
    type Output = CivilSecond;

    /// Subtracts a number of seconds, normalizing and saturating.
    fn sub(self, seconds: i64) -> CivilSecond {
        CivilSecond::from_epoch_seconds(self.epoch_seconds() - i128::from(seconds))
    }
}

impl fmt::Display for CivilSecond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Days since 1970-01-01 of the given civil date.
///
/// Fields other than the day of the month must already be normalized. The
/// computation is exact for every `i64` year, which is why it runs in
/// `i128`.
fn days_from_civil(year: i128, month: i128, day: i128) -> i128 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = div_floor(year, 400);
    let yoe = year - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// The inverse of `days_from_civil`.
fn civil_from_days(days: i128) -> (i128, i128, i128) {
    let z = days + 719_468;
    let era = div_floor(z, 146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    (if month <= 2 { year + 1 } else { year }, month, day)
}
