// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! Absolute points in time.
//!
//! An [`Instant`] is a count of Unix seconds; the subsecond remainder is
//! carried separately as [`Femtoseconds`] and travels alongside the instant
//! through [`format`](crate::format()) and [`parse`](crate::parse()).

use core::fmt;

/// A point on the absolute timeline, as whole seconds since the Unix epoch.
///
/// The full `i64` range is representable; conversions that would leave it
/// saturate at [`Instant::MIN`]/[`Instant::MAX`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instant(i64);

impl Instant {
    /// The earliest representable instant.
    pub const MIN: Instant = Instant(i64::MIN);

    /// The latest representable instant.
    pub const MAX: Instant = Instant(i64::MAX);

    /// The Unix epoch, 1970-01-01T00:00:00Z.
    pub const UNIX_EPOCH: Instant = Instant(0);

    /// Makes an `Instant` from a count of Unix seconds.
    #[inline]
    pub const fn from_unix(seconds: i64) -> Instant {
        Instant(seconds)
    }

    /// The count of Unix seconds of this instant.
    #[inline]
    pub const fn to_unix(self) -> i64 {
        self.0
    }

    /// Saturating conversion from a wide second count, used when shifting
    /// civil times near the edges of the representable range.
    pub(crate) fn saturating_from(seconds: i128) -> Instant {
        if seconds > i128::from(i64::MAX) {
            Instant::MAX
        } else if seconds < i128::from(i64::MIN) {
            Instant::MIN
        } else {
            Instant(seconds as i64)
        }
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A subsecond remainder: a count of 10⁻¹⁵ seconds.
///
/// At the format/parse boundary the value is always in `[0, 10¹⁵)`, i.e.
/// less than one whole second.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Femtoseconds(i64);

impl Femtoseconds {
    /// No subseconds at all.
    pub const ZERO: Femtoseconds = Femtoseconds(0);

    /// The number of femtoseconds in one second.
    pub const PER_SECOND: i64 = 1_000_000_000_000_000;

    /// Makes a `Femtoseconds` from a raw count, or `None` when the count
    /// is a second or more (or negative).
    #[inline]
    pub fn new(count: i64) -> Option<Femtoseconds> {
        if (0..Femtoseconds::PER_SECOND).contains(&count) {
            Some(Femtoseconds(count))
        } else {
            None
        }
    }

    /// The raw femtosecond count.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Used by the parse engine, whose subsecond scanner can only produce
    /// in-range counts.
    #[inline]
    pub(crate) const fn from_scan(count: i64) -> Femtoseconds {
        Femtoseconds(count)
    }
}
