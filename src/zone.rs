// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! Fixed-offset time zones and their lookup primitives.
//!
//! A [`TimeZone`] translates in both directions between absolute instants
//! and civil times: [`TimeZone::lookup`] goes from an [`Instant`] to the
//! civil fields plus offset/abbreviation metadata, and
//! [`TimeZone::lookup_civil`] goes from a [`CivilSecond`] back to the
//! instant(s) that display as it. Only fixed offsets are supported, so the
//! civil direction is never ambiguous; the [`CivilLookup`] shape still
//! mirrors the general (DST-capable) interface so the engines stay
//! agnostic.

use core::fmt;

use crate::civil::CivilSecond;
use crate::format::formatting::offset_to_string;
use crate::instant::Instant;

/// A time zone with a fixed offset from UTC.
///
/// The offset is limited to less than one day in either direction, the
/// same range the `%z` specifier family can express.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeZone {
    offset: i32,
}

impl TimeZone {
    /// The UTC time zone.
    #[inline]
    pub const fn utc() -> TimeZone {
        TimeZone { offset: 0 }
    }

    /// Makes a time zone with the given offset in seconds east of UTC.
    ///
    /// Returns `None` when `seconds` is out of bounds (a day or more).
    pub fn fixed(seconds: i32) -> Option<TimeZone> {
        if -86_400 < seconds && seconds < 86_400 {
            Some(TimeZone { offset: seconds })
        } else {
            None
        }
    }

    /// The zone's offset in seconds east of UTC.
    #[inline]
    pub fn offset_seconds(&self) -> i32 {
        self.offset
    }

    /// Translates an instant into the civil time this zone displays for it.
    ///
    /// This is total: every instant has exactly one civil reading in a
    /// fixed-offset zone (saturated at the civil sentinels for instants
    /// whose shifted reading would leave the calendar).
    pub fn lookup(&self, tp: Instant) -> AbsoluteLookup {
        let cs = CivilSecond::from_epoch_seconds(
            i128::from(tp.to_unix()) + i128::from(self.offset),
        );
        AbsoluteLookup { cs, offset: self.offset, is_dst: false, abbr: self.abbreviation() }
    }

    /// Translates a civil time into the instant(s) it could denote.
    ///
    /// The `pre` instant saturates at [`Instant::MIN`]/[`Instant::MAX`]
    /// when the civil time lies outside the absolute range; callers use
    /// that pinning for overflow detection.
    pub fn lookup_civil(&self, cs: CivilSecond) -> CivilLookup {
        let pre = Instant::saturating_from(cs.epoch_seconds() - i128::from(self.offset));
        CivilLookup { kind: LookupKind::Unique, pre }
    }

    /// The zone abbreviation reported by [`TimeZone::lookup`].
    fn abbreviation(&self) -> String {
        if self.offset == 0 {
            "UTC".to_owned()
        } else {
            offset_to_string(self.offset, b":*:")
        }
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.abbreviation())
    }
}

/// The civil reading of an instant in some zone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AbsoluteLookup {
    /// The civil time the zone displays for the instant.
    pub cs: CivilSecond,
    /// The zone's offset in seconds east of UTC at that instant.
    pub offset: i32,
    /// Whether daylight saving is in effect (never, for fixed offsets).
    pub is_dst: bool,
    /// A short zone abbreviation, e.g. `"UTC"` or `"+09"`.
    pub abbr: String,
}

/// How a civil time maps onto the absolute timeline.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LookupKind {
    /// The civil time denotes exactly one instant.
    Unique,
    /// The civil time was skipped by a forward transition.
    Skipped,
    /// The civil time repeats across a backward transition.
    Repeated,
}

/// The absolute reading(s) of a civil time in some zone.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CivilLookup {
    /// How the civil time maps; always [`LookupKind::Unique`] for the
    /// fixed-offset zones this crate provides.
    pub kind: LookupKind,
    /// The earliest instant that displays as the requested civil time.
    pub pre: Instant,
}
