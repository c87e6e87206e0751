// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! # Femtime: zone-aware `strftime`/`strptime` with femtosecond precision
//!
//! Femtime converts between absolute instants (Unix seconds plus a
//! femtosecond fraction) and human-readable strings, under an extended
//! family of `strftime`/`strptime`-style format specifiers.
//!
//! The two entry points are [`format`] and [`parse`]. They are designed as a
//! matched pair: for any instant representable in the target zone, a format
//! containing `%E4Y-%m-%dT%H:%M:%S%Ez` (plus `%E*S` or `%E*f` when the
//! fraction matters) round-trips exactly.
//!
//! ```
//! use femtime::{format, parse, Femtoseconds, Instant, TimeZone};
//!
//! let tz = TimeZone::fixed(9 * 3600).unwrap();
//! let when = Instant::from_unix(1_482_710_400);
//! let text = format("%E4Y-%m-%dT%H:%M:%S%Ez", when, Femtoseconds::ZERO, &tz);
//! assert_eq!(text, "2016-12-26T09:00:00+09:00");
//!
//! let (back, fs) = parse("%E4Y-%m-%dT%H:%M:%S%Ez", &text, &tz)?;
//! assert_eq!(back, when);
//! assert_eq!(fs, Femtoseconds::ZERO);
//! # Ok::<(), femtime::ParseError>(())
//! ```
//!
//! ## Design
//!
//! Specifiers that are numerically critical — `%Y`, `%m`, `%d`, `%e`, `%H`,
//! `%M`, `%S`, the `%z` family, `%s`, `%E4Y`, and the fractional-second
//! extensions — are encoded and decoded internally, so their output can
//! never be perturbed by a locale and never overflows at the extremes of
//! the representable range. Everything else is delegated to a
//! broken-down-time collaborator (see [`format::tm`]); the shipped
//! [`CLocale`](format::tm::CLocale) collaborator renders the fixed C
//! locale and reads no process-wide state.
//!
//! Time zones are fixed offsets from UTC ([`TimeZone::utc`] and
//! [`TimeZone::fixed`]). Reading zoneinfo and resolving DST rules are out
//! of scope for this crate.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod logging;

pub mod civil;
pub mod format;
pub mod instant;
pub mod zone;

pub use crate::civil::{CivilSecond, Weekday};
pub use crate::format::{format, parse, ParseError, ParseResult};
pub use crate::instant::{Femtoseconds, Instant};
pub use crate::zone::{AbsoluteLookup, CivilLookup, LookupKind, TimeZone};
