// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! `strftime`/`strptime`-style formatting and parsing of absolute instants.
//!
//! ## Specifiers
//!
//! The following specifiers are handled by the engines themselves and are
//! therefore immune to locale and to integer overflow at the extremes:
//!
//! Spec.    | Example       | Description
//! -------- | ------------- | -----------
//! `%Y`     | `2001`        | The full year as a signed decimal, unpadded.
//! `%m`     | `07`          | Month number (01--12), zero-padded to 2 digits.
//! `%d`     | `08`          | Day number (01--31), zero-padded to 2 digits.
//! `%e`     | ` 8`          | Same as `%d` but space-padded.
//! `%H`     | `00`          | Hour number (00--23), zero-padded to 2 digits.
//! `%M`     | `34`          | Minute number (00--59), zero-padded to 2 digits.
//! `%S`     | `60`          | Second number (00--60), zero-padded to 2 digits. [1]
//! `%z`     | `+0930`       | Offset from UTC. Parsing also accepts `Z`.
//! `%:z`    | `+09:30`      | Offset from UTC with a colon separator.
//! `%::z`   | `+09:30:00`   | Offset from UTC at full resolution.
//! `%:::z`  | `+09`         | Like `%::z` with zero minutes/seconds elided.
//! `%Ez`    | `+09:30`      | RFC 3339-compatible spelling of `%:z`.
//! `%E*z`   | `+09:30:00`   | Same as `%::z`.
//! `%Z`     | `UTC`         | Zone abbreviation. Parsed but ignored. [2]
//! `%s`     | `994518299`   | Unix timestamp in seconds, signed.
//! `%E*S`   | `59.026413`   | Seconds with full fractional precision. [3]
//! `%E#S`   | `59.026`      | Seconds with `#` digits of fractional precision.
//! `%E*f`   | `026413`      | Just the fractional digits; `0` when zero.
//! `%E#f`   | `026`         | Exactly `#` fractional digits.
//! `%E4Y`   | `2001`        | Four-character years (`-999` ... `9999`).
//! `%%`     | `%`           | A literal percent sign.
//!
//! Notes:
//!
//! 1. `%S` accounts for leap seconds, so `60` parses; the result
//!    normalizes forward to the following `:00`.
//! 2. Zone abbreviations are ambiguous, so `%Z` consumes a non-space run
//!    when parsing but contributes nothing to the result.
//! 3. Fractional precision reaches down to femtoseconds (15 digits);
//!    trailing zeros are trimmed, and the `.` disappears with them.
//!
//! Every other specifier (`%a`, `%B`, `%c`, `%p`, `%y`, and the rest of
//! the `strftime` menagerie) is delegated to a broken-down-time
//! collaborator; see the [`tm`] module. The shipped collaborator renders
//! the fixed C locale.
//!
//! Whitespace in a format being parsed matches any run of whitespace in
//! the input, including none at all. Any other character outside a
//! specifier must match the input literally.

use thiserror::Error;

pub(crate) mod formatting;
mod parse;
mod scan;
pub mod tm;

pub use self::formatting::{format, format_with};
pub use self::parse::{parse, parse_with};

/// The number of base-10 digits representable by a signed 64-bit integer,
/// i.e. `10^DIGITS10_64 <= i64::MAX < 10^(DIGITS10_64 + 1)`.
pub(crate) const DIGITS10_64: usize = 18;

/// `10^n` for everything that fits in a signed 64-bit integer.
pub(crate) const POW10: [i64; DIGITS10_64 + 1] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// An error from the [`parse`] function.
///
/// The `Display` form is one of a small set of fixed diagnostics; parsing
/// never reports anything more granular than these.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Error)]
pub enum ParseError {
    /// The input did not match the format: a literal mismatched, a field
    /// had the wrong shape or left its documented range, or one side ran
    /// out while the other still demanded data.
    #[error("Failed to parse input")]
    Failed,
    /// Everything matched, but input remained after the format (and any
    /// trailing whitespace) was exhausted.
    #[error("Illegal trailing data in input string")]
    TrailingData,
    /// The parsed fields do not denote a real, representable time: a day
    /// that normalizes into the next month, an offset shift past the civil
    /// range, or an instant outside the absolute range.
    #[error("Out-of-range field")]
    FieldOutOfRange,
    /// Widening a two-digit year overflowed the year range.
    #[error("Out-of-range year")]
    YearOutOfRange,
}

/// Same as `Result<T, ParseError>`.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::ParseError;

    #[test]
    fn test_diagnostic_strings() {
        assert_eq!(ParseError::Failed.to_string(), "Failed to parse input");
        assert_eq!(
            ParseError::TrailingData.to_string(),
            "Illegal trailing data in input string"
        );
        assert_eq!(ParseError::FieldOutOfRange.to_string(), "Out-of-range field");
        assert_eq!(ParseError::YearOutOfRange.to_string(), "Out-of-range year");
    }
}
