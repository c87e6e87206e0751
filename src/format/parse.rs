// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! The parse engine: a lockstep walk of format and input, followed by
//! normalization of the collected fields into an absolute instant.

use crate::civil::CivilSecond;
use crate::format::scan;
use crate::format::tm::{CLocale, Tm, TmParse};
use crate::format::{ParseError, ParseResult};
use crate::instant::{Femtoseconds, Instant};
use crate::zone::TimeZone;

/// Parses `input` according to `format`, as civil time displayed in `tz`,
/// into an instant and its subsecond remainder.
///
/// See the [module documentation](crate::format) for the supported
/// specifiers. The whole input must be consumed (trailing whitespace
/// excepted). Fields absent from the format default to
/// 1970-01-01 00:00:00.
///
/// An offset specifier (`%z` and friends) switches interpretation to UTC
/// plus that offset, ignoring `tz`; `%s` overrides everything else.
///
/// # Example
///
/// ```
/// use femtime::{parse, Instant, TimeZone};
///
/// let utc = TimeZone::utc();
/// let (when, fs) = parse("%Y-%m-%dT%H:%M:%S", "2016-12-26T00:00:00", &utc)?;
/// assert_eq!(when, Instant::from_unix(1_482_710_400));
/// assert_eq!(fs.get(), 0);
/// # Ok::<(), femtime::ParseError>(())
/// ```
pub fn parse(format: &str, input: &str, tz: &TimeZone) -> ParseResult<(Instant, Femtoseconds)> {
    parse_with(format, input, tz, &CLocale)
}

/// Like [`parse`], but with a caller-supplied broken-down-time
/// collaborator instead of the C-locale one.
pub fn parse_with(
    format: &str,
    input: &str,
    tz: &TimeZone,
    tm_parse: &dyn TmParse,
) -> ParseResult<(Instant, Femtoseconds)> {
    let fb = format.as_bytes();
    let ib = input.as_bytes();
    let mut fi = 0usize;
    let mut ii = ib.len() - scan::skip_spaces(ib).len();

    // Defaults for unspecified fields.
    let mut saw_year = false;
    let mut year: i64 = 1970;
    let mut tm =
        Tm { sec: 0, min: 0, hour: 0, mday: 1, mon: 0, year: 70, wday: 4, yday: 0, isdst: 0 };
    let mut subseconds: i64 = 0;
    let mut saw_offset = false;
    let mut offset: i32 = 0; // no offset from the passed tz

    let mut twelve_hour = false;
    let mut afternoon = false;

    let mut saw_percent_s = false;
    let mut percent_s: i64 = 0;

    // Steps through the format, one specifier at a time.
    'walk: while ii != ib.len() && fi != fb.len() {
        if fb[fi].is_ascii_whitespace() {
            while fi != fb.len() && fb[fi].is_ascii_whitespace() {
                fi += 1;
            }
            ii += ib[ii..].len() - scan::skip_spaces(&ib[ii..]).len();
            continue;
        }

        if fb[fi] != b'%' {
            if fb[fi] != ib[ii] {
                return Err(ParseError::Failed);
            }
            fi += 1;
            ii += 1;
            continue;
        }
        fi += 1;

        if fi == fb.len() {
            return Err(ParseError::Failed);
        }

        let percent = fi - 1;
        let spec = fb[fi];
        fi += 1;
        match spec {
            b'Y' => {
                // Symmetrically with format(), handling %Y here avoids the
                // Tm year window. The windowed year is still used by other
                // specifiers like %D.
                year = scan_signed(ib, &mut ii, 0, i64::MIN, i64::MAX)?;
                saw_year = true;
                continue;
            }
            b'm' => {
                tm.mon = scan_signed(ib, &mut ii, 2, 1, 12)? as i32 - 1;
                continue;
            }
            b'd' | b'e' => {
                tm.mday = scan_signed(ib, &mut ii, 2, 1, 31)? as i32;
                continue;
            }
            b'H' => {
                tm.hour = scan_signed(ib, &mut ii, 2, 0, 23)? as i32;
                twelve_hour = false;
                continue;
            }
            b'M' => {
                tm.min = scan_signed(ib, &mut ii, 2, 0, 59)? as i32;
                continue;
            }
            b'S' => {
                tm.sec = scan_signed(ib, &mut ii, 2, 0, 60)? as i32;
                continue;
            }
            b'I' | b'l' | b'r' => {
                // probably uses %I
                twelve_hour = true;
            }
            b'R' | b'T' | b'c' | b'X' => {
                // probably uses %H
                twelve_hour = false;
            }
            b'z' => {
                offset = scan_offset(ib, &mut ii, b"")?;
                saw_offset = true;
                continue;
            }
            b'Z' => {
                // zone abbreviations are ambiguous; consumed and ignored
                let rest = scan::zone_name(&ib[ii..]).ok_or(ParseError::Failed)?;
                ii = ib.len() - rest.len();
                continue;
            }
            b's' => {
                percent_s = scan_signed(ib, &mut ii, 0, i64::MIN, i64::MAX)?;
                saw_percent_s = true;
                continue;
            }
            b':' => {
                // %:z, %::z, and %:::z all accept the same input shapes
                let tail = if fb[fi..].starts_with(b"z") {
                    1
                } else if fb[fi..].starts_with(b":z") {
                    2
                } else if fb[fi..].starts_with(b"::z") {
                    3
                } else {
                    0
                };
                if tail != 0 {
                    fi += tail;
                    offset = scan_offset(ib, &mut ii, b":")?;
                    saw_offset = true;
                    continue;
                }
            }
            b'%' => {
                if ib.get(ii) != Some(&b'%') {
                    return Err(ParseError::Failed);
                }
                ii += 1;
                continue;
            }
            b'E' => {
                if fb[fi..].starts_with(b"z") {
                    fi += 1;
                    offset = scan_offset(ib, &mut ii, b":")?;
                    saw_offset = true;
                    continue;
                }
                if fb[fi..].starts_with(b"*z") {
                    fi += 2;
                    offset = scan_offset(ib, &mut ii, b":")?;
                    saw_offset = true;
                    continue;
                }
                if fb[fi..].starts_with(b"*S") {
                    fi += 2;
                    scan_seconds_and_fraction(ib, &mut ii, &mut tm.sec, &mut subseconds)?;
                    continue;
                }
                if fb[fi..].starts_with(b"*f") {
                    fi += 2;
                    scan_optional_fraction(ib, &mut ii, &mut subseconds)?;
                    continue;
                }
                if fb[fi..].starts_with(b"4Y") {
                    fi += 2;
                    let before = ii;
                    year = scan_signed(ib, &mut ii, 4, -999, 9999)?;
                    if ii - before != 4 {
                        // stopped too soon
                        return Err(ParseError::Failed);
                    }
                    saw_year = true;
                    continue;
                }
                if fi != fb.len() && fb[fi].is_ascii_digit() {
                    if let Some((rest, _)) = scan::signed(&fb[fi..], 0, 0, 1024) {
                        let np = fb.len() - rest.len();
                        if np != fb.len() {
                            if fb[np] == b'S' {
                                scan_seconds_and_fraction(
                                    ib,
                                    &mut ii,
                                    &mut tm.sec,
                                    &mut subseconds,
                                )?;
                                fi = np + 1;
                                continue;
                            }
                            if fb[np] == b'f' {
                                scan_optional_fraction(ib, &mut ii, &mut subseconds)?;
                                fi = np + 1;
                                continue;
                            }
                        }
                    }
                }
                if fi != fb.len() && fb[fi] == b'c' {
                    twelve_hour = false; // probably uses %H
                }
                if fi != fb.len() && fb[fi] == b'X' {
                    twelve_hour = false; // probably uses %H
                }
                if fi != fb.len() {
                    fi += 1;
                }
            }
            b'O' => {
                if fi != fb.len() && fb[fi] == b'H' {
                    twelve_hour = false;
                }
                if fi != fb.len() && fb[fi] == b'I' {
                    twelve_hour = true;
                }
                if fi != fb.len() {
                    fi += 1;
                }
            }
            _ => {}
        }

        // Delegates the current specifier to the collaborator.
        let spec = &format[percent..fi];
        let remaining =
            core::str::from_utf8(&ib[ii..]).map_err(|_| ParseError::Failed)?;
        let consumed = match tm_parse.parse(remaining, spec, &mut tm) {
            Some(consumed) => consumed,
            None => {
                trace!("delegated specifier {:?} did not match", spec);
                return Err(ParseError::Failed);
            }
        };
        let orig_ii = ii;
        ii += consumed;

        // A successfully delegated %p leaves no trace of whether the hour
        // was shifted. Reparse the consumed bytes with a known AM hour and
        // see whether it comes out as 13.
        if spec == "%p" {
            let mut probe = String::from("1");
            probe.push_str(&input[orig_ii..ii]);
            let mut tmp = Tm::default();
            let _ = tm_parse.parse(&probe, "%I%p", &mut tmp);
            afternoon = tmp.hour == 13;
        }
    }

    // Adjust a 12-hour value if it should be in the afternoon.
    if twelve_hour && afternoon && tm.hour < 12 {
        tm.hour += 12;
    }

    ii = ib.len() - scan::skip_spaces(&ib[ii..]).len();

    // The entire input must be consumed.
    if ii != ib.len() {
        return Err(ParseError::TrailingData);
    }

    // %s overrides everything else.
    if saw_percent_s {
        return Ok((Instant::from_unix(percent_s), Femtoseconds::ZERO));
    }

    // An explicit offset means the fields are interpreted in UTC and then
    // shifted; otherwise they are interpreted directly in the passed zone.
    let ptz = if saw_offset { TimeZone::utc() } else { *tz };

    // A leap second of 60 normalizes forward to the following ":00".
    if tm.sec == 60 {
        tm.sec -= 1;
        offset -= 1;
        subseconds = 0;
    }

    if !saw_year {
        year = i64::from(tm.year);
        if year > i64::MAX - 1900 {
            return Err(ParseError::YearOutOfRange);
        }
        year += 1900;
    }

    let month = tm.mon + 1;
    let cs = CivilSecond::new(
        year,
        month.into(),
        tm.mday.into(),
        tm.hour.into(),
        tm.min.into(),
        tm.sec.into(),
    );

    // Normalization is not allowed here. Given the restricted field ranges
    // above, the only possibility is days rolling into months; parsing
    // "Sep 31" must not produce "Oct 1".
    if i64::from(cs.month()) != i64::from(month) || i64::from(cs.day()) != i64::from(tm.mday) {
        return Err(ParseError::FieldOutOfRange);
    }

    // Accounts for the offset adjustment before converting to an instant.
    let off = i64::from(offset);
    if (off < 0 && cs > CivilSecond::MAX + off) || (off > 0 && cs < CivilSecond::MIN + off) {
        return Err(ParseError::FieldOutOfRange);
    }
    let cs = cs - off;

    let tp = ptz.lookup_civil(cs).pre;
    // A lookup pinned to a sentinel is only valid when the civil time
    // really was at or past the zone's extreme civil time.
    if tp == Instant::MAX {
        let al = ptz.lookup(Instant::MAX);
        if cs > al.cs {
            return Err(ParseError::FieldOutOfRange);
        }
    }
    if tp == Instant::MIN {
        let al = ptz.lookup(Instant::MIN);
        if cs < al.cs {
            return Err(ParseError::FieldOutOfRange);
        }
    }

    Ok((tp, Femtoseconds::from_scan(subseconds)))
}

/// Scans a signed integer at the cursor, advancing it on success.
fn scan_signed(
    ib: &[u8],
    ii: &mut usize,
    width: usize,
    min: i64,
    max: i64,
) -> ParseResult<i64> {
    let (rest, v) =
        scan::signed(&ib[*ii..], width, min, max).ok_or(ParseError::Failed)?;
    *ii = ib.len() - rest.len();
    Ok(v)
}

/// Scans a UTC offset at the cursor, advancing it on success.
fn scan_offset(ib: &[u8], ii: &mut usize, mode: &[u8]) -> ParseResult<i32> {
    let (rest, v) = scan::offset(&ib[*ii..], mode).ok_or(ParseError::Failed)?;
    *ii = ib.len() - rest.len();
    Ok(v)
}

/// Scans two seconds digits, then an optional `.`-prefixed subsecond run.
fn scan_seconds_and_fraction(
    ib: &[u8],
    ii: &mut usize,
    sec: &mut i32,
    subseconds: &mut i64,
) -> ParseResult<()> {
    *sec = scan_signed(ib, ii, 2, 0, 60)? as i32;
    if ib.get(*ii) == Some(&b'.') {
        *ii += 1;
        let (rest, fs) = scan::subseconds(&ib[*ii..]).ok_or(ParseError::Failed)?;
        *ii = ib.len() - rest.len();
        *subseconds = fs;
    }
    Ok(())
}

/// Scans a subsecond run iff the next input byte is a digit.
fn scan_optional_fraction(ib: &[u8], ii: &mut usize, subseconds: &mut i64) -> ParseResult<()> {
    if ib.get(*ii).map_or(false, |b| b.is_ascii_digit()) {
        let (rest, fs) = scan::subseconds(&ib[*ii..]).ok_or(ParseError::Failed)?;
        *ii = ib.len() - rest.len();
        *subseconds = fs;
    }
    Ok(())
}
