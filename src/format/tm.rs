// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! Broken-down time and the formatter/parser collaborator built on it.
//!
//! Specifiers the engines do not handle internally are routed through a
//! pair of narrow traits, [`TmFormat`] and [`TmParse`], operating on the
//! conventional struct-of-fields [`Tm`]. The shipped [`CLocale`]
//! collaborator implements both for the fixed C locale, so nothing in this
//! crate ever consults the process locale or the `TZ` environment
//! variable. Callers with other locale needs can supply their own
//! implementations to [`format_with`](crate::format::format_with) and
//! [`parse_with`](crate::format::parse_with).

use core::fmt::Write;

use num_integer::{div_floor, mod_floor};

use crate::zone::AbsoluteLookup;

/// Broken-down time, laid out the way platform date routines expect it.
///
/// The quirks are intentional and match the convention: `mon` and `yday`
/// are 0-indexed, `year` is offset by 1900 (and saturated into `i32` when
/// populated from a wider year), and `wday` counts from Sunday.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Tm {
    /// Seconds, 0--60 (a leap second is representable).
    pub sec: i32,
    /// Minutes, 0--59.
    pub min: i32,
    /// Hours, 0--23.
    pub hour: i32,
    /// Day of the month, 1--31.
    pub mday: i32,
    /// Month since January, 0--11.
    pub mon: i32,
    /// Years since 1900.
    pub year: i32,
    /// Days since Sunday, 0--6.
    pub wday: i32,
    /// Days since January 1, 0--365.
    pub yday: i32,
    /// Whether daylight saving is in effect, 0 or 1.
    pub isdst: i32,
}

impl Tm {
    /// Populates a `Tm` from an absolute lookup, saturating the year into
    /// the `i32` window.
    pub(crate) fn from_lookup(al: &AbsoluteLookup) -> Tm {
        let cs = al.cs;
        let year = if cs.year() < i64::from(i32::MIN) + 1900 {
            i32::MIN
        } else if cs.year() - 1900 > i64::from(i32::MAX) {
            i32::MAX
        } else {
            (cs.year() - 1900) as i32
        };
        Tm {
            sec: cs.second().into(),
            min: cs.minute().into(),
            hour: cs.hour().into(),
            mday: cs.day().into(),
            mon: i32::from(cs.month()) - 1,
            year,
            wday: cs.weekday().num_days_from_sunday() as i32,
            yday: cs.yearday() - 1,
            isdst: i32::from(al.is_dst),
        }
    }

    /// The full year, undoing the 1900 offset.
    fn full_year(&self) -> i64 {
        i64::from(self.year) + 1900
    }

    /// The hour on the 12-hour clock.
    fn hour12(&self) -> i32 {
        let h = self.hour % 12;
        if h == 0 {
            12
        } else {
            h
        }
    }
}

/// The formatting half of the broken-down-time collaborator.
pub trait TmFormat {
    /// Formats `fmt` for `tm` into `buf` and returns the number of bytes
    /// produced.
    ///
    /// A return of 0 signals that the buffer was too small (or the
    /// sub-format is unsupported); the caller retries with a larger
    /// buffer and eventually drops the fragment.
    fn format(&self, fmt: &str, tm: &Tm, buf: &mut [u8]) -> usize;
}

/// The parsing half of the broken-down-time collaborator.
pub trait TmParse {
    /// Parses a prefix of `input` according to `fmt` (a single-specifier
    /// format assembled by the engine), updating `tm` in place.
    ///
    /// Returns the number of input bytes consumed, or `None` when the
    /// input does not match.
    fn parse(&self, input: &str, fmt: &str, tm: &mut Tm) -> Option<usize>;
}

/// The built-in collaborator: renders and scans the fixed C locale.
#[derive(Copy, Clone, Default, Debug)]
pub struct CLocale;

impl TmFormat for CLocale {
    fn format(&self, fmt: &str, tm: &Tm, buf: &mut [u8]) -> usize {
        let mut out = String::new();
        if !render(fmt, tm, &mut out) {
            trace!("unsupported sub-format {:?}", fmt);
            return 0;
        }
        if out.is_empty() || out.len() > buf.len() {
            return 0;
        }
        buf[..out.len()].copy_from_slice(out.as_bytes());
        out.len()
    }
}

impl TmParse for CLocale {
    fn parse(&self, input: &str, fmt: &str, tm: &mut Tm) -> Option<usize> {
        scan(fmt, input.as_bytes(), tm)
    }
}

static SHORT_MONTHS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
static LONG_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
static SHORT_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
static LONG_WEEKDAYS: [&str; 7] =
    ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

// lowercased long names, minus their first three letters
static LONG_MONTH_SUFFIXES: [&str; 12] =
    ["uary", "ruary", "ch", "il", "", "e", "y", "ust", "tember", "ober", "ember", "ember"];
static LONG_WEEKDAY_SUFFIXES: [&str; 7] =
    ["day", "day", "sday", "nesday", "rsday", "day", "urday"];

/// Renders `fmt` in the C locale. Returns false on an unsupported
/// directive, in which case the output must be discarded.
fn render(fmt: &str, tm: &Tm, out: &mut String) -> bool {
    let f = fmt.as_bytes();
    let mut i = 0;
    while i < f.len() {
        if f[i] != b'%' {
            let start = i;
            while i < f.len() && f[i] != b'%' {
                i += 1;
            }
            out.push_str(&fmt[start..i]);
            continue;
        }
        i += 1;
        if i == f.len() {
            return false;
        }
        let mut spec = f[i];
        // the C locale has no alternative representations
        if (spec == b'E' || spec == b'O') && i + 1 < f.len() {
            i += 1;
            spec = f[i];
        }
        i += 1;
        let ok = match spec {
            b'a' => push_name(out, &SHORT_WEEKDAYS, tm.wday),
            b'A' => push_name(out, &LONG_WEEKDAYS, tm.wday),
            b'b' | b'h' => push_name(out, &SHORT_MONTHS, tm.mon),
            b'B' => push_name(out, &LONG_MONTHS, tm.mon),
            b'c' => render("%a %b %e %H:%M:%S %Y", tm, out),
            b'C' => {
                let _ = write!(out, "{:02}", div_floor(tm.full_year(), 100));
                true
            }
            b'd' => {
                let _ = write!(out, "{:02}", tm.mday);
                true
            }
            b'D' | b'x' => render("%m/%d/%y", tm, out),
            b'e' => {
                let _ = write!(out, "{:2}", tm.mday);
                true
            }
            b'F' => render("%Y-%m-%d", tm, out),
            b'H' => {
                let _ = write!(out, "{:02}", tm.hour);
                true
            }
            b'I' => {
                let _ = write!(out, "{:02}", tm.hour12());
                true
            }
            b'j' => {
                let _ = write!(out, "{:03}", tm.yday + 1);
                true
            }
            b'k' => {
                let _ = write!(out, "{:2}", tm.hour);
                true
            }
            b'l' => {
                let _ = write!(out, "{:2}", tm.hour12());
                true
            }
            b'm' => {
                let _ = write!(out, "{:02}", tm.mon + 1);
                true
            }
            b'M' => {
                let _ = write!(out, "{:02}", tm.min);
                true
            }
            b'n' => {
                out.push('\n');
                true
            }
            b'p' => {
                out.push_str(if tm.hour < 12 { "AM" } else { "PM" });
                true
            }
            b'r' => render("%I:%M:%S %p", tm, out),
            b'R' => render("%H:%M", tm, out),
            b'S' => {
                let _ = write!(out, "{:02}", tm.sec);
                true
            }
            b't' => {
                out.push('\t');
                true
            }
            b'T' | b'X' => render("%H:%M:%S", tm, out),
            b'u' => {
                let _ = write!(out, "{}", if tm.wday == 0 { 7 } else { tm.wday });
                true
            }
            b'U' => {
                let _ = write!(out, "{:02}", (tm.yday + 7 - tm.wday) / 7);
                true
            }
            b'w' => {
                let _ = write!(out, "{}", tm.wday);
                true
            }
            b'W' => {
                let _ = write!(out, "{:02}", (tm.yday + 7 - (tm.wday + 6) % 7) / 7);
                true
            }
            b'y' => {
                let _ = write!(out, "{:02}", mod_floor(tm.full_year(), 100));
                true
            }
            b'Y' => {
                let _ = write!(out, "{}", tm.full_year());
                true
            }
            b'%' => {
                out.push('%');
                true
            }
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    true
}

/// Indexes a name table, refusing out-of-range (garbage) field values.
fn push_name(out: &mut String, table: &[&str], index: i32) -> bool {
    match usize::try_from(index).ok().and_then(|i| table.get(i)) {
        Some(name) => {
            out.push_str(name);
            true
        }
        None => false,
    }
}

/// Scans `input` under `fmt` with `strptime(3)` conventions, returning
/// the number of bytes consumed.
fn scan(fmt: &str, input: &[u8], tm: &mut Tm) -> Option<usize> {
    let f = fmt.as_bytes();
    let mut fi = 0;
    let mut s = input;
    while fi < f.len() {
        let c = f[fi];
        if c == b'%' {
            fi += 1;
            if fi == f.len() {
                return None;
            }
            let mut spec = f[fi];
            if (spec == b'E' || spec == b'O') && fi + 1 < f.len() {
                fi += 1;
                spec = f[fi];
            }
            fi += 1;
            s = directive(spec, s, tm)?;
            continue;
        }
        if c.is_ascii_whitespace() {
            fi += 1;
            s = skip_ws(s);
            continue;
        }
        if s.first() != Some(&c) {
            return None;
        }
        s = &s[1..];
        fi += 1;
    }
    Some(input.len() - s.len())
}

fn directive<'a>(spec: u8, s: &'a [u8], tm: &mut Tm) -> Option<&'a [u8]> {
    match spec {
        b'a' | b'A' => {
            let (s, wday) = weekday_name(skip_ws(s))?;
            tm.wday = wday;
            Some(s)
        }
        b'b' | b'B' | b'h' => {
            let (s, mon) = month_name(skip_ws(s))?;
            tm.mon = mon;
            Some(s)
        }
        b'c' => recurse("%a %b %e %H:%M:%S %Y", s, tm),
        b'C' => {
            let (s, v) = num(s, 2, 0, 99)?;
            tm.year = v * 100 - 1900;
            Some(s)
        }
        b'd' | b'e' => {
            let (s, v) = num(s, 2, 1, 31)?;
            tm.mday = v;
            Some(s)
        }
        b'D' | b'x' => recurse("%m/%d/%y", s, tm),
        b'F' => recurse("%Y-%m-%d", s, tm),
        b'H' | b'k' => {
            let (s, v) = num(s, 2, 0, 23)?;
            tm.hour = v;
            Some(s)
        }
        b'I' | b'l' => {
            let (s, v) = num(s, 2, 1, 12)?;
            tm.hour = v;
            Some(s)
        }
        b'j' => {
            let (s, v) = num(s, 3, 1, 366)?;
            tm.yday = v - 1;
            Some(s)
        }
        b'm' => {
            let (s, v) = num(s, 2, 1, 12)?;
            tm.mon = v - 1;
            Some(s)
        }
        b'M' => {
            let (s, v) = num(s, 2, 0, 59)?;
            tm.min = v;
            Some(s)
        }
        b'n' | b't' => Some(skip_ws(s)),
        b'p' => {
            let s = skip_ws(s);
            if s.len() < 2 {
                return None;
            }
            let pm = match [s[0] | 32, s[1] | 32] {
                [b'a', b'm'] => false,
                [b'p', b'm'] => true,
                _ => return None,
            };
            // apply immediately; a 12-hour value may already be in place
            if pm {
                if (1..=11).contains(&tm.hour) {
                    tm.hour += 12;
                }
            } else if tm.hour == 12 {
                tm.hour = 0;
            }
            Some(&s[2..])
        }
        b'r' => recurse("%I:%M:%S %p", s, tm),
        b'R' => recurse("%H:%M", s, tm),
        b'S' => {
            let (s, v) = num(s, 2, 0, 60)?;
            tm.sec = v;
            Some(s)
        }
        b'T' | b'X' => recurse("%H:%M:%S", s, tm),
        b'u' => {
            let (s, v) = num(s, 1, 1, 7)?;
            tm.wday = v % 7;
            Some(s)
        }
        b'U' | b'W' => {
            // week numbers cannot be represented in a Tm; consume and drop
            let (s, _) = num(s, 2, 0, 53)?;
            Some(s)
        }
        b'w' => {
            let (s, v) = num(s, 1, 0, 6)?;
            tm.wday = v;
            Some(s)
        }
        b'y' => {
            let (s, v) = num(s, 2, 0, 99)?;
            // POSIX pivot: 69-99 map to 1969-1999, 00-68 to 2000-2068
            tm.year = if v >= 69 { v } else { v + 100 };
            Some(s)
        }
        b'Y' => {
            let (s, v) = num(s, 4, 0, 9999)?;
            tm.year = v - 1900;
            Some(s)
        }
        b'%' => {
            if s.first() == Some(&b'%') {
                Some(&s[1..])
            } else {
                None
            }
        }
        _ => None,
    }
}

fn recurse<'a>(fmt: &str, s: &'a [u8], tm: &mut Tm) -> Option<&'a [u8]> {
    let consumed = scan(fmt, s, tm)?;
    Some(&s[consumed..])
}

fn skip_ws(mut s: &[u8]) -> &[u8] {
    while let Some((&c, rest)) = s.split_first() {
        if !c.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    s
}

/// Scans 1 to `max_digits` digits into `[min, max]`, skipping leading
/// whitespace the way `strptime(3)` does.
fn num(s: &[u8], max_digits: usize, min: i32, max: i32) -> Option<(&[u8], i32)> {
    let s = skip_ws(s);
    let mut value: i32 = 0;
    let mut i = 0;
    while i < s.len() && i < max_digits {
        let d = s[i].wrapping_sub(b'0');
        if d >= 10 {
            break;
        }
        value = value * 10 + i32::from(d);
        i += 1;
    }
    if i == 0 {
        return None;
    }
    if !(min..=max).contains(&value) {
        return None;
    }
    Some((&s[i..], value))
}

fn eq_ascii_nocase(s: &[u8], lower: &[u8]) -> bool {
    s.len() == lower.len() && s.iter().zip(lower).all(|(&a, &b)| (a | 32) == b)
}

/// Matches a weekday name, short or long, preferring the long form.
fn weekday_name(s: &[u8]) -> Option<(&[u8], i32)> {
    if s.len() < 3 {
        return None;
    }
    let wday: i32 = match &[s[0] | 32, s[1] | 32, s[2] | 32] {
        b"sun" => 0,
        b"mon" => 1,
        b"tue" => 2,
        b"wed" => 3,
        b"thu" => 4,
        b"fri" => 5,
        b"sat" => 6,
        _ => return None,
    };
    let mut s = &s[3..];
    let suffix = LONG_WEEKDAY_SUFFIXES[wday as usize].as_bytes();
    if s.len() >= suffix.len() && eq_ascii_nocase(&s[..suffix.len()], suffix) {
        s = &s[suffix.len()..];
    }
    Some((s, wday))
}

/// Matches a month name, short or long, preferring the long form.
fn month_name(s: &[u8]) -> Option<(&[u8], i32)> {
    if s.len() < 3 {
        return None;
    }
    let mon: i32 = match &[s[0] | 32, s[1] | 32, s[2] | 32] {
        b"jan" => 0,
        b"feb" => 1,
        b"mar" => 2,
        b"apr" => 3,
        b"may" => 4,
        b"jun" => 5,
        b"jul" => 6,
        b"aug" => 7,
        b"sep" => 8,
        b"oct" => 9,
        b"nov" => 10,
        b"dec" => 11,
        _ => return None,
    };
    let mut s = &s[3..];
    let suffix = LONG_MONTH_SUFFIXES[mon as usize].as_bytes();
    if !suffix.is_empty() && s.len() >= suffix.len() && eq_ascii_nocase(&s[..suffix.len()], suffix)
    {
        s = &s[suffix.len()..];
    }
    Some((s, mon))
}

#[cfg(test)]
mod tests {
    use super::{render, scan, CLocale, Tm, TmFormat};
    use crate::instant::Instant;
    use crate::zone::TimeZone;

    fn sample() -> Tm {
        // 2024-07-15T13:04:05, a Monday, day 197 of a leap year
        Tm { sec: 5, min: 4, hour: 13, mday: 15, mon: 6, year: 124, wday: 1, yday: 196, isdst: 0 }
    }

    fn rendered(fmt: &str, tm: &Tm) -> Option<String> {
        let mut out = String::new();
        render(fmt, tm, &mut out).then_some(out)
    }

    #[test]
    fn test_from_lookup() {
        let al = TimeZone::utc().lookup(Instant::UNIX_EPOCH);
        let tm = Tm::from_lookup(&al);
        assert_eq!(
            tm,
            Tm { sec: 0, min: 0, hour: 0, mday: 1, mon: 0, year: 70, wday: 4, yday: 0, isdst: 0 }
        );
    }

    #[test]
    fn test_from_lookup_saturates_year() {
        let utc = TimeZone::utc();
        let al = utc.lookup(Instant::MAX);
        assert_eq!(Tm::from_lookup(&al).year, i32::MAX);
        let al = utc.lookup(Instant::MIN);
        assert_eq!(Tm::from_lookup(&al).year, i32::MIN);
    }

    #[test]
    fn test_render_names() {
        let tm = sample();
        assert_eq!(rendered("%a %A", &tm).unwrap(), "Mon Monday");
        assert_eq!(rendered("%b %B %h", &tm).unwrap(), "Jul July Jul");
        assert_eq!(rendered("%p", &tm).unwrap(), "PM");
    }

    #[test]
    fn test_render_numbers() {
        let tm = sample();
        assert_eq!(rendered("%C %y %Y", &tm).unwrap(), "20 24 2024");
        assert_eq!(rendered("%d %e %j", &tm).unwrap(), "15 15 197");
        assert_eq!(rendered("%H %I %k %l", &tm).unwrap(), "13 01 13  1");
        assert_eq!(rendered("%u %w", &tm).unwrap(), "1 1");
        assert_eq!(rendered("%U %W", &tm).unwrap(), "28 29");
    }

    #[test]
    fn test_render_composites() {
        let tm = sample();
        assert_eq!(rendered("%c", &tm).unwrap(), "Mon Jul 15 13:04:05 2024");
        assert_eq!(rendered("%D", &tm).unwrap(), "07/15/24");
        assert_eq!(rendered("%F", &tm).unwrap(), "2024-07-15");
        assert_eq!(rendered("%r", &tm).unwrap(), "01:04:05 PM");
        assert_eq!(rendered("%R %T", &tm).unwrap(), "13:04 13:04:05");
    }

    #[test]
    fn test_render_modifier_prefixes_fall_back() {
        let tm = sample();
        assert_eq!(rendered("%EY", &tm).unwrap(), "2024");
        assert_eq!(rendered("%OH", &tm).unwrap(), "13");
    }

    #[test]
    fn test_render_unknown_fails() {
        let tm = sample();
        assert_eq!(rendered("%Q", &tm), None);
        assert_eq!(rendered("ok %Q", &tm), None);
        assert_eq!(rendered("%", &tm), None);
    }

    #[test]
    fn test_render_rejects_garbage_name_index() {
        let mut tm = sample();
        tm.wday = 9;
        assert_eq!(rendered("%a", &tm), None);
        tm.wday = -1;
        assert_eq!(rendered("%a", &tm), None);
    }

    #[test]
    fn test_format_trait_buffer_contract() {
        let tm = sample();
        let mut small = [0u8; 2];
        assert_eq!(CLocale.format("%A", &tm, &mut small), 0);
        let mut big = [0u8; 16];
        let n = CLocale.format("%A", &tm, &mut big);
        assert_eq!(&big[..n], b"Monday");
    }

    #[test]
    fn test_scan_names_any_case() {
        for input in ["mon", "MON", "Mon", "Monday", "MONDAY"] {
            let mut tm = Tm::default();
            let n = scan("%a", input.as_bytes(), &mut tm).unwrap();
            assert_eq!(n, input.len(), "consumed all of {input:?}");
            assert_eq!(tm.wday, 1);
        }
        let mut tm = Tm::default();
        // the short form does not eat a partial long suffix
        assert_eq!(scan("%a", b"Mondao", &mut tm), Some(3));
    }

    #[test]
    fn test_scan_months() {
        let mut tm = Tm::default();
        assert_eq!(scan("%b", b"sep", &mut tm), Some(3));
        assert_eq!(tm.mon, 8);
        assert_eq!(scan("%B", b"September", &mut tm), Some(9));
        // May has no long suffix
        assert_eq!(scan("%B", b"May", &mut tm), Some(3));
        assert_eq!(tm.mon, 4);
        assert_eq!(scan("%b", b"Xxx", &mut tm), None);
    }

    #[test]
    fn test_scan_numbers() {
        let mut tm = Tm::default();
        assert_eq!(scan("%H:%M:%S", b"13:04:05", &mut tm), Some(8));
        assert_eq!((tm.hour, tm.min, tm.sec), (13, 4, 5));
        // single digits and leading whitespace are fine
        let mut tm = Tm::default();
        assert_eq!(scan("%d", b" 5", &mut tm), Some(2));
        assert_eq!(tm.mday, 5);
        // out of range fails
        assert_eq!(scan("%H", b"25", &mut Tm::default()), None);
    }

    #[test]
    fn test_scan_year_pivot() {
        let mut tm = Tm::default();
        scan("%y", b"69", &mut tm).unwrap();
        assert_eq!(tm.year, 69); // 1969
        scan("%y", b"68", &mut tm).unwrap();
        assert_eq!(tm.year, 168); // 2068
        scan("%Y", b"1988", &mut tm).unwrap();
        assert_eq!(tm.year, 88);
    }

    #[test]
    fn test_scan_ampm_adjusts_hour() {
        let mut tm = Tm::default();
        scan("%I%p", b"1PM", &mut tm).unwrap();
        assert_eq!(tm.hour, 13);
        let mut tm = Tm::default();
        scan("%I%p", b"12am", &mut tm).unwrap();
        assert_eq!(tm.hour, 0);
        let mut tm = Tm::default();
        scan("%I%p", b"12pm", &mut tm).unwrap();
        assert_eq!(tm.hour, 12);
    }

    #[test]
    fn test_scan_composites() {
        let mut tm = Tm::default();
        let n = scan("%c", b"Mon Jul 15 13:04:05 2024", &mut tm).unwrap();
        assert_eq!(n, 24);
        assert_eq!((tm.year, tm.mon, tm.mday), (124, 6, 15));
        assert_eq!((tm.hour, tm.min, tm.sec), (13, 4, 5));
        assert_eq!(tm.wday, 1);
    }

    #[test]
    fn test_scan_literal_and_percent() {
        let mut tm = Tm::default();
        assert_eq!(scan("x%%y", b"x%y", &mut tm), Some(3));
        assert_eq!(scan("x", b"y", &mut tm), None);
        // format whitespace collapses any input whitespace run
        assert_eq!(scan("a b", b"a \t b", &mut tm), Some(5));
    }
}
