// This is a part of Femtime.
// See README.md and LICENSE.txt for details.

//! Formatting machinery: the integer, offset, and subsecond encoders, and
//! the format engine that drives them.

use crate::format::scan;
use crate::format::tm::{CLocale, Tm, TmFormat};
use crate::format::{DIGITS10_64, POW10};
use crate::instant::{Femtoseconds, Instant};
use crate::zone::TimeZone;

const DIGITS: &[u8; 10] = b"0123456789";

/// Scratch space for the longest internal conversion: a full-width 64-bit
/// value plus sign and punctuation.
const SCRATCH: usize = 3 + DIGITS10_64;

/// Encodes `v` in decimal, right to left, ending just before `ep`.
///
/// Returns the index of the first written byte. `width` requests
/// zero-padding up to that many characters, with the sign (if any)
/// counting against it. The most-negative value never gets negated; its
/// last digit is peeled off first.
fn format64(buf: &mut [u8], mut ep: usize, mut width: i32, mut v: i64) -> usize {
    let mut neg = false;
    if v < 0 {
        width -= 1;
        neg = true;
        if v == i64::MIN {
            // peel off the last digit so that -v below cannot overflow
            let mut last_digit = -(v % 10);
            v /= 10;
            if last_digit < 0 {
                v += 1;
                last_digit += 10;
            }
            width -= 1;
            ep -= 1;
            buf[ep] = DIGITS[last_digit as usize];
        }
        v = -v;
    }
    loop {
        width -= 1;
        ep -= 1;
        buf[ep] = DIGITS[(v % 10) as usize];
        v /= 10;
        if v == 0 {
            break;
        }
    }
    while width > 0 {
        width -= 1;
        ep -= 1;
        buf[ep] = b'0';
    }
    if neg {
        ep -= 1;
        buf[ep] = b'-';
    }
    ep
}

/// Encodes `v` in `[0, 99]` as two digits, the `%02d` workhorse.
fn format02d(buf: &mut [u8], mut ep: usize, v: i32) -> usize {
    ep -= 1;
    buf[ep] = DIGITS[(v % 10) as usize];
    ep -= 1;
    buf[ep] = DIGITS[((v / 10) % 10) as usize];
    ep
}

/// Encodes a UTC offset, e.g. `+00:00`.
///
/// `mode` selects the shape: `mode[0]` is the separator (absent for the
/// compact `±HHMM` form), `mode[1] == '*'` adds full-resolution seconds,
/// and `mode[2] == ':'` on top of that elides zero seconds (and zero
/// minutes when the seconds went too).
fn format_offset(buf: &mut [u8], mut ep: usize, mut offset: i32, mode: &[u8]) -> usize {
    let mut sign = b'+';
    if offset < 0 {
        offset = -offset; // bounded by 24h so no overflow
        sign = b'-';
    }
    let seconds = offset % 60;
    offset /= 60;
    let minutes = offset % 60;
    let hours = offset / 60;
    let sep = mode.first().copied().unwrap_or(0);
    let ext = sep != 0 && mode.get(1) == Some(&b'*');
    let ccc = ext && mode.get(2) == Some(&b':');
    if ext && (!ccc || seconds != 0) {
        ep = format02d(buf, ep, seconds);
        ep -= 1;
        buf[ep] = sep;
    } else {
        // If we're not rendering seconds, sub-minute negative offsets
        // should get a positive sign (e.g., offset=-10s => "+00:00").
        if hours == 0 && minutes == 0 {
            sign = b'+';
        }
    }
    if !ccc || minutes != 0 || seconds != 0 {
        ep = format02d(buf, ep, minutes);
        if sep != 0 {
            ep -= 1;
            buf[ep] = sep;
        }
    }
    ep = format02d(buf, ep, hours);
    ep -= 1;
    buf[ep] = sign;
    ep
}

/// Renders an offset to an owned string; also used by the zone
/// abbreviation machinery.
pub(crate) fn offset_to_string(offset: i32, mode: &[u8]) -> String {
    let mut buf = [0u8; SCRATCH];
    let bp = format_offset(&mut buf, SCRATCH, offset, mode);
    let mut out = String::new();
    push_bytes(&mut out, &buf[bp..SCRATCH]);
    out
}

/// Appends scratch-buffer bytes (always ASCII) to the output.
fn push_bytes(result: &mut String, bytes: &[u8]) {
    for &b in bytes {
        result.push(char::from(b));
    }
}

/// Flushes a pending sub-format through the broken-down-time collaborator.
///
/// The collaborator returns 0 when the buffer is too small, so the buffer
/// grows from 2x the sub-format's length, doubling, up to (but excluding)
/// 32x. When every size fails the sub-format contributes nothing.
fn format_tm(result: &mut String, sub: &str, tm: &Tm, tm_format: &dyn TmFormat) {
    let mut mult = 2;
    while mult != 32 {
        let mut buf = vec![0u8; sub.len() * mult];
        let len = tm_format.format(sub, tm, &mut buf);
        if len > 0 {
            if let Ok(s) = core::str::from_utf8(&buf[..len]) {
                result.push_str(s);
            }
            return;
        }
        mult *= 2;
    }
    trace!("sub-format {:?} produced no output", sub);
}

/// Formats `tp` (with its subsecond remainder `fs`) as displayed in `tz`,
/// under the given format string.
///
/// See the [module documentation](crate::format) for the supported
/// specifiers. Formatting never fails; an unrecognized specifier simply
/// contributes nothing.
///
/// # Example
///
/// ```
/// use femtime::{format, Femtoseconds, Instant, TimeZone};
///
/// let tz = TimeZone::fixed(-4 * 3600).unwrap();
/// let t = Instant::from_unix(1_721_059_199); // 2024-07-15T15:59:59Z
/// assert_eq!(
///     format("%a, %d %b %Y %H:%M:%S %z", t, Femtoseconds::ZERO, &tz),
///     "Mon, 15 Jul 2024 11:59:59 -0400",
/// );
/// ```
pub fn format(format: &str, tp: Instant, fs: Femtoseconds, tz: &TimeZone) -> String {
    format_with(format, tp, fs, tz, &CLocale)
}

/// Like [`format`], but with a caller-supplied broken-down-time
/// collaborator instead of the C-locale one.
pub fn format_with(
    format: &str,
    tp: Instant,
    fs: Femtoseconds,
    tz: &TimeZone,
    tm_format: &dyn TmFormat,
) -> String {
    debug_assert!((0..Femtoseconds::PER_SECOND).contains(&fs.get()));

    let f = format.as_bytes();
    let end = f.len();
    let mut result = String::with_capacity(end); // a reasonable guess
    let al = tz.lookup(tp);
    let tm = Tm::from_lookup(&al);

    // Scratch buffer for internal conversions; every encoder works back
    // from `ep`.
    let mut buf = [0u8; SCRATCH];
    let ep = SCRATCH;

    // Maintain three disjoint regions that span the format:
    //   [0 .. pending)   : already formatted into the result
    //   [pending .. cur) : formatting pending, but no special cases
    //   [cur .. end)     : unexamined
    let mut pending = 0usize;
    let mut cur = 0usize;

    while cur != end {
        // Move cur to the next percent sign.
        let mut start = cur;
        while cur != end && f[cur] != b'%' {
            cur += 1;
        }

        // If the new pending text is all ordinary, copy it out.
        if cur != start && pending == start {
            result.push_str(&format[pending..cur]);
            pending = cur;
            start = cur;
        }

        // Span the sequential percent signs.
        let percent = cur;
        while cur != end && f[cur] == b'%' {
            cur += 1;
        }

        // If the new pending text is all percents, copy out one percent
        // for every matched pair, then skip those pairs.
        if cur != start && pending == start {
            let escaped = (cur - pending) / 2;
            result.push_str(&format[pending..pending + escaped]);
            pending += escaped * 2;
            // Also copy out a single trailing percent.
            if pending != cur && cur == end {
                result.push('%');
                pending += 1;
            }
        }

        // Loop unless we have an unescaped percent.
        if cur == end || (cur - percent) % 2 == 0 {
            continue;
        }

        // Simple specifiers handled without the collaborator.
        if matches!(f[cur], b'Y' | b'm' | b'd' | b'e' | b'H' | b'M' | b'S' | b'z' | b'Z' | b's') {
            if cur - 1 != pending {
                format_tm(&mut result, &format[pending..cur - 1], &tm, tm_format);
            }
            match f[cur] {
                b'Y' => {
                    // This avoids the Tm year window for %Y; the windowed
                    // year is still seen by specifiers like %D.
                    let bp = format64(&mut buf, ep, 0, al.cs.year());
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'm' => {
                    let bp = format02d(&mut buf, ep, al.cs.month().into());
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'd' | b'e' => {
                    let bp = format02d(&mut buf, ep, al.cs.day().into());
                    if f[cur] == b'e' && buf[bp] == b'0' {
                        buf[bp] = b' ';
                    }
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'H' => {
                    let bp = format02d(&mut buf, ep, al.cs.hour().into());
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'M' => {
                    let bp = format02d(&mut buf, ep, al.cs.minute().into());
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'S' => {
                    let bp = format02d(&mut buf, ep, al.cs.second().into());
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'z' => {
                    let bp = format_offset(&mut buf, ep, al.offset, b"");
                    push_bytes(&mut result, &buf[bp..ep]);
                }
                b'Z' => result.push_str(&al.abbr),
                _ => {
                    // b's'
                    let bp = format64(&mut buf, ep, 0, tp.to_unix());
                    push_bytes(&mut result, &buf[bp..ep]);
                }
            }
            cur += 1;
            pending = cur;
            continue;
        }

        // The %:z, %::z, and %:::z offset shapes.
        if f[cur] == b':' && cur + 1 != end {
            if f[cur + 1] == b'z' {
                if cur - 1 != pending {
                    format_tm(&mut result, &format[pending..cur - 1], &tm, tm_format);
                }
                let bp = format_offset(&mut buf, ep, al.offset, b":");
                push_bytes(&mut result, &buf[bp..ep]);
                cur += 2;
                pending = cur;
                continue;
            }
            if f[cur + 1] == b':' && cur + 2 != end {
                if f[cur + 2] == b'z' {
                    if cur - 1 != pending {
                        format_tm(&mut result, &format[pending..cur - 1], &tm, tm_format);
                    }
                    let bp = format_offset(&mut buf, ep, al.offset, b":*");
                    push_bytes(&mut result, &buf[bp..ep]);
                    cur += 3;
                    pending = cur;
                    continue;
                }
                if f[cur + 2] == b':' && cur + 3 != end && f[cur + 3] == b'z' {
                    if cur - 1 != pending {
                        format_tm(&mut result, &format[pending..cur - 1], &tm, tm_format);
                    }
                    let bp = format_offset(&mut buf, ep, al.offset, b":*:");
                    push_bytes(&mut result, &buf[bp..ep]);
                    cur += 4;
                    pending = cur;
                    continue;
                }
            }
        }

        // Loop if there is no E modifier.
        if f[cur] != b'E' {
            continue;
        }
        cur += 1;
        if cur == end {
            continue;
        }

        if f[cur] == b'z' {
            // %Ez
            if cur - 2 != pending {
                format_tm(&mut result, &format[pending..cur - 2], &tm, tm_format);
            }
            let bp = format_offset(&mut buf, ep, al.offset, b":");
            push_bytes(&mut result, &buf[bp..ep]);
            cur += 1;
            pending = cur;
        } else if f[cur] == b'*' && cur + 1 != end && f[cur + 1] == b'z' {
            // %E*z
            if cur - 2 != pending {
                format_tm(&mut result, &format[pending..cur - 2], &tm, tm_format);
            }
            let bp = format_offset(&mut buf, ep, al.offset, b":*");
            push_bytes(&mut result, &buf[bp..ep]);
            cur += 2;
            pending = cur;
        } else if f[cur] == b'*' && cur + 1 != end && (f[cur + 1] == b'S' || f[cur + 1] == b'f') {
            // %E*S or %E*f
            if cur - 2 != pending {
                format_tm(&mut result, &format[pending..cur - 2], &tm, tm_format);
            }
            let mut cp = ep;
            let mut bp = format64(&mut buf, cp, 15, fs.get());
            while cp != bp && buf[cp - 1] == b'0' {
                cp -= 1;
            }
            if f[cur + 1] == b'S' {
                if cp != bp {
                    bp -= 1;
                    buf[bp] = b'.';
                }
                bp = format02d(&mut buf, bp, al.cs.second().into());
            } else if cp == bp {
                bp -= 1;
                buf[bp] = b'0';
            }
            push_bytes(&mut result, &buf[bp..cp]);
            cur += 2;
            pending = cur;
        } else if f[cur] == b'4' && cur + 1 != end && f[cur + 1] == b'Y' {
            // %E4Y
            if cur - 2 != pending {
                format_tm(&mut result, &format[pending..cur - 2], &tm, tm_format);
            }
            let bp = format64(&mut buf, ep, 4, al.cs.year());
            push_bytes(&mut result, &buf[bp..ep]);
            cur += 2;
            pending = cur;
        } else if f[cur].is_ascii_digit() {
            // Possibly %E#S or %E#f.
            if let Some((rest, n)) = scan::signed(&f[cur..], 0, 0, 1024) {
                let np = end - rest.len();
                if np != end && (f[np] == b'S' || f[np] == b'f') {
                    if cur - 2 != pending {
                        format_tm(&mut result, &format[pending..cur - 2], &tm, tm_format);
                    }
                    let mut bp = ep;
                    let n = (n as usize).min(DIGITS10_64);
                    if n > 0 {
                        let shown = if n > 15 {
                            fs.get() * POW10[n - 15]
                        } else {
                            fs.get() / POW10[15 - n]
                        };
                        bp = format64(&mut buf, bp, n as i32, shown);
                        if f[np] == b'S' {
                            bp -= 1;
                            buf[bp] = b'.';
                        }
                    }
                    if f[np] == b'S' {
                        bp = format02d(&mut buf, bp, al.cs.second().into());
                    }
                    push_bytes(&mut result, &buf[bp..ep]);
                    cur = np + 1;
                    pending = cur;
                }
            }
            // A digit run reaching the end of the format (or not followed
            // by S/f) is no specifier of ours; it stays pending and is
            // delegated with the rest.
        }
    }

    // Format any remaining data.
    if end != pending {
        format_tm(&mut result, &format[pending..end], &tm, tm_format);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::{format, format02d, format64, SCRATCH};
    use crate::instant::{Femtoseconds, Instant};
    use crate::zone::TimeZone;

    fn fmt64(width: i32, v: i64) -> String {
        let mut buf = [0u8; SCRATCH];
        let bp = format64(&mut buf, SCRATCH, width, v);
        String::from_utf8(buf[bp..].to_vec()).unwrap()
    }

    #[test]
    fn test_format64() {
        assert_eq!(fmt64(0, 0), "0");
        assert_eq!(fmt64(0, 42), "42");
        assert_eq!(fmt64(0, -42), "-42");
        assert_eq!(fmt64(4, 7), "0007");
        assert_eq!(fmt64(4, -7), "-007");
        assert_eq!(fmt64(4, 12345), "12345");
        assert_eq!(fmt64(4, -12345), "-12345");
        assert_eq!(fmt64(0, i64::MAX), "9223372036854775807");
        assert_eq!(fmt64(0, i64::MIN), "-9223372036854775808");
        assert_eq!(fmt64(21, i64::MIN), "-09223372036854775808");
    }

    #[test]
    fn test_format02d() {
        let two = |v: i32| {
            let mut buf = [0u8; SCRATCH];
            let bp = format02d(&mut buf, SCRATCH, v);
            String::from_utf8(buf[bp..].to_vec()).unwrap()
        };
        assert_eq!(two(0), "00");
        assert_eq!(two(7), "07");
        assert_eq!(two(59), "59");
    }

    fn render(f: &str, unix: i64, fs: i64, offset: i32) -> String {
        let tz = TimeZone::fixed(offset).unwrap();
        format(f, Instant::from_unix(unix), Femtoseconds::new(fs).unwrap(), &tz)
    }

    #[test]
    fn test_offset_shape_table() {
        let cases: &[(i32, [&str; 4])] = &[
            (0, ["+0000", "+00:00", "+00:00:00", "+00"]),
            (3600, ["+0100", "+01:00", "+01:00:00", "+01"]),
            (-3600, ["-0100", "-01:00", "-01:00:00", "-01"]),
            (5400, ["+0130", "+01:30", "+01:30:00", "+01:30"]),
            (5445, ["+0130", "+01:30:45", "+01:30:45", "+01:30:45"]),
            (-5445, ["-0130", "-01:30:45", "-01:30:45", "-01:30:45"]),
        ];
        for &(off, expected) in cases {
            assert_eq!(render("%z", 0, 0, off), expected[0], "%z of {off}");
            assert_eq!(render("%:z", 0, 0, off), expected[1], "%:z of {off}");
            assert_eq!(render("%::z", 0, 0, off), expected[2], "%::z of {off}");
            assert_eq!(render("%:::z", 0, 0, off), expected[3], "%:::z of {off}");
        }
        // %Ez and %E*z are alternate spellings
        assert_eq!(render("%Ez", 0, 0, 5445), "+01:30");
        assert_eq!(render("%E*z", 0, 0, 5445), "+01:30:45");
    }

    #[test]
    fn test_offset_negative_zero() {
        // sub-minute negative offsets force a positive sign without seconds
        assert_eq!(render("%z", 0, 0, -10), "+0000");
        assert_eq!(render("%:z", 0, 0, -10), "+00:00");
        assert_eq!(render("%::z", 0, 0, -10), "-00:00:10");
        assert_eq!(render("%:::z", 0, 0, -10), "-00:00:10");
    }

    #[test]
    fn test_simple_fields() {
        // 2016-12-26T09:08:07+09:00
        let t = 1_482_710_400 + 8 * 60 + 7;
        assert_eq!(render("%Y-%m-%dT%H:%M:%S", t, 0, 32_400), "2016-12-26T09:08:07");
        assert_eq!(render("%e", t, 0, 32_400), "26");
        // %e swaps a leading zero for a space
        let t2 = t - 18 * 86_400;
        assert_eq!(render("%d|%e", t2, 0, 32_400), "08| 8");
    }

    #[test]
    fn test_year_variants() {
        let utc = TimeZone::utc();
        let at = |y: i64, f: &str| {
            let cs = crate::civil::CivilSecond::new(y, 1, 1, 0, 0, 0);
            let tp = utc.lookup_civil(cs).pre;
            format(f, tp, Femtoseconds::ZERO, &utc)
        };
        assert_eq!(at(2024, "%Y"), "2024");
        assert_eq!(at(123, "%Y"), "123");
        assert_eq!(at(-1, "%Y"), "-1");
        assert_eq!(at(123, "%E4Y"), "0123");
        assert_eq!(at(-1, "%E4Y"), "-001");
        assert_eq!(at(-999, "%E4Y"), "-999");
        assert_eq!(at(-1000, "%E4Y"), "-1000");
        assert_eq!(at(12345, "%E4Y"), "12345");
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(render("%E*S", 7, 0, 0), "07");
        assert_eq!(render("%E*S", 7, 250_000_000_000_000, 0), "07.25");
        assert_eq!(render("%E*S", 7, 3, 0), "07.000000000000003");
        assert_eq!(render("%E*f", 7, 0, 0), "0");
        assert_eq!(render("%E*f", 7, 250_000_000_000_000, 0), "25");
    }

    #[test]
    fn test_fixed_width_fractions() {
        let fs = 123_456_789_012_345;
        assert_eq!(render("%E0S", 7, fs, 0), "07");
        assert_eq!(render("%E3S", 7, fs, 0), "07.123");
        assert_eq!(render("%E15S", 7, fs, 0), "07.123456789012345");
        assert_eq!(render("%E16S", 7, fs, 0), "07.1234567890123450");
        assert_eq!(render("%E18S", 7, fs, 0), "07.123456789012345000");
        // anything above 18 behaves like 18
        assert_eq!(render("%E19S", 7, fs, 0), "07.123456789012345000");
        assert_eq!(render("%E1024S", 7, fs, 0), "07.123456789012345000");
        assert_eq!(render("%E0f", 7, fs, 0), "");
        assert_eq!(render("%E3f", 7, fs, 0), "123");
    }

    #[test]
    fn test_percent_collapsing() {
        let utc = TimeZone::utc();
        let y2020 = utc.lookup_civil(crate::civil::CivilSecond::new(2020, 1, 1, 0, 0, 0)).pre;
        let go = |f: &str| format(f, y2020, Femtoseconds::ZERO, &utc);
        assert_eq!(go("%%"), "%");
        assert_eq!(go("%%%%"), "%%");
        assert_eq!(go("%Y%%"), "2020%");
        assert_eq!(go("%%Y"), "%Y");
        assert_eq!(go("%%%Y"), "%2020");
        assert_eq!(go("%"), "%");
        assert_eq!(go("a%"), "a%");
    }

    #[test]
    fn test_unix_seconds() {
        assert_eq!(render("%s", 0, 0, 0), "0");
        assert_eq!(render("%s", -1, 0, 0), "-1");
        // %s reports the instant regardless of the zone
        assert_eq!(render("%s", 1_482_710_400, 0, 32_400), "1482710400");
    }

    #[test]
    fn test_zone_abbreviation() {
        assert_eq!(render("%Z", 0, 0, 0), "UTC");
        assert_eq!(render("%Z", 0, 0, 32_400), "+09");
        assert_eq!(render("%Z", 0, 0, -12_645), "-03:30:45");
    }

    #[test]
    fn test_delegated_specifiers() {
        // 2024-07-15 was a Monday
        let t = 1_721_001_600;
        assert_eq!(render("%a %b %d", t, 0, 0), "Mon Jul 15");
        assert_eq!(render("%A, %B %e", t, 0, 0), "Monday, July 15");
        // delegated and internal fragments interleave
        assert_eq!(render("%a %Y-%m-%d %p", t, 0, 0), "Mon 2024-07-15 AM");
    }

    #[test]
    fn test_unknown_specifier_contributes_nothing() {
        assert_eq!(render("ab%Qcd", 0, 0, 0), "ab");
        // but internally handled neighbors still render
        assert_eq!(render("%Y%Q", 0, 0, 0), "1970");
    }
}
