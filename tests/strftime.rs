//! End-to-end properties of the format/parse pair.

use femtime::{format, parse, CivilSecond, Femtoseconds, Instant, ParseError, TimeZone};

fn instant_of(tz: &TimeZone, y: i64, m: i64, d: i64, hh: i64, mm: i64, ss: i64) -> Instant {
    tz.lookup_civil(CivilSecond::new(y, m, d, hh, mm, ss)).pre
}

#[test]
fn round_trip_rfc3339_shape() {
    let tz = TimeZone::fixed(5 * 3600 + 1800).unwrap();
    let t = instant_of(&tz, 2024, 7, 15, 13, 4, 5);
    let text = format("%E4Y-%m-%dT%H:%M:%S%Ez", t, Femtoseconds::ZERO, &tz);
    assert_eq!(text, "2024-07-15T18:34:05+05:30");
    let (back, fs) = parse("%E4Y-%m-%dT%H:%M:%S%Ez", &text, &tz).unwrap();
    assert_eq!(back, t);
    assert_eq!(fs, Femtoseconds::ZERO);
}

#[test]
fn round_trip_subseconds() {
    let utc = TimeZone::utc();
    let t = instant_of(&utc, 2016, 12, 26, 9, 0, 7);
    for &raw in &[0i64, 1, 250_000_000_000_000, 999_999_999_999_999] {
        let fs = Femtoseconds::new(raw).unwrap();
        let text = format("%E4Y-%m-%dT%H:%M:%E*S%Ez", t, fs, &utc);
        let (back, fs2) = parse("%E4Y-%m-%dT%H:%M:%E*S%Ez", &text, &utc).unwrap();
        assert_eq!((back, fs2), (t, fs), "via {text:?}");
    }
}

#[test]
fn round_trip_bare_fraction() {
    let utc = TimeZone::utc();
    let t = Instant::from_unix(7);
    for &raw in &[0i64, 40_000_000_000_000, 123_456_789_012_345] {
        let fs = Femtoseconds::new(raw).unwrap();
        let text = format("%S.%E*f", t, fs, &utc);
        let (back, fs2) = parse("%S.%E*f", &text, &utc).unwrap();
        assert_eq!((back, fs2), (t, fs), "via {text:?}");
    }
}

#[test]
fn round_trip_through_delegated_specifiers() {
    let utc = TimeZone::utc();
    let t = instant_of(&utc, 2024, 7, 15, 16, 24, 59);
    let f = "%a, %d %b %Y %H:%M:%S %z";
    let text = format(f, t, Femtoseconds::ZERO, &utc);
    assert_eq!(text, "Mon, 15 Jul 2024 16:24:59 +0000");
    let (back, _) = parse(f, &text, &utc).unwrap();
    assert_eq!(back, t);
}

#[test]
fn offset_shapes_parse_back() {
    let utc = TimeZone::utc();
    for off in [0, 3600, -3600, 5400, 5445, -5445] {
        let tz = TimeZone::fixed(off).unwrap();
        for f in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%::z"] {
            let t = Instant::from_unix(1_482_710_400);
            let text = format(f, t, Femtoseconds::ZERO, &tz);
            let (back, _) = parse(f, &text, &utc).unwrap();
            assert_eq!(back, t, "offset {off} via {text:?}");
        }
    }
}

#[test]
fn width_cap_above_eighteen() {
    let utc = TimeZone::utc();
    let t = Instant::from_unix(7);
    let fs = Femtoseconds::new(123_456_789_012_345).unwrap();
    let at18 = format("%E18S", t, fs, &utc);
    assert_eq!(format("%E19S", t, fs, &utc), at18);
    assert_eq!(format("%E1024S", t, fs, &utc), at18);
    assert_eq!(format("%E0S", t, fs, &utc), "07");
}

#[test]
fn leap_second_normalizes() {
    let utc = TimeZone::utc();
    let (t, fs) = parse("%Y-%m-%dT%H:%M:%S", "2016-12-31T23:59:60", &utc).unwrap();
    assert_eq!(t, instant_of(&utc, 2017, 1, 1, 0, 0, 0));
    assert_eq!(fs, Femtoseconds::ZERO);
}

#[test]
fn impossible_dates_are_rejected() {
    let utc = TimeZone::utc();
    assert_eq!(parse("%Y-%m-%d", "2023-09-31", &utc), Err(ParseError::FieldOutOfRange));
    assert_eq!(parse("%Y-%m-%d", "2023-02-29", &utc), Err(ParseError::FieldOutOfRange));
}

#[test]
fn percent_s_dominates() {
    let utc = TimeZone::utc();
    let (t, fs) = parse("%Y %s", "1999 0", &utc).unwrap();
    assert_eq!(t, Instant::UNIX_EPOCH);
    assert_eq!(fs, Femtoseconds::ZERO);
}

#[test]
fn percent_escaping() {
    let utc = TimeZone::utc();
    let t = instant_of(&utc, 2020, 1, 1, 0, 0, 0);
    assert_eq!(format("%%", t, Femtoseconds::ZERO, &utc), "%");
    assert_eq!(format("%%%%", t, Femtoseconds::ZERO, &utc), "%%");
    assert_eq!(format("%Y%%", t, Femtoseconds::ZERO, &utc), "2020%");
}

#[test]
fn whitespace_collapses_on_both_sides() {
    let utc = TimeZone::utc();
    let (t, _) = parse(" %Y  %m ", "\t1999\n\n07 ", &utc).unwrap();
    assert_eq!(t, instant_of(&utc, 1999, 7, 1, 0, 0, 0));
}

#[test]
fn format_is_total_parse_is_strict() {
    let utc = TimeZone::utc();
    let t = Instant::UNIX_EPOCH;
    // formatting with junk produces output (possibly dropping fragments)
    let _ = format("%Q %Y", t, Femtoseconds::ZERO, &utc);
    // parsing the same junk fails loudly
    assert_eq!(parse("%Q %Y", "x 1970", &utc), Err(ParseError::Failed));
}

quickcheck::quickcheck! {
    fn prop_round_trip_seconds(unix: i32, quarter_hours: i8) -> bool {
        let offset = i32::from(quarter_hours % 96) * 900;
        let tz = TimeZone::fixed(offset).unwrap();
        let t = Instant::from_unix(i64::from(unix));
        let text = format("%E4Y-%m-%dT%H:%M:%S%Ez", t, Femtoseconds::ZERO, &tz);
        parse("%E4Y-%m-%dT%H:%M:%S%Ez", &text, &tz) == Ok((t, Femtoseconds::ZERO))
    }

    fn prop_round_trip_subseconds(unix: i32, raw: u64) -> bool {
        let utc = TimeZone::utc();
        let fs = Femtoseconds::new((raw % 1_000_000_000_000_000) as i64).unwrap();
        let t = Instant::from_unix(i64::from(unix));
        let text = format("%E4Y-%m-%dT%H:%M:%E*S%Ez", t, fs, &utc);
        parse("%E4Y-%m-%dT%H:%M:%E*S%Ez", &text, &utc) == Ok((t, fs))
    }

    fn prop_format_agrees_with_zone_lookup(unix: i32, quarter_hours: i8) -> bool {
        let offset = i32::from(quarter_hours % 96) * 900;
        let tz = TimeZone::fixed(offset).unwrap();
        let t = Instant::from_unix(i64::from(unix));
        let al = tz.lookup(t);
        let text = format("%Y-%m-%d %H:%M:%S", t, Femtoseconds::ZERO, &tz);
        text == al.cs.to_string().replace('T', " ")
    }
}
