//! Calendar-date normalization.
//!
//! Dates in this app are date-only values: a year, month and day with no
//! time-of-day and no timezone. The canonical external form is the
//! `YYYY-MM-DD` string, which is also the storage and comparison form.
//! In memory a calendar date is a [time::Date], so once a value has been
//! parsed it can no longer be shifted by a timezone conversion. This module
//! guards the boundaries where strings and timestamps enter the system:
//! every conversion here discards time-of-day information instead of
//! round-tripping through a timestamp, which is what causes the classic
//! off-by-one-day bug in negative-offset zones.

use time::{Date, Month, OffsetDateTime};

use crate::Error;

/// The locale used to order day, month and year in display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    /// Brazilian Portuguese: `DD/MM/YYYY`. The app's default display locale.
    #[default]
    PtBr,
    /// US English: `MM/DD/YYYY`.
    EnUs,
}

/// Parse a strict canonical `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns [Error::InvalidDate] if `input` does not match `^\d{4}-\d{2}-\d{2}$`
/// or names a day that does not exist (e.g. `2025-02-30`).
pub fn parse_canonical(input: &str) -> Result<Date, Error> {
    let invalid = || Error::InvalidDate(input.to_owned());

    if !is_canonical(input) {
        return Err(invalid());
    }

    let year: i32 = input[0..4].parse().map_err(|_| invalid())?;
    let month: u8 = input[5..7].parse().map_err(|_| invalid())?;
    let day: u8 = input[8..10].parse().map_err(|_| invalid())?;

    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Reduce an arbitrary date string to a calendar date.
///
/// Accepts, in order of preference:
/// - a canonical `YYYY-MM-DD` string (idempotent: parses to the same day),
/// - an RFC 3339 style timestamp (`YYYY-MM-DDTHH:MM:SS...`), reduced to the
///   date components as written and the time of day discarded, so that no
///   UTC offset in the range -12:00 to +14:00 can shift the day,
/// - a localized display string (`DD/MM/YYYY` or `MM/DD/YYYY` per `locale`).
///
/// # Errors
/// Returns [Error::InvalidDate] for anything else. Unparseable input is
/// never silently coerced to some arbitrary date.
pub fn canonicalize(input: &str, locale: DateLocale) -> Result<Date, Error> {
    let input = input.trim();

    if let Some((date_part, _time_part)) = input.split_once('T') {
        return parse_canonical(date_part);
    }

    if input.contains('/') {
        return parse_display(input, locale);
    }

    parse_canonical(input)
}

/// The calendar date of `moment` as experienced in its own UTC offset.
///
/// A timestamp at 2025-01-01 23:00 -03:00 is 02:00 the next day in UTC;
/// the couple entering it still means January 1st, so the date is read in
/// the timestamp's offset, never after converting to UTC.
pub fn local_date(moment: OffsetDateTime) -> Date {
    moment.date()
}

/// Render a calendar date in canonical `YYYY-MM-DD` form.
///
/// Month and day are zero-padded to two digits.
pub fn to_canonical_string(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Render a calendar date for display in the given locale.
pub fn format_display(date: Date, locale: DateLocale) -> String {
    let day = date.day();
    let month = u8::from(date.month());
    let year = date.year();

    match locale {
        DateLocale::PtBr => format!("{day:02}/{month:02}/{year:04}"),
        DateLocale::EnUs => format!("{month:02}/{day:02}/{year:04}"),
    }
}

/// Parse a display string produced by [format_display] back to a date.
///
/// # Errors
/// Returns [Error::InvalidDate] if `input` is not three `/`-separated
/// numbers naming a real calendar date in the locale's field order.
pub fn parse_display(input: &str, locale: DateLocale) -> Result<Date, Error> {
    let invalid = || Error::InvalidDate(input.to_owned());

    let mut parts = input.split('/');
    let (first, second, third) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(c), None) => (a, b, c),
        _ => return Err(invalid()),
    };

    let (day_text, month_text) = match locale {
        DateLocale::PtBr => (first, second),
        DateLocale::EnUs => (second, first),
    };

    let day: u8 = day_text.trim().parse().map_err(|_| invalid())?;
    let month: u8 = month_text.trim().parse().map_err(|_| invalid())?;
    let year: i32 = third.trim().parse().map_err(|_| invalid())?;

    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

fn is_canonical(input: &str) -> bool {
    let bytes = input.as_bytes();

    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, byte)| i == 4 || i == 7 || byte.is_ascii_digit())
}

#[cfg(test)]
mod canonical_tests {
    use time::macros::date;

    use crate::{Error, dates::DateLocale};

    use super::{canonicalize, parse_canonical, to_canonical_string};

    #[test]
    fn parses_canonical_string() {
        assert_eq!(parse_canonical("2025-07-25"), Ok(date!(2025 - 07 - 25)));
    }

    #[test]
    fn round_trips_with_to_canonical_string() {
        let cases = [
            date!(2025 - 01 - 01),
            date!(2025 - 12 - 31),
            date!(2024 - 02 - 29),
            date!(2025 - 07 - 05),
        ];

        for date in cases {
            let text = to_canonical_string(date);
            assert_eq!(parse_canonical(&text), Ok(date), "from {text}");
        }
    }

    #[test]
    fn zero_pads_month_and_day() {
        assert_eq!(to_canonical_string(date!(2025 - 03 - 04)), "2025-03-04");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let inputs = ["2025-07-25", "2025-01-01", "2024-02-29"];

        for input in inputs {
            let once = canonicalize(input, DateLocale::PtBr).unwrap();
            let twice = canonicalize(&to_canonical_string(once), DateLocale::PtBr).unwrap();
            assert_eq!(once, twice, "for {input}");
        }
    }

    #[test]
    fn canonicalize_discards_timestamp_time_component() {
        // Midnight UTC is the classic trigger for the previous-day bug in
        // negative-offset zones. The date components are taken as written.
        assert_eq!(
            canonicalize("2025-07-01T00:00:00Z", DateLocale::PtBr),
            Ok(date!(2025 - 07 - 01))
        );
        assert_eq!(
            canonicalize("2025-12-31T23:59:59-03:00", DateLocale::PtBr),
            Ok(date!(2025 - 12 - 31))
        );
    }

    #[test]
    fn canonicalize_parses_display_strings() {
        assert_eq!(
            canonicalize("25/07/2025", DateLocale::PtBr),
            Ok(date!(2025 - 07 - 25))
        );
        assert_eq!(
            canonicalize("07/25/2025", DateLocale::EnUs),
            Ok(date!(2025 - 07 - 25))
        );
    }

    #[test]
    fn rejects_malformed_input() {
        let inputs = [
            "",
            "not a date",
            "2025-7-5",
            "2025/07/05",
            "2025-13-01",
            "2025-02-30",
            "25-07-2025",
        ];

        for input in inputs {
            assert_eq!(
                parse_canonical(input),
                Err(Error::InvalidDate(input.to_owned())),
                "for {input:?}"
            );
        }
    }

    #[test]
    fn leap_day_is_valid_only_on_leap_years() {
        assert_eq!(parse_canonical("2024-02-29"), Ok(date!(2024 - 02 - 29)));
        assert_eq!(
            parse_canonical("2025-02-29"),
            Err(Error::InvalidDate("2025-02-29".to_owned()))
        );
    }
}

#[cfg(test)]
mod local_date_tests {
    use time::macros::datetime;

    use super::local_date;
    use time::macros::date;

    #[test]
    fn reads_date_in_the_timestamps_own_offset() {
        // 23:00 in UTC-12 is already the next day in UTC.
        assert_eq!(
            local_date(datetime!(2025-01-01 23:00 -12)),
            date!(2025 - 01 - 01)
        );
        // 00:30 in UTC+14 is still the previous day in UTC.
        assert_eq!(
            local_date(datetime!(2025-01-01 00:30 +14)),
            date!(2025 - 01 - 01)
        );
    }

    #[test]
    fn month_boundaries_do_not_shift_at_extreme_offsets() {
        let cases = [
            datetime!(2025-01-01 00:00 -12),
            datetime!(2025-01-01 23:59 -12),
            datetime!(2025-12-31 00:00 +14),
            datetime!(2025-12-31 23:59 +14),
            datetime!(2024-02-29 00:00 -12),
            datetime!(2024-02-29 23:59 +14),
        ];

        for moment in cases {
            assert_eq!(local_date(moment), moment.date(), "for {moment}");
        }
    }
}

#[cfg(test)]
mod display_tests {
    use time::macros::date;

    use crate::Error;

    use super::{DateLocale, format_display, parse_display, to_canonical_string};

    #[test]
    fn formats_pt_br_day_first() {
        assert_eq!(
            format_display(date!(2025 - 07 - 05), DateLocale::PtBr),
            "05/07/2025"
        );
    }

    #[test]
    fn formats_en_us_month_first() {
        assert_eq!(
            format_display(date!(2025 - 07 - 05), DateLocale::EnUs),
            "07/05/2025"
        );
    }

    #[test]
    fn display_round_trip_reproduces_the_same_day() {
        let cases = [
            date!(2025 - 01 - 01),
            date!(2025 - 12 - 31),
            date!(2024 - 02 - 29),
            date!(2025 - 07 - 25),
        ];

        for locale in [DateLocale::PtBr, DateLocale::EnUs] {
            for date in cases {
                let displayed = format_display(date, locale);
                let parsed = parse_display(&displayed, locale).unwrap();

                assert_eq!(parsed, date, "{displayed} via {locale:?}");
                assert_eq!(
                    to_canonical_string(parsed),
                    to_canonical_string(date),
                    "{displayed} via {locale:?}"
                );
            }
        }
    }

    #[test]
    fn parse_display_rejects_garbage() {
        let inputs = ["", "25/07", "25/07/2025/01", "aa/bb/cccc", "31/02/2025"];

        for input in inputs {
            assert_eq!(
                parse_display(input, DateLocale::PtBr),
                Err(Error::InvalidDate(input.to_owned())),
                "for {input:?}"
            );
        }
    }
}
