//! Resolving the configured canonical timezone to "today".
//!
//! Handlers call [today_in] once per request and thread the resulting date
//! into the pure aggregation functions, which never read the clock
//! themselves.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The current UTC offset of a canonical timezone, e.g. "America/Sao_Paulo".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's calendar date as experienced in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone name is not a
/// canonical timezone string.
pub fn today_in(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod timezone_tests {
    use super::{get_local_offset, today_in};
    use crate::Error;

    #[test]
    fn resolves_canonical_timezone() {
        assert!(get_local_offset("Etc/UTC").is_some());
        assert!(get_local_offset("America/Sao_Paulo").is_some());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(get_local_offset("Not/AZone").is_none());
        assert_eq!(
            today_in("Not/AZone"),
            Err(Error::InvalidTimezoneError("Not/AZone".to_owned()))
        );
    }
}
