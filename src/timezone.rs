//! Resolves IANA timezone names to UTC offsets.
//!
//! The offset of a zone depends on daylight saving rules, so it is always
//! resolved at a particular instant. [resolve_offset] uses the instant given
//! by a [Clock], [resolve_offset_at] takes the instant explicitly.

use std::sync::LazyLock;

use regex::Regex;
use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::{Error, clock::Clock};

/// A signed number of minutes east (+) or west (-) of UTC.
pub type OffsetMinutes = i32;

/// The zone used when the host's timezone cannot be determined.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Access to a timezone database.
pub trait TimezoneDatabase {
    /// Look up a zone by its canonical IANA name, e.g. "Pacific/Auckland".
    fn get(&self, name: &str) -> Option<&'static Tz>;

    /// The names of every zone in the database, sorted.
    ///
    /// An empty list means the database has no zone data.
    fn names(&self) -> Vec<&'static str>;

    /// The zone the host system is configured to use, if it can be determined.
    fn local(&self) -> Option<&'static Tz>;
}

/// The timezone database bundled with `time-tz`, plus the host's configured zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tzdb;

impl TimezoneDatabase for Tzdb {
    fn get(&self, name: &str) -> Option<&'static Tz> {
        time_tz::timezones::get_by_name(name)
    }

    fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = time_tz::timezones::iter().map(|tz| tz.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn local(&self) -> Option<&'static Tz> {
        match time_tz::system::get_timezone() {
            Ok(tz) => Some(tz),
            Err(error) => {
                tracing::warn!("could not determine the system timezone: {error:?}");
                None
            }
        }
    }
}

/// Get the current UTC offset of `timezone` in minutes.
///
/// "Now" comes from `clock`, so the result changes when the zone enters or
/// leaves daylight saving time. Use [resolve_offset_at] to resolve the offset
/// at some other instant, e.g. the start of the appointment.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `timezone` is not in `db`, or
/// [Error::InvalidOffset] if the zone's offset cannot be expressed as
/// long-form offset text.
pub fn resolve_offset(
    timezone: &str,
    clock: &impl Clock,
    db: &impl TimezoneDatabase,
) -> Result<OffsetMinutes, Error> {
    resolve_offset_at(timezone, clock.now(), db)
}

/// Get the UTC offset of `timezone` in minutes at `instant`.
///
/// # Errors
/// See [resolve_offset].
pub fn resolve_offset_at(
    timezone: &str,
    instant: OffsetDateTime,
    db: &impl TimezoneDatabase,
) -> Result<OffsetMinutes, Error> {
    let tz = db
        .get(timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(timezone.to_owned()))?;

    let offset = tz.get_offset_utc(&instant).to_utc();
    let offset_text = format_long_offset(offset);
    let minutes = parse_long_offset(&offset_text)?;

    tracing::debug!("resolved {timezone} to {offset_text} ({minutes} minutes) at {instant}");

    Ok(minutes)
}

/// Render `offset` as long-form offset text: "GMT" for zero, otherwise
/// "GMT+HH:MM" or "GMT-HH:MM".
///
/// Seconds are dropped, no zone has used second-level offsets since the 1970s.
pub fn format_long_offset(offset: UtcOffset) -> String {
    let total_minutes = i32::from(offset.whole_minutes());

    if total_minutes == 0 {
        return "GMT".to_owned();
    }

    let sign = if total_minutes < 0 { '-' } else { '+' };
    let total_minutes = total_minutes.abs();

    format!("GMT{sign}{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

static LONG_OFFSET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"GMT([+-])(\d{2}):(\d{2})").expect("long offset pattern is a valid regex")
});

/// Parse long-form offset text such as "GMT+05:30" into minutes east of UTC.
///
/// A bare "GMT" is zero.
///
/// # Errors
/// Returns [Error::InvalidOffset] if `offset_text` does not contain a
/// `GMT{sign}{HH}:{MM}` offset.
pub fn parse_long_offset(offset_text: &str) -> Result<OffsetMinutes, Error> {
    if offset_text == "GMT" {
        return Ok(0);
    }

    let invalid = || Error::InvalidOffset(offset_text.to_owned());

    let captures = LONG_OFFSET_REGEX
        .captures(offset_text)
        .ok_or_else(invalid)?;

    let sign = if &captures[1] == "-" { -1 } else { 1 };
    let hours: OffsetMinutes = captures[2].parse().map_err(|_| invalid())?;
    let minutes: OffsetMinutes = captures[3].parse().map_err(|_| invalid())?;

    Ok(sign * (hours * 60 + minutes))
}

/// A label for timezone pickers, e.g. "(GMT+05:30) Asia/Kolkata".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `timezone` is not in `db`.
pub fn timezone_label(
    timezone: &str,
    clock: &impl Clock,
    db: &impl TimezoneDatabase,
) -> Result<String, Error> {
    let tz = db
        .get(timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(timezone.to_owned()))?;
    let offset = tz.get_offset_utc(&clock.now()).to_utc();

    Ok(format!("({}) {timezone}", format_long_offset(offset)))
}

/// List the name of every timezone in `db`, sorted.
///
/// Returns an empty list rather than an error when `db` has no zone data.
pub fn list_supported_timezones(db: &impl TimezoneDatabase) -> Vec<&'static str> {
    db.names()
}

/// Get the name of the host's timezone.
///
/// Falls back to [FALLBACK_TIMEZONE] when the host's zone cannot be
/// determined, which matches how browsers resolve their default zone.
pub fn get_local_timezone(db: &impl TimezoneDatabase) -> String {
    match db.local() {
        Some(tz) => tz.name().to_owned(),
        None => {
            tracing::warn!("falling back to {FALLBACK_TIMEZONE} as the local timezone");
            FALLBACK_TIMEZONE.to_owned()
        }
    }
}
