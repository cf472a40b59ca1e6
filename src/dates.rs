use anyhow::{Error, Result};
use chrono::prelude::*;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Whether `left` is strictly earlier than `right`.
///
/// Unparsable input is an error rather than `false`.
pub fn compare_dates(left: &str, right: &str) -> Result<bool> {
    Ok(parse(left)? < parse(right)?)
}

/// Parses a date string into an absolute instant.
///
/// Offsets are honoured when present. Date-times without an offset are read
/// as local time, bare dates as midnight UTC.
pub fn parse(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(when) = DateTime::parse_from_rfc3339(input) {
        return Ok(when.with_timezone(&Utc));
    }
    if let Ok(when) = DateTime::parse_from_rfc2822(input) {
        return Ok(when.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|when| when.with_timezone(&Utc))
                .ok_or_else(|| Error::msg(format!("{input} does not exist in local time")));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(Error::msg(format!("unrecognised date: {input:?}")))
}
