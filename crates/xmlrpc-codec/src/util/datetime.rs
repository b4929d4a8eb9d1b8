//! ISO 8601 date/time parsing and formatting for `dateTime.iso8601` text.
//!
//! XML-RPC peers disagree on the exact timestamp layout, so parsing accepts:
//! - the compact form `YYYYMMDDTHH:MM:SS` (also `YYYYMMDDTHHMMSS`)
//! - the extended form `YYYY-MM-DDTHH:MM:SS`
//! - optional fractional seconds (truncated to microseconds)
//! - an optional `Z`, `±HH:MM` or `±HHMM` offset
//!
//! Formatting always emits the compact form.

use thiserror::Error;

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

/// Error type for ISO 8601 parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DateTimeParseError {
    pub message: String,
}

impl DateTimeParseError {
    fn invalid(what: &str, input: &str) -> Self {
        Self {
            message: format!("Invalid {} in ISO 8601 datetime: {}", what, input),
        }
    }
}

/// Broken-down timestamp as carried by `dateTime.iso8601`.
///
/// `offset_min` is `None` when the wire text carried no zone designator;
/// most servers mean local server time by that, which this layer cannot know.
///
/// Every component is range-checked on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsoDateTime {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
    offset_min: Option<i16>,
}

/// Largest accepted zone offset in minutes (24:00).
const MAX_OFFSET_MINUTES: i16 = 24 * 60;

impl IsoDateTime {
    /// Creates a timestamp without fractional seconds or offset.
    ///
    /// Returns an error if any component is out of range.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateTimeParseError> {
        let dt = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            micros: 0,
            offset_min: None,
        };
        dt.check_ranges(&format_iso8601(&dt))?;
        Ok(dt)
    }

    pub fn with_micros(mut self, micros: u32) -> Self {
        self.micros = micros.min(999_999);
        self
    }

    /// Attaches a zone offset in minutes east of UTC.
    ///
    /// Returns an error if the offset lies outside ±24:00.
    pub fn with_offset(mut self, offset_min: i16) -> Result<Self, DateTimeParseError> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&offset_min) {
            return Err(DateTimeParseError {
                message: format!("Invalid timezone offset in ISO 8601 datetime: {offset_min} minutes"),
            });
        }
        self.offset_min = Some(offset_min);
        Ok(self)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn micros(&self) -> u32 {
        self.micros
    }

    /// Zone offset in minutes east of UTC, if the timestamp carried one.
    pub fn offset_minutes(&self) -> Option<i16> {
        self.offset_min
    }

    /// Microseconds since the Unix epoch. A missing offset is treated as UTC.
    pub fn epoch_micros(&self) -> i64 {
        let days = date_to_days(self.year, self.month as u32, self.day as u32) as i64;
        let local = days * MICROSECONDS_PER_DAY
            + self.hour as i64 * MICROSECONDS_PER_HOUR
            + self.minute as i64 * MICROSECONDS_PER_MINUTE
            + self.second as i64 * MICROSECONDS_PER_SECOND
            + self.micros as i64;
        // local time = UTC + offset
        local - self.offset_min.unwrap_or(0) as i64 * MICROSECONDS_PER_MINUTE
    }

    fn check_ranges(&self, input: &str) -> Result<(), DateTimeParseError> {
        if !(0..=9999).contains(&self.year) {
            return Err(DateTimeParseError::invalid("year", input));
        }
        if self.month < 1 || self.month > 12 {
            return Err(DateTimeParseError::invalid("month", input));
        }
        if self.day < 1 || self.day as u32 > days_in_month(self.year, self.month as u32) {
            return Err(DateTimeParseError::invalid("day", input));
        }
        if self.hour > 23 {
            return Err(DateTimeParseError::invalid("hours", input));
        }
        if self.minute > 59 {
            return Err(DateTimeParseError::invalid("minutes", input));
        }
        if self.second > 59 {
            return Err(DateTimeParseError::invalid("seconds", input));
        }
        Ok(())
    }
}

/// Parses a timezone offset (Z, ±HH:MM, ±HHMM) and returns offset in minutes.
fn parse_timezone_offset(offset: &str, input: &str) -> Result<i16, DateTimeParseError> {
    if offset == "Z" || offset == "z" {
        return Ok(0);
    }

    let sign = match offset.as_bytes().first() {
        Some(b'+') => 1i16,
        Some(b'-') => -1i16,
        _ => return Err(DateTimeParseError::invalid("timezone offset", input)),
    };

    let (hh, mm) = match offset.len() {
        6 if offset.as_bytes()[3] == b':' => (&offset[1..3], &offset[4..6]),
        5 => (&offset[1..3], &offset[3..5]),
        _ => return Err(DateTimeParseError::invalid("timezone offset", input)),
    };

    let hours = parse_digits(hh).ok_or_else(|| DateTimeParseError::invalid("timezone offset", input))?;
    let minutes =
        parse_digits(mm).ok_or_else(|| DateTimeParseError::invalid("timezone offset", input))?;

    // Allow 24:00 as special case for ±24:00
    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(DateTimeParseError::invalid("timezone offset", input));
    }

    Ok(sign * (hours as i16 * 60 + minutes as i16))
}

/// Formats an offset in minutes as a timezone string (Z, +HH:MM, -HH:MM).
fn format_timezone_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }

    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs_offset = offset_min.unsigned_abs();
    let hours = abs_offset / 60;
    let minutes = abs_offset % 60;

    format!("{}{:02}:{:02}", sign, hours, minutes)
}

/// Parses an all-digit field.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses fractional seconds and returns microseconds.
fn parse_fractional_seconds(frac: &str) -> u32 {
    // Pad or truncate to 6 digits (microseconds)
    let mut padded = frac.to_string();
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.truncate(6);
    padded.parse().unwrap_or(0)
}

/// Formats microseconds as fractional seconds string, omitting if zero.
fn format_fractional_seconds(us: u32) -> String {
    if us == 0 {
        return String::new();
    }

    let str = format!("{:06}", us);
    let trimmed = str.trim_end_matches('0');
    format!(".{}", trimmed)
}

/// Returns true if the given year is a leap year.
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Calculates days since Unix epoch for a given date.
fn date_to_days(year: i32, month: u32, day: u32) -> i32 {
    // Howard Hinnant's days_from_civil
    let y = if month <= 2 { year - 1 } else { year } as i64;

    let m = if month <= 2 {
        month as i64 + 9
    } else {
        month as i64 - 3
    };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32; // year of era
    let doy = (153 * m as u32 + 2) / 5 + day - 1; // day of year
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era

    (era * 146097 + doe as i64 - 719468) as i32
}

/// Parses `dateTime.iso8601` text.
pub fn parse_iso8601(input: &str) -> Result<IsoDateTime, DateTimeParseError> {
    let s = input.trim();
    if !s.is_ascii() {
        return Err(DateTimeParseError::invalid("character", input));
    }

    let t = s
        .find(['T', 't'])
        .ok_or_else(|| DateTimeParseError::invalid("date/time separator", input))?;
    let (date_part, time_part) = (&s[..t], &s[t + 1..]);

    // YYYYMMDD or YYYY-MM-DD
    let (year, month, day) = match date_part.len() {
        8 => (&date_part[..4], &date_part[4..6], &date_part[6..8]),
        10 if date_part.as_bytes()[4] == b'-' && date_part.as_bytes()[7] == b'-' => {
            (&date_part[..4], &date_part[5..7], &date_part[8..10])
        }
        _ => return Err(DateTimeParseError::invalid("date", input)),
    };
    let year = parse_digits(year).ok_or_else(|| DateTimeParseError::invalid("year", input))?;
    let month = parse_digits(month).ok_or_else(|| DateTimeParseError::invalid("month", input))?;
    let day = parse_digits(day).ok_or_else(|| DateTimeParseError::invalid("day", input))?;

    // HH:MM:SS or HHMMSS
    let tb = time_part.as_bytes();
    let (hh, mm, ss, rest) = if tb.len() >= 8 && tb[2] == b':' && tb[5] == b':' {
        (&time_part[..2], &time_part[3..5], &time_part[6..8], &time_part[8..])
    } else if tb.len() >= 6 {
        (&time_part[..2], &time_part[2..4], &time_part[4..6], &time_part[6..])
    } else {
        return Err(DateTimeParseError::invalid("time", input));
    };
    let hour = parse_digits(hh).ok_or_else(|| DateTimeParseError::invalid("hours", input))?;
    let minute = parse_digits(mm).ok_or_else(|| DateTimeParseError::invalid("minutes", input))?;
    let second = parse_digits(ss).ok_or_else(|| DateTimeParseError::invalid("seconds", input))?;

    // Optional fractional seconds, then optional offset
    let (micros, offset_str) = match rest.strip_prefix(['.', ',']) {
        Some(frac_rest) => {
            let frac_end = frac_rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(frac_rest.len());
            if frac_end == 0 {
                return Err(DateTimeParseError::invalid("fractional seconds", input));
            }
            (
                parse_fractional_seconds(&frac_rest[..frac_end]),
                &frac_rest[frac_end..],
            )
        }
        None => (0, rest),
    };

    let offset_min = if offset_str.is_empty() {
        None
    } else {
        Some(parse_timezone_offset(offset_str, input)?)
    };

    let dt = IsoDateTime {
        year: year as i32,
        month: month.min(u8::MAX as u32) as u8,
        day: day.min(u8::MAX as u32) as u8,
        hour: hour.min(u8::MAX as u32) as u8,
        minute: minute.min(u8::MAX as u32) as u8,
        second: second.min(u8::MAX as u32) as u8,
        micros,
        offset_min,
    };
    dt.check_ranges(input)?;
    Ok(dt)
}

/// Formats a timestamp in the compact `YYYYMMDDTHH:MM:SS` form.
pub fn format_iso8601(dt: &IsoDateTime) -> String {
    let frac = format_fractional_seconds(dt.micros);
    let offset = dt.offset_min.map(format_timezone_offset).unwrap_or_default();

    format!(
        "{:04}{:02}{:02}T{:02}:{:02}:{:02}{}{}",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second, frac, offset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact() {
        let dt = parse_iso8601("19980717T14:08:55").unwrap();
        assert_eq!(
            dt,
            IsoDateTime {
                year: 1998,
                month: 7,
                day: 17,
                hour: 14,
                minute: 8,
                second: 55,
                micros: 0,
                offset_min: None,
            }
        );

        let dt = parse_iso8601("19980717T140855").unwrap();
        assert_eq!((dt.hour, dt.minute, dt.second), (14, 8, 55));
    }

    #[test]
    fn test_parse_extended_with_offset() {
        let dt = parse_iso8601("2024-03-15T14:30:00.5+05:30").unwrap();
        assert_eq!((dt.year, dt.month, dt.day), (2024, 3, 15));
        assert_eq!(dt.micros, 500_000);
        assert_eq!(dt.offset_min, Some(330));

        let dt = parse_iso8601("2024-03-15T14:30:00-0800").unwrap();
        assert_eq!(dt.offset_min, Some(-480));

        let dt = parse_iso8601("2024-03-15T14:30:00Z").unwrap();
        assert_eq!(dt.offset_min, Some(0));
    }

    #[test]
    fn test_format_compact() {
        let dt = IsoDateTime::new(1998, 7, 17, 14, 8, 55).unwrap();
        assert_eq!(format_iso8601(&dt), "19980717T14:08:55");
        assert_eq!(
            format_iso8601(&dt.with_micros(123_000).with_offset(-300).unwrap()),
            "19980717T14:08:55.123-05:00"
        );
        assert_eq!(format_iso8601(&dt.with_offset(0).unwrap()), "19980717T14:08:55Z");
    }

    #[test]
    fn test_roundtrip() {
        let inputs = [
            "19980717T14:08:55",
            "20000229T00:00:00Z",
            "20241231T23:59:59.999999+05:30",
            "19700101T00:00:00.5-08:00",
        ];

        for input in inputs {
            let dt = parse_iso8601(input).unwrap();
            assert_eq!(format_iso8601(&dt), input, "Roundtrip failed for {}", input);
        }
    }

    #[test]
    fn test_epoch_micros() {
        assert_eq!(parse_iso8601("19700101T00:00:00").unwrap().epoch_micros(), 0);
        assert_eq!(
            parse_iso8601("2024-03-15T14:30:00.123456Z").unwrap().epoch_micros(),
            1710513000123456
        );
        assert_eq!(
            parse_iso8601("1969-12-31T23:59:59Z").unwrap().epoch_micros(),
            -1_000_000
        );

        // 14:30 at +05:30 is 09:00 UTC
        let local = parse_iso8601("2024-03-15T14:30:00+05:30").unwrap();
        let utc = parse_iso8601("2024-03-15T09:00:00Z").unwrap();
        assert_eq!(local.epoch_micros(), utc.epoch_micros());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_iso8601("20241301T00:00:00").is_err()); // invalid month
        assert!(parse_iso8601("20230229T00:00:00").is_err()); // not a leap year
        assert!(parse_iso8601("20240101T24:00:00").is_err()); // invalid hour
        assert!(parse_iso8601("20240101T14:60:00").is_err()); // invalid minute
        assert!(parse_iso8601("20240101 14:00:00").is_err()); // no separator
        assert!(parse_iso8601("2024011T14:00:00").is_err()); // short date
        assert!(parse_iso8601("20240101T14:00:00+2401").is_err()); // offset out of range
        assert!(parse_iso8601("20240101T14:00:00.Z").is_err());
        assert!(parse_iso8601("2024-01-01T14:00:00é").is_err());
        assert!(IsoDateTime::new(2024, 2, 30, 0, 0, 0).is_err());
    }

    #[test]
    fn test_constructed_values_stay_in_range() {
        let err = IsoDateTime::new(2024, 3, 0, 0, 0, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid day in ISO 8601 datetime: 20240300T00:00:00"
        );

        let dt = IsoDateTime::new(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(dt.with_offset(10_000).is_err());
        assert!(dt.with_offset(-1441).is_err());
        assert_eq!(dt.with_offset(1440).unwrap().offset_minutes(), Some(1440));

        let east = dt.with_offset(-1440).unwrap();
        let text = format_iso8601(&east);
        assert_eq!(text, "20240301T00:00:00-24:00");
        assert_eq!(parse_iso8601(&text).unwrap(), east);
        assert_eq!(east.epoch_micros(), dt.epoch_micros() + MICROSECONDS_PER_DAY);
    }

    #[test]
    fn test_error_message_names_input() {
        let err = parse_iso8601("20241301T00:00:00").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid month in ISO 8601 datetime: 20241301T00:00:00"
        );
    }
}
