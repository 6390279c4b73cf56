//! Spreadsheet date/time serial decoding
//!
//! Spreadsheets store dates as serial numbers (days since a base date) and
//! times as the fractional part of a day.
//!
//! Notes:
//! - In the 1900 date system, serial 1 is 1900-01-01 and Excel includes the
//!   historical "1900 leap year" bug, inserting a non-existent day 1900-02-29
//!   as serial 60.
//! - In the 1904 date system, serial 0 is 1904-01-01.

use chrono::{Datelike, Duration, NaiveDate};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Largest serial a spreadsheet can display as a date (9999-12-31 in the
/// 1900 system)
pub const MAX_DATE_SERIAL: i64 = 2_958_465;

/// Days between the 1900 and 1904 epochs
const EPOCH_1904_OFFSET: i64 = 1_462;

/// Decode a whole-day serial into `(year, month, day)`.
///
/// Returns `None` for negative serials and serials past 9999-12-31.
pub fn ymd_from_serial(serial: i64, date_1904: bool) -> Option<(i32, u32, u32)> {
    let max = if date_1904 {
        MAX_DATE_SERIAL - EPOCH_1904_OFFSET
    } else {
        MAX_DATE_SERIAL
    };
    if !(0..=max).contains(&serial) {
        return None;
    }
    if date_1904 {
        let base = NaiveDate::from_ymd_opt(1904, 1, 1)?;
        let date = base.checked_add_signed(Duration::days(serial))?;
        return Some((date.year(), date.month(), date.day()));
    }

    // Serial 60 is the fictional 1900-02-29.
    if serial == 60 {
        return Some((1900, 2, 29));
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 31)?;
    let adjusted = if serial > 60 { serial - 1 } else { serial };
    let date = base.checked_add_signed(Duration::days(adjusted))?;
    Some((date.year(), date.month(), date.day()))
}

/// Decode a serial into a `YYYY-MM-DD` string, ignoring any time fraction.
pub fn date_string_from_serial(serial: f64, date_1904: bool) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let (y, m, d) = ymd_from_serial(serial.floor() as i64, date_1904)?;
    Some(format!("{:04}-{:02}-{:02}", y, m, d))
}

/// Decode the time-of-day part of a serial into `(hours, minutes, seconds)`.
///
/// The whole-day part is ignored, so a full date-time serial yields its
/// clock time. Values are rounded to the nearest second; a fraction that
/// rounds up to midnight wraps to `(0, 0, 0)`.
pub fn hms_from_serial(serial: f64) -> Option<(u32, u32, u32)> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let total = (serial.fract() * SECONDS_PER_DAY).round() as u32 % 86_400;
    Some((total / 3600, (total % 3600) / 60, total % 60))
}

/// Decode the time-of-day part of a serial into an `HH:MM:SS` string.
pub fn time_string_from_serial(serial: f64) -> Option<String> {
    let (h, m, s) = hms_from_serial(serial)?;
    Some(format!("{:02}:{:02}:{:02}", h, m, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_1900_system() {
        assert_eq!(ymd_from_serial(1, false), Some((1900, 1, 1)));
        assert_eq!(ymd_from_serial(59, false), Some((1900, 2, 28)));
        assert_eq!(ymd_from_serial(60, false), Some((1900, 2, 29)));
        assert_eq!(ymd_from_serial(61, false), Some((1900, 3, 1)));
        assert_eq!(ymd_from_serial(45366, false), Some((2024, 3, 15)));
        assert_eq!(ymd_from_serial(-1, false), None);
    }

    #[test]
    fn test_serial_upper_bound() {
        assert_eq!(ymd_from_serial(MAX_DATE_SERIAL, false), Some((9999, 12, 31)));
        assert_eq!(ymd_from_serial(MAX_DATE_SERIAL + 1, false), None);
        assert_eq!(ymd_from_serial(i64::MAX, false), None);
        assert_eq!(ymd_from_serial(MAX_DATE_SERIAL - 1_462, true), Some((9999, 12, 31)));
        assert_eq!(ymd_from_serial(MAX_DATE_SERIAL - 1_461, true), None);
        assert_eq!(ymd_from_serial(i64::MAX, true), None);
        assert_eq!(date_string_from_serial(1e12, false), None);
        assert_eq!(date_string_from_serial(f64::MAX, true), None);
        assert_eq!(date_string_from_serial(f64::INFINITY, false), None);
    }

    #[test]
    fn test_1904_system() {
        assert_eq!(ymd_from_serial(0, true), Some((1904, 1, 1)));
        assert_eq!(ymd_from_serial(1462, true), Some((1908, 1, 2)));
    }

    #[test]
    fn test_date_string() {
        assert_eq!(
            date_string_from_serial(45366.75, false).as_deref(),
            Some("2024-03-15")
        );
        assert_eq!(date_string_from_serial(f64::NAN, false), None);
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(hms_from_serial(0.5), Some((12, 0, 0)));
        assert_eq!(hms_from_serial(8.0 / 24.0), Some((8, 0, 0)));
        assert_eq!(
            time_string_from_serial(45366.0 + 8.5 / 24.0).as_deref(),
            Some("08:30:00")
        );
        // 00:02:30 expressed as a fraction of a day
        assert_eq!(hms_from_serial(150.0 / 86_400.0), Some((0, 2, 30)));
        assert_eq!(hms_from_serial(0.999_999_9), Some((0, 0, 0)));
        assert_eq!(hms_from_serial(-0.1), None);
    }
}
