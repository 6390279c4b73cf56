//! Signed minute/second offsets ("GPS variance")

use std::fmt;
use std::str::FromStr;

use fieldcheck_core::{serial, CellValue};
use lazy_regex::regex_captures;
use serde::Serialize;
use thiserror::Error;

use crate::schema::DurationUnits;

/// A signed offset split into minutes and seconds.
///
/// Both parts carry the sign: -65 seconds is `{ minutes: -1, seconds: -5 }`.
/// Negative offsets mean the service ran late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SignedDuration {
    pub minutes: i32,
    pub seconds: i32,
}

/// Error returned by [`SignedDuration::from_str`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration '{0}': expected [+|-]MM:SS")]
pub struct ParseDurationError(String);

impl SignedDuration {
    /// The zero offset
    pub const ZERO: SignedDuration = SignedDuration {
        minutes: 0,
        seconds: 0,
    };

    /// Build from magnitude parts and a sign
    pub fn from_parts(negative: bool, minutes: u32, seconds: u32) -> Self {
        let total = minutes as i64 * 60 + seconds as i64;
        Self::from_total_seconds(if negative { -total } else { total })
    }

    /// Split a signed number of seconds
    pub fn from_total_seconds(total: i64) -> Self {
        let total = total.clamp(i32::MIN as i64 * 60, i32::MAX as i64 * 60);
        Self {
            minutes: (total / 60) as i32,
            seconds: (total % 60) as i32,
        }
    }

    /// Signed number of seconds
    pub fn total_seconds(&self) -> i64 {
        self.minutes as i64 * 60 + self.seconds as i64
    }

    /// Check if the offset is below zero
    pub fn is_negative(&self) -> bool {
        self.total_seconds() < 0
    }

    /// Coerce a raw cell into an offset; unreadable input yields zero.
    ///
    /// Accepted shapes, optionally wrapped in parentheses:
    /// - `+MM:SS` / `-M:SS` colon notation
    /// - `H:MM:SS` clock text (see [`DurationUnits`] for its reading)
    /// - bare integers and decimals, read according to `units`
    /// - numeric cells, read according to `units`
    pub fn from_cell(cell: &CellValue, units: DurationUnits) -> Self {
        match cell {
            CellValue::Empty => Self::ZERO,
            CellValue::Number(n) => Self::from_number(*n, units),
            CellValue::Text(s) => Self::from_text(s, units),
        }
    }

    fn from_text(text: &str, units: DurationUnits) -> Self {
        let mut s = text.trim();
        if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            s = inner.trim();
        }
        if s.is_empty() {
            return Self::ZERO;
        }

        if let Some(d) = parse_colon(s, units) {
            return d;
        }
        if let Ok(n) = s.parse::<i64>() {
            return Self::from_number(n as f64, units);
        }
        match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::from_number(n, units),
            _ => {
                log::trace!("unreadable duration '{}', defaulting to zero", text);
                Self::ZERO
            }
        }
    }

    fn from_number(n: f64, units: DurationUnits) -> Self {
        if !n.is_finite() {
            return Self::ZERO;
        }
        match units {
            DurationUnits::Seconds => Self::from_total_seconds(n.round() as i64),
            DurationUnits::ClockSerial if n.fract() == 0.0 => {
                Self::from_total_seconds((n as i64).saturating_mul(60))
            }
            DurationUnits::ClockSerial if n.abs() < 1.0 => {
                // The cell held "MM:SS" but the spreadsheet stored it as the
                // clock time MM:SS:00, so hours are minutes and minutes are
                // seconds.
                match serial::hms_from_serial(n.abs()) {
                    Some((hours, minutes, _)) => Self::from_parts(n < 0.0, hours, minutes),
                    None => Self::ZERO,
                }
            }
            DurationUnits::ClockSerial => Self::from_total_seconds((n * 60.0).round() as i64),
        }
    }
}

/// Parse colon notation.
///
/// `MM:SS` is always minutes and seconds. A three-part `H:MM:SS` is a real
/// clock duration under [`DurationUnits::Seconds`], while under
/// [`DurationUnits::ClockSerial`] it is the text rendering of a remapped
/// time serial and its hours and minutes become minutes and seconds.
fn parse_colon(s: &str, units: DurationUnits) -> Option<SignedDuration> {
    let (_, sign, first, second, third) =
        regex_captures!(r"^([+-]?)\s*(\d{1,4}):(\d{1,2})(?::(\d{1,2}))?$", s)?;

    let negative = sign == "-";
    let first: u32 = first.parse().ok()?;
    let second: u32 = second.parse().ok()?;
    if second >= 60 {
        return None;
    }

    if third.is_empty() {
        return Some(SignedDuration::from_parts(negative, first, second));
    }

    let third: u32 = third.parse().ok()?;
    if third >= 60 {
        return None;
    }
    Some(match units {
        DurationUnits::Seconds => {
            SignedDuration::from_parts(negative, first * 60 + second, third)
        }
        DurationUnits::ClockSerial => SignedDuration::from_parts(negative, first, second),
    })
}

impl fmt::Display for SignedDuration {
    /// Formats as `+MM:SS` or `-MM:SS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { '-' } else { '+' };
        let abs = self.total_seconds().unsigned_abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}

impl FromStr for SignedDuration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, sign, minutes, seconds) = regex_captures!(r"^([+-]?)(\d+):(\d{2})$", s.trim())
            .ok_or_else(|| ParseDurationError(s.to_string()))?;

        let minutes: u32 = minutes
            .parse()
            .map_err(|_| ParseDurationError(s.to_string()))?;
        let seconds: u32 = seconds
            .parse()
            .map_err(|_| ParseDurationError(s.to_string()))?;
        if seconds >= 60 {
            return Err(ParseDurationError(s.to_string()));
        }

        Ok(Self::from_parts(sign == "-", minutes, seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str, units: DurationUnits) -> SignedDuration {
        SignedDuration::from_cell(&CellValue::text(s), units)
    }

    fn num(n: f64, units: DurationUnits) -> SignedDuration {
        SignedDuration::from_cell(&CellValue::Number(n), units)
    }

    #[test]
    fn test_split_keeps_sign_on_both_parts() {
        assert_eq!(
            SignedDuration::from_total_seconds(-65),
            SignedDuration { minutes: -1, seconds: -5 }
        );
        assert_eq!(
            SignedDuration::from_total_seconds(150),
            SignedDuration { minutes: 2, seconds: 30 }
        );
        assert_eq!(SignedDuration::from_parts(true, 0, 30).total_seconds(), -30);
    }

    #[test]
    fn test_colon_notation() {
        use DurationUnits::*;
        for units in [Seconds, ClockSerial] {
            assert_eq!(text("+02:30", units).total_seconds(), 150);
            assert_eq!(text("-1:05", units).total_seconds(), -65);
            assert_eq!(text("(-01:05)", units).total_seconds(), -65);
            assert_eq!(text(" ( 3:00 ) ", units).total_seconds(), 180);
            assert_eq!(text("2:75", units), SignedDuration::ZERO);
        }
    }

    #[test]
    fn test_three_part_clock_text() {
        assert_eq!(text("0:02:30", DurationUnits::Seconds).total_seconds(), 150);
        assert_eq!(text("1:00:00", DurationUnits::Seconds).total_seconds(), 3600);
        // Hours read as minutes, minutes as seconds
        assert_eq!(
            text("02:30:00", DurationUnits::ClockSerial),
            SignedDuration { minutes: 2, seconds: 30 }
        );
    }

    #[test]
    fn test_bare_numbers_in_seconds() {
        use DurationUnits::Seconds;
        assert_eq!(text("+150", Seconds).total_seconds(), 150);
        assert_eq!(text("-65", Seconds), SignedDuration { minutes: -1, seconds: -5 });
        assert_eq!(text("90.6", Seconds).total_seconds(), 91);
        assert_eq!(num(-30.0, Seconds).total_seconds(), -30);
    }

    #[test]
    fn test_bare_numbers_in_clock_serial() {
        use DurationUnits::ClockSerial;
        // Whole numbers are minutes
        assert_eq!(num(-2.0, ClockSerial).total_seconds(), -120);
        assert_eq!(text("3", ClockSerial).total_seconds(), 180);
        // Decimals of one or more are fractional minutes
        assert_eq!(num(1.5, ClockSerial).total_seconds(), 90);
        // Day fractions are remapped time serials: 02:30 -> 2 min 30 s
        let serial = (2.0 * 3600.0 + 30.0 * 60.0) / 86_400.0;
        assert_eq!(
            num(serial, ClockSerial),
            SignedDuration { minutes: 2, seconds: 30 }
        );
        assert_eq!(
            num(-serial, ClockSerial),
            SignedDuration { minutes: -2, seconds: -30 }
        );
    }

    #[test]
    fn test_unreadable_defaults_to_zero() {
        use DurationUnits::Seconds;
        assert_eq!(text("", Seconds), SignedDuration::ZERO);
        assert_eq!(text("()", Seconds), SignedDuration::ZERO);
        assert_eq!(text("tarde", Seconds), SignedDuration::ZERO);
        assert_eq!(text("NaN", Seconds), SignedDuration::ZERO);
        assert_eq!(
            SignedDuration::from_cell(&CellValue::Empty, Seconds),
            SignedDuration::ZERO
        );
    }

    #[test]
    fn test_display_and_parse() {
        let d = SignedDuration { minutes: 2, seconds: 30 };
        assert_eq!(d.to_string(), "+02:30");
        assert_eq!("+02:30".parse::<SignedDuration>().unwrap(), d);

        let late = SignedDuration { minutes: -1, seconds: -5 };
        assert_eq!(late.to_string(), "-01:05");
        assert_eq!(
            "-01:05".parse::<SignedDuration>().unwrap().total_seconds(),
            late.total_seconds()
        );

        assert_eq!(SignedDuration::ZERO.to_string(), "+00:00");
        assert!("2:5".parse::<SignedDuration>().is_err());
        assert!("+01:60".parse::<SignedDuration>().is_err());
    }
}
