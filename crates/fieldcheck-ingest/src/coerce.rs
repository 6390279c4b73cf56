//! Cell coercion
//!
//! Every coercer is total: input it cannot read resolves to the kind's
//! default (empty text, zero count, zero offset, `false`) and is logged at
//! trace level.

use chrono::{Datelike, NaiveDate};
use fieldcheck_core::{serial, CellValue};
use lazy_regex::regex_captures;

use crate::duration::SignedDuration;
use crate::record::{FieldValue, MetadataValue};
use crate::schema::{DurationUnits, FieldKind, MetadataKind};

/// Text values read as an explicit "yes"
const TRUE_MARKERS: [&str; 5] = ["true", "1", "yes", "sí", "si"];

/// Day-first and year-first layouts seen in exported forms
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Trimmed display text
pub fn coerce_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Time of day as `HH:MM:SS`.
///
/// Numeric cells are clock serials. Text already shaped `H:MM` or
/// `H:MM:SS` is kept, with `:00` appended when seconds are missing.
pub fn coerce_time(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => serial::time_string_from_serial(*n).unwrap_or_default(),
        CellValue::Text(s) => {
            let s = s.trim();
            match regex_captures!(r"^(\d{1,2}):([0-5]\d)(?::([0-5]\d))?$", s) {
                Some((_, _, _, "")) => format!("{}:00", s),
                Some(_) => s.to_string(),
                None => {
                    if !s.is_empty() {
                        log::trace!("unreadable time '{}', defaulting to empty", s);
                    }
                    String::new()
                }
            }
        }
    }
}

/// Non-negative whole count; fractions are truncated
pub fn coerce_count(cell: &CellValue) -> u32 {
    let count = match cell {
        CellValue::Empty => Some(0),
        CellValue::Number(n) => count_from_f64(*n),
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0)
            } else {
                s.parse::<u32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(count_from_f64))
            }
        }
    };
    count.unwrap_or_else(|| {
        log::trace!("unreadable count ({} '{}'), defaulting to 0", cell.type_name(), cell);
        0
    })
}

fn count_from_f64(n: f64) -> Option<u32> {
    if n.is_finite() && n >= 0.0 {
        Some(n.trunc().min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

/// Explicit yes/no marker, matched case-insensitively
pub fn coerce_flag(cell: &CellValue) -> bool {
    let text = cell.to_string().trim().to_lowercase();
    TRUE_MARKERS.contains(&text.as_str())
}

/// Calendar date as `YYYY-MM-DD`, or `None` when unreadable.
///
/// Numbers (and numeric text) are date serials in the grid's date system.
/// Text takes its first whitespace-separated token, so a trailing clock
/// time is ignored; two-digit years are read as 20xx.
pub fn coerce_date(cell: &CellValue, date_1904: bool) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(n) => serial::date_string_from_serial(*n, date_1904),
        CellValue::Text(s) => {
            let token = s.split_whitespace().next()?;
            if let Ok(n) = token.parse::<f64>() {
                return serial::date_string_from_serial(n, date_1904);
            }
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
                .map(|date| {
                    let year = if date.year() < 100 {
                        date.year() + 2000
                    } else {
                        date.year()
                    };
                    format!("{:04}-{:02}-{:02}", year, date.month(), date.day())
                })
        }
    }
}

/// Whole number, 0 when unreadable
pub fn coerce_integer(cell: &CellValue) -> i64 {
    let value = match cell {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Number(_) => None,
        CellValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(|n| n.trunc() as i64)
            })
        }
    };
    value.unwrap_or_else(|| {
        log::trace!("unreadable integer ({} '{}'), defaulting to 0", cell.type_name(), cell);
        0
    })
}

/// Coerce a data cell by declared kind
pub fn coerce_field(cell: &CellValue, kind: FieldKind, units: DurationUnits) -> FieldValue {
    match kind {
        FieldKind::Text => FieldValue::Text(coerce_text(cell)),
        FieldKind::Time => FieldValue::Time(coerce_time(cell)),
        FieldKind::Duration => FieldValue::Duration(SignedDuration::from_cell(cell, units)),
        FieldKind::Count => FieldValue::Count(coerce_count(cell)),
        FieldKind::Flag => FieldValue::Flag(coerce_flag(cell)),
    }
}

/// Value of a field whose column is absent
pub fn default_field(kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Text => FieldValue::Text(String::new()),
        FieldKind::Time => FieldValue::Time(String::new()),
        FieldKind::Duration => FieldValue::Duration(SignedDuration::ZERO),
        FieldKind::Count => FieldValue::Count(0),
        FieldKind::Flag => FieldValue::Flag(false),
    }
}

/// Coerce a metadata value by declared kind.
///
/// Returns `None` only for dates that cannot be read.
pub fn coerce_metadata(
    cell: &CellValue,
    kind: MetadataKind,
    date_1904: bool,
) -> Option<MetadataValue> {
    match kind {
        MetadataKind::Text => Some(MetadataValue::Text(coerce_text(cell))),
        MetadataKind::Date => coerce_date(cell, date_1904).map(MetadataValue::Date),
        MetadataKind::Integer => Some(MetadataValue::Integer(coerce_integer(cell))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn test_time_text() {
        assert_eq!(coerce_time(&t("08:00")), "08:00:00");
        assert_eq!(coerce_time(&t(" 8:05 ")), "8:05:00");
        assert_eq!(coerce_time(&t("17:45:10")), "17:45:10");
        assert_eq!(coerce_time(&t("8h")), "");
        assert_eq!(coerce_time(&t("25:61")), "");
        assert_eq!(coerce_time(&CellValue::Empty), "");
    }

    #[test]
    fn test_time_serial() {
        assert_eq!(coerce_time(&CellValue::Number(0.5)), "12:00:00");
        assert_eq!(coerce_time(&CellValue::Number(8.0 / 24.0)), "08:00:00");
        // Date part is ignored
        assert_eq!(coerce_time(&CellValue::Number(45366.75)), "18:00:00");
        assert_eq!(coerce_time(&CellValue::Number(-0.5)), "");
    }

    #[test]
    fn test_count() {
        assert_eq!(coerce_count(&CellValue::Number(10.0)), 10);
        assert_eq!(coerce_count(&CellValue::Number(3.9)), 3);
        assert_eq!(coerce_count(&t(" 12 ")), 12);
        assert_eq!(coerce_count(&t("4.0")), 4);
        assert_eq!(coerce_count(&t("")), 0);
        assert_eq!(coerce_count(&t("muchos")), 0);
        assert_eq!(coerce_count(&CellValue::Number(-2.0)), 0);
        assert_eq!(coerce_count(&t("-2")), 0);
    }

    #[test]
    fn test_flag() {
        for yes in ["true", "TRUE", "1", "Yes", "sí", "SÍ", "si", " Si "] {
            assert!(coerce_flag(&t(yes)), "{yes}");
        }
        assert!(coerce_flag(&CellValue::Number(1.0)));
        for no in ["", "no", "false", "0", "x"] {
            assert!(!coerce_flag(&t(no)), "{no}");
        }
        assert!(!coerce_flag(&CellValue::Empty));
    }

    #[test]
    fn test_text() {
        assert_eq!(coerce_text(&t("  Calle 5 ")), "Calle 5");
        assert_eq!(coerce_text(&CellValue::Number(12.0)), "12");
        assert_eq!(coerce_text(&CellValue::Empty), "");
    }

    #[test]
    fn test_date() {
        assert_eq!(
            coerce_date(&CellValue::Number(45366.0), false).as_deref(),
            Some("2024-03-15")
        );
        assert_eq!(coerce_date(&t("2024-03-15"), false).as_deref(), Some("2024-03-15"));
        assert_eq!(coerce_date(&t("2024/3/5"), false).as_deref(), Some("2024-03-05"));
        assert_eq!(coerce_date(&t("15/03/2024"), false).as_deref(), Some("2024-03-15"));
        assert_eq!(coerce_date(&t("15-03-2024 08:30"), false).as_deref(), Some("2024-03-15"));
        assert_eq!(coerce_date(&t("15.03.24"), false).as_deref(), Some("2024-03-15"));
        assert_eq!(coerce_date(&t("45366"), false).as_deref(), Some("2024-03-15"));
        assert_eq!(coerce_date(&t("mañana"), false), None);
        assert_eq!(coerce_date(&CellValue::Number(1e12), false), None);
        assert_eq!(coerce_date(&t("999999999999"), true), None);
        assert_eq!(coerce_date(&t("1e308"), false), None);
        assert_eq!(coerce_date(&CellValue::Empty, false), None);
    }

    #[test]
    fn test_integer() {
        assert_eq!(coerce_integer(&CellValue::Number(42.0)), 42);
        assert_eq!(coerce_integer(&t(" 17 ")), 17);
        assert_eq!(coerce_integer(&t("17.8")), 17);
        assert_eq!(coerce_integer(&t("n/a")), 0);
        assert_eq!(coerce_integer(&CellValue::Empty), 0);
    }

    #[test]
    fn test_field_defaults() {
        assert_eq!(default_field(FieldKind::Count), FieldValue::Count(0));
        assert_eq!(default_field(FieldKind::Time), FieldValue::Time(String::new()));
        assert_eq!(
            default_field(FieldKind::Duration),
            FieldValue::Duration(SignedDuration::ZERO)
        );
        assert_eq!(
            coerce_field(&t("+02:30"), FieldKind::Duration, DurationUnits::Seconds),
            FieldValue::Duration(SignedDuration::from_total_seconds(150))
        );
    }

    #[test]
    fn test_metadata() {
        assert_eq!(
            coerce_metadata(&t(" Downtown "), MetadataKind::Text, false),
            Some(MetadataValue::Text("Downtown".into()))
        );
        assert_eq!(
            coerce_metadata(&t("x"), MetadataKind::Integer, false),
            Some(MetadataValue::Integer(0))
        );
        assert_eq!(coerce_metadata(&t("x"), MetadataKind::Date, false), None);
    }
}
