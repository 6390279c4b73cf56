//! Property tests for the pipeline invariants

use fieldcheck_core::{CellValue, RawGrid};
use fieldcheck_ingest::{
    classify, coerce, parse_grid, DurationUnits, FieldKind, MetadataKind, MetadataValue, Schema,
    SignedDuration, Timeliness,
};
use proptest::prelude::*;

/// A cell as inspectors tend to fill them
fn cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        Just(CellValue::text("")),
        Just(CellValue::text("   ")),
        "[A-Z][0-9]{1,3}".prop_map(CellValue::text),
        "[+-]?[0-9]{1,2}:[0-5][0-9]".prop_map(CellValue::text),
        (-500i32..500).prop_map(|n| CellValue::Number(n as f64)),
        (0.0f64..1.0).prop_map(CellValue::Number),
        "[a-z ]{0,12}".prop_map(CellValue::text),
    ]
}

/// Any cell at all, including huge, negative and non-finite numbers
fn any_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        any::<f64>().prop_map(CellValue::Number),
        any::<f64>().prop_map(|n| CellValue::text(n.to_string())),
        "[+-]?[0-9]{1,24}(\\.[0-9]{0,6})?".prop_map(CellValue::text),
        "\\PC*".prop_map(CellValue::text),
    ]
}

const HEADER: [&str; 6] = ["Serv", "Ruta", "Conductor", "Hora", "GPS", "Observaciones"];

fn form(rows: Vec<Vec<CellValue>>) -> RawGrid {
    let mut grid = RawGrid::new();
    grid.push_row(vec![CellValue::text("Lugar"), CellValue::text("Centro")]);
    grid.push_row(HEADER.iter().map(|h| CellValue::from(*h)).collect());
    for row in rows {
        grid.push_row(row);
    }
    grid
}

fn data_rows() -> impl Strategy<Value = Vec<Vec<CellValue>>> {
    prop::collection::vec(prop::collection::vec(cell(), 0..=HEADER.len()), 0..20)
}

proptest! {
    /// Parsing is a pure function of the grid
    #[test]
    fn prop_parse_is_deterministic(rows in data_rows()) {
        let grid = form(rows);
        let schema = Schema::daily_inspection();

        let first = serde_json::to_string(&parse_grid(&grid, schema)).unwrap();
        let second = serde_json::to_string(&parse_grid(&grid, schema)).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A row survives iff one of serv/ruta/conductor is non-blank
    #[test]
    fn prop_identifying_filter(rows in data_rows()) {
        let expected: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().take(3).any(|c| !coerce::coerce_text(c).is_empty()))
            .map(|(i, _)| i + 3)
            .collect();

        let result = parse_grid(&form(rows), Schema::daily_inspection());
        let actual: Vec<usize> = result.records().iter().map(|r| r.row).collect();

        prop_assert_eq!(result.success, !expected.is_empty());
        prop_assert_eq!(actual, expected);
    }

    /// Status depends only on the sign and the two minute mark
    #[test]
    fn prop_status_boundary(seconds in any::<i64>()) {
        let expected = if seconds < 0 {
            Timeliness::Late
        } else if seconds < 120 {
            Timeliness::OnTime
        } else {
            Timeliness::Early
        };
        prop_assert_eq!(classify(seconds), expected);
    }

    /// Formatting and re-parsing keeps the signed total
    #[test]
    fn prop_duration_round_trip(total in -360_000i64..360_000) {
        let duration = SignedDuration::from_total_seconds(total);
        let parsed: SignedDuration = duration.to_string().parse().unwrap();
        prop_assert_eq!(parsed.total_seconds(), total);
        prop_assert_eq!(parsed, duration);
    }

    /// Colon text reads the same under both unit conventions
    #[test]
    fn prop_colon_text_ignores_units(negative in any::<bool>(), m in 0u32..100, s in 0u32..60) {
        let text = format!("{}{}:{:02}", if negative { "-" } else { "+" }, m, s);
        let cell = CellValue::text(text);
        prop_assert_eq!(
            SignedDuration::from_cell(&cell, DurationUnits::Seconds),
            SignedDuration::from_cell(&cell, DurationUnits::ClockSerial)
        );
    }

    /// Every field coercer returns a value for any cell
    #[test]
    fn prop_field_coercion_is_total(c in any_cell(), seconds in any::<bool>()) {
        let units = if seconds { DurationUnits::Seconds } else { DurationUnits::ClockSerial };
        for kind in [
            FieldKind::Text,
            FieldKind::Time,
            FieldKind::Duration,
            FieldKind::Count,
            FieldKind::Flag,
        ] {
            let _ = coerce::coerce_field(&c, kind, units);
        }

        let time = coerce::coerce_time(&c);
        prop_assert!(time.is_empty() || time.len() >= 7, "{:?}", time);
        let duration = SignedDuration::from_cell(&c, units);
        prop_assert!(duration.minutes.signum() * duration.seconds.signum() >= 0);
    }

    /// Every metadata coercer returns for any cell in either date system
    #[test]
    fn prop_metadata_coercion_is_total(c in any_cell(), date_1904 in any::<bool>()) {
        if let Some(date) = coerce::coerce_date(&c, date_1904) {
            prop_assert!(!date.is_empty());
        }
        let _ = coerce::coerce_integer(&c);
        for kind in [MetadataKind::Text, MetadataKind::Date, MetadataKind::Integer] {
            let _ = coerce::coerce_metadata(&c, kind, date_1904);
        }
    }

    /// A form parses whatever sits in its metadata and data cells
    #[test]
    fn prop_parse_is_total(date in any_cell(), total in any_cell(), gps in any_cell()) {
        let mut grid = RawGrid::new();
        grid.push_row(vec![CellValue::text("Fecha"), date]);
        grid.push_row(vec![CellValue::text("Total pasajeros"), total]);
        grid.push_row(HEADER.iter().map(|h| CellValue::from(*h)).collect());
        grid.push_row(vec![
            CellValue::text("S1"),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::text("08:00"),
            gps,
        ]);
        prop_assert!(parse_grid(&grid, Schema::daily_inspection()).success);
    }
}

/// Test the fixed classification boundaries
#[test]
fn test_status_boundary_points() {
    assert_eq!(classify(-1), Timeliness::Late);
    assert_eq!(classify(0), Timeliness::OnTime);
    assert_eq!(classify(119), Timeliness::OnTime);
    assert_eq!(classify(120), Timeliness::Early);
}

/// Test the documented duration round trips
#[test]
fn test_duration_round_trip_points() {
    let early = SignedDuration { minutes: 2, seconds: 30 };
    assert_eq!(early.to_string(), "+02:30");
    assert_eq!("+02:30".parse::<SignedDuration>().unwrap(), early);

    let late = SignedDuration { minutes: -1, seconds: -5 };
    assert_eq!(late.to_string(), "-01:05");
    assert_eq!("-01:05".parse::<SignedDuration>().unwrap().total_seconds(), -65);
}

/// Test report detection without an explicit marker column
#[test]
fn test_report_mention_without_flag_column() {
    let grid = RawGrid::from(vec![
        vec!["Serv", "Hora", "GPS", "Observaciones"],
        vec!["S1", "08:00", "0", "INFORME DE LO OCURRIDO"],
        vec!["S2", "08:10", "0", "Informe de lo ocurrido"],
    ]);
    let result = parse_grid(&grid, Schema::daily_inspection());
    assert!(result.records().iter().all(|r| r.non_compliance));
}

/// Test that date serials past the spreadsheet range are dropped
#[test]
fn test_out_of_range_date_does_not_abort_parse() {
    for date in [CellValue::Number(1e12), CellValue::text("999999999999")] {
        let mut grid = RawGrid::new();
        grid.push_row(vec![CellValue::text("Fecha"), date]);
        grid.push_row(vec!["Serv".into(), "Hora".into(), "GPS".into()]);
        grid.push_row(vec!["S1".into(), "08:00".into(), "0".into()]);

        let result = parse_grid(&grid, Schema::daily_inspection());
        assert!(result.success, "{}", result.message);
        assert_eq!(result.form_header().unwrap().get("date"), None);
        assert_eq!(result.records().len(), 1);
    }
}

/// Test that repeated metadata labels keep the first value
#[test]
fn test_metadata_first_match_wins() {
    let grid = RawGrid::from(vec![
        vec!["Lugar", "Primero"],
        vec!["LUGAR ", "Segundo"],
        vec!["Serv", "Hora", "GPS"],
        vec!["S1", "08:00", "0"],
    ]);
    let result = parse_grid(&grid, Schema::daily_inspection());
    assert_eq!(
        result.form_header().unwrap()["place"],
        MetadataValue::Text("Primero".into())
    );
}
