//! Data row normalization

use std::collections::BTreeMap;

use ahash::AHashMap;
use fieldcheck_core::RawGrid;

use crate::coerce::{coerce_field, default_field};
use crate::columns::ColumnIndexMap;
use crate::record::{FieldValue, NormalizedRecord};
use crate::schema::Schema;
use crate::status::classify;

/// Observation text mentioning a filed report marks the row non-compliant
const REPORT_TOKEN: &str = "informe";

/// Records built from the rows below the header
#[derive(Debug, Clone, Default)]
pub struct NormalizedRows {
    /// Surviving records in grid order
    pub records: Vec<NormalizedRecord>,
    /// Rows examined
    pub scanned: usize,
    /// Rows discarded for lacking identifying data
    pub dropped: usize,
}

/// Normalize every grid row after `header_row`.
///
/// Each schema field is coerced from its mapped column or defaulted when
/// unmapped. Rows whose identifying fields are all empty are discarded.
/// Ids are `"{id_prefix}-{row}"` with the 1-based grid row.
pub fn normalize_rows(
    grid: &RawGrid,
    header_row: usize,
    columns: &ColumnIndexMap,
    schema: &Schema,
    id_prefix: &str,
) -> NormalizedRows {
    let column_of: AHashMap<&str, usize> = columns
        .iter()
        .map(|(index, key)| (key.as_str(), *index))
        .collect();
    let units = schema.duration_units();

    let mut out = NormalizedRows::default();
    for index in header_row + 1..grid.len() {
        out.scanned += 1;

        let fields: BTreeMap<String, FieldValue> = schema
            .data_fields()
            .iter()
            .map(|field| {
                let value = match column_of.get(field.key.as_str()) {
                    Some(&col) => coerce_field(grid.cell(index, col), field.kind, units),
                    None => default_field(field.kind),
                };
                (field.key.clone(), value)
            })
            .collect();

        let identified = schema
            .identifying_fields()
            .iter()
            .any(|key| fields.get(key).is_some_and(|v| !v.is_blank()));
        if !identified {
            log::trace!("row {} has no identifying data, dropping", index + 1);
            out.dropped += 1;
            continue;
        }

        let offset = schema
            .duration_field()
            .and_then(|key| fields.get(key))
            .and_then(FieldValue::as_duration)
            .map_or(0, |d| d.total_seconds());

        let non_compliance =
            explicitly_flagged(&fields, schema) || mentions_report(&fields, schema);

        let row = index + 1;
        out.records.push(NormalizedRecord {
            id: format!("{}-{}", id_prefix, row),
            row,
            fields,
            status: classify(offset),
            non_compliance,
        });
    }

    out
}

fn explicitly_flagged(fields: &BTreeMap<String, FieldValue>, schema: &Schema) -> bool {
    schema
        .explicit_non_compliance_field()
        .and_then(|key| fields.get(key))
        .and_then(FieldValue::as_flag)
        .unwrap_or(false)
}

fn mentions_report(fields: &BTreeMap<String, FieldValue>, schema: &Schema) -> bool {
    let text = schema
        .observation_fields()
        .iter()
        .filter_map(|key| fields.get(key).and_then(FieldValue::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    text.to_lowercase().contains(REPORT_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::map_columns;
    use crate::status::Timeliness;
    use fieldcheck_core::CellValue;

    fn run(rows: Vec<Vec<&str>>, schema: &Schema) -> NormalizedRows {
        let grid = RawGrid::from(rows);
        let columns = map_columns(grid.row(0).unwrap_or_default(), schema);
        normalize_rows(&grid, 0, &columns, schema, "check")
    }

    #[test]
    fn test_unmapped_fields_get_defaults() {
        let out = run(
            vec![vec!["Serv", "Hora", "GPS"], vec!["S1", "8:15", "-30"]],
            Schema::daily_inspection(),
        );
        let record = &out.records[0];

        assert_eq!(record.id, "check-2");
        assert_eq!(record.row, 2);
        assert_eq!(record.text("serviceCode"), "S1");
        assert_eq!(record.text("scheduledTime"), "8:15:00");
        assert_eq!(record.text("driverName"), "");
        assert_eq!(record.count("passengers"), 0);
        assert_eq!(record.get("nonComplianceReported"), Some(&FieldValue::Flag(false)));
        assert_eq!(record.status, Timeliness::Late);
        assert!(!record.non_compliance);
    }

    #[test]
    fn test_any_identifying_field_keeps_the_row() {
        let out = run(
            vec![
                vec!["Serv", "Ruta", "Conductor", "Pasajeros"],
                vec!["", "", "Pérez", "3"],
                vec!["", "", "", "7"],
                vec!["", "R4", "", ""],
            ],
            Schema::daily_inspection(),
        );
        assert_eq!(out.scanned, 3);
        assert_eq!(out.dropped, 1);
        let rows: Vec<usize> = out.records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_non_compliance_sources() {
        let out = run(
            vec![
                vec!["Serv", "Observaciones", "Incumplimiento", "GPS"],
                vec!["S1", "Informe de lo ocurrido", "", "0"],
                vec!["S2", "sin novedad", "SÍ", "0"],
                vec!["S3", "todo bien", "no", "0"],
                vec!["S4", "se envió INFORME", "", "0"],
            ],
            Schema::daily_inspection(),
        );
        let flags: Vec<bool> = out.records.iter().map(|r| r.non_compliance).collect();
        assert_eq!(flags, vec![true, true, false, true]);
    }

    #[test]
    fn test_missing_cells_in_ragged_rows() {
        let grid = RawGrid::from_rows(vec![
            ["Serv", "Hora", "GPS", "Pasajeros"]
                .into_iter()
                .map(CellValue::from)
                .collect(),
            vec![CellValue::text("S1")],
        ]);
        let schema = Schema::daily_inspection();
        let columns = map_columns(grid.row(0).unwrap_or_default(), schema);
        let out = normalize_rows(&grid, 0, &columns, schema, "x");

        let record = &out.records[0];
        assert_eq!(record.id, "x-2");
        assert_eq!(record.count("passengers"), 0);
        assert_eq!(record.status, Timeliness::OnTime);
    }
}
