//! Header cell to field mapping

use std::collections::BTreeMap;

use ahash::AHashMap;
use fieldcheck_core::CellValue;

use crate::schema::Schema;

/// Column index to canonical data key, in column order
pub type ColumnIndexMap = BTreeMap<usize, String>;

/// Map each recognized header cell to its field.
///
/// Unrecognized cells are skipped. When two cells name the same field the
/// rightmost one wins and the earlier column is left unmapped.
pub fn map_columns(header: &[CellValue], schema: &Schema) -> ColumnIndexMap {
    let mut by_key: AHashMap<&str, usize> = AHashMap::new();
    for (index, cell) in header.iter().enumerate() {
        if let Some(key) = schema.data_aliases().lookup_cell(cell) {
            if let Some(previous) = by_key.insert(key, index) {
                log::debug!("column '{}' repeated at {}, using {}", key, previous, index);
            }
        }
    }

    by_key
        .into_iter()
        .map(|(key, index)| (index, key.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(labels: &[&str]) -> Vec<CellValue> {
        labels.iter().map(|l| CellValue::from(*l)).collect()
    }

    #[test]
    fn test_unmatched_cells_are_skipped() {
        let columns = map_columns(
            &row(&["Serv", "", "Notas", "Hora", "GPS"]),
            Schema::daily_inspection(),
        );
        let expected: ColumnIndexMap = [
            (0, "serviceCode".to_string()),
            (3, "scheduledTime".to_string()),
            (4, "gpsVariance".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(columns, expected);
    }

    #[test]
    fn test_rightmost_duplicate_wins() {
        let columns = map_columns(
            &row(&["Pasajeros", "Serv", "PAX", "Hora"]),
            Schema::daily_inspection(),
        );
        assert_eq!(columns.get(&0), None);
        assert_eq!(columns.get(&2).map(String::as_str), Some("passengers"));
        assert_eq!(columns.len(), 3);
    }
}
