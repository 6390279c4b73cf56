//! Header row location

use fieldcheck_core::{CellValue, RawGrid};

use crate::schema::Schema;

/// Number of cells in `row` naming a data field that counts toward the
/// header threshold.
///
/// Every matching cell counts, so a label repeated across two columns
/// counts twice.
pub fn header_matches(row: &[CellValue], schema: &Schema) -> usize {
    row.iter()
        .filter_map(|cell| schema.data_aliases().lookup_cell(cell))
        .filter(|key| schema.counts_toward_header(key))
        .count()
}

/// Index of the first row with at least `schema.header_threshold()` matching
/// cells, scanning from the top of the grid.
///
/// Rows shorter than the threshold cannot qualify and are skipped.
pub fn locate_header(grid: &RawGrid, schema: &Schema) -> Option<usize> {
    let threshold = schema.header_threshold();
    grid.rows()
        .iter()
        .position(|row| row.len() >= threshold && header_matches(row, schema) >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_below_metadata() {
        let grid = RawGrid::from(vec![
            vec!["Lugar", "Downtown"],
            vec!["Línea", "A12"],
            vec!["Serv", "Hora", "GPS", "Pasajeros"],
            vec!["S1", "08:00", "+02:30", "10"],
        ]);
        assert_eq!(locate_header(&grid, Schema::daily_inspection()), Some(2));
    }

    #[test]
    fn test_header_above_metadata() {
        let grid = RawGrid::from(vec![
            vec!["SERVICIO", "  Hora ", "Pasajeros"],
            vec!["S1", "08:00", "3"],
            vec!["Lugar", "Downtown"],
        ]);
        assert_eq!(locate_header(&grid, Schema::daily_inspection()), Some(0));
    }

    #[test]
    fn test_below_threshold() {
        let grid = RawGrid::from(vec![
            vec!["Serv", "Hora", "Comentario libre"],
            vec!["S1", "08:00", "x"],
        ]);
        assert_eq!(locate_header(&grid, Schema::daily_inspection()), None);
    }

    #[test]
    fn test_critical_subset() {
        let schema = Schema::out_of_section_ticket();

        // Direction and the explicit flag are known columns but not critical
        let row: Vec<CellValue> = ["Serv", "Paradero", "Hora", "Sentido", "Incumplimiento"]
            .into_iter()
            .map(CellValue::from)
            .collect();
        assert_eq!(header_matches(&row, schema), 3);

        let grid = RawGrid::from(vec![
            vec!["Serv", "Paradero", "Hora", "Sentido", "Incumplimiento"],
            vec!["Serv", "Paradero", "Hora", "GPS", "Pasajeros", "Sentido"],
        ]);
        assert_eq!(locate_header(&grid, schema), Some(1));
    }
}
