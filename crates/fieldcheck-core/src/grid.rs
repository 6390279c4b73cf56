//! Row-major cell grid

use crate::cell::{CellRef, CellValue};

static EMPTY: CellValue = CellValue::Empty;

/// A decoded worksheet: an ordered sequence of rows of cells.
///
/// Rows may have different lengths; a missing trailing cell reads as
/// [`CellValue::Empty`]. The grid also remembers which date system the
/// source workbook used so that numeric date serials decode correctly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
    date_1904: bool,
}

impl RawGrid {
    /// Create an empty grid using the 1900 date system
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid from already decoded rows
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            rows,
            date_1904: false,
        }
    }

    /// Set the date system (builder style)
    pub fn with_date_1904(mut self, date_1904: bool) -> Self {
        self.date_1904 = date_1904;
        self
    }

    /// Whether date serials count from 1904-01-01 instead of 1900-01-01
    pub fn date_1904(&self) -> bool {
        self.date_1904
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the grid has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the longest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// All rows in order
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// A single row, if present
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// A single cell; out-of-range positions read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Append a row at the bottom
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Store a value at a position, growing the grid with empty cells as needed
    pub fn set(&mut self, at: CellRef, value: CellValue) {
        let (row, col) = (at.row as usize, at.col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }
}

impl<T: Into<CellValue>> From<Vec<Vec<T>>> for RawGrid {
    fn from(rows: Vec<Vec<T>>) -> Self {
        RawGrid::from_rows(
            rows.into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}
