//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use fieldcheck_core::{CellValue, RawGrid};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a grid
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<RawGrid> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a grid
    ///
    /// Every record becomes one grid row, including the first: exported
    /// forms carry metadata above the column labels, so no row is treated
    /// as a header here. Rows may differ in length.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<RawGrid> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid = RawGrid::new();

        for result in csv_reader.byte_records() {
            let record = result?;
            let first = grid.is_empty();

            let row = record
                .iter()
                .enumerate()
                .map(|(col, bytes)| {
                    let mut field = decode_field(bytes);
                    if first && col == 0 {
                        field = field.trim_start_matches('\u{feff}').to_string();
                    }
                    if options.auto_detect_types {
                        Self::detect_type(&field)
                    } else if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field)
                    }
                })
                .collect();

            grid.push_row(row);
        }

        Ok(grid)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }

        CellValue::text(field)
    }
}

/// Whether a field should be read as a number.
///
/// Codes with leading zeros ("007") stay text, as do words `f64::from_str`
/// would otherwise accept ("inf", "NaN").
fn looks_numeric(s: &str) -> bool {
    let digits = s.trim_start_matches(['+', '-']);
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') && !digits[1..].starts_with('.') {
        return false;
    }
    digits
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// Decode a raw field as UTF-8, falling back to Latin-1 for legacy exports.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
