//! # fieldcheck
//!
//! Reads the spreadsheets field inspectors fill in and turns them into typed
//! service-check records.
//!
//! Spreadsheet decoding (XLSX and CSV) produces a [`RawGrid`]; the ingestion
//! pipeline then locates the metadata block and the data table, coerces
//! every cell according to a [`Schema`] and derives timeliness and
//! non-compliance for each record.
//!
//! ## Features
//!
//! - `xlsx` (default): Office Open XML workbooks
//! - `csv` (default): comma or tab separated exports
//!
//! ## Example
//!
//! ```rust
//! use fieldcheck::prelude::*;
//!
//! let csv = "Lugar,Downtown\nServ,Hora,GPS,Pasajeros\nS1,08:00,+02:30,10\n";
//! let result = fieldcheck::parse_bytes(
//!     csv.as_bytes(),
//!     Schema::daily_inspection(),
//!     &ParseOptions::default(),
//! );
//!
//! assert!(result.success);
//! assert_eq!(result.records()[0].status, Timeliness::Early);
//! ```

pub mod prelude;

use std::path::Path;

// Re-export core types
pub use fieldcheck_core::{serial, CellRef, CellValue, Error, RawGrid, Result};

// Re-export pipeline types
pub use fieldcheck_ingest::{
    classify, normalize_label, parse_grid, AliasTable, Diagnostics, DurationUnits, FieldKind,
    FieldSpec, FieldValue, HeaderMatch, IngestError, Ingestor, MetadataKind, MetadataMap,
    MetadataValue, NormalizedRecord, ParseOptions, ParseResult, ParsedForm, Schema, SchemaConfig,
    SchemaError, SignedDuration, Timeliness, TotalRule,
};

// Re-export I/O types
#[cfg(feature = "csv")]
pub use fieldcheck_csv::{CsvError, CsvReadOptions, CsvReader};
#[cfg(feature = "xlsx")]
pub use fieldcheck_xlsx::{XlsxError, XlsxReader};

/// Leading bytes of a ZIP archive, and so of every XLSX workbook
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xlsx,
    Csv,
    Tsv,
}

impl Format {
    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Some(Format::Xlsx),
            Some("csv") | Some("txt") => Some(Format::Csv),
            Some("tsv") => Some(Format::Tsv),
            _ => None,
        }
    }

    /// Guess the format from file contents
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_SIGNATURE) {
            Format::Xlsx
        } else {
            Format::Csv
        }
    }
}

/// How an input is decoded into a grid
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Worksheet index for workbooks
    pub sheet: usize,
    /// Field delimiter for delimited text, overriding the format default
    pub delimiter: Option<u8>,
}

impl OpenOptions {
    /// Select a worksheet
    pub fn with_sheet(mut self, sheet: usize) -> Self {
        self.sheet = sheet;
        self
    }

    /// Override the text delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Decode raw file contents, detecting XLSX by its ZIP signature
pub fn decode(bytes: &[u8]) -> Result<RawGrid> {
    decode_with(bytes, &OpenOptions::default())
}

/// Decode raw file contents with explicit options
pub fn decode_with(bytes: &[u8], options: &OpenOptions) -> Result<RawGrid> {
    decode_as(bytes, Format::sniff(bytes), options)
}

/// Open a file, choosing the decoder by extension
pub fn open<P: AsRef<Path>>(path: P) -> Result<RawGrid> {
    open_with(path, &OpenOptions::default())
}

/// Open a file with explicit options
pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<RawGrid> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| {
        Error::other(format!("Unsupported file format: {}", path.display()))
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| Error::other(format!("Failed to read {}: {}", path.display(), e)))?;
    log::debug!("decoding {} as {:?}", path.display(), format);
    decode_as(&bytes, format, options)
}

fn decode_as(bytes: &[u8], format: Format, options: &OpenOptions) -> Result<RawGrid> {
    match format {
        Format::Xlsx => decode_xlsx(bytes, options),
        Format::Csv | Format::Tsv => decode_delimited(bytes, format, options),
    }
}

#[cfg(feature = "xlsx")]
fn decode_xlsx(bytes: &[u8], options: &OpenOptions) -> Result<RawGrid> {
    XlsxReader::read_sheet(std::io::Cursor::new(bytes), options.sheet)
        .map_err(|e| Error::other(e.to_string()))
}

#[cfg(not(feature = "xlsx"))]
fn decode_xlsx(_bytes: &[u8], _options: &OpenOptions) -> Result<RawGrid> {
    Err(Error::other("XLSX support is not enabled"))
}

#[cfg(feature = "csv")]
fn decode_delimited(bytes: &[u8], format: Format, options: &OpenOptions) -> Result<RawGrid> {
    let mut csv_options = match format {
        Format::Tsv => CsvReadOptions::tsv(),
        _ => CsvReadOptions::default(),
    };
    if let Some(delimiter) = options.delimiter {
        csv_options = csv_options.with_delimiter(delimiter);
    }
    CsvReader::read(bytes, &csv_options).map_err(|e| Error::other(e.to_string()))
}

#[cfg(not(feature = "csv"))]
fn decode_delimited(_bytes: &[u8], _format: Format, _options: &OpenOptions) -> Result<RawGrid> {
    Err(Error::other("CSV support is not enabled"))
}

/// Decode and parse file contents.
///
/// Decoding failures are reported as a failed [`ParseResult`], so callers
/// handle a single outcome type.
pub fn parse_bytes(bytes: &[u8], schema: &Schema, options: &ParseOptions) -> ParseResult {
    match decode(bytes) {
        Ok(grid) => parse_decoded(&grid, schema, options),
        Err(e) => ParseResult::failure(format!("Could not read spreadsheet: {}", e)),
    }
}

/// Open and parse a file; see [`parse_bytes`]
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    options: &ParseOptions,
) -> ParseResult {
    match open(path) {
        Ok(grid) => parse_decoded(&grid, schema, options),
        Err(e) => ParseResult::failure(format!("Could not read spreadsheet: {}", e)),
    }
}

fn parse_decoded(grid: &RawGrid, schema: &Schema, options: &ParseOptions) -> ParseResult {
    Ingestor::new(schema)
        .with_options(options.clone())
        .parse(grid)
}
