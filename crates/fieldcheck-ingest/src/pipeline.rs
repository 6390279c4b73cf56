//! Staged parse of one grid against one schema

use fieldcheck_core::RawGrid;

use crate::columns::map_columns;
use crate::error::IngestError;
use crate::header::locate_header;
use crate::metadata::extract_metadata;
use crate::record::{MetadataMap, MetadataValue, NormalizedRecord};
use crate::result::{Diagnostics, ParseResult, ParsedForm};
use crate::rows::normalize_rows;
use crate::schema::Schema;

/// A form needs at least a header row and one data row
pub const MIN_GRID_ROWS: usize = 2;

/// Default prefix for generated record ids
pub const DEFAULT_ID_PREFIX: &str = "check";

/// Options for a parse
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Records are identified as `"{id_prefix}-{row}"`
    pub id_prefix: String,
    /// Attach [`Diagnostics`] to successful results
    pub include_debug: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            include_debug: false,
        }
    }
}

impl ParseOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id prefix
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Attach diagnostics to successful results
    pub fn with_debug(mut self, include_debug: bool) -> Self {
        self.include_debug = include_debug;
        self
    }
}

/// Parses grids against a schema.
///
/// Holds no per-parse state, so one ingestor can serve any number of grids,
/// including from several threads at once.
///
/// # Example
///
/// ```
/// use fieldcheck_core::RawGrid;
/// use fieldcheck_ingest::{Ingestor, Schema};
///
/// let grid = RawGrid::from(vec![
///     vec!["Lugar", "Downtown"],
///     vec!["Serv", "Hora", "GPS", "Pasajeros"],
///     vec!["S1", "08:00", "+02:30", "10"],
/// ]);
///
/// let result = Ingestor::new(Schema::daily_inspection()).parse(&grid);
/// assert!(result.success);
/// assert_eq!(result.records()[0].status.as_str(), "early");
/// ```
#[derive(Debug, Clone)]
pub struct Ingestor<'s> {
    schema: &'s Schema,
    options: ParseOptions,
}

impl<'s> Ingestor<'s> {
    /// Create an ingestor with default options
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            options: ParseOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// The schema in use
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Parse a grid into a result value; never fails
    pub fn parse(&self, grid: &RawGrid) -> ParseResult {
        match self.try_parse(grid) {
            Ok(form) => ParseResult::success(form, self.options.include_debug),
            Err(err) => {
                log::debug!("{} parse failed: {}", self.schema.name(), err);
                ParseResult::failure(err.to_string())
            }
        }
    }

    /// Parse a grid, stopping at the first failed stage
    pub fn try_parse(&self, grid: &RawGrid) -> Result<ParsedForm, IngestError> {
        let schema = self.schema;

        if grid.len() < MIN_GRID_ROWS {
            return Err(IngestError::InputTooShort { rows: grid.len() });
        }

        let mut form_header = extract_metadata(grid, schema);

        let header_row = locate_header(grid, schema).ok_or_else(|| IngestError::HeaderNotFound {
            threshold: schema.header_threshold(),
            expected: schema.expected_header_labels(),
        })?;
        log::debug!("header found on row {}", header_row + 1);

        let header = grid.row(header_row).unwrap_or_default();
        let columns = map_columns(header, schema);
        log::debug!("mapped {} of {} header cells", columns.len(), header.len());

        let rows = normalize_rows(grid, header_row, &columns, schema, &self.options.id_prefix);
        log::debug!(
            "{} records from {} rows, {} dropped",
            rows.records.len(),
            rows.scanned,
            rows.dropped
        );
        if rows.records.is_empty() {
            return Err(IngestError::NoValidData { header_row });
        }

        fill_totals(&mut form_header, &rows.records, schema);

        Ok(ParsedForm {
            form_header,
            service_checks: rows.records,
            diagnostics: Diagnostics {
                header_row,
                columns,
                rows_scanned: rows.scanned,
                rows_dropped: rows.dropped,
            },
        })
    }
}

/// Parse a grid with default options
pub fn parse_grid(grid: &RawGrid, schema: &Schema) -> ParseResult {
    Ingestor::new(schema).parse(grid)
}

/// Sum count fields into metadata totals the form left out
fn fill_totals(form_header: &mut MetadataMap, records: &[NormalizedRecord], schema: &Schema) {
    for rule in schema.totals() {
        if form_header.contains_key(&rule.metadata_key) {
            continue;
        }
        let total: i64 = records
            .iter()
            .map(|r| i64::from(r.count(&rule.data_key)))
            .sum();
        form_header.insert(rule.metadata_key.clone(), MetadataValue::Integer(total));
    }
}
