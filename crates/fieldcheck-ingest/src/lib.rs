//! # fieldcheck-ingest
//!
//! Turns loosely laid out inspection spreadsheets into typed service-check
//! records.
//!
//! A form is a [`RawGrid`](fieldcheck_core::RawGrid) with a few
//! `label | value` metadata rows and a table whose header row sits at an
//! unknown offset. One generic pipeline handles every form variant; the
//! variants differ only in their [`Schema`]:
//!
//! 1. [`extract_metadata`] reads the leading label/value pairs
//! 2. [`locate_header`] finds the first row naming enough known columns
//! 3. [`map_columns`] maps header cells to canonical field keys
//! 4. [`normalize_rows`] coerces each data row, drops rows without
//!    identifying data and derives timeliness and non-compliance
//! 5. [`Ingestor`] runs the stages and folds the outcome into a
//!    [`ParseResult`]
//!
//! ## Example
//!
//! ```rust
//! use fieldcheck_core::RawGrid;
//! use fieldcheck_ingest::{parse_grid, Schema, Timeliness};
//!
//! let grid = RawGrid::from(vec![
//!     vec!["Lugar", "Downtown"],
//!     vec!["Línea", "A12"],
//!     vec!["Serv", "Hora", "GPS", "Pasajeros"],
//!     vec!["S1", "08:00", "+02:30", "10"],
//!     vec!["", "", "", ""],
//! ]);
//!
//! let result = parse_grid(&grid, Schema::daily_inspection());
//! let record = &result.records()[0];
//! assert_eq!(record.text("scheduledTime"), "08:00:00");
//! assert_eq!(record.status, Timeliness::Early);
//! ```

pub mod alias;
pub mod coerce;
pub mod columns;
pub mod duration;
pub mod error;
pub mod header;
pub mod metadata;
pub mod pipeline;
pub mod record;
pub mod result;
pub mod rows;
pub mod schema;
pub mod status;

pub use alias::{normalize_label, AliasTable};
pub use columns::{map_columns, ColumnIndexMap};
pub use duration::{ParseDurationError, SignedDuration};
pub use error::{IngestError, SchemaError, SchemaResult};
pub use header::{header_matches, locate_header};
pub use metadata::extract_metadata;
pub use pipeline::{parse_grid, Ingestor, ParseOptions};
pub use record::{FieldValue, MetadataMap, MetadataValue, NormalizedRecord};
pub use result::{Diagnostics, ParseResult, ParsedForm};
pub use rows::{normalize_rows, NormalizedRows};
pub use schema::{
    DurationUnits, FieldKind, FieldSpec, HeaderMatch, MetadataKind, Schema, SchemaConfig,
    TotalRule,
};
pub use status::{classify, Timeliness};
