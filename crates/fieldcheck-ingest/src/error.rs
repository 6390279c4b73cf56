//! Error types for fieldcheck-ingest

use thiserror::Error;

/// Result type for schema construction
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Errors raised while compiling a [`SchemaConfig`](crate::SchemaConfig)
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document could not be deserialized
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// Alias normalizes to an empty label
    #[error("Empty alias for field '{key}'")]
    EmptyAlias { key: String },

    /// One alias points at two different fields
    #[error("Alias '{alias}' maps to both '{first}' and '{second}'")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },

    /// Field key declared twice
    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),

    /// Data field key clashes with a derived record attribute
    #[error("Field key '{0}' is reserved for derived record attributes")]
    ReservedKey(String),

    /// A schema setting names a field that is not declared
    #[error("{role} refers to unknown field '{key}'")]
    UnknownField { role: &'static str, key: String },

    /// A schema setting names a field of the wrong kind
    #[error("{role} field '{key}' must be of kind {expected}")]
    WrongKind {
        role: &'static str,
        key: String,
        expected: &'static str,
    },

    /// Header threshold cannot be met
    #[error("Header threshold {threshold} must be between 1 and {available}")]
    InvalidThreshold { threshold: usize, available: usize },

    /// No identifying fields declared
    #[error("At least one identifying field is required")]
    NoIdentifyingFields,
}

/// A pipeline stage failure.
///
/// Each variant is a deterministic consequence of the input grid, so a
/// failed parse is never worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// Fewer rows than a form can possibly hold
    #[error("Input too short: expected at least 2 rows, found {rows}")]
    InputTooShort { rows: usize },

    /// No row matched enough known column labels
    #[error(
        "Data columns not found: no row matched at least {threshold} of the expected column labels ({})",
        .expected.join(", ")
    )]
    HeaderNotFound {
        threshold: usize,
        expected: Vec<String>,
    },

    /// Header found but every row below it lacked identifying data
    #[error("No valid data rows found below the header on row {}", .header_row + 1)]
    NoValidData { header_row: usize },
}
