//! Terminal output of a parse

use serde::Serialize;

use crate::columns::ColumnIndexMap;
use crate::error::IngestError;
use crate::record::{MetadataMap, NormalizedRecord};

/// Successful parse payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedForm {
    /// Form-level metadata, including derived totals
    pub form_header: MetadataMap,
    /// One record per surviving data row
    pub service_checks: Vec<NormalizedRecord>,
    /// Pipeline diagnostics
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

/// What the pipeline saw while parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// 0-based index of the header row
    pub header_row: usize,
    /// Mapped columns
    pub columns: ColumnIndexMap,
    /// Rows examined below the header
    pub rows_scanned: usize,
    /// Rows discarded for lacking identifying data
    pub rows_dropped: usize,
}

/// Never-failing result value handed to callers.
///
/// Either `data` is present and `success` is true, or `success` is false and
/// `message` explains the failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ParsedForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Diagnostics>,
}

impl ParseResult {
    /// A failed parse
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            debug: None,
        }
    }

    /// A successful parse, optionally carrying diagnostics
    pub fn success(form: ParsedForm, include_debug: bool) -> Self {
        let diagnostics = &form.diagnostics;
        let message = format!(
            "Parsed {} service checks ({} rows skipped)",
            form.service_checks.len(),
            diagnostics.rows_dropped
        );
        let debug = include_debug.then(|| diagnostics.clone());
        Self {
            success: true,
            message,
            data: Some(form),
            debug,
        }
    }

    /// Surviving records, empty on failure
    pub fn records(&self) -> &[NormalizedRecord] {
        self.data
            .as_ref()
            .map(|d| d.service_checks.as_slice())
            .unwrap_or_default()
    }

    /// Form metadata, if the parse succeeded
    pub fn form_header(&self) -> Option<&MetadataMap> {
        self.data.as_ref().map(|d| &d.form_header)
    }

    /// Render as JSON
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl From<Result<ParsedForm, IngestError>> for ParseResult {
    fn from(result: Result<ParsedForm, IngestError>) -> Self {
        match result {
            Ok(form) => Self::success(form, false),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}
