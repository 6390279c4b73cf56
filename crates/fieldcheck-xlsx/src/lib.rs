//! # fieldcheck-xlsx
//!
//! XLSX (Office Open XML) decoder for fieldcheck.
//!
//! Only cell values are read: styles, comments and formatting are skipped
//! and formulas contribute their cached result.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
