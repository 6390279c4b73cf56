//! # fieldcheck-csv
//!
//! Decodes delimited text exports into a [`RawGrid`](fieldcheck_core::RawGrid).

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvReader;
