//! # fieldcheck-core
//!
//! Core data structures shared by the fieldcheck decoders and the ingestion
//! pipeline.
//!
//! This crate provides:
//! - [`CellValue`] - A decoded cell (text, number or blank)
//! - [`RawGrid`] - The row-major grid a spreadsheet decodes into
//! - [`CellRef`] - A1-style cell references used to place sparse cells
//! - [`serial`] - Spreadsheet date/time serial decoding
//!
//! ## Example
//!
//! ```rust
//! use fieldcheck_core::{CellValue, RawGrid};
//!
//! let grid = RawGrid::from(vec![
//!     vec![CellValue::from("Lugar"), CellValue::from("Downtown")],
//!     vec![CellValue::from("Pasajeros"), CellValue::from(10.0)],
//! ]);
//!
//! assert_eq!(grid.len(), 2);
//! assert_eq!(grid.cell(1, 1).as_number(), Some(10.0));
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod serial;

pub use cell::{CellRef, CellValue};
pub use error::{Error, Result};
pub use grid::RawGrid;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
