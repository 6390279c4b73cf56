//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value decoded from a cell
//! - [`CellRef`] - A cell's location (e.g., "B3")

mod address;
mod value;

pub use address::CellRef;
pub use value::CellValue;
