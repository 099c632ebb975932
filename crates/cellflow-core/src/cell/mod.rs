//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value held by a cell vertex
//! - [`CellError`] - The error kinds a value can carry
//! - [`SimpleCellAddress`] - A cell's absolute location (sheet, column, row)

mod address;
mod value;

pub use address::SimpleCellAddress;
pub use value::{CellError, CellValue, SharedString};
