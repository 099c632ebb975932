//! # cellflow-core
//!
//! Core data structures for the cellflow spreadsheet engine.
//!
//! This crate provides the leaf types used throughout cellflow:
//! - [`CellValue`] - Computed or literal cell values (numbers, text, booleans, errors)
//! - [`CellError`] - The closed set of spreadsheet error kinds
//! - [`SimpleCellAddress`] and [`AbsoluteCellRange`] - Absolute addressing
//! - [`Error`] - Fatal contract violations raised by the engine
//!
//! ## Example
//!
//! ```rust
//! use cellflow_core::{AbsoluteCellRange, CellValue, SimpleCellAddress};
//!
//! let a1 = SimpleCellAddress::parse_a1("A1", 0).unwrap();
//! let range = AbsoluteCellRange::spanning(a1, 2, 3);
//!
//! assert_eq!(range.width(), 2);
//! assert_eq!(range.address(1, 2), SimpleCellAddress::new(0, 1, 2));
//! assert_eq!(CellValue::from(4.0).as_number(), Some(4.0));
//! ```

pub mod cell;
pub mod error;
pub mod range;

// Re-exports for convenience
pub use cell::{CellError, CellValue, SharedString, SimpleCellAddress};
pub use error::{Error, Result};
pub use range::AbsoluteCellRange;

/// Maximum number of rows addressable in A1 notation
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns addressable in A1 notation
pub const MAX_COLS: u32 = 16_384;
