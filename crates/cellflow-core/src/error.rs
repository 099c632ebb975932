//! Error types for cellflow-core
//!
//! These are fatal contract violations. Spreadsheet errors such as `#DIV/0!`
//! are data and live in [`crate::CellError`].

use crate::cell::SimpleCellAddress;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an engine operation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Invalid A1-style address text
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Address outside the bounds recorded when the sheet was loaded
    #[error("Address {address} out of bounds (sheet is {width} columns x {height} rows)")]
    AddressOutOfBounds {
        address: SimpleCellAddress,
        width: u32,
        height: u32,
    },

    /// Content edits are only supported for plain value cells
    #[error("Cannot set content of {address}: {reason}")]
    UnsupportedEdit {
        address: SimpleCellAddress,
        reason: &'static str,
    },

    /// A vertex other than a formula was found on a dependency cycle
    #[error("Only formula vertices can be on a cycle, found {0}")]
    NonFormulaOnCycle(String),

    /// Graph operation referenced a vertex that was never added
    #[error("Unknown graph vertex: {0}")]
    UnknownVertex(String),

    /// The engine was queried or edited before a sheet was loaded
    #[error("No sheet loaded")]
    NotLoaded,
}
