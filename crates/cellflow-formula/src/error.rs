//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while turning formula text into an expression tree
///
/// Evaluation never fails with this type: evaluation problems are
/// [`cellflow_core::CellError`] values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reference that cannot be expressed relative to the formula's cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}
