//! # cellflow
//!
//! A spreadsheet calculation engine built around a dependency graph.
//!
//! A sheet of raw cell content (numbers, text, `=` formulas) is loaded once:
//! the engine creates a vertex per occupied cell and per referenced range,
//! orders them topologically, flags formulas on a cycle as `#CYCLE!` and
//! evaluates the rest. Value cells can then be edited; every edit triggers a
//! full re-evaluation.
//!
//! ## Features
//!
//! - Relative A1 references and rectangular ranges
//! - Cycle isolation: only formulas actually on a cycle become `#CYCLE!`
//! - Function plugins (`ABS`, `SUM`, `VLOOKUP`, `MATCH`, `BITXOR`, `COLUMNS`, ...)
//! - Cached per-range column indexes for exact-match lookups
//! - CSV input and output
//!
//! ## Example
//!
//! ```rust
//! use cellflow::prelude::*;
//!
//! let mut engine = Engine::new();
//! engine
//!     .load_sheet(&[
//!         vec!["apple", "3", "=VLOOKUP(\"pear\",A1:B2,2)"],
//!         vec!["pear", "5", "=MATCH(\"pear\",A1:A2)"],
//!     ])
//!     .unwrap();
//!
//! assert_eq!(engine.get_cell_value("C1").unwrap(), CellValue::Number(5.0));
//! assert_eq!(engine.get_cell_value("C2").unwrap(), CellValue::Number(2.0));
//! ```

pub mod engine;
pub mod error;
pub mod prelude;
pub mod stats;

pub use engine::{Engine, EngineConfig};
pub use error::LoadError;
pub use stats::{EngineStats, StatType, Statistics};

// Re-export core types
pub use cellflow_core::{
    AbsoluteCellRange, CellError, CellValue, Error, Result, SimpleCellAddress, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use cellflow_formula::{
    functions, is_formula, parse_formula, FormulaError, FormulaExpr, FunctionDef, FunctionImpl,
    FunctionRegistry, Interpreter,
};

// Re-export I/O types
pub use cellflow_csv::{
    CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter, LineTerminator, RawSheet,
};
