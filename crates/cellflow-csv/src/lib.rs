//! # cellflow-csv
//!
//! CSV reader and writer for cellflow.
//!
//! [`CsvReader`] turns CSV text into the raw sheet content the engine loads:
//! rows of strings, ragged rows allowed. [`CsvWriter`] renders a grid of
//! computed [`CellValue`](cellflow_core::CellValue)s back to CSV.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::{CsvReader, RawSheet};
pub use writer::CsvWriter;
