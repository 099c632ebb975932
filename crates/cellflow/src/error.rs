//! Errors raised while loading a sheet from CSV

use cellflow_csv::CsvError;
use thiserror::Error;

/// Failure of [`Engine::load_csv_sheet`](crate::Engine::load_csv_sheet)
#[derive(Debug, Error)]
pub enum LoadError {
    /// The CSV could not be read or parsed
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// The sheet was read but the engine rejected it
    #[error("Engine error: {0}")]
    Engine(#[from] cellflow_core::Error),
}
