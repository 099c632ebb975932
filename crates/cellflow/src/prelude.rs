//! Prelude module - common imports for cellflow users
//!
//! ```rust
//! use cellflow::prelude::*;
//! ```

pub use crate::{
    CellError,
    // Cell types
    CellValue,
    CsvReadOptions,
    CsvWriteOptions,
    CsvWriter,
    // Engine
    Engine,
    EngineConfig,
    EngineStats,
    // Error types
    Error,
    FunctionDef,
    LoadError,
    Result,
    SimpleCellAddress,
};
