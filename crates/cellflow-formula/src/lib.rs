//! # cellflow-formula
//!
//! Formula layer of the cellflow spreadsheet engine.
//!
//! This crate provides:
//! - Formula parsing (text → expression tree with relative references)
//! - A generic dependency graph with cycle-isolating topological sort
//! - The vertex arena and the address/range mappings indexing it
//! - Column indexes for exact-match lookups
//! - The interpreter and the function plugin registry
//!
//! ## Example
//!
//! ```rust
//! use cellflow_core::{CellValue, SimpleCellAddress};
//! use cellflow_formula::{
//!     parse_formula, AddressMapping, FunctionRegistry, Interpreter, RangeMapping, VertexStore,
//! };
//!
//! let base = SimpleCellAddress::new(0, 0, 0);
//! let ast = parse_formula("=ABS(-2)*BITXOR(1,5)", base).unwrap();
//!
//! let store = VertexStore::new();
//! let mapping = AddressMapping::new(0, 1, 1);
//! let ranges = RangeMapping::new();
//! let functions = FunctionRegistry::with_builtins();
//! let interpreter = Interpreter::new(&store, &mapping, &ranges, &functions);
//!
//! assert_eq!(interpreter.compute_formula(&ast, base), CellValue::Number(8.0));
//! ```

pub mod address_mapping;
pub mod ast;
pub mod column_index;
pub mod dependency;
pub mod error;
pub mod functions;
pub mod graph_builder;
pub mod interpreter;
pub mod parser;
pub mod vertex;

#[cfg(test)]
mod test_support;

pub use address_mapping::{AddressMapping, RangeMapping};
pub use ast::{
    BinaryOperator, CellReference, Dependency, FormulaExpr, RangeReference, UnaryOperator,
};
pub use column_index::ColumnIndex;
pub use dependency::{Graph, TopSortResult};
pub use error::{FormulaError, FormulaResult};
pub use functions::{FunctionDef, FunctionImpl, FunctionRegistry};
pub use graph_builder::{sheet_dimensions, GraphBuilder};
pub use interpreter::Interpreter;
pub use parser::{is_formula, parse_formula};
pub use vertex::{FormulaCellVertex, RangeVertex, ValueCellVertex, Vertex, VertexId, VertexStore};
