//! Graph vertices
//!
//! Vertices live in a [`VertexStore`] arena and are referred to everywhere else
//! by [`VertexId`]. The dependency graph, the address mapping and the range
//! mapping are independent indices over the same ids.

use crate::ast::FormulaExpr;
use crate::column_index::ColumnIndex;
use cellflow_core::{AbsoluteCellRange, CellValue, SimpleCellAddress};
use std::cell::OnceCell;
use std::fmt;
use std::ops::Index;

static EMPTY_VALUE: CellValue = CellValue::Empty;

/// Handle to a vertex in a [`VertexStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(u32);

impl VertexId {
    /// Position of the vertex in its store
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A node of the dependency graph
#[derive(Debug)]
pub enum Vertex {
    /// Literal value typed into a cell
    ValueCell(ValueCellVertex),
    /// Cell holding a formula and its last computed value
    FormulaCell(FormulaCellVertex),
    /// A range used as a function argument
    Range(RangeVertex),
    /// Referenced address with no content
    EmptyCell,
}

impl Vertex {
    /// Current value of a cell vertex; ranges have none
    pub fn cell_value(&self) -> Option<&CellValue> {
        match self {
            Vertex::ValueCell(v) => Some(v.value()),
            Vertex::FormulaCell(f) => Some(f.value()),
            Vertex::EmptyCell => Some(&EMPTY_VALUE),
            Vertex::Range(_) => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Vertex::ValueCell(_) => "value cell",
            Vertex::FormulaCell(_) => "formula cell",
            Vertex::Range(_) => "range",
            Vertex::EmptyCell => "empty cell",
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Vertex::FormulaCell(_))
    }
}

/// Vertex owning a literal value
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCellVertex {
    value: CellValue,
}

impl ValueCellVertex {
    pub fn new(value: CellValue) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Replace the stored value
    pub fn set_value(&mut self, value: CellValue) {
        self.value = value;
    }
}

/// Vertex owning a parsed formula
///
/// The tree is fixed at creation; the cached value is replaced on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaCellVertex {
    formula: FormulaExpr,
    address: SimpleCellAddress,
    cached: CellValue,
}

impl FormulaCellVertex {
    pub fn new(formula: FormulaExpr, address: SimpleCellAddress) -> Self {
        Self {
            formula,
            address,
            cached: CellValue::Empty,
        }
    }

    pub fn formula(&self) -> &FormulaExpr {
        &self.formula
    }

    /// Address the formula lives at; references in the tree are relative to it
    pub fn address(&self) -> SimpleCellAddress {
        self.address
    }

    /// Last computed value (`Empty` before the first pass)
    pub fn value(&self) -> &CellValue {
        &self.cached
    }

    pub fn set_value(&mut self, value: CellValue) {
        self.cached = value;
    }
}

/// Vertex standing for a whole range argument
///
/// Holds caches derived from the range's cells. They are filled lazily on
/// first use within an evaluation pass and must be cleared before the next.
#[derive(Debug)]
pub struct RangeVertex {
    range: AbsoluteCellRange,
    values: OnceCell<Vec<CellValue>>,
    column_index: OnceCell<ColumnIndex>,
}

impl RangeVertex {
    pub fn new(range: AbsoluteCellRange) -> Self {
        Self {
            range,
            values: OnceCell::new(),
            column_index: OnceCell::new(),
        }
    }

    pub fn range(&self) -> AbsoluteCellRange {
        self.range
    }

    /// Row-major values of the range, materialized by `compute` on first use
    pub fn values_or_init(&self, compute: impl FnOnce() -> Vec<CellValue>) -> &[CellValue] {
        self.values.get_or_init(compute)
    }

    /// Index over the first column, built by `build` on first use
    pub fn column_index_or_init(&self, build: impl FnOnce() -> ColumnIndex) -> &ColumnIndex {
        self.column_index.get_or_init(build)
    }

    /// Whether any cache is currently filled
    pub fn is_cached(&self) -> bool {
        self.values.get().is_some() || self.column_index.get().is_some()
    }

    /// Drop all cached aggregates
    pub fn clear(&mut self) {
        self.values.take();
        self.column_index.take();
    }
}

/// Arena owning every vertex of a loaded sheet
#[derive(Debug, Default)]
pub struct VertexStore {
    vertices: Vec<Vertex>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a vertex into the store and return its handle
    pub fn insert(&mut self, vertex: Vertex) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(vertex);
        id
    }

    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    pub fn get_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of formula vertices
    pub fn formula_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_formula()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i as u32), v))
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl Index<VertexId> for VertexStore {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }
}
