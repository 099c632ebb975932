//! Sheet fixture for function tests

use crate::address_mapping::{AddressMapping, RangeMapping};
use crate::dependency::Graph;
use crate::functions::FunctionRegistry;
use crate::graph_builder::{sheet_dimensions, GraphBuilder};
use crate::interpreter::Interpreter;
use crate::vertex::{Vertex, VertexId, VertexStore};
use cellflow_core::{CellError, CellValue, SimpleCellAddress};

/// A sheet built and evaluated once in dependency order
pub(crate) struct TestSheet {
    store: VertexStore,
    mapping: AddressMapping,
}

impl TestSheet {
    pub(crate) fn new(rows: &[Vec<&str>]) -> Self {
        let (width, height) = sheet_dimensions(rows);
        let mut store = VertexStore::new();
        let mut graph: Graph<VertexId> = Graph::new();
        let mut mapping = AddressMapping::new(0, width, height);
        let mut ranges = RangeMapping::new();
        let functions = FunctionRegistry::with_builtins();

        GraphBuilder::new(&mut store, &mut graph, &mut mapping, &mut ranges, &functions)
            .build_graph(rows)
            .unwrap();

        let order = graph.topological_sort();
        for id in order.cycled {
            if let Some(Vertex::FormulaCell(f)) = store.get_mut(id) {
                f.set_value(CellValue::Error(CellError::Cycle));
            }
        }
        for id in order.sorted {
            let value = match &store[id] {
                Vertex::FormulaCell(f) => Interpreter::new(&store, &mapping, &ranges, &functions)
                    .compute_formula(f.formula(), f.address()),
                _ => continue,
            };
            if let Some(Vertex::FormulaCell(f)) = store.get_mut(id) {
                f.set_value(value);
            }
        }

        Self { store, mapping }
    }

    pub(crate) fn value(&self, a1: &str) -> CellValue {
        let address = SimpleCellAddress::parse_a1(a1, 0).unwrap();
        match self.mapping.get_cell(&address).unwrap() {
            Some(id) => self.store[id].cell_value().cloned().unwrap(),
            None => CellValue::Empty,
        }
    }
}

/// Evaluate a single formula placed in A1 of an otherwise empty sheet
pub(crate) fn eval(formula: &str) -> CellValue {
    TestSheet::new(&[vec![formula]]).value("A1")
}
