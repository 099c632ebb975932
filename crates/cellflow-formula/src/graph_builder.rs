//! Building the dependency graph from raw sheet content

use crate::address_mapping::{AddressMapping, RangeMapping};
use crate::ast::{Dependency, FormulaExpr};
use crate::dependency::Graph;
use crate::functions::FunctionRegistry;
use crate::parser::{is_formula, parse_formula};
use crate::vertex::{FormulaCellVertex, RangeVertex, ValueCellVertex, Vertex, VertexId, VertexStore};
use cellflow_core::{AbsoluteCellRange, CellError, CellValue, Result, SimpleCellAddress};
use tracing::{trace, warn};

/// Width and height of a sheet given as rows of raw content
///
/// The width is the length of the longest row, so ragged sheets are padded.
pub fn sheet_dimensions<R, S>(sheet: &[R]) -> (u32, u32)
where
    R: AsRef<[S]>,
{
    let width = sheet.iter().map(|row| row.as_ref().len()).max().unwrap_or(0);
    (width as u32, sheet.len() as u32)
}

/// Populates a vertex store, graph and mappings from raw sheet content
///
/// The four containers are expected to be freshly created: the address mapping
/// already sized to the sheet, everything else empty. The function registry
/// tells which calls only inspect the shape of their arguments; those
/// arguments add no edges.
pub struct GraphBuilder<'a> {
    store: &'a mut VertexStore,
    graph: &'a mut Graph<VertexId>,
    mapping: &'a mut AddressMapping,
    ranges: &'a mut RangeMapping,
    functions: &'a FunctionRegistry,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        store: &'a mut VertexStore,
        graph: &'a mut Graph<VertexId>,
        mapping: &'a mut AddressMapping,
        ranges: &'a mut RangeMapping,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Self {
            store,
            graph,
            mapping,
            ranges,
            functions,
        }
    }

    /// Create vertices for every occupied cell, then wire up dependencies
    ///
    /// Cells come first so that a formula's precedents already exist, whatever
    /// their position in the sheet, when its edges are added. Referenced but
    /// unoccupied in-bounds addresses get an empty-cell vertex. References that
    /// leave the sheet get no edge; they evaluate to `#REF!`.
    pub fn build_graph<R, S>(&mut self, sheet: &[R]) -> Result<()>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let sheet_id = self.mapping.sheet();
        let mut formulas = Vec::new();

        for (row_idx, row) in sheet.iter().enumerate() {
            for (col_idx, raw) in row.as_ref().iter().enumerate() {
                let raw = raw.as_ref();
                let address = SimpleCellAddress::new(sheet_id, col_idx as u32, row_idx as u32);

                let vertex = if is_formula(raw) {
                    let ast = parse_formula(raw, address).unwrap_or_else(|err| {
                        warn!(%address, formula = raw, error = %err, "formula failed to parse");
                        FormulaExpr::Error(CellError::Error)
                    });
                    Vertex::FormulaCell(FormulaCellVertex::new(ast, address))
                } else {
                    match CellValue::from_raw_content(raw) {
                        CellValue::Empty => continue,
                        value => Vertex::ValueCell(ValueCellVertex::new(value)),
                    }
                };

                let formula = vertex.is_formula();
                let id = self.add_vertex(vertex);
                self.mapping.set_cell(address, id)?;
                if formula {
                    formulas.push((id, address));
                }
            }
        }

        let functions = self.functions;
        let shape_only = |name: &str| functions.inspects_shape_only(name);

        for (id, address) in formulas {
            let dependencies = match &self.store[id] {
                Vertex::FormulaCell(formula) => {
                    formula.formula().dependencies_skipping(address, &shape_only)
                }
                _ => continue,
            };

            for dependency in dependencies {
                let precedent = match dependency {
                    Dependency::Cell(cell) if self.mapping.is_in_bounds(&cell) => {
                        self.cell_vertex(cell)?
                    }
                    Dependency::Range(range) if self.mapping.is_range_in_bounds(&range) => {
                        self.range_vertex(range)?
                    }
                    other => {
                        trace!(%address, ?other, "reference outside the sheet");
                        continue;
                    }
                };
                self.graph.add_edge(precedent, id)?;
            }
        }

        Ok(())
    }

    /// Vertex for an in-bounds address, creating an empty-cell vertex if needed
    fn cell_vertex(&mut self, address: SimpleCellAddress) -> Result<VertexId> {
        if let Some(id) = self.mapping.get_cell(&address)? {
            return Ok(id);
        }
        let id = self.add_vertex(Vertex::EmptyCell);
        self.mapping.set_cell(address, id)?;
        Ok(id)
    }

    /// Shared vertex for a range, wired to every cell it covers
    fn range_vertex(&mut self, range: AbsoluteCellRange) -> Result<VertexId> {
        if let Some(id) = self.ranges.get_range(&range) {
            return Ok(id);
        }

        let id = self.add_vertex(Vertex::Range(RangeVertex::new(range)));
        self.ranges.set_range(range, id);

        for address in range.addresses() {
            let cell = self.cell_vertex(address)?;
            self.graph.add_edge(cell, id)?;
        }

        Ok(id)
    }

    fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let id = self.store.insert(vertex);
        self.graph.add_node(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Built {
        store: VertexStore,
        graph: Graph<VertexId>,
        mapping: AddressMapping,
        ranges: RangeMapping,
    }

    impl Built {
        fn id(&self, a1: &str) -> VertexId {
            let address = SimpleCellAddress::parse_a1(a1, 0).unwrap();
            self.mapping.get_cell(&address).unwrap().unwrap()
        }
    }

    fn build(sheet: &[Vec<&str>]) -> Built {
        let (width, height) = sheet_dimensions(sheet);
        let mut built = Built {
            store: VertexStore::new(),
            graph: Graph::new(),
            mapping: AddressMapping::new(0, width, height),
            ranges: RangeMapping::new(),
        };
        let functions = FunctionRegistry::with_builtins();
        GraphBuilder::new(
            &mut built.store,
            &mut built.graph,
            &mut built.mapping,
            &mut built.ranges,
            &functions,
        )
        .build_graph(sheet)
        .unwrap();
        built
    }

    #[test]
    fn test_sheet_dimensions_use_widest_row() {
        let sheet = vec![vec!["1"], vec!["1", "2", "3"], vec![]];
        assert_eq!(sheet_dimensions(&sheet), (3, 3));
        assert_eq!(sheet_dimensions::<Vec<&str>, &str>(&[]), (0, 0));
    }

    #[test]
    fn test_classifies_cells() {
        let built = build(&[vec!["1", "foo", "", "=A1"]]);

        assert!(matches!(built.store[built.id("A1")], Vertex::ValueCell(_)));
        assert!(matches!(built.store[built.id("B1")], Vertex::ValueCell(_)));
        assert!(matches!(built.store[built.id("D1")], Vertex::FormulaCell(_)));

        // Blank and unreferenced: no vertex at all
        let c1 = SimpleCellAddress::parse_a1("C1", 0).unwrap();
        assert_eq!(built.mapping.get_cell(&c1).unwrap(), None);
        assert_eq!(built.store.len(), 3);
    }

    #[test]
    fn test_forward_reference_gets_edge() {
        let built = build(&[vec!["=B1*2", "3"]]);
        assert!(built.graph.has_edge(built.id("B1"), built.id("A1")));
        assert_eq!(built.graph.edge_count(), 1);
    }

    #[test]
    fn test_referenced_blank_gets_empty_vertex() {
        let built = build(&[vec!["=B1", ""]]);
        let b1 = built.id("B1");

        assert!(matches!(built.store[b1], Vertex::EmptyCell));
        assert!(built.graph.has_edge(b1, built.id("A1")));
    }

    #[test]
    fn test_range_vertex_is_shared_and_wired() {
        let built = build(&[
            vec!["1", "=SUM(A1:A3)"],
            vec!["2", "=SUM(A1:A3)+1"],
            vec!["", ""],
        ]);

        assert_eq!(built.ranges.len(), 1);
        let range = AbsoluteCellRange::from_corners(
            SimpleCellAddress::new(0, 0, 0),
            SimpleCellAddress::new(0, 0, 2),
        );
        let range_id = built.ranges.get_range(&range).unwrap();

        for cell in ["A1", "A2", "A3"] {
            assert!(built.graph.has_edge(built.id(cell), range_id));
        }
        assert!(built.graph.has_edge(range_id, built.id("B1")));
        assert!(built.graph.has_edge(range_id, built.id("B2")));
        assert!(matches!(built.store[built.id("A3")], Vertex::EmptyCell));
    }

    #[test]
    fn test_out_of_bounds_references_get_no_edges() {
        let built = build(&[vec!["=Z99", "=SUM(A1:Z99)"]]);
        assert_eq!(built.graph.edge_count(), 0);
        assert!(built.ranges.is_empty());
    }

    #[test]
    fn test_unparsable_formula_is_error_literal() {
        let built = build(&[vec!["=1+"]]);
        match &built.store[built.id("A1")] {
            Vertex::FormulaCell(f) => {
                assert_eq!(f.formula(), &FormulaExpr::Error(CellError::Error))
            }
            other => panic!("expected formula vertex, got {}", other.kind()),
        }
    }

    #[test]
    fn test_shape_only_arguments_add_no_edges() {
        let built = build(&[vec!["=COLUMNS(A1:C2)+B1", "1", ""], vec!["", "", ""]]);

        assert!(built.ranges.is_empty());
        assert_eq!(built.graph.edge_count(), 1);
        assert!(built.graph.has_edge(built.id("B1"), built.id("A1")));
        assert!(built.graph.topological_sort().cycled.is_empty());
    }

    #[test]
    fn test_duplicate_references_add_one_edge() {
        let built = build(&[vec!["2", "=A1*A1+A1"]]);
        assert_eq!(built.graph.edge_count(), 1);
    }
}
