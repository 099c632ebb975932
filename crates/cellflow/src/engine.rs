//! Spreadsheet engine: load a sheet, query computed values, edit value cells
//!
//! # Example
//!
//! ```rust
//! use cellflow::{CellValue, Engine};
//!
//! let mut engine = Engine::new();
//! engine.load_sheet(&[vec!["1", "=A1+1"], vec!["=B1*10", ""]]).unwrap();
//! assert_eq!(engine.get_cell_value("A2").unwrap(), CellValue::Number(20.0));
//!
//! engine.set_cell_content("A1", "4").unwrap();
//! assert_eq!(engine.get_cell_value("A2").unwrap(), CellValue::Number(50.0));
//! ```

use std::path::Path;

use crate::error::LoadError;
use crate::stats::{EngineStats, StatType, Statistics};
use cellflow_core::{CellError, CellValue, Error, Result, SimpleCellAddress};
use cellflow_csv::{CsvReadOptions, CsvReader};
use cellflow_formula::{
    is_formula, sheet_dimensions, AddressMapping, FunctionDef, FunctionRegistry, Graph,
    GraphBuilder, Interpreter, RangeMapping, TopSortResult, ValueCellVertex, Vertex, VertexId,
    VertexStore,
};
use tracing::{debug, trace};

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Extra function plugins registered on top of the built-ins
    ///
    /// Plugins are applied in order; a later definition replaces an earlier
    /// one with the same name, built-ins included.
    pub function_plugins: Vec<&'static [FunctionDef]>,
    /// Options used by [`Engine::load_csv_sheet`]
    pub csv: CsvReadOptions,
}

impl EngineConfig {
    pub fn with_function_plugin(mut self, plugin: &'static [FunctionDef]) -> Self {
        self.function_plugins.push(plugin);
        self
    }

    pub fn with_csv_options(mut self, csv: CsvReadOptions) -> Self {
        self.csv = csv;
        self
    }
}

/// Everything built from one loaded sheet
#[derive(Debug)]
struct LoadedSheet {
    store: VertexStore,
    graph: Graph<VertexId>,
    mapping: AddressMapping,
    ranges: RangeMapping,
    order: TopSortResult<VertexId>,
}

impl LoadedSheet {
    /// Run one full evaluation pass
    ///
    /// Formula vertices on a cycle become `#CYCLE!`, then every vertex in
    /// topological order is recomputed (formulas) or has its cache dropped
    /// (ranges). Value cells are left alone.
    fn evaluate(&mut self, functions: &FunctionRegistry) -> Result<()> {
        let LoadedSheet {
            store,
            mapping,
            ranges,
            order,
            ..
        } = self;

        for &id in &order.cycled {
            match store.get_mut(id) {
                Some(Vertex::FormulaCell(formula)) => {
                    formula.set_value(CellValue::Error(CellError::Cycle))
                }
                Some(other) => {
                    return Err(Error::NonFormulaOnCycle(format!("{} {}", other.kind(), id)))
                }
                None => return Err(Error::UnknownVertex(id.to_string())),
            }
        }

        for &id in &order.sorted {
            let value = match store.get(id) {
                Some(Vertex::FormulaCell(formula)) => {
                    Interpreter::new(store, mapping, ranges, functions)
                        .compute_formula(formula.formula(), formula.address())
                }
                Some(Vertex::Range(_)) => {
                    if let Some(Vertex::Range(range)) = store.get_mut(id) {
                        range.clear();
                    }
                    continue;
                }
                Some(_) => continue,
                None => return Err(Error::UnknownVertex(id.to_string())),
            };

            trace!(vertex = %id, %value, "evaluated");
            if let Some(Vertex::FormulaCell(formula)) = store.get_mut(id) {
                formula.set_value(value);
            }
        }

        Ok(())
    }

    fn value_at(&self, address: &SimpleCellAddress) -> Result<CellValue> {
        match self.mapping.get_cell(address)? {
            Some(id) => match self.store.get(id).and_then(Vertex::cell_value) {
                Some(value) => Ok(value.clone()),
                None => Err(Error::UnknownVertex(id.to_string())),
            },
            None => Ok(CellValue::Empty),
        }
    }
}

/// The spreadsheet engine
///
/// Starts unloaded; [`Engine::load_sheet`] builds the dependency graph and runs
/// the first evaluation pass. Every successful edit runs another full pass.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    functions: FunctionRegistry,
    sheet: Option<LoadedSheet>,
    stats: Statistics,
    passes: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with the built-in functions
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut functions = FunctionRegistry::with_builtins();
        for plugin in &config.function_plugins {
            functions.register_plugin(plugin);
        }
        Self {
            config,
            functions,
            sheet: None,
            stats: Statistics::new(),
            passes: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Functions available to formulas
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn is_loaded(&self) -> bool {
        self.sheet.is_some()
    }

    /// Load a sheet of raw cell content, replacing any previous one
    ///
    /// The sheet's bounds are its row count and the length of its longest row.
    /// On failure the previously loaded sheet, if any, is discarded.
    pub fn load_sheet<R, S>(&mut self, sheet: &[R]) -> Result<()>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        self.sheet = None;
        self.passes = 0;
        self.stats.reset();
        self.stats.start(StatType::Overall);

        let (width, height) = sheet_dimensions(sheet);
        let mut store = VertexStore::new();
        let mut graph = Graph::new();
        let mut mapping = AddressMapping::new(0, width, height);
        let mut ranges = RangeMapping::new();

        let functions = &self.functions;
        self.stats.measure(StatType::GraphBuild, || {
            GraphBuilder::new(&mut store, &mut graph, &mut mapping, &mut ranges, functions)
                .build_graph(sheet)
        })?;
        debug!(
            width,
            height,
            vertices = store.len(),
            edges = graph.edge_count(),
            "graph built"
        );

        let order = self
            .stats
            .measure(StatType::TopSort, || graph.topological_sort());
        debug!(
            sorted = order.sorted.len(),
            cycled = order.cycled.len(),
            "topological order computed"
        );

        let mut loaded = LoadedSheet {
            store,
            graph,
            mapping,
            ranges,
            order,
        };
        let result = self.evaluate(&mut loaded);
        self.stats.end(StatType::Overall);
        result?;

        self.sheet = Some(loaded);
        Ok(())
    }

    /// Parse CSV text with the configured options and load it
    pub fn load_csv_sheet(&mut self, text: &str) -> std::result::Result<(), LoadError> {
        let sheet = CsvReader::read_str(text, &self.config.csv)?;
        self.load_sheet(&sheet)?;
        Ok(())
    }

    /// Read a CSV file with the configured options and load it
    pub fn load_csv_file<P: AsRef<Path>>(&mut self, path: P) -> std::result::Result<(), LoadError> {
        let sheet = CsvReader::read_file(path, &self.config.csv)?;
        self.load_sheet(&sheet)?;
        Ok(())
    }

    /// Computed value at an A1 address on the loaded sheet
    pub fn get_cell_value(&self, a1: &str) -> Result<CellValue> {
        self.get_cell_value_at(SimpleCellAddress::parse_a1(a1, 0)?)
    }

    /// Computed value at an absolute address
    ///
    /// Unoccupied addresses are empty; addresses outside the loaded bounds fail.
    pub fn get_cell_value_at(&self, address: SimpleCellAddress) -> Result<CellValue> {
        self.loaded()?.value_at(&address)
    }

    /// Replace the content of a value cell and recompute
    pub fn set_cell_content(&mut self, a1: &str, content: &str) -> Result<()> {
        self.set_cell_content_at(SimpleCellAddress::parse_a1(a1, 0)?, content)
    }

    /// Replace the content of a value cell and recompute
    ///
    /// Only plain values can be written: formula text is rejected, as is any
    /// target holding a formula. Empty-cell vertices and unoccupied in-bounds
    /// addresses become value cells. The content is classified like loaded
    /// content: numeric text becomes a number, blank content the empty value.
    pub fn set_cell_content_at(&mut self, address: SimpleCellAddress, content: &str) -> Result<()> {
        if is_formula(content) {
            return Err(Error::UnsupportedEdit {
                address,
                reason: "formula content cannot be set on a loaded sheet",
            });
        }

        let sheet = self.sheet.as_mut().ok_or(Error::NotLoaded)?;
        let value = CellValue::from_raw_content(content);

        match sheet.mapping.get_cell(&address)? {
            Some(id) => match sheet.store.get_mut(id) {
                Some(Vertex::ValueCell(cell)) => cell.set_value(value),
                Some(Vertex::FormulaCell(_)) => {
                    return Err(Error::UnsupportedEdit {
                        address,
                        reason: "cell holds a formula",
                    })
                }
                Some(Vertex::Range(_)) => {
                    return Err(Error::UnsupportedEdit {
                        address,
                        reason: "address maps to a range vertex",
                    })
                }
                // Referenced blank: keeps its edges, now carries a value
                Some(vertex) => *vertex = Vertex::ValueCell(ValueCellVertex::new(value)),
                None => return Err(Error::UnknownVertex(id.to_string())),
            },
            None if value.is_empty() => {}
            None => {
                let id = sheet
                    .store
                    .insert(Vertex::ValueCell(ValueCellVertex::new(value)));
                sheet.graph.add_node(id);
                sheet.mapping.set_cell(address, id)?;
                sheet.order = sheet.graph.topological_sort();
            }
        }
        debug!(%address, content, "cell content set");

        self.recompute_formulas()
    }

    /// Run a full evaluation pass over the loaded sheet
    pub fn recompute_formulas(&mut self) -> Result<()> {
        let mut sheet = self.sheet.take().ok_or(Error::NotLoaded)?;
        let result = self.evaluate(&mut sheet);
        self.sheet = Some(sheet);
        result
    }

    /// Timings and graph counts for the loaded sheet
    pub fn get_stats(&self) -> EngineStats {
        let mut stats = EngineStats {
            overall: self.stats.duration(StatType::Overall),
            graph_build: self.stats.duration(StatType::GraphBuild),
            top_sort: self.stats.duration(StatType::TopSort),
            evaluation: self.stats.duration(StatType::Evaluation),
            evaluation_passes: self.passes,
            ..EngineStats::default()
        };
        if let Some(sheet) = &self.sheet {
            stats.vertex_count = sheet.store.len();
            stats.edge_count = sheet.graph.edge_count();
            stats.formula_count = sheet.store.formula_count();
            stats.cycled_count = sheet.order.cycled.len();
        }
        stats
    }

    /// Width and height of the loaded sheet, `(0, 0)` when nothing is loaded
    pub fn dimensions(&self) -> (u32, u32) {
        match &self.sheet {
            Some(sheet) => (sheet.mapping.width(), sheet.mapping.height()),
            None => (0, 0),
        }
    }

    /// Computed values of the whole loaded sheet, row by row
    pub fn values(&self) -> Result<Vec<Vec<CellValue>>> {
        let sheet = self.loaded()?;
        let (width, height) = (sheet.mapping.width(), sheet.mapping.height());

        (0..height)
            .map(|row| {
                (0..width)
                    .map(|col| sheet.value_at(&SimpleCellAddress::new(0, col, row)))
                    .collect()
            })
            .collect()
    }

    fn loaded(&self) -> Result<&LoadedSheet> {
        self.sheet.as_ref().ok_or(Error::NotLoaded)
    }

    fn evaluate(&mut self, sheet: &mut LoadedSheet) -> Result<()> {
        let functions = &self.functions;
        self.stats
            .measure(StatType::Evaluation, || sheet.evaluate(functions))?;
        self.passes += 1;
        debug!(
            pass = self.passes,
            formulas = sheet.store.formula_count(),
            cycled = sheet.order.cycled.len(),
            "evaluation pass complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unloaded_engine() {
        let mut engine = Engine::new();
        assert!(!engine.is_loaded());
        assert_eq!(engine.dimensions(), (0, 0));
        assert_eq!(engine.get_cell_value("A1"), Err(Error::NotLoaded));
        assert_eq!(engine.set_cell_content("A1", "1"), Err(Error::NotLoaded));
        assert_eq!(engine.recompute_formulas(), Err(Error::NotLoaded));
        assert_eq!(engine.get_stats().vertex_count, 0);
    }

    #[test]
    fn test_failed_load_discards_previous_sheet() {
        let mut engine = Engine::new();
        engine.load_sheet(&[vec!["1"]]).unwrap();
        assert!(engine.is_loaded());

        let err = engine
            .load_sheet(&[vec!["1"], vec!["=SUM(A1:A3)"], vec![""]])
            .unwrap_err();
        assert!(matches!(err, Error::NonFormulaOnCycle(_)));
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_stats_count_passes() {
        let mut engine = Engine::new();
        engine.load_sheet(&[vec!["1", "=A1+1"]]).unwrap();
        assert_eq!(engine.get_stats().evaluation_passes, 1);

        engine.set_cell_content("A1", "2").unwrap();
        engine.recompute_formulas().unwrap();
        let stats = engine.get_stats();
        assert_eq!(stats.evaluation_passes, 3);
        assert_eq!(stats.vertex_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.formula_count, 1);
        assert_eq!(stats.cycled_count, 0);
    }

    #[test]
    fn test_new_value_cell_joins_the_graph() {
        let mut engine = Engine::new();
        engine.load_sheet(&[vec!["1", ""]]).unwrap();
        engine.set_cell_content("B1", "hello").unwrap();

        assert_eq!(engine.get_cell_value("B1").unwrap(), CellValue::text("hello"));
        assert_eq!(engine.get_stats().vertex_count, 2);
    }
}
