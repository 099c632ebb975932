//! Function plugins
//!
//! A plugin is a static table of [`FunctionDef`]s. Implementations receive the
//! raw argument nodes and decide themselves what to evaluate, so shape-only
//! functions such as COLUMNS can look at a range without reading its cells.

pub mod engineering;
pub mod lookup;
pub mod math;

use crate::ast::FormulaExpr;
use crate::interpreter::Interpreter;
use ahash::AHashMap;
use cellflow_core::{AbsoluteCellRange, CellError, CellValue, SimpleCellAddress};

/// Function implementation signature
pub type FunctionImpl = fn(&Interpreter<'_>, &[FormulaExpr], SimpleCellAddress) -> CellValue;

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Key used to look up the localized display name
    pub translation_key: &'static str,
    /// Implementation
    pub implementation: FunctionImpl,
    /// The function looks only at the shape of its arguments, never at the
    /// cells behind them, so its arguments create no dependencies
    pub inspects_shape_only: bool,
}

impl std::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("translation_key", &self.translation_key)
            .field("inspects_shape_only", &self.inspects_shape_only)
            .finish_non_exhaustive()
    }
}

/// Built-in plugins, in registration order
pub const BUILTIN_PLUGINS: &[&[FunctionDef]] = &[
    math::IMPLEMENTED_FUNCTIONS,
    engineering::IMPLEMENTED_FUNCTIONS,
    lookup::IMPLEMENTED_FUNCTIONS,
];

/// Function registry
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in plugin registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in BUILTIN_PLUGINS {
            registry.register_plugin(plugin);
        }
        registry
    }

    /// Register every function of a plugin; later registrations replace earlier ones
    pub fn register_plugin(&mut self, plugin: &[FunctionDef]) {
        for def in plugin {
            self.register(*def);
        }
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether calls to `name` read none of their arguments' cells
    pub fn inspects_shape_only(&self, name: &str) -> bool {
        self.get(name).map_or(false, |def| def.inspects_shape_only)
    }

    /// All registered functions sorted by name
    pub fn definitions(&self) -> Vec<&FunctionDef> {
        let mut defs: Vec<_> = self.functions.values().collect();
        defs.sort_by_key(|def| def.name);
        defs
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

// === Shared helpers for plugin implementations ===

/// Coerce a value to a number
///
/// Booleans are 1/0, empty is 0, text must parse as a finite number after
/// trimming. Errors are passed through.
pub fn coerce_to_number(value: &CellValue) -> Result<f64, CellError> {
    match value {
        CellValue::Number(n) => Ok(*n),
        CellValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        CellValue::Empty => Ok(0.0),
        CellValue::Text(s) => match s.as_str().trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(CellError::Value),
        },
        CellValue::Error(e) => Err(*e),
    }
}

/// `#N/A` unless `min <= args.len() <= max`
pub fn check_arity(args: &[FormulaExpr], min: usize, max: usize) -> Result<(), CellError> {
    if args.len() < min || args.len() > max {
        Err(CellError::Na)
    } else {
        Ok(())
    }
}

/// Evaluate an argument that must be a scalar, turning an error value into `Err`
pub fn evaluate_scalar(
    interpreter: &Interpreter<'_>,
    arg: &FormulaExpr,
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    match interpreter.evaluate_ast(arg, formula_address) {
        CellValue::Error(e) => Err(e),
        value => Ok(value),
    }
}

/// Evaluate an argument and coerce it to a number
pub fn evaluate_number(
    interpreter: &Interpreter<'_>,
    arg: &FormulaExpr,
    formula_address: SimpleCellAddress,
) -> Result<f64, CellError> {
    coerce_to_number(&interpreter.evaluate_ast(arg, formula_address))
}

/// Absolute range named by a literal range argument
///
/// `None` when the argument is not a range node at all; `Some(Err(#REF!))` when
/// the range would start left of column A or above row 1.
pub fn range_argument(
    arg: &FormulaExpr,
    formula_address: SimpleCellAddress,
) -> Option<Result<AbsoluteCellRange, CellError>> {
    match arg {
        FormulaExpr::RangeRef(range) => Some(range.resolve(formula_address).ok_or(CellError::Ref)),
        _ => None,
    }
}

/// Shape of a one-argument numeric function
///
/// No argument is `#VALUE!`, more than one is `#N/A`; the argument is coerced to
/// a number (coercion failures and argument errors are returned as-is) and
/// handed to `f`. Non-finite results become `#NUM!`.
pub fn template_with_one_coerced_to_number_argument(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
    f: impl FnOnce(f64) -> CellValue,
) -> CellValue {
    let arg = match args {
        [] => return CellValue::Error(CellError::Value),
        [arg] => arg,
        _ => return CellValue::Error(CellError::Na),
    };

    match evaluate_number(interpreter, arg, formula_address) {
        Ok(n) => match f(n) {
            CellValue::Number(result) if !result.is_finite() => CellValue::Error(CellError::Num),
            result => result,
        },
        Err(e) => CellValue::Error(e),
    }
}

/// Turn a plugin's internal `Result` into the cell value it produces
pub(crate) fn into_value(result: Result<CellValue, CellError>) -> CellValue {
    result.unwrap_or_else(CellValue::Error)
}
