//! Formula interpreter

use crate::address_mapping::{AddressMapping, RangeMapping};
use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::column_index::ColumnIndex;
use crate::functions::{coerce_to_number, FunctionRegistry};
use crate::vertex::{RangeVertex, Vertex, VertexStore};
use cellflow_core::{AbsoluteCellRange, CellError, CellValue, SimpleCellAddress};
use std::cmp::Ordering;

/// Evaluates expression trees against the current state of a loaded sheet
///
/// The interpreter only reads: it borrows the vertex store and the mappings for
/// the duration of one evaluation. Range caches are filled through the range
/// vertices' interior cells.
pub struct Interpreter<'a> {
    store: &'a VertexStore,
    mapping: &'a AddressMapping,
    ranges: &'a RangeMapping,
    functions: &'a FunctionRegistry,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        store: &'a VertexStore,
        mapping: &'a AddressMapping,
        ranges: &'a RangeMapping,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Self {
            store,
            mapping,
            ranges,
            functions,
        }
    }

    /// Compute the value of a formula living at `formula_address`
    pub fn compute_formula(&self, formula: &FormulaExpr, formula_address: SimpleCellAddress) -> CellValue {
        self.evaluate_ast(formula, formula_address)
    }

    /// Evaluate a (sub)tree to a scalar value
    ///
    /// A range reference is not a scalar and evaluates to `#VALUE!`; functions
    /// that consume ranges inspect their argument nodes instead of calling this.
    pub fn evaluate_ast(&self, ast: &FormulaExpr, formula_address: SimpleCellAddress) -> CellValue {
        match ast {
            // === Literals ===
            FormulaExpr::Number(n) => CellValue::Number(*n),
            FormulaExpr::Text(s) => CellValue::text(s),
            FormulaExpr::Boolean(b) => CellValue::Boolean(*b),
            FormulaExpr::Error(e) => CellValue::Error(*e),

            // === References ===
            FormulaExpr::CellRef(reference) => match reference.resolve(formula_address) {
                Some(address) => self.get_cell_value(address),
                None => CellValue::Error(CellError::Ref),
            },
            FormulaExpr::RangeRef(_) => CellValue::Error(CellError::Value),

            // === Operators ===
            FormulaExpr::BinaryOp { op, left, right } => {
                let left = self.evaluate_ast(left, formula_address);
                let right = self.evaluate_ast(right, formula_address);
                evaluate_binary_op(*op, &left, &right)
            }
            FormulaExpr::UnaryOp { op, operand } => {
                let value = self.evaluate_ast(operand, formula_address);
                evaluate_unary_op(*op, &value)
            }
            FormulaExpr::Parenthesis(inner) => self.evaluate_ast(inner, formula_address),

            // === Functions ===
            FormulaExpr::Function { name, args } => match self.functions.get(name) {
                Some(def) => (def.implementation)(self, args, formula_address),
                None => CellValue::Error(CellError::Name),
            },
        }
    }

    /// Current value at an absolute address
    ///
    /// Unoccupied addresses are empty; addresses outside the loaded sheet are `#REF!`.
    pub fn get_cell_value(&self, address: SimpleCellAddress) -> CellValue {
        match self.mapping.get_cell(&address) {
            Ok(Some(id)) => self
                .store
                .get(id)
                .and_then(Vertex::cell_value)
                .cloned()
                .unwrap_or(CellValue::Error(CellError::Ref)),
            Ok(None) => CellValue::Empty,
            Err(_) => CellValue::Error(CellError::Ref),
        }
    }

    /// Values of every cell in `range`, row by row
    ///
    /// Served from the range vertex's cache, which is filled on first use in a
    /// pass. Fails with `#REF!` for ranges that leave the sheet.
    pub fn compute_list_of_values_in_range(
        &self,
        range: &AbsoluteCellRange,
    ) -> Result<&'a [CellValue], CellError> {
        let vertex = self.range_vertex(range)?;
        Ok(vertex.values_or_init(|| {
            range
                .addresses()
                .map(|address| self.get_cell_value(address))
                .collect()
        }))
    }

    /// Row offset of the first cell in the range's first column equal to `key`
    pub fn column_index_find(
        &self,
        key: &CellValue,
        range: &AbsoluteCellRange,
    ) -> Result<Option<usize>, CellError> {
        let vertex = self.range_vertex(range)?;
        let width = range.width() as usize;
        let values = self.compute_list_of_values_in_range(range)?;
        let index =
            vertex.column_index_or_init(|| ColumnIndex::build(values.iter().step_by(width)));
        Ok(index.find(key))
    }

    /// Registered functions
    pub fn functions(&self) -> &'a FunctionRegistry {
        self.functions
    }

    fn range_vertex(&self, range: &AbsoluteCellRange) -> Result<&'a RangeVertex, CellError> {
        match self.ranges.get_range(range).and_then(|id| self.store.get(id)) {
            Some(Vertex::Range(vertex)) => Ok(vertex),
            _ => Err(CellError::Ref),
        }
    }
}

/// Apply a binary operator; the first error operand wins
fn evaluate_binary_op(op: BinaryOperator, left: &CellValue, right: &CellValue) -> CellValue {
    if let Some(e) = left.error() {
        return CellValue::Error(e);
    }
    if let Some(e) = right.error() {
        return CellValue::Error(e);
    }

    match op {
        // Arithmetic operators
        BinaryOperator::Add => arithmetic(left, right, |l, r| Ok(l + r)),
        BinaryOperator::Subtract => arithmetic(left, right, |l, r| Ok(l - r)),
        BinaryOperator::Multiply => arithmetic(left, right, |l, r| Ok(l * r)),
        BinaryOperator::Divide => arithmetic(left, right, |l, r| {
            if r == 0.0 {
                Err(CellError::DivByZero)
            } else {
                Ok(l / r)
            }
        }),
        BinaryOperator::Power => arithmetic(left, right, |l, r| Ok(l.powf(r))),

        // Comparison operators
        BinaryOperator::Equal => CellValue::Boolean(compare_values(left, right).is_eq()),
        BinaryOperator::NotEqual => CellValue::Boolean(compare_values(left, right).is_ne()),
        BinaryOperator::LessThan => CellValue::Boolean(compare_values(left, right).is_lt()),
        BinaryOperator::LessEqual => CellValue::Boolean(compare_values(left, right).is_le()),
        BinaryOperator::GreaterThan => CellValue::Boolean(compare_values(left, right).is_gt()),
        BinaryOperator::GreaterEqual => CellValue::Boolean(compare_values(left, right).is_ge()),

        // Concatenation
        BinaryOperator::Concat => CellValue::text(left.to_text() + &right.to_text()),
    }
}

/// Coerce both operands and apply `f`; non-finite results are `#NUM!`
fn arithmetic(
    left: &CellValue,
    right: &CellValue,
    f: impl FnOnce(f64, f64) -> Result<f64, CellError>,
) -> CellValue {
    let result = coerce_to_number(left)
        .and_then(|l| coerce_to_number(right).map(|r| (l, r)))
        .and_then(|(l, r)| f(l, r));

    match result {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        Ok(_) => CellValue::Error(CellError::Num),
        Err(e) => CellValue::Error(e),
    }
}

/// Compare two values for ordering
///
/// An empty operand takes the blank value of the other side's type. Numbers
/// compare numerically, text case-insensitively, FALSE < TRUE; across types
/// numbers < text < booleans.
fn compare_values(left: &CellValue, right: &CellValue) -> Ordering {
    let blank_for = |other: &CellValue| match other {
        CellValue::Text(_) => CellValue::text(""),
        CellValue::Boolean(_) => CellValue::Boolean(false),
        _ => CellValue::Number(0.0),
    };
    let left_owned;
    let right_owned;
    let (left, right) = match (left, right) {
        (CellValue::Empty, other) => {
            left_owned = blank_for(other);
            (&left_owned, right)
        }
        (other, CellValue::Empty) => {
            right_owned = blank_for(other);
            (left, &right_owned)
        }
        pair => pair,
    };

    fn type_rank(value: &CellValue) -> u8 {
        match value {
            CellValue::Number(_) | CellValue::Empty => 0,
            CellValue::Text(_) => 1,
            CellValue::Boolean(_) => 2,
            CellValue::Error(_) => 3,
        }
    }

    match (left, right) {
        (CellValue::Number(l), CellValue::Number(r)) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
        (CellValue::Text(l), CellValue::Text(r)) => {
            l.as_str().to_lowercase().cmp(&r.as_str().to_lowercase())
        }
        (CellValue::Boolean(l), CellValue::Boolean(r)) => l.cmp(r),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

/// Apply a unary operator
fn evaluate_unary_op(op: UnaryOperator, value: &CellValue) -> CellValue {
    match coerce_to_number(value) {
        Ok(n) => match op {
            UnaryOperator::Negate => CellValue::Number(-n),
            UnaryOperator::Percent => CellValue::Number(n / 100.0),
        },
        Err(e) => CellValue::Error(e),
    }
}
