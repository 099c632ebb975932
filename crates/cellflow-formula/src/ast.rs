//! Formula expression tree
//!
//! References are stored relative to the cell that owns the formula, so the
//! same tree means the same thing wherever the formula lives. They are resolved
//! to absolute addresses against the formula address at evaluation time.

use cellflow_core::{AbsoluteCellRange, CellError, SimpleCellAddress};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// Text literal
    Text(String),
    /// Boolean literal
    Boolean(bool),
    /// Error literal (also produced for formulas that failed to parse)
    Error(CellError),

    // === References ===
    /// Single cell reference
    CellRef(CellReference),
    /// Range reference
    RangeRef(RangeReference),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Parenthesized expression
    Parenthesis(Box<FormulaExpr>),

    // === Function call ===
    Function {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

/// Cell reference as offsets from the formula's own address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellReference {
    pub col_offset: i64,
    pub row_offset: i64,
}

impl CellReference {
    /// Create a reference from raw offsets
    pub fn new(col_offset: i64, row_offset: i64) -> Self {
        Self {
            col_offset,
            row_offset,
        }
    }

    /// Reference pointing at `target` from a formula living at `base`
    pub fn relative_to(target: SimpleCellAddress, base: SimpleCellAddress) -> Self {
        Self::new(
            target.col as i64 - base.col as i64,
            target.row as i64 - base.row as i64,
        )
    }

    /// Resolve against the formula address; `None` if it lands left of column A or above row 1
    pub fn resolve(&self, base: SimpleCellAddress) -> Option<SimpleCellAddress> {
        base.offset(self.col_offset, self.row_offset)
    }
}

/// Range reference with two relative corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeReference {
    pub start: CellReference,
    pub end: CellReference,
}

impl RangeReference {
    /// Create a range reference from two corners
    pub fn new(start: CellReference, end: CellReference) -> Self {
        Self { start, end }
    }

    /// Build the absolute range this reference denotes for a formula at `base`
    pub fn resolve(&self, base: SimpleCellAddress) -> Option<AbsoluteCellRange> {
        let start = self.start.resolve(base)?;
        let end = self.end.resolve(base)?;
        Some(AbsoluteCellRange::from_corners(start, end))
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Text
    Concat,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Percent,
}

/// Something a formula reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Cell(SimpleCellAddress),
    Range(AbsoluteCellRange),
}

impl FormulaExpr {
    /// Collect every cell and range this expression reads, resolved against `base`
    ///
    /// References that resolve to negative coordinates are skipped; they
    /// evaluate to `#REF!` and have nothing to depend on.
    pub fn dependencies(&self, base: SimpleCellAddress) -> Vec<Dependency> {
        self.dependencies_skipping(base, &|_| false)
    }

    /// Like [`FormulaExpr::dependencies`], but ignores the arguments of every
    /// function call whose name satisfies `skip`
    ///
    /// Used for functions that only look at the shape of their arguments and
    /// never read the cells behind them.
    pub fn dependencies_skipping(
        &self,
        base: SimpleCellAddress,
        skip: &dyn Fn(&str) -> bool,
    ) -> Vec<Dependency> {
        let mut deps = Vec::new();
        self.collect_dependencies(base, skip, &mut deps);
        deps
    }

    fn collect_dependencies(
        &self,
        base: SimpleCellAddress,
        skip: &dyn Fn(&str) -> bool,
        deps: &mut Vec<Dependency>,
    ) {
        match self {
            FormulaExpr::CellRef(cell) => {
                if let Some(address) = cell.resolve(base) {
                    deps.push(Dependency::Cell(address));
                }
            }
            FormulaExpr::RangeRef(range) => {
                if let Some(range) = range.resolve(base) {
                    deps.push(Dependency::Range(range));
                }
            }
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_dependencies(base, skip, deps);
                right.collect_dependencies(base, skip, deps);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_dependencies(base, skip, deps),
            FormulaExpr::Parenthesis(inner) => inner.collect_dependencies(base, skip, deps),
            FormulaExpr::Function { name, args } => {
                if skip(name) {
                    return;
                }
                for arg in args {
                    arg.collect_dependencies(base, skip, deps);
                }
            }
            FormulaExpr::Number(_)
            | FormulaExpr::Text(_)
            | FormulaExpr::Boolean(_)
            | FormulaExpr::Error(_) => {}
        }
    }
}
