//! Lookup and reference functions

use super::{check_arity, into_value, range_argument, FunctionDef};
use crate::ast::FormulaExpr;
use crate::interpreter::Interpreter;
use cellflow_core::{AbsoluteCellRange, CellError, CellValue, SimpleCellAddress};

pub const IMPLEMENTED_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "VLOOKUP",
        translation_key: "VLOOKUP",
        implementation: fn_vlookup,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "MATCH",
        translation_key: "MATCH",
        implementation: fn_match,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "COLUMNS",
        translation_key: "COLUMNS",
        implementation: fn_columns,
        inspects_shape_only: true,
    },
    FunctionDef {
        name: "ROWS",
        translation_key: "ROWS",
        implementation: fn_rows,
        inspects_shape_only: true,
    },
];

/// Lookup keys must be numbers, text or booleans
fn lookup_key(
    interpreter: &Interpreter<'_>,
    arg: &FormulaExpr,
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    match interpreter.evaluate_ast(arg, formula_address) {
        key @ (CellValue::Number(_) | CellValue::Text(_) | CellValue::Boolean(_)) => Ok(key),
        _ => Err(CellError::Value),
    }
}

/// The searched range must be written as a range, not computed
fn lookup_range(
    arg: &FormulaExpr,
    formula_address: SimpleCellAddress,
) -> Result<AbsoluteCellRange, CellError> {
    range_argument(arg, formula_address).unwrap_or(Err(CellError::Value))
}

/// Typed exact equality: mismatched types never match
fn lookup_equal(value: &CellValue, key: &CellValue) -> bool {
    match (value, key) {
        (CellValue::Number(a), CellValue::Number(b)) => a == b,
        (CellValue::Text(a), CellValue::Text(b)) => a == b,
        (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
        _ => false,
    }
}

/// VLOOKUP(key, range, index, [sorted])
///
/// Searches the first column of `range` for the topmost exact match and
/// returns the cell `index` columns into the range on that row. `sorted` must
/// be a boolean when given; the search is the same either way.
pub fn fn_vlookup(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(vlookup(interpreter, args, formula_address))
}

fn vlookup(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    check_arity(args, 3, 4)?;

    let key = lookup_key(interpreter, &args[0], formula_address)?;
    let range = lookup_range(&args[1], formula_address)?;

    let index = match interpreter.evaluate_ast(&args[2], formula_address) {
        CellValue::Number(n) => n.trunc(),
        _ => return Err(CellError::Value),
    };

    if let Some(sorted) = args.get(3) {
        if !matches!(
            interpreter.evaluate_ast(sorted, formula_address),
            CellValue::Boolean(_)
        ) {
            return Err(CellError::Value);
        }
    }

    if index < 1.0 {
        return Err(CellError::Value);
    }
    if index > range.width() as f64 {
        return Err(CellError::Ref);
    }

    let row = interpreter
        .column_index_find(&key, &range)?
        .ok_or(CellError::Na)?;

    Ok(interpreter.get_cell_value(range.address(index as u32 - 1, row as u32)))
}

/// MATCH(key, range, [match_type])
///
/// 1-based position of the first exact match. `match_type` is accepted for
/// arity but ignored. Single columns are searched
/// through the range's column index, anything wider is flattened row by row.
pub fn fn_match(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(match_position(interpreter, args, formula_address))
}

fn match_position(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    check_arity(args, 2, 3)?;

    let key = lookup_key(interpreter, &args[0], formula_address)?;
    let range = lookup_range(&args[1], formula_address)?;

    // Only exact matching is supported; the match type is never evaluated
    let position = if range.width() == 1 {
        interpreter.column_index_find(&key, &range)?
    } else {
        interpreter
            .compute_list_of_values_in_range(&range)?
            .iter()
            .position(|value| lookup_equal(value, &key))
    };

    position
        .map(|offset| CellValue::Number((offset + 1) as f64))
        .ok_or(CellError::Na)
}

/// COLUMNS(range)
///
/// Looks only at the shape of the argument: a scalar, even an error, is `#VALUE!`.
pub fn fn_columns(
    _interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(
        range_shape(args, formula_address).map(|range| CellValue::Number(range.width() as f64)),
    )
}

/// ROWS(range)
pub fn fn_rows(
    _interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(
        range_shape(args, formula_address).map(|range| CellValue::Number(range.height() as f64)),
    )
}

fn range_shape(
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> Result<AbsoluteCellRange, CellError> {
    check_arity(args, 1, 1)?;
    lookup_range(&args[0], formula_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{eval, TestSheet};
    use pretty_assertions::assert_eq;

    fn price_list(formula: &str) -> CellValue {
        TestSheet::new(&[
            vec!["apple", "1.5", formula],
            vec!["pear", "2", ""],
            vec!["7", "seven", ""],
            vec!["pear", "3", ""],
        ])
        .value("C1")
    }

    #[test]
    fn test_vlookup_finds_first_match() {
        assert_eq!(price_list("=VLOOKUP(\"pear\", A1:B4, 2)"), CellValue::Number(2.0));
        assert_eq!(price_list("=VLOOKUP(7, A1:B4, 2)"), CellValue::text("seven"));
        assert_eq!(price_list("=VLOOKUP(\"apple\", A1:B4, 1)"), CellValue::text("apple"));
        assert_eq!(
            price_list("=VLOOKUP(\"pear\", A1:B4, 2, FALSE)"),
            CellValue::Number(2.0)
        );
        // Index is truncated
        assert_eq!(price_list("=VLOOKUP(7, A1:B4, 2.9)"), CellValue::text("seven"));
    }

    #[test]
    fn test_vlookup_not_found() {
        assert_eq!(price_list("=VLOOKUP(\"plum\", A1:B4, 2)"), CellValue::Error(CellError::Na));
        // Typed equality: the number 7 is not the text "7" and case matters
        assert_eq!(price_list("=VLOOKUP(\"7\", A1:B4, 2)"), CellValue::Error(CellError::Na));
        assert_eq!(price_list("=VLOOKUP(\"PEAR\", A1:B4, 2)"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_vlookup_argument_errors() {
        assert_eq!(price_list("=VLOOKUP(1, A1:B4)"), CellValue::Error(CellError::Na));
        assert_eq!(
            price_list("=VLOOKUP(1, A1:B4, 2, TRUE, 1)"),
            CellValue::Error(CellError::Na)
        );
        assert_eq!(price_list("=VLOOKUP(A1:A2, A1:B4, 2)"), CellValue::Error(CellError::Value));
        assert_eq!(price_list("=VLOOKUP(#N/A, A1:B4, 2)"), CellValue::Error(CellError::Value));
        assert_eq!(price_list("=VLOOKUP(7, 42, 2)"), CellValue::Error(CellError::Value));
        assert_eq!(price_list("=VLOOKUP(7, A1:B4, \"2\")"), CellValue::Error(CellError::Value));
        assert_eq!(price_list("=VLOOKUP(7, A1:B4, 0)"), CellValue::Error(CellError::Value));
        assert_eq!(price_list("=VLOOKUP(7, A1:B4, 3)"), CellValue::Error(CellError::Ref));
        assert_eq!(price_list("=VLOOKUP(7, A1:B4, 2, 1)"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_vlookup_index_past_width_is_ref_whether_or_not_key_is_found() {
        assert_eq!(price_list("=VLOOKUP(\"pear\", A1:B4, 3)"), CellValue::Error(CellError::Ref));
        assert_eq!(price_list("=VLOOKUP(\"plum\", A1:B4, 3)"), CellValue::Error(CellError::Ref));
        assert_eq!(price_list("=VLOOKUP(99, A1:B4, 5)"), CellValue::Error(CellError::Ref));
    }

    #[test]
    fn test_vlookup_reads_computed_cells() {
        let sheet = TestSheet::new(&[
            vec!["=1+1", "two", "=VLOOKUP(2, A1:B2, 2)"],
            vec!["=A1+1", "three", "=VLOOKUP(A2, A1:B2, 2)"],
        ]);
        assert_eq!(sheet.value("C1"), CellValue::text("two"));
        assert_eq!(sheet.value("C2"), CellValue::text("three"));
    }

    #[test]
    fn test_match_single_column() {
        let sheet = TestSheet::new(&[
            vec!["10", "=MATCH(30, A1:A4)"],
            vec!["20", "=MATCH(10, A1:A4, 0)"],
            vec!["30", "=MATCH(99, A1:A4)"],
            vec!["30", "=MATCH(\"10\", A1:A4)"],
        ]);
        assert_eq!(sheet.value("B1"), CellValue::Number(3.0));
        assert_eq!(sheet.value("B2"), CellValue::Number(1.0));
        assert_eq!(sheet.value("B3"), CellValue::Error(CellError::Na));
        assert_eq!(sheet.value("B4"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_match_flattens_wider_ranges() {
        let sheet = TestSheet::new(&[
            vec!["a", "b", "c", "=MATCH(\"c\", A1:C1)"],
            vec!["d", "e", "f", "=MATCH(\"e\", A1:C2)"],
            vec!["", "", "", "=MATCH(\"z\", A1:C2)"],
        ]);
        assert_eq!(sheet.value("D1"), CellValue::Number(3.0));
        assert_eq!(sheet.value("D2"), CellValue::Number(5.0));
        assert_eq!(sheet.value("D3"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_match_ignores_match_type() {
        let sheet = TestSheet::new(&[
            vec!["1", "=MATCH(1, A1:A2, \"exact\")"],
            vec!["2", "=MATCH(2, A1:A2, 1/0)"],
        ]);
        assert_eq!(sheet.value("B1"), CellValue::Number(1.0));
        assert_eq!(sheet.value("B2"), CellValue::Number(2.0));
    }

    #[test]
    fn test_match_argument_errors() {
        assert_eq!(eval("=MATCH(1)"), CellValue::Error(CellError::Na));
        assert_eq!(eval("=MATCH(1, 2)"), CellValue::Error(CellError::Value));
        assert_eq!(eval("=MATCH(1, B1:B1, 0, 0)"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_columns() {
        assert_eq!(eval("=COLUMNS()"), CellValue::Error(CellError::Na));
        assert_eq!(eval("=COLUMNS(A1:B1, A2:B2)"), CellValue::Error(CellError::Na));
        assert_eq!(eval("=COLUMNS(A1:C2)"), CellValue::Number(3.0));
        assert_eq!(eval("=COLUMNS(A1)"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_columns_propagates_only_direct_errors() {
        let sheet = TestSheet::new(&[vec!["=4/0"], vec!["=COLUMNS(4/0)"], vec!["=COLUMNS(A1)"]]);
        assert_eq!(sheet.value("A2"), CellValue::Error(CellError::Value));
        assert_eq!(sheet.value("A3"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_columns_rejects_function_results() {
        let sheet = TestSheet::new(&[
            vec!["1", "1"],
            vec!["1", "1"],
            vec!["=COLUMNS(SUM(A1:B2))", ""],
        ]);
        assert_eq!(sheet.value("A3"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_rows() {
        assert_eq!(eval("=ROWS(A1:C2)"), CellValue::Number(2.0));
        assert_eq!(eval("=ROWS(B3:B1)"), CellValue::Number(3.0));
        assert_eq!(eval("=ROWS(1)"), CellValue::Error(CellError::Value));
    }
}
