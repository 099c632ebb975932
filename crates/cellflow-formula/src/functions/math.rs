//! Math functions

use super::{
    check_arity, coerce_to_number, into_value, range_argument,
    template_with_one_coerced_to_number_argument, FunctionDef,
};
use crate::ast::FormulaExpr;
use crate::interpreter::Interpreter;
use cellflow_core::{CellError, CellValue, SimpleCellAddress};

pub const IMPLEMENTED_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "ABS",
        translation_key: "ABS",
        implementation: fn_abs,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "SUM",
        translation_key: "SUM",
        implementation: fn_sum,
        inspects_shape_only: false,
    },
];

/// ABS(number)
pub fn fn_abs(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    template_with_one_coerced_to_number_argument(interpreter, args, formula_address, |n| {
        CellValue::Number(n.abs())
    })
}

/// SUM(value1, [value2], ...)
///
/// Ranges contribute only their numbers; scalar arguments are coerced.
pub fn fn_sum(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(sum(interpreter, args, formula_address))
}

fn sum(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    check_arity(args, 1, 255)?;

    let mut total = 0.0;
    for arg in args {
        match range_argument(arg, formula_address) {
            Some(range) => {
                for value in interpreter.compute_list_of_values_in_range(&range?)? {
                    match value {
                        CellValue::Number(n) => total += n,
                        CellValue::Error(e) => return Err(*e),
                        _ => {}
                    }
                }
            }
            None => total += coerce_to_number(&interpreter.evaluate_ast(arg, formula_address))?,
        }
    }

    if total.is_finite() {
        Ok(CellValue::Number(total))
    } else {
        Err(CellError::Num)
    }
}
