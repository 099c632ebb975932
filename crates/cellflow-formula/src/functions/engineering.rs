//! Engineering functions: bitwise operations and binary conversion

use super::{check_arity, evaluate_number, evaluate_scalar, into_value, FunctionDef};
use crate::ast::FormulaExpr;
use crate::interpreter::Interpreter;
use cellflow_core::{CellError, CellValue, SimpleCellAddress};

pub const IMPLEMENTED_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "BITAND",
        translation_key: "BITAND",
        implementation: fn_bitand,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "BITOR",
        translation_key: "BITOR",
        implementation: fn_bitor,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "BITXOR",
        translation_key: "BITXOR",
        implementation: fn_bitxor,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "BIN2DEC",
        translation_key: "BIN2DEC",
        implementation: fn_bin2dec,
        inspects_shape_only: false,
    },
    FunctionDef {
        name: "DEC2BIN",
        translation_key: "DEC2BIN",
        implementation: fn_dec2bin,
        inspects_shape_only: false,
    },
];

/// Bitwise operands must be integers in `0..2^48`
const MAX_BITWISE_OPERAND: f64 = 281_474_976_710_655.0;

/// Ten binary digits, the top one being the sign
const BINARY_DIGITS: usize = 10;

/// BITAND(number1, number2)
pub fn fn_bitand(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(bitwise(interpreter, args, formula_address, |a, b| a & b))
}

/// BITOR(number1, number2)
pub fn fn_bitor(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(bitwise(interpreter, args, formula_address, |a, b| a | b))
}

/// BITXOR(number1, number2)
pub fn fn_bitxor(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(bitwise(interpreter, args, formula_address, |a, b| a ^ b))
}

fn bitwise(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
    op: impl FnOnce(u64, u64) -> u64,
) -> Result<CellValue, CellError> {
    check_arity(args, 2, 2)?;

    let left = bitwise_operand(evaluate_number(interpreter, &args[0], formula_address)?)?;
    let right = bitwise_operand(evaluate_number(interpreter, &args[1], formula_address)?)?;

    Ok(CellValue::Number(op(left, right) as f64))
}

fn bitwise_operand(n: f64) -> Result<u64, CellError> {
    if n < 0.0 || n.fract() != 0.0 || n > MAX_BITWISE_OPERAND {
        Err(CellError::Num)
    } else {
        Ok(n as u64)
    }
}

/// BIN2DEC(binary)
///
/// Up to ten binary digits; a ten-digit value starting with 1 is a two's
/// complement negative.
pub fn fn_bin2dec(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(bin2dec(interpreter, args, formula_address))
}

fn bin2dec(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    check_arity(args, 1, 1)?;

    let digits = match evaluate_scalar(interpreter, &args[0], formula_address)? {
        CellValue::Number(n) if n >= 0.0 && n.fract() == 0.0 => format!("{}", n as u64),
        CellValue::Number(_) => return Err(CellError::Num),
        CellValue::Text(s) => s.as_str().trim().to_string(),
        CellValue::Empty => "0".to_string(),
        _ => return Err(CellError::Value),
    };

    if digits.is_empty()
        || digits.len() > BINARY_DIGITS
        || !digits.bytes().all(|b| b == b'0' || b == b'1')
    {
        return Err(CellError::Num);
    }

    let value = i64::from_str_radix(&digits, 2).map_err(|_| CellError::Num)?;
    let value = if digits.len() == BINARY_DIGITS && digits.starts_with('1') {
        value - (1 << BINARY_DIGITS)
    } else {
        value
    };

    Ok(CellValue::Number(value as f64))
}

/// DEC2BIN(number, [places])
///
/// Accepts -512..=511. Negatives are rendered as ten-digit two's complement and
/// ignore `places`.
pub fn fn_dec2bin(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> CellValue {
    into_value(dec2bin(interpreter, args, formula_address))
}

fn dec2bin(
    interpreter: &Interpreter<'_>,
    args: &[FormulaExpr],
    formula_address: SimpleCellAddress,
) -> Result<CellValue, CellError> {
    check_arity(args, 1, 2)?;

    let number = evaluate_number(interpreter, &args[0], formula_address)?.trunc();
    let limit = (1i64 << (BINARY_DIGITS - 1)) as f64;
    if number < -limit || number >= limit {
        return Err(CellError::Num);
    }
    let number = number as i64;

    if number < 0 {
        let twos_complement = number + (1 << BINARY_DIGITS);
        return Ok(CellValue::text(format!("{:b}", twos_complement)));
    }

    let binary = format!("{:b}", number);
    match args.get(1) {
        Some(places) => {
            let places = evaluate_number(interpreter, places, formula_address)?.trunc();
            if places < 1.0 || places > BINARY_DIGITS as f64 || (places as usize) < binary.len() {
                return Err(CellError::Num);
            }
            Ok(CellValue::text(format!(
                "{:0>width$}",
                binary,
                width = places as usize
            )))
        }
        None => Ok(CellValue::text(binary)),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{eval, TestSheet};
    use cellflow_core::{CellError, CellValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bitxor_arity() {
        assert_eq!(eval("=BITXOR(101)"), CellValue::Error(CellError::Na));
        assert_eq!(eval("=BITXOR(1,2,3)"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_bitxor_rejects_text() {
        assert_eq!(eval("=BITXOR(1,\"foo\")"), CellValue::Error(CellError::Value));
        assert_eq!(eval("=BITXOR(\"bar\",4)"), CellValue::Error(CellError::Value));
        assert_eq!(eval("=BITXOR(\"foo\",\"baz\")"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_bitxor_rejects_negative_and_fractional() {
        assert_eq!(eval("=BITXOR(1,-2)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=BITXOR(1.2,2)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=BITXOR(2,281474976710656)"), CellValue::Error(CellError::Num));
    }

    #[test]
    fn test_bitxor() {
        assert_eq!(eval("=BITXOR(1,5)"), CellValue::Number(4.0));
        assert_eq!(eval("=BITXOR(457,111)"), CellValue::Number(422.0));
        assert_eq!(eval("=BITXOR(BIN2DEC(101),BIN2DEC(1))"), CellValue::Number(4.0));
        assert_eq!(eval("=BITXOR(256,123)"), CellValue::Number(379.0));
        assert_eq!(eval("=BITXOR(0,0)"), CellValue::Number(0.0));
    }

    #[test]
    fn test_bitand_bitor() {
        assert_eq!(eval("=BITAND(13,25)"), CellValue::Number(9.0));
        assert_eq!(eval("=BITOR(23,10)"), CellValue::Number(31.0));
        assert_eq!(eval("=BITAND(1)"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_bitxor_reads_cells() {
        let sheet = TestSheet::new(&[vec!["1", "5", "=BITXOR(A1,B1)", "=BITXOR(A1,#REF!)"]]);
        assert_eq!(sheet.value("C1"), CellValue::Number(4.0));
        assert_eq!(sheet.value("D1"), CellValue::Error(CellError::Ref));
    }

    #[test]
    fn test_bin2dec() {
        assert_eq!(eval("=BIN2DEC(1100100)"), CellValue::Number(100.0));
        assert_eq!(eval("=BIN2DEC(\"101\")"), CellValue::Number(5.0));
        assert_eq!(eval("=BIN2DEC(1111111111)"), CellValue::Number(-1.0));
        assert_eq!(eval("=BIN2DEC(\"1000000000\")"), CellValue::Number(-512.0));
        assert_eq!(eval("=BIN2DEC(102)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=BIN2DEC(\"11111111111\")"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=BIN2DEC(TRUE)"), CellValue::Error(CellError::Value));
        assert_eq!(eval("=BIN2DEC()"), CellValue::Error(CellError::Na));
    }

    #[test]
    fn test_dec2bin() {
        assert_eq!(eval("=DEC2BIN(9)"), CellValue::text("1001"));
        assert_eq!(eval("=DEC2BIN(9,6)"), CellValue::text("001001"));
        assert_eq!(eval("=DEC2BIN(-1)"), CellValue::text("1111111111"));
        assert_eq!(eval("=DEC2BIN(-512)"), CellValue::text("1000000000"));
        assert_eq!(eval("=DEC2BIN(512)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=DEC2BIN(9,2)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=DEC2BIN(\"x\")"), CellValue::Error(CellError::Value));
    }
}
