//! Editing value cells and the recompute that follows

use cellflow::prelude::*;
use pretty_assertions::assert_eq;

fn loaded(rows: &[Vec<&str>]) -> Engine {
    let mut engine = Engine::new();
    engine.load_sheet(rows).unwrap();
    engine
}

fn value(engine: &Engine, a1: &str) -> CellValue {
    engine.get_cell_value(a1).unwrap()
}

#[test]
fn test_edit_propagates_to_dependents() {
    let mut engine = loaded(&[vec!["1", "=A1*2", "=B1+A1"]]);
    engine.set_cell_content("A1", "10").unwrap();

    assert_eq!(value(&engine, "A1"), CellValue::Number(10.0));
    assert_eq!(value(&engine, "B1"), CellValue::Number(20.0));
    assert_eq!(value(&engine, "C1"), CellValue::Number(30.0));
}

#[test]
fn test_content_is_classified() {
    let mut engine = loaded(&[vec!["1", "=A1+1"]]);

    engine.set_cell_content("A1", " 2.5 ").unwrap();
    assert_eq!(value(&engine, "B1"), CellValue::Number(3.5));

    engine.set_cell_content("A1", "abc").unwrap();
    assert_eq!(value(&engine, "A1"), CellValue::text("abc"));
    assert_eq!(value(&engine, "B1"), CellValue::Error(CellError::Value));

    engine.set_cell_content("A1", "").unwrap();
    assert_eq!(value(&engine, "A1"), CellValue::Empty);
    assert_eq!(value(&engine, "B1"), CellValue::Number(1.0));

    engine.set_cell_content("A1", "7").unwrap();
    engine.set_cell_content("A1", "   ").unwrap();
    assert_eq!(value(&engine, "A1"), CellValue::Empty);
    assert_eq!(value(&engine, "B1"), CellValue::Number(1.0));
}

#[test]
fn test_edit_referenced_blank() {
    let mut engine = loaded(&[vec!["=B1+1", ""]]);
    assert_eq!(value(&engine, "A1"), CellValue::Number(1.0));

    engine.set_cell_content("B1", "4").unwrap();
    assert_eq!(value(&engine, "A1"), CellValue::Number(5.0));
}

#[test]
fn test_edit_unoccupied_address() {
    let mut engine = loaded(&[vec!["1", ""], vec!["", "=A1"]]);
    engine.set_cell_content("B1", "7").unwrap();

    assert_eq!(value(&engine, "B1"), CellValue::Number(7.0));
    assert_eq!(value(&engine, "B2"), CellValue::Number(1.0));
}

#[test]
fn test_edit_invalidates_range_caches() {
    let mut engine = loaded(&[
        vec!["1", "=SUM(A1:A2)", "=VLOOKUP(\"b\",C3:D4,2)"],
        vec!["2", "=MATCH(5,A1:A2)", ""],
        vec!["", "", "a", "x"],
        vec!["", "", "c", "y"],
    ]);
    assert_eq!(value(&engine, "B1"), CellValue::Number(3.0));
    assert_eq!(value(&engine, "B2"), CellValue::Error(CellError::Na));
    assert_eq!(value(&engine, "C1"), CellValue::Error(CellError::Na));

    engine.set_cell_content("A2", "5").unwrap();
    engine.set_cell_content("C4", "b").unwrap();

    assert_eq!(value(&engine, "B1"), CellValue::Number(6.0));
    assert_eq!(value(&engine, "B2"), CellValue::Number(2.0));
    assert_eq!(value(&engine, "C1"), CellValue::text("y"));
}

#[test]
fn test_rejected_edits() {
    let mut engine = loaded(&[vec!["1", "=A1"]]);

    assert!(matches!(
        engine.set_cell_content("B1", "2"),
        Err(Error::UnsupportedEdit { .. })
    ));
    assert!(matches!(
        engine.set_cell_content("A1", "=2"),
        Err(Error::UnsupportedEdit { .. })
    ));
    assert!(matches!(
        engine.set_cell_content("C1", "2"),
        Err(Error::AddressOutOfBounds { .. })
    ));
    assert!(matches!(
        engine.set_cell_content("not an address", "2"),
        Err(Error::InvalidAddress(_))
    ));

    // Nothing changed
    assert_eq!(value(&engine, "A1"), CellValue::Number(1.0));
    assert_eq!(value(&engine, "B1"), CellValue::Number(1.0));
    assert_eq!(engine.get_stats().evaluation_passes, 1);
}

#[test]
fn test_edit_only_touches_target() {
    let mut engine = loaded(&[vec!["1", "2", "=A1+B1"]]);
    engine.set_cell_content("A1", "3").unwrap();

    assert_eq!(value(&engine, "B1"), CellValue::Number(2.0));
    assert_eq!(value(&engine, "C1"), CellValue::Number(5.0));
}
