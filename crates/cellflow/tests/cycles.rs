//! Cycle isolation during evaluation passes

use cellflow::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const CYCLE: CellValue = CellValue::Error(CellError::Cycle);

fn loaded(rows: &[Vec<&str>]) -> Engine {
    let mut engine = Engine::new();
    engine.load_sheet(rows).unwrap();
    engine
}

#[test]
fn test_self_reference() {
    let engine = loaded(&[vec!["=A1+1", "=A1"]]);
    assert_eq!(engine.get_cell_value("A1").unwrap(), CYCLE);
    assert_eq!(engine.get_cell_value("B1").unwrap(), CYCLE);
    assert_eq!(engine.get_stats().cycled_count, 1);
}

#[test]
fn test_only_cycle_members_are_cycled() {
    let engine = loaded(&[vec!["=B1", "=A1", "=A1+1", "5", "=D1*2"]]);

    assert_eq!(engine.get_cell_value("A1").unwrap(), CYCLE);
    assert_eq!(engine.get_cell_value("B1").unwrap(), CYCLE);
    // Downstream of the cycle: sorted, sees the error through propagation
    assert_eq!(engine.get_cell_value("C1").unwrap(), CYCLE);
    // Unrelated cells still evaluate
    assert_eq!(engine.get_cell_value("E1").unwrap(), CellValue::Number(10.0));
    assert_eq!(engine.get_stats().cycled_count, 2);
}

#[test]
fn test_longer_cycle() {
    let engine = loaded(&[vec!["=B1", "=C1", "=D1", "=A1"], vec!["=ABS(C1)", "1", "", ""]]);

    for cell in ["A1", "B1", "C1", "D1", "A2"] {
        assert_eq!(engine.get_cell_value(cell).unwrap(), CYCLE, "{cell}");
    }
    assert_eq!(engine.get_cell_value("B2").unwrap(), CellValue::Number(1.0));
    assert_eq!(engine.get_stats().cycled_count, 4);
}

#[test]
fn test_shape_function_ignores_cycled_cells() {
    // COLUMNS never reads the cycled cells, so it computes normally
    let engine = loaded(&[vec!["=B1", "=A1", "=COLUMNS(A1:B1)"]]);
    assert_eq!(engine.get_cell_value("C1").unwrap(), CellValue::Number(2.0));
}

#[test]
fn test_range_on_cycle_is_fatal() {
    let mut engine = Engine::new();
    let err = engine
        .load_sheet(&[vec!["1"], vec!["=SUM(A1:A3)"], vec!["2"]])
        .unwrap_err();
    assert!(matches!(err, Error::NonFormulaOnCycle(_)));
    assert!(!engine.is_loaded());
}

#[test]
fn test_cycle_stays_after_edit() {
    let mut engine = loaded(&[vec!["=B1+C1", "=A1", "1"]]);
    engine.set_cell_content("C1", "2").unwrap();

    assert_eq!(engine.get_cell_value("A1").unwrap(), CYCLE);
    assert_eq!(engine.get_cell_value("C1").unwrap(), CellValue::Number(2.0));
}

/// Expected value of cell `col` when every formula is `=<ref>+1`
///
/// Walks the reference chain: reaching a number `n` after `k` steps gives
/// `n + k`, coming back to a visited cell means the chain hits a cycle.
fn chain_value(cells: &[std::result::Result<f64, usize>], col: usize) -> CellValue {
    let mut visited = vec![false; cells.len()];
    let mut steps = 0.0;
    let mut current = col;
    loop {
        if visited[current] {
            return CYCLE;
        }
        visited[current] = true;
        match cells[current] {
            Ok(n) => return CellValue::Number(n + steps),
            Err(next) => {
                steps += 1.0;
                current = next;
            }
        }
    }
}

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

proptest! {
    #[test]
    fn prop_reference_chains(
        cells in prop::collection::vec(
            prop_oneof![
                (0u8..100).prop_map(|n| Ok::<f64, usize>(n as f64)),
                (0usize..8).prop_map(Err::<f64, usize>),
            ],
            1..8,
        )
    ) {
        let width = cells.len();
        let cells: Vec<std::result::Result<f64, usize>> = cells
            .into_iter()
            .map(|cell| cell.map_err(|target| target % width))
            .collect();
        let row: Vec<String> = cells
            .iter()
            .map(|cell| match cell {
                Ok(n) => n.to_string(),
                Err(target) => format!("={}1+1", column_letter(*target)),
            })
            .collect();

        let mut engine = Engine::new();
        engine.load_sheet(&[row]).unwrap();

        for col in 0..width {
            let a1 = format!("{}1", column_letter(col));
            prop_assert_eq!(engine.get_cell_value(&a1).unwrap(), chain_value(&cells, col));
        }

        let before = engine.values().unwrap();
        engine.recompute_formulas().unwrap();
        prop_assert_eq!(engine.values().unwrap(), before);
    }
}
