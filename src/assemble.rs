use crate::std::vec::Vec;

use crate::checksum::{row_check, row_indicator};
use crate::classify::Subset;
use crate::encode::BlockMatrix;
use crate::{Row, START_A, STOP};

/// Frame each row of the matrix as a Code 128 symbol sequence:
/// start A, subset selector, row indicator, data, row check, stop.
pub(crate) fn assemble(matrix: &BlockMatrix, subsets: &[Subset]) -> Vec<Row> {
    let rows = matrix.rows();
    subsets
        .iter()
        .enumerate()
        .map(|(i, &subset)| {
            let indicator = row_indicator(i, rows, subset);
            let mut symbols = Vec::with_capacity(matrix.columns() + 5);
            symbols.push(START_A);
            symbols.push(subset.selector());
            symbols.push(indicator);
            symbols.extend_from_slice(matrix.row(i));
            let check = row_check(symbols.iter().cloned());
            symbols.push(check);
            symbols.push(STOP);
            log::trace!("row {}: {:?}", i, symbols);
            Row {
                subset,
                indicator,
                check,
                symbols,
            }
        })
        .collect()
}

/// Height of every row in modules (4.6.1.a).
pub(crate) fn row_height(columns: usize) -> usize {
    (55 * (columns + 3) / 100 + 3).max(8)
}

#[test]
fn test_row_height() {
    assert_eq!(row_height(4), 8);
    assert_eq!(row_height(10), 10);
    assert_eq!(row_height(17), 14);
    assert_eq!(row_height(62), 38);
    for columns in crate::MIN_COLUMNS..=crate::MAX_COLUMNS {
        let float = ((0.55 * (columns + 3) as f64) as usize + 3).max(8);
        assert_eq!(row_height(columns), float);
    }
}
