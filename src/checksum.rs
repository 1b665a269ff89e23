use crate::classify::{Item, Subset};
use crate::GS;

/// Code 128 check value, all symbols of a row up to but excluding the check.
pub(crate) fn row_check(symbols: impl Iterator<Item = u8>) -> u8 {
    (symbols
        .enumerate()
        .map(|(i, idx)| (i.max(1) as u64) * idx as u64)
        .sum::<u64>()
        % 103) as u8
}

/// The two symbol check characters K1 and K2 (Annex F).
pub(crate) fn symbol_checks(data: &[Item], final_subset: Subset) -> [u8; 2] {
    let (k1, k2) = data
        .iter()
        .map(|item| match item {
            Item::Byte(byte) => *byte as u64,
            Item::Separator => GS as u64,
        })
        .enumerate()
        .fold((0, 0), |(k1, k2), (i, value)| {
            (k1 + (i as u64 + 1) * value, k2 + i as u64 * value)
        });
    [k1, k2].map(|k| {
        let k = (k % 86) as u8;
        match final_subset {
            Subset::C => k,
            Subset::A | Subset::B if k + 64 > 95 => k + 64 - 96,
            Subset::A | Subset::B => k + 64,
        }
    })
}

/// Row indicator, Annex D tables D2 and D3.
pub(crate) fn row_indicator(row: usize, rows: usize, subset: Subset) -> u8 {
    let indicator = match (row, subset) {
        (0, Subset::C) => rows - 2,
        (0, _) if rows + 62 > 95 => rows + 62 - 95,
        (0, _) => rows + 62,
        (_, Subset::C) => row + 42,
        (1..=5, _) => row + 10,
        _ => row + 20,
    };
    indicator as u8
}

#[test]
fn test_symbol_checks() {
    let data = [Item::Byte(b'A'), Item::Byte(b'I'), Item::Byte(b'M')];
    // 442 % 86 = 12, 227 % 86 = 55
    assert_eq!(symbol_checks(&data, Subset::C), [12, 55]);
    assert_eq!(symbol_checks(&data, Subset::A), [76, 23]);
    assert_eq!(symbol_checks(&data, Subset::B), [76, 23]);
}

#[test]
fn test_separator_check_value() {
    let separated = [Item::Byte(b'1'), Item::Separator, Item::Byte(b'2')];
    let literal = [Item::Byte(b'1'), Item::Byte(GS), Item::Byte(b'2')];
    assert_eq!(
        symbol_checks(&separated, Subset::C),
        symbol_checks(&literal, Subset::C)
    );
}

#[test]
fn test_symbol_check_range() {
    for byte in 0..=255 {
        for subset in [Subset::A, Subset::B, Subset::C] {
            let checks = symbol_checks(&[Item::Byte(byte), Item::Byte(!byte)], subset);
            assert!(checks.iter().all(|&k| k <= 95));
        }
    }
}

#[test]
fn test_row_indicator() {
    assert_eq!(row_indicator(0, 2, Subset::C), 0);
    assert_eq!(row_indicator(0, 2, Subset::B), 64);
    assert_eq!(row_indicator(0, 33, Subset::A), 95);
    assert_eq!(row_indicator(0, 34, Subset::A), 1);
    assert_eq!(row_indicator(0, 44, Subset::B), 11);
    assert_eq!(row_indicator(1, 3, Subset::C), 43);
    assert_eq!(row_indicator(1, 3, Subset::A), 11);
    assert_eq!(row_indicator(5, 8, Subset::B), 15);
    assert_eq!(row_indicator(6, 8, Subset::B), 26);
    assert_eq!(row_indicator(43, 44, Subset::A), 63);
    assert_eq!(row_indicator(43, 44, Subset::C), 85);
}

#[test]
fn test_row_check() {
    // start A, subset B, indicator, data, Annex E weights 1, 1, 2, 3, ...
    let symbols = [103, 100, 64, 33, 41, 45, 101];
    let expected = (103 + 100 + 2 * 64 + 3 * 33 + 4 * 41 + 5 * 45 + 6 * 101) % 103;
    assert_eq!(row_check(symbols.into_iter()), expected as u8);
    assert_eq!(row_check(symbols.into_iter()), 86);
}
