use crate::classify::{classify, Class, Item};
use crate::encode::{EncodingError, TooLong};
use crate::{MAX_COLUMNS, MAX_ROWS, MIN_COLUMNS, MIN_ROWS};

/// First guess of the symbol size.
///
/// The code length is tracked in half symbols, digits cost half a symbol
/// in subset C.
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) struct Estimate {
    halves: usize,
    pub rows: usize,
    pub columns: usize,
}

impl Estimate {
    pub fn code_length(&self) -> f64 {
        self.halves as f64 / 2.0
    }
}

pub(crate) fn estimate(data: &[Item]) -> Result<Estimate, EncodingError> {
    let (halves, _) = data.iter().fold((0, Class::AOrB), |(halves, last), &item| {
        let class = classify(item);
        let switch = if class != last { 2 } else { 0 };
        let symbol = if class == Class::AOrBOrC { 1 } else { 2 };
        let extended = if matches!(item, Item::Byte(0x80..=0xFF)) {
            2
        } else {
            0
        };
        (halves + switch + symbol + extended, class)
    });

    let rows = rows_for(halves);
    let columns = ((halves + 4) / (2 * rows)).max(MIN_COLUMNS);
    if columns > MAX_COLUMNS {
        return Err(EncodingError::InputTooLong(TooLong::Columns(columns)));
    }
    Ok(Estimate {
        halves,
        rows,
        columns,
    })
}

/// `round(sqrt((length + 2) / 1.45))` clamped to the allowed row count.
///
/// With the length `l = halves / 2` a row count `r` is reached iff
/// `(2r - 1)^2 <= 4 (l + 2) / 1.45 = 40 (halves + 4) / 29`.
fn rows_for(halves: usize) -> usize {
    (MIN_ROWS..=MAX_ROWS)
        .take_while(|&r| 29 * (2 * r - 1).pow(2) <= 40 * (halves + 4))
        .last()
        .unwrap_or(MIN_ROWS)
}

#[cfg(test)]
fn bytes(data: &[u8]) -> crate::std::vec::Vec<Item> {
    data.iter().map(|&b| Item::Byte(b)).collect()
}

#[test]
fn test_short_text() {
    let size = estimate(&bytes(b"AIM")).unwrap();
    assert_eq!(size.code_length(), 3.0);
    assert_eq!(size.rows, 2);
    // (3 + 2) / 2 is clamped up
    assert_eq!(size.columns, 4);
}

#[test]
fn test_digits() {
    let size = estimate(&bytes(b"123456789012345678")).unwrap();
    assert_eq!(size.code_length(), 10.0);
    assert_eq!(size.rows, 3);
    assert_eq!(size.columns, 4);
}

#[test]
fn test_switch_and_extended_cost() {
    // switch + symbol + extended for each
    let size = estimate(&bytes(b"\xE0\x80")).unwrap();
    assert_eq!(size.code_length(), 6.0);
    // the initial class is A or B
    let size = estimate(&[Item::Separator, Item::Byte(b'A')]).unwrap();
    assert_eq!(size.code_length(), 2.0);
}

#[test]
fn test_empty() {
    let size = estimate(&[]).unwrap();
    assert_eq!(size.rows, 2);
    assert_eq!(size.columns, 4);
}

#[test]
fn test_rows_match_float_formula() {
    for halves in 0..12000 {
        let length = halves as f64 / 2.0;
        // round(x) == (0.5 + x) truncated
        let mut expected = (0.5 + newton_sqrt((length + 2.0) / 1.45)) as usize;
        expected = expected.clamp(MIN_ROWS, MAX_ROWS);
        assert_eq!(rows_for(halves), expected, "halves = {}", halves);
    }
}

#[cfg(test)]
fn newton_sqrt(x: f64) -> f64 {
    // Newton iteration, enough for the test range
    let mut guess = x.max(1.0);
    for _ in 0..64 {
        guess = 0.5 * (guess + x / guess);
    }
    guess
}

#[test]
fn test_too_many_columns() {
    let data = bytes(&[0xE0; 3000]);
    assert!(matches!(
        estimate(&data),
        Err(EncodingError::InputTooLong(TooLong::Columns(c))) if c > MAX_COLUMNS
    ));
}
