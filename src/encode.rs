use core::fmt;

use crate::std::vec;
use crate::std::vec::Vec;

#[cfg(feature = "std")]
use thiserror::Error;

use crate::classify::{classify, code_value, row_start_subset, Class, Item, Subset};
use crate::{CODE_A, CODE_B, FNC1, MAX_ROWS, SHIFT};

/// The limit an input exceeded.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TooLong {
    /// More than 5450 input bytes.
    Bytes(usize),
    /// The size estimate asked for more than 62 columns.
    Columns(usize),
}

impl fmt::Display for TooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TooLong::Bytes(n) => write!(f, "{} bytes exceed the limit of {}", n, crate::MAX_INPUT),
            TooLong::Columns(n) => write!(
                f,
                "{} columns exceed the limit of {}",
                n,
                crate::MAX_COLUMNS
            ),
        }
    }
}

/// Errors that can occur during encoding.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum EncodingError {
    /// A character of the text is outside of Latin 1.
    #[cfg_attr(feature = "std", error("character {0:?} is not covered by Latin 1"))]
    InvalidInput(char),
    /// The data can not fit into a symbol of the maximal width.
    #[cfg_attr(feature = "std", error("input too long: {0}"))]
    InputTooLong(TooLong),
    /// The encoded data needs more than the maximal number of rows.
    #[cfg_attr(feature = "std", error("data needs more than 44 rows"))]
    CapacityExceeded,
}

/// Grid of symbol values, one row per symbol row, without row framing.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct BlockMatrix {
    columns: usize,
    cells: Vec<u8>,
}

impl BlockMatrix {
    fn new(columns: usize) -> Self {
        Self {
            columns,
            cells: vec![0; columns],
        }
    }

    fn push_row(&mut self) {
        self.cells.resize(self.cells.len() + self.columns, 0);
    }

    #[inline]
    fn set(&mut self, row: usize, column: usize, value: u8) {
        debug_assert!(column < self.columns);
        self.cells[row * self.columns + column] = value;
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.cells.len() / self.columns
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row * self.columns..(row + 1) * self.columns]
    }

    /// Place the symbol check characters into the last two cells.
    pub fn set_checks(&mut self, checks: [u8; 2]) {
        let len = self.cells.len();
        self.cells[len - 2..].copy_from_slice(&checks);
    }
}

/// Result of the row encoding, before any check character is known.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct Layout {
    pub matrix: BlockMatrix,
    /// Starting subset of each row.
    pub subsets: Vec<Subset>,
    /// Subset in effect when the data ended.
    pub final_subset: Subset,
}

struct EncoderState<'a> {
    data: &'a [Item],
    position: usize,
    gs1: bool,
    matrix: BlockMatrix,
    subsets: Vec<Subset>,
    row: usize,
    column: usize,
    /// Free columns in the current row.
    remaining: usize,
    subset: Subset,
}

impl<'a> EncoderState<'a> {
    fn new(data: &'a [Item], columns: usize, gs1: bool) -> Self {
        Self {
            data,
            position: 0,
            gs1,
            matrix: BlockMatrix::new(columns),
            subsets: vec![Subset::A],
            row: 0,
            column: 0,
            remaining: columns,
            subset: Subset::A,
        }
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<Item> {
        self.data.get(self.position + offset).copied()
    }

    #[inline]
    fn class_at(&self, offset: usize) -> Option<Class> {
        self.peek(offset).map(classify)
    }

    #[inline]
    fn is_digit_at(&self, offset: usize) -> bool {
        self.peek(offset).is_some_and(Item::is_digit)
    }

    #[inline]
    fn has_pair(&self) -> bool {
        self.is_digit_at(0) && self.is_digit_at(1)
    }

    /// Length of the numeric run at the cursor, a separator counts as two digits.
    fn digit_run(&self) -> usize {
        self.data[self.position..]
            .iter()
            .map_while(|item| match item {
                Item::Byte(b'0'..=b'9') => Some(1),
                Item::Separator => Some(2),
                _ => None,
            })
            .sum()
    }

    #[inline]
    fn push(&mut self, symbol: u8) {
        debug_assert!(self.remaining > 0);
        self.matrix.set(self.row, self.column, symbol);
        self.column += 1;
        self.remaining -= 1;
    }

    /// Encode and consume `byte` in subset A or B.
    fn push_byte(&mut self, subset: Subset, byte: u8) {
        if byte >= 0x80 {
            self.push(subset.fnc4());
        }
        self.push(code_value(byte));
        self.position += 1;
    }

    /// Encode and consume two digits in subset C.
    fn push_pair(&mut self) {
        if let (Some(Item::Byte(c1)), Some(Item::Byte(c2))) = (self.peek(0), self.peek(1)) {
            self.push((c1 - b'0') * 10 + (c2 - b'0'));
            self.position += 2;
        }
    }

    #[inline]
    fn latch(&mut self, subset: Subset) {
        self.push(subset.code());
        self.subset = subset;
    }

    /// Consume a column with an alternating Code A / Code B character.
    #[inline]
    fn fill(&mut self) {
        self.latch(self.subset.filler());
    }

    fn next_row(&mut self) -> Result<(), EncodingError> {
        if self.row + 1 >= MAX_ROWS {
            return Err(EncodingError::CapacityExceeded);
        }
        self.row += 1;
        self.column = 0;
        self.remaining = self.matrix.columns();
        self.matrix.push_row();
        self.subsets.push(Subset::A);
        Ok(())
    }

    fn finish(mut self) -> Result<Layout, EncodingError> {
        if self.remaining == 1 {
            self.fill();
        }
        if self.remaining == 0 {
            self.next_row()?;
            self.subset = Subset::A;
        }
        // the last two columns are left for the check characters
        while self.remaining > 2 {
            self.fill();
        }
        let final_subset = self.subset;

        if self.row == 0 {
            // at least two rows are required
            while self.remaining > 0 {
                self.fill();
            }
            self.next_row()?;
            self.subset = Subset::A;
            while self.remaining > 2 {
                self.fill();
            }
        }

        Ok(Layout {
            matrix: self.matrix,
            subsets: self.subsets,
            final_subset,
        })
    }
}

/// A rule returns whether it handled the item at the cursor.
type Rule = fn(&mut EncoderState<'_>) -> bool;

/// Annex B rules, the first matching one is applied.
const RULES: [Rule; 9] = [
    start_row,
    separator,
    low_capacity,
    encode_current,
    pair_c,
    latch_c,
    enter_a,
    enter_b,
    leave_c,
];

fn start_row(state: &mut EncoderState<'_>) -> bool {
    if state.column == 0 {
        state.remaining = state.matrix.columns();
        state.subset = row_start_subset(state.peek(0));
        state.subsets[state.row] = state.subset;
        log::trace!("row {} starts in subset {:?}", state.row, state.subset);
        if state.row == 0 && state.gs1 {
            state.push(FNC1);
        }
    }
    false
}

fn separator(state: &mut EncoderState<'_>) -> bool {
    if state.peek(0) != Some(Item::Separator) {
        return false;
    }
    state.push(FNC1);
    state.position += 1;
    true
}

/// Avoid splitting a multi symbol sequence at the end of a row (Annex B.2).
fn low_capacity(state: &mut EncoderState<'_>) -> bool {
    let Some(Item::Byte(byte)) = state.peek(0) else {
        return false;
    };
    if state.remaining > 2 {
        return false;
    }
    let single = state.remaining == 1;
    let class = classify(Item::Byte(byte));
    match state.subset {
        // Table B1
        Subset::A => match class {
            Class::AOrBOrC => state.push_byte(Subset::A, byte),
            Class::ShiftB if single => state.push(CODE_B),
            _ if byte >= 0xE0 => {
                state.push(CODE_B);
                if state.remaining == 1 {
                    state.push(CODE_A);
                }
            }
            _ if byte >= 0x80 && single => state.push(CODE_B),
            _ => return false,
        },
        // Table B2
        Subset::B => match class {
            Class::AOrBOrC => state.push_byte(Subset::B, byte),
            Class::ShiftA if single => state.push(CODE_A),
            _ if (0x80..=0x9F).contains(&byte) => {
                state.push(CODE_A);
                if state.remaining == 1 {
                    state.push(CODE_B);
                }
            }
            _ if byte >= 0xA0 && single => state.push(CODE_A),
            _ => return false,
        },
        // Table B3
        Subset::C => {
            if single && !state.has_pair() {
                state.push(CODE_A);
            } else if byte >= 0x80 {
                state.push(CODE_A);
                if state.remaining == 1 {
                    state.push(CODE_B);
                }
            } else {
                return false;
            }
        }
    }
    true
}

/// The item can be encoded in the current subset A or B.
fn encode_current(state: &mut EncoderState<'_>) -> bool {
    let Some(Item::Byte(byte)) = state.peek(0) else {
        return false;
    };
    match (state.subset, classify(Item::Byte(byte))) {
        (Subset::A, Class::AOrB | Class::ShiftA) | (Subset::B, Class::AOrB | Class::ShiftB) => {
            state.push_byte(state.subset, byte);
            true
        }
        _ => false,
    }
}

fn pair_c(state: &mut EncoderState<'_>) -> bool {
    if state.subset != Subset::C || !state.has_pair() {
        return false;
    }
    state.push_pair();
    true
}

/// Digits in subset A or B, switch to C for four or more.
fn latch_c(state: &mut EncoderState<'_>) -> bool {
    let Some(Item::Byte(byte @ b'0'..=b'9')) = state.peek(0) else {
        return false;
    };
    if state.subset == Subset::C {
        return false;
    }
    let run = state.digit_run();
    if run >= 4 && run % 2 == 0 && state.has_pair() {
        state.latch(Subset::C);
        state.push_pair();
    } else {
        // an odd run continues in C after this digit
        state.push_byte(state.subset, byte);
    }
    true
}

/// A control character in subset B.
fn enter_a(state: &mut EncoderState<'_>) -> bool {
    let Some(Item::Byte(byte)) = state.peek(0) else {
        return false;
    };
    if state.subset != Subset::B || classify(Item::Byte(byte)) != Class::ShiftA {
        return false;
    }
    if matches!(state.peek(1), Some(Item::Byte(0x60..=0x7F))) {
        state.push(SHIFT);
    } else {
        state.latch(Subset::A);
    }
    state.push_byte(Subset::A, byte);
    true
}

/// A lower case character in subset A.
fn enter_b(state: &mut EncoderState<'_>) -> bool {
    let Some(Item::Byte(byte)) = state.peek(0) else {
        return false;
    };
    if state.subset != Subset::A || classify(Item::Byte(byte)) != Class::ShiftB {
        return false;
    }
    if state.class_at(1) == Some(Class::ShiftA) && state.class_at(2) == Some(Class::ShiftB) {
        state.push(SHIFT);
    } else {
        state.latch(Subset::B);
    }
    state.push_byte(Subset::B, byte);
    true
}

/// Anything but a digit pair in subset C.
fn leave_c(state: &mut EncoderState<'_>) -> bool {
    let Some(Item::Byte(byte)) = state.peek(0) else {
        return false;
    };
    if state.subset != Subset::C {
        return false;
    }
    // A if a control character comes before any lower case character
    let target = state.data[state.position..]
        .iter()
        .find_map(|&item| match classify(item) {
            Class::ShiftA => Some(Subset::A),
            Class::ShiftB => Some(Subset::B),
            _ => None,
        })
        .unwrap_or(Subset::B);
    state.latch(target);
    state.push_byte(target, byte);
    true
}

/// Distribute the data over rows of `columns` symbols.
pub(crate) fn encode(data: &[Item], columns: usize, gs1: bool) -> Result<Layout, EncodingError> {
    let mut state = EncoderState::new(data, columns, gs1);
    loop {
        let handled = RULES.iter().any(|rule| rule(&mut state));
        debug_assert!(handled || state.position == data.len());
        if state.position == data.len() {
            return state.finish();
        }
        if state.remaining == 0 {
            state.next_row()?;
        }
    }
}

#[cfg(test)]
fn items(data: &[u8]) -> Vec<Item> {
    data.iter().map(|&b| Item::Byte(b)).collect()
}

#[cfg(test)]
fn rows(layout: &Layout) -> Vec<Vec<u8>> {
    (0..layout.matrix.rows())
        .map(|i| layout.matrix.row(i).to_vec())
        .collect()
}

#[test]
fn test_latch_c_even_run() {
    let layout = encode(&items(b"AB1234CD"), 10, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![
            vec![33, 34, 99, 12, 34, 100, 35, 36, 101, 100],
            vec![100, 101, 100, 101, 100, 101, 100, 101, 0, 0],
        ]
    );
    assert_eq!(layout.subsets, vec![Subset::B, Subset::A]);
    assert_eq!(layout.final_subset, Subset::B);
}

#[test]
fn test_latch_c_odd_run() {
    let layout = encode(&items(b"AB12345CD"), 10, false).unwrap();
    assert_eq!(
        layout.matrix.row(0),
        &[33, 34, 17, 99, 23, 45, 100, 35, 36, 101]
    );
}

#[test]
fn test_short_runs_stay() {
    let layout = encode(&items(b"AB123CD"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..7], &[33, 34, 17, 18, 19, 35, 36]);
}

#[test]
fn test_separator_counts_as_two_digits() {
    let data = [
        Item::Byte(b'A'),
        Item::Byte(b'1'),
        Item::Byte(b'2'),
        Item::Separator,
        Item::Byte(b'3'),
        Item::Byte(b'4'),
    ];
    let layout = encode(&data, 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..6], &[33, 99, 12, 102, 34, 101]);
}

#[test]
fn test_shift_to_a() {
    let layout = encode(&items(b"a\x01b"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..4], &[65, SHIFT, 65, 66]);
}

#[test]
fn test_switch_to_a() {
    let layout = encode(&items(b"a\x01B"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..4], &[65, CODE_A, 65, 34]);
    assert_eq!(layout.final_subset, Subset::A);
}

#[test]
fn test_shift_to_b() {
    let layout = encode(&items(b"\x01a\x01a"), 10, false).unwrap();
    assert_eq!(
        &layout.matrix.row(0)[..6],
        &[65, SHIFT, 65, 65, CODE_B, 65]
    );
}

#[test]
fn test_lookahead_at_end() {
    // no item after the end matches any lookahead
    let layout = encode(&items(b"\x01a"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..3], &[65, CODE_B, 65]);
    let layout = encode(&items(b"a\x01"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..3], &[65, CODE_A, 65]);
    let layout = encode(&items(b"12\x01"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..3], &[12, CODE_A, 65]);
}

#[test]
fn test_leave_c_scans_ahead() {
    let layout = encode(&items(b"1234AB\x01"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..6], &[12, 34, CODE_A, 33, 34, 65]);
    let layout = encode(&items(b"1234ab"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..5], &[12, 34, CODE_B, 65, 66]);
    let layout = encode(&items(b"12345"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..4], &[12, 34, CODE_B, 21]);
}

#[test]
fn test_extended() {
    let layout = encode(&items(b"\xE9"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![CODE_B, 73, CODE_A, CODE_B], vec![CODE_B, CODE_A, 0, 0]]
    );
    let layout = encode(&items(b"\x81"), 10, false).unwrap();
    assert_eq!(&layout.matrix.row(0)[..2], &[CODE_A, 65]);
}

#[test]
fn test_low_capacity_a() {
    let layout = encode(&items(b"\x01\x01\x01a"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![65, 65, 65, CODE_B], vec![65, CODE_A, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::A, Subset::B]);

    let layout = encode(&items(b"\x01\x02\xF0"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![65, 66, CODE_B, CODE_A], vec![CODE_B, 80, 0, 0]]
    );

    // FNC4 and the symbol do not fit into the last column
    let layout = encode(&items(b"\x01\x01\x01\x81"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![65, 65, 65, CODE_B], vec![CODE_A, 65, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::A, Subset::A]);
}

#[test]
fn test_low_capacity_b() {
    let layout = encode(&items(b"abc\x80"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![65, 66, 67, CODE_A], vec![CODE_A, 64, 0, 0]]
    );

    let layout = encode(&items(b"abc\xE9"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![65, 66, 67, CODE_A], vec![CODE_B, 73, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::B, Subset::B]);
}

#[test]
fn test_low_capacity_c() {
    let layout = encode(&items(b"1234\xE9"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![12, 34, CODE_A, CODE_B], vec![CODE_B, 73, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::C, Subset::B]);

    // a single digit in the last column
    let layout = encode(&items(b"1234567"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![12, 34, 56, CODE_A], vec![CODE_B, 23, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::C, Subset::C]);

    let layout = encode(&items(b"123456A"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![12, 34, 56, CODE_A], vec![33, CODE_A, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::C, Subset::B]);
}

#[test]
fn test_full_row_at_end() {
    let layout = encode(&items(b"AIM"), 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![vec![33, 41, 45, CODE_A], vec![CODE_B, CODE_A, 0, 0]]
    );
    assert_eq!(layout.subsets, vec![Subset::B, Subset::A]);
    assert_eq!(layout.final_subset, Subset::A);
}

#[test]
fn test_empty() {
    let layout = encode(&[], 4, false).unwrap();
    assert_eq!(
        rows(&layout),
        vec![
            vec![CODE_A, CODE_B, CODE_A, CODE_B],
            vec![CODE_B, CODE_A, 0, 0]
        ]
    );
    assert_eq!(layout.final_subset, Subset::B);
}

#[test]
fn test_gs1_leading_separator() {
    let layout = encode(&items(b"12"), 4, true).unwrap();
    assert_eq!(layout.matrix.row(0), &[FNC1, 12, CODE_A, CODE_B]);
    assert_eq!(layout.subsets[0], Subset::C);
}

#[test]
fn test_too_many_rows() {
    let data = items(&b"12345A".repeat(450));
    assert_eq!(encode(&data, 60, false), Err(EncodingError::CapacityExceeded));
}

#[test]
fn test_rows_are_full() {
    for byte in 0..=255 {
        let data = items(&[byte, byte, b'a', b'0', b'0', 0x01, byte]);
        let layout = encode(&data, 4, false).unwrap();
        assert!(layout.matrix.rows() >= 2);
        assert_eq!(layout.subsets.len(), layout.matrix.rows());
    }
}
