use crate::{CODE_A, CODE_B, CODE_C, SHIFT};

/// One unit of input data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Item {
    Byte(u8),
    /// Application separator (FNC1) in GS1 mode.
    Separator,
}

impl Item {
    #[inline]
    pub(crate) fn is_digit(self) -> bool {
        matches!(self, Item::Byte(b'0'..=b'9'))
    }
}

/// The subsets a single item can be encoded in.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Class {
    /// Only in A (control characters and their extended range).
    ShiftA,
    /// Only in B (lower case and its extended range).
    ShiftB,
    AOrB,
    /// Digits.
    AOrBOrC,
}

/// A Code 128 character subset.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Subset {
    A,
    B,
    C,
}

impl Subset {
    /// The symbol switching to this subset.
    #[inline]
    pub(crate) fn code(self) -> u8 {
        match self {
            Subset::A => CODE_A,
            Subset::B => CODE_B,
            Subset::C => CODE_C,
        }
    }

    /// The subset selector placed after the start character of a row.
    #[inline]
    pub(crate) fn selector(self) -> u8 {
        match self {
            Subset::A => SHIFT,
            Subset::B => CODE_B,
            Subset::C => CODE_C,
        }
    }

    /// FNC4, shifting the next data character into the extended range.
    #[inline]
    pub(crate) fn fnc4(self) -> u8 {
        match self {
            Subset::A => CODE_A,
            Subset::B => CODE_B,
            Subset::C => unreachable!(),
        }
    }

    /// The subset a filler character switches to.
    #[inline]
    pub(crate) fn filler(self) -> Subset {
        match self {
            Subset::A => Subset::B,
            Subset::B | Subset::C => Subset::A,
        }
    }
}

pub(crate) fn classify(item: Item) -> Class {
    let Item::Byte(byte) = item else {
        return Class::AOrB;
    };
    match byte {
        0..=0x1F => Class::ShiftA,
        b'0'..=b'9' => Class::AOrBOrC,
        0x20..=0x5F => Class::AOrB,
        0x60..=0x7F => Class::ShiftB,
        0x80..=0x9F => Class::ShiftA,
        0xA0..=0xDF => Class::AOrB,
        0xE0..=0xFF => Class::ShiftB,
    }
}

/// Subset selected for a row starting with `item`.
pub(crate) fn row_start_subset(item: Option<Item>) -> Subset {
    match item {
        Some(Item::Byte(b'0'..=b'9')) => Subset::C,
        Some(Item::Byte(0x80..=0xA0)) => Subset::A,
        Some(Item::Byte(0..=0x1F)) => Subset::A,
        _ => Subset::B,
    }
}

/// Symbol value of a byte in subset A or B, without the FNC4 prefix.
pub(crate) fn code_value(byte: u8) -> u8 {
    match byte {
        0..=0x1F => byte + 0x40,
        0x20..=0x7F => byte - b' ',
        0x80..=0x9F => byte - 128 + 0x40,
        0xA0..=0xFF => byte - 128 - b' ',
    }
}

#[test]
fn test_classify() {
    let class = |byte| classify(Item::Byte(byte));
    assert_eq!(class(0x00), Class::ShiftA);
    assert_eq!(class(b'\n'), Class::ShiftA);
    assert_eq!(class(b' '), Class::AOrB);
    assert_eq!(class(b'0'), Class::AOrBOrC);
    assert_eq!(class(b'9'), Class::AOrBOrC);
    assert_eq!(class(b'A'), Class::AOrB);
    assert_eq!(class(b'_'), Class::AOrB);
    assert_eq!(class(b'`'), Class::ShiftB);
    assert_eq!(class(0x7F), Class::ShiftB);
    assert_eq!(class(0x80), Class::ShiftA);
    assert_eq!(class(0x9F), Class::ShiftA);
    assert_eq!(class(0xA0), Class::AOrB);
    assert_eq!(class(0xDF), Class::AOrB);
    assert_eq!(class(0xE0), Class::ShiftB);
    assert_eq!(class(0xFF), Class::ShiftB);
    assert_eq!(classify(Item::Separator), Class::AOrB);
}

#[test]
fn test_row_start_subset() {
    assert_eq!(row_start_subset(Some(Item::Byte(b'5'))), Subset::C);
    assert_eq!(row_start_subset(Some(Item::Byte(0x80))), Subset::A);
    assert_eq!(row_start_subset(Some(Item::Byte(0xA0))), Subset::A);
    assert_eq!(row_start_subset(Some(Item::Byte(0xA1))), Subset::B);
    assert_eq!(row_start_subset(Some(Item::Byte(0x1F))), Subset::A);
    assert_eq!(row_start_subset(Some(Item::Byte(b'a'))), Subset::B);
    assert_eq!(row_start_subset(Some(Item::Separator)), Subset::B);
    assert_eq!(row_start_subset(None), Subset::B);
}

#[test]
fn test_code_value() {
    assert_eq!(code_value(0x00), 64);
    assert_eq!(code_value(b' '), 0);
    assert_eq!(code_value(b'A'), 33);
    assert_eq!(code_value(0x7F), 95);
    assert_eq!(code_value(0x80), 64);
    assert_eq!(code_value(0xA0), 0);
    assert_eq!(code_value(0xFF), 95);
    for byte in 0..=255 {
        assert!(code_value(byte) <= 95);
    }
}
