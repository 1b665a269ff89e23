//! This crate implements encoding of Codablock F symbols as defined in the
//! AIM Europe "Uniform Symbology Specification - Codablock F" (1995).
//!
//! Codablock F is a stacked symbology: the data is distributed over 2 to 44
//! rows, each of them a Code 128 symbol with its own start character, subset
//! selector, row indicator, check character, and stop character. Two check
//! characters over the whole data end the last row.
//!
//! The subsets of each row are chosen by the rules of Annex B, i.e. the
//! encoding is not guaranteed to be minimal.
//! The full 256 bit range can be encoded, up to 5450 bytes.
//!
//! ## Example
//!
//! ```rust
//! use codablock::CodablockF;
//!
//! let code = CodablockF::encode(b"Hello, World!").unwrap();
//! assert_eq!(code.row_count(), 4);
//! for row in code.rows() {
//!     let width: u32 = row.bars().map(|b| (b.width + b.space) as u32).sum();
//!     assert_eq!(width as usize, row.width());
//! }
//! ```
//!
//! Rendering is left to the caller. Each [Row] provides its symbol sequence
//! and the corresponding bars, all rows share the same
//! [height](CodablockF::row_height). A scanner expects separator bars between
//! the rows, and a bar above and below the symbol.
//!
//! ## Charsets
//!
//! As with Code 128 the range `0x00` to `0x7F` is interpreted as ASCII, and
//! `0xA0` to `0xFF` as [ISO/IEC 8859-1](https://en.wikipedia.org/wiki/ISO/IEC_8859-1)
//! (Latin 1). Use [CodablockF::encode_str] to encode text in Latin 1.
//!
//! ## GS1
//!
//! With [CodablockBuilder::with_gs1] the symbol starts with FNC1 and every
//! group separator (`0x1D`) in the data is encoded as FNC1.
#![no_std]

#[cfg(not(feature = "std"))]
extern crate alloc as std;
#[cfg(feature = "std")]
extern crate std;

#[cfg(test)]
use std::vec;
use std::format;
use std::string::String;
use std::vec::Vec;

mod assemble;
mod checksum;
mod classify;
mod encode;
mod estimate;
mod latin1;
mod patterns;

pub use classify::Subset;
pub use encode::{EncodingError, TooLong};

use classify::Item;

const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;
const STOP: u8 = 106;

/// Group separator, the application separator in GS1 data.
const GS: u8 = 0x1D;

const MAX_INPUT: usize = 5450;
const MIN_ROWS: usize = 2;
const MAX_ROWS: usize = 44;
const MIN_COLUMNS: usize = 4;
const MAX_COLUMNS: usize = 62;

/// Representation of a "black line" in a row.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Bar {
    /// The width of the line.
    ///
    /// Ranges from one to four.
    pub width: u8,
    /// White space after the line.
    pub space: u8,
}

/// One row of a Codablock F.
#[derive(Debug, PartialEq, Clone)]
pub struct Row {
    subset: Subset,
    indicator: u8,
    check: u8,
    symbols: Vec<u8>,
}

impl Row {
    /// The subset the row starts in.
    pub fn subset(&self) -> Subset {
        self.subset
    }

    /// The row indicator symbol.
    pub fn indicator(&self) -> u8 {
        self.indicator
    }

    /// The row check symbol.
    pub fn check(&self) -> u8 {
        self.check
    }

    /// All symbols of the row, from start to stop character.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// The data symbols of the row, without framing.
    pub fn data(&self) -> &[u8] {
        &self.symbols[3..self.symbols.len() - 2]
    }

    /// Get the sequence of bars this row consists of.
    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        self.symbols
            .iter()
            .flat_map(|idx| patterns::bars(patterns::PATTERNS[*idx as usize]))
    }

    /// The width of the row in modules, without quiet zones.
    pub fn width(&self) -> usize {
        self.symbols.len() * 11 + 2
    }
}

/// A Codablock F.
///
/// The rows are meant to be stacked from top to bottom, each
/// [row_height](Self::row_height) modules high.
///
/// ```rust
/// # use codablock::CodablockF;
/// let code = CodablockF::encode(b"AIM").unwrap();
/// assert_eq!(code.summary(), "Grid Size: 4 X 2, K1 Check Digit: 76, K2 Check Digit: 23");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct CodablockF {
    columns: usize,
    checks: [u8; 2],
    rows: Vec<Row>,
}

impl CodablockF {
    /// Encode the bytes as Codablock F.
    pub fn encode(data: &[u8]) -> Result<Self, EncodingError> {
        CodablockBuilder::default().encode(data)
    }

    /// Encode the string as Codablock F using Latin 1.
    ///
    /// Fails with [EncodingError::InvalidInput] if the string includes
    /// characters not included in Latin 1.
    pub fn encode_str(text: &str) -> Result<Self, EncodingError> {
        CodablockBuilder::default().encode_str(text)
    }

    /// The rows from top to bottom.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows, 2 to 44.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data columns per row, including the check characters in
    /// the last row.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Height of each row in modules.
    pub fn row_height(&self) -> usize {
        assemble::row_height(self.columns)
    }

    /// The symbol check characters K1 and K2.
    pub fn check_characters(&self) -> (u8, u8) {
        (self.checks[0], self.checks[1])
    }

    /// A line describing grid size and check characters.
    pub fn summary(&self) -> String {
        format!(
            "Grid Size: {} X {}, K1 Check Digit: {}, K2 Check Digit: {}",
            self.columns,
            self.rows.len(),
            self.checks[0],
            self.checks[1],
        )
    }
}

/// Builder for encoding a Codablock F with more control.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodablockBuilder {
    gs1: bool,
}

impl CodablockBuilder {
    /// Whether the data is GS1 data, with `0x1D` as separator.
    pub fn with_gs1(self, gs1: bool) -> Self {
        Self { gs1 }
    }

    /// Encode the bytes as Codablock F.
    pub fn encode(self, data: &[u8]) -> Result<CodablockF, EncodingError> {
        if data.len() > MAX_INPUT {
            return Err(EncodingError::InputTooLong(TooLong::Bytes(data.len())));
        }
        let items: Vec<Item> = data
            .iter()
            .map(|&byte| match byte {
                GS if self.gs1 => Item::Separator,
                byte => Item::Byte(byte),
            })
            .collect();

        let size = estimate::estimate(&items)?;
        log::debug!(
            "estimated code length {}, {} rows, {} columns",
            size.code_length(),
            size.rows,
            size.columns
        );

        let mut layout = encode::encode(&items, size.columns, self.gs1)?;
        let checks = checksum::symbol_checks(&items, layout.final_subset);
        layout.matrix.set_checks(checks);
        let rows = assemble::assemble(&layout.matrix, &layout.subsets);

        let code = CodablockF {
            columns: size.columns,
            checks,
            rows,
        };
        log::debug!("{}", code.summary());
        Ok(code)
    }

    /// Encode the string as Codablock F using Latin 1.
    pub fn encode_str(self, text: &str) -> Result<CodablockF, EncodingError> {
        latin1::utf8_to_latin1(text).and_then(|data| self.encode(&data))
    }
}


#[test]
fn test_aim() {
    let code = CodablockF::encode(b"AIM").unwrap();
    assert_eq!(code.row_count(), 2);
    assert_eq!(code.columns(), 4);
    assert_eq!(
        code.rows()[0].symbols(),
        &[103, 100, 64, 33, 41, 45, 101, 86, 106]
    );
    assert_eq!(
        code.rows()[1].symbols(),
        &[103, 98, 11, 100, 101, 76, 23, 3, 106]
    );
    assert_eq!(code.rows()[0].subset(), Subset::B);
    assert_eq!(code.rows()[1].subset(), Subset::A);
    assert_eq!(code.check_characters(), (76, 23));
    assert_eq!(code.row_height(), 8);
}

#[test]
fn test_digits() {
    let code = CodablockF::encode(b"123456789012345678").unwrap();
    assert_eq!(code.row_count(), 3);
    assert_eq!(code.columns(), 4);
    let rows: Vec<_> = code.rows().iter().map(|r| r.symbols().to_vec()).collect();
    assert_eq!(
        rows,
        vec![
            vec![103, 99, 1, 12, 34, 56, 78, 94, 106],
            vec![103, 99, 43, 90, 12, 34, 56, 82, 106],
            vec![103, 99, 44, 78, 101, 91, 92, 81, 106],
        ]
    );
}

#[test]
fn test_mixed_text() {
    let code = CodablockF::encode(b"abc\x01def").unwrap();
    let subsets: Vec<_> = code.rows().iter().map(|r| r.subset()).collect();
    assert_eq!(subsets, vec![Subset::B, Subset::A, Subset::B]);
    assert_eq!(code.rows()[1].data(), &[65, 100, 68, 69]);
    assert_eq!(code.check_characters(), (70, 74));
}

#[test]
fn test_empty() {
    let code = CodablockF::encode(b"").unwrap();
    assert_eq!(code.row_count(), 2);
    assert_eq!(
        code.rows()[0].symbols(),
        &[103, 100, 64, 101, 100, 101, 100, 79, 106]
    );
    assert_eq!(code.check_characters(), (64, 64));
}

#[test]
fn test_gs1() {
    let code = CodablockBuilder::default()
        .with_gs1(true)
        .encode(b"0112345678901231\x1d3103000250")
        .unwrap();
    assert_eq!(code.row_count(), 5);
    assert_eq!(
        code.rows()[0].symbols(),
        &[103, 99, 3, 102, 1, 12, 34, 61, 106]
    );
    assert_eq!(code.rows()[2].data(), &[31, 102, 31, 3]);
    assert_eq!(code.check_characters(), (8, 40));

    // without GS1 the separator is data
    let code = CodablockF::encode(b"0112345678901231\x1d3103000250").unwrap();
    assert!(code.rows().iter().all(|r| !r.data().contains(&FNC1)));
}

#[test]
fn test_encode_str() {
    let code = CodablockF::encode_str("Füße").unwrap();
    assert_eq!(code, CodablockF::encode(b"F\xFC\xDFe").unwrap());
    assert_eq!(
        CodablockF::encode_str("€"),
        Err(EncodingError::InvalidInput('€'))
    );
}

#[test]
fn test_too_long() {
    assert_eq!(
        CodablockF::encode(&[b'a'; 5451]),
        Err(EncodingError::InputTooLong(TooLong::Bytes(5451)))
    );
    assert!(CodablockF::encode(&[b'a'; 1000]).is_ok());
    assert!(matches!(
        CodablockF::encode(&[0xE0; 3000]),
        Err(EncodingError::InputTooLong(TooLong::Columns(_)))
    ));
}

#[test]
fn test_capacity_exceeded() {
    assert_eq!(
        CodablockF::encode(&b"12345A".repeat(450)),
        Err(EncodingError::CapacityExceeded)
    );
}

#[test]
fn test_summary() {
    let code = CodablockF::encode(b"123456789012345678").unwrap();
    assert_eq!(
        code.summary(),
        "Grid Size: 4 X 3, K1 Check Digit: 91, K2 Check Digit: 92"
    );
}

#[test]
fn test_deterministic() {
    let data = b"Codablock F \x00\x7F\xE9 0123456789";
    assert_eq!(
        CodablockF::encode(data).unwrap(),
        CodablockF::encode(data).unwrap()
    );
}

#[cfg(test)]
fn check_invariants(code: &CodablockF) {
    assert!((MIN_ROWS..=MAX_ROWS).contains(&code.row_count()));
    assert!((MIN_COLUMNS..=MAX_COLUMNS).contains(&code.columns()));
    for row in code.rows() {
        assert_eq!(row.symbols().len(), code.columns() + 5);
        assert_eq!(row.symbols()[0], START_A);
        assert_eq!(row.symbols()[1], row.subset().selector());
        assert_eq!(*row.symbols().last().unwrap(), STOP);
        assert!(row.symbols().iter().all(|&s| s <= STOP));
        assert!(row.check() <= 102);
        assert!(row.indicator() <= 106);
    }
    let (k1, k2) = code.check_characters();
    assert!(k1 <= 95 && k2 <= 95);
    let last = code.rows().last().unwrap().data();
    assert_eq!(&last[last.len() - 2..], &[k1, k2]);
}

#[test]
fn test_all_single_bytes() {
    for x in 0..=255 {
        check_invariants(&CodablockF::encode(&[x]).unwrap());
        check_invariants(&CodablockF::encode(&[x, b'a', x, b'0', b'1', b'2', b'3', x]).unwrap());
        check_invariants(&CodablockBuilder::default().with_gs1(true).encode(&[x, GS, x]).unwrap());
    }
}

#[test]
fn test_long_inputs() {
    let mut data = Vec::new();
    for i in 0..2000u32 {
        data.push((i * 37 % 256) as u8);
    }
    for len in [10, 100, 500, 1000] {
        let code = CodablockF::encode(&data[..len]).unwrap();
        check_invariants(&code);
    }
    let digits: Vec<u8> = (0..3000).map(|i| b'0' + (i % 10) as u8).collect();
    check_invariants(&CodablockF::encode(&digits).unwrap());
}

#[test]
fn test_row_bars() {
    let code = CodablockF::encode(b"Hello, World!").unwrap();
    for row in code.rows() {
        let size: usize = row
            .bars()
            .map(|b| b.width as usize + b.space as usize)
            .sum();
        assert_eq!(size, row.width());
        assert_eq!(row.width(), (code.columns() + 5) * 11 + 2);
    }
}
