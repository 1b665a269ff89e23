use crate::Bar;

/// Bar patterns of the Code 128 symbols 0 to 106, one bit per module.
///
/// The stop character 106 includes its final bar and spans 13 modules.
pub(crate) const PATTERNS: [u16; 107] = [
    0x6cc, 0x66c, 0x666, 0x498, 0x48c, 0x44c, 0x4c8, 0x4c4, 0x464, 0x648, 0x644, 0x624, 0x59c,
    0x4dc, 0x4ce, 0x5cc, 0x4ec, 0x4e6, 0x672, 0x65c, 0x64e, 0x6e4, 0x674, 0x76e, 0x74c, 0x72c,
    0x726, 0x764, 0x734, 0x732, 0x6d8, 0x6c6, 0x636, 0x518, 0x458, 0x446, 0x588, 0x468, 0x462,
    0x688, 0x628, 0x622, 0x5b8, 0x58e, 0x46e, 0x5d8, 0x5c6, 0x476, 0x776, 0x68e, 0x62e, 0x6e8,
    0x6e2, 0x6ee, 0x758, 0x746, 0x716, 0x768, 0x762, 0x71a, 0x77a, 0x642, 0x78a, 0x530, 0x50c,
    0x4b0, 0x486, 0x42c, 0x426, 0x590, 0x584, 0x4d0, 0x4c2, 0x434, 0x432, 0x612, 0x650, 0x7ba,
    0x614, 0x47a, 0x53c, 0x4bc, 0x49e, 0x5e4, 0x4f4, 0x4f2, 0x7a4, 0x794, 0x792, 0x6de, 0x6f6,
    0x7b6, 0x578, 0x51e, 0x45e, 0x5e8, 0x5e2, 0x7a8, 0x7a2, 0x5de, 0x5ee, 0x75e, 0x7ae, 0x684,
    0x690, 0x69c, 0x18eb,
];

/// The bars of a pattern, from the most significant module on.
pub(crate) fn bars(pattern: u16) -> impl Iterator<Item = Bar> {
    let mut bits = pattern;
    core::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let lead = bits.leading_zeros();
        let width = (bits << lead).leading_ones();
        // clear the bar, what remains up to the next bar is the space
        bits &= u16::MAX.checked_shr(lead + width).unwrap_or(0);
        let space = bits.leading_zeros() - lead - width;
        Some(Bar {
            width: width as u8,
            space: space as u8,
        })
    })
}

#[cfg(test)]
use crate::std::{vec, vec::Vec};

#[test]
fn test_pattern_bars() {
    assert_eq!(bars(0).next(), None);
    let bars1: Vec<Bar> = bars(0b10000011010).collect();
    assert_eq!(
        bars1,
        vec![
            Bar { width: 1, space: 5 },
            Bar { width: 2, space: 1 },
            Bar { width: 1, space: 1 },
        ]
    );
    let bars2: Vec<Bar> = bars(0b1100011101011).collect();
    assert_eq!(
        bars2,
        vec![
            Bar { width: 2, space: 3 },
            Bar { width: 3, space: 1 },
            Bar { width: 1, space: 1 },
            Bar { width: 2, space: 0 },
        ]
    );
}

#[test]
fn test_module_widths() {
    // AIM Codablock F, Table A.1
    const WIDTHS: [&str; 107] = [
        "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
        "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
        "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
        "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
        "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
        "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
        "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
        "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
        "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
        "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
        "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
        "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
    ];
    for (symbol, (pattern, widths)) in PATTERNS.iter().zip(WIDTHS).enumerate() {
        let mut expected = vec![];
        let digits: Vec<u8> = widths.bytes().map(|d| d - b'0').collect();
        for pair in digits.chunks(2) {
            expected.push(Bar {
                width: pair[0],
                space: pair.get(1).copied().unwrap_or(0),
            });
        }
        assert_eq!(bars(*pattern).collect::<Vec<_>>(), expected, "symbol {}", symbol);
    }
}

#[test]
fn test_bar_size() {
    for pattern in &PATTERNS[0..106] {
        let size: u32 = bars(*pattern)
            .map(|m| m.width as u32 + m.space as u32)
            .sum();
        assert_eq!(size, 11);
    }

    let size: u32 = bars(PATTERNS[crate::STOP as usize])
        .map(|m| m.width as u32 + m.space as u32)
        .sum();
    assert_eq!(size, 13);
}
