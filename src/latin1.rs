use crate::std::vec::Vec;

use crate::EncodingError;

/// Convert text to ISO/IEC 8859-1, whose code points coincide with the first
/// 256 Unicode code points.
pub(crate) fn utf8_to_latin1(text: &str) -> Result<Vec<u8>, EncodingError> {
    text.chars()
        .map(|ch| u8::try_from(ch).map_err(|_| EncodingError::InvalidInput(ch)))
        .collect()
}

#[test]
fn test_latin1() {
    assert_eq!(utf8_to_latin1("Füße"), Ok(b"F\xFC\xDFe".to_vec()));
    assert_eq!(utf8_to_latin1(""), Ok(Vec::new()));
    assert_eq!(utf8_to_latin1("\u{FF}"), Ok(b"\xFF".to_vec()));
    assert_eq!(
        utf8_to_latin1("1 €"),
        Err(EncodingError::InvalidInput('€'))
    );
}
