//! Fixed-width ASCII fields
//!
//! Names are stored as printable ASCII, NUL-padded to the field width. A
//! name that fills the whole field carries no terminator. Any byte outside
//! printable ASCII (including the erased value `0xFF`) ends the string on
//! decode.

use heapless::String;

use super::CodecError;

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// Write `text` into `field`, truncating to the field width
pub fn encode_text(text: &str, field: &mut [u8]) -> Result<(), CodecError> {
    let bytes = text.as_bytes();
    if let Some(&bad) = bytes.iter().find(|&&b| !is_printable(b)) {
        return Err(CodecError::InvalidSymbol(bad));
    }

    let len = bytes.len().min(field.len());
    field.fill(0);
    field[..len].copy_from_slice(&bytes[..len]);
    Ok(())
}

/// Read a string back out of `field`
pub fn decode_text<const N: usize>(field: &[u8]) -> String<N> {
    let mut text = String::new();
    for &byte in field.iter().take_while(|&&b| is_printable(b)) {
        if text.push(byte as char).is_err() {
            break;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_with_nul() {
        let mut field = [0xFFu8; 6];
        encode_text("Bob", &mut field).unwrap();
        assert_eq!(&field, b"Bob\0\0\0");
        assert_eq!(decode_text::<6>(&field).as_str(), "Bob");
    }

    #[test]
    fn test_full_width_has_no_terminator() {
        let mut field = [0u8; 4];
        encode_text("Alexander", &mut field).unwrap();
        assert_eq!(&field, b"Alex");
        assert_eq!(decode_text::<4>(&field).as_str(), "Alex");
    }

    #[test]
    fn test_rejects_non_ascii() {
        let mut field = [0u8; 8];
        assert_eq!(
            encode_text("Zoë", &mut field),
            Err(CodecError::InvalidSymbol(0xC3))
        );
        assert_eq!(field, [0u8; 8]);
    }

    #[test]
    fn test_erased_field_decodes_empty() {
        let field = [0xFFu8; 8];
        assert_eq!(decode_text::<8>(&field).as_str(), "");
    }
}
