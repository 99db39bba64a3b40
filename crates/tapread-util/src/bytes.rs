//! Reading tag dumps from the formats tools commonly produce

use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum InputEncoding {
    /// Pick from the content, see [`decode_input`]
    #[default]
    Auto,

    /// Comma or whitespace separated decimal bytes, `209, 1, 13, 85`
    Bytes,

    /// Hex, optionally separated by whitespace or colons, `D1:01:0D:55`
    Hex,

    /// Raw bytes as read from the tag
    Binary,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("input is not valid utf8 text")]
    NotText,

    #[error("invalid byte value {0:?}, expected 0-255")]
    InvalidByte(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Decode a tag dump into raw bytes
///
/// With [`InputEncoding::Auto`] non utf8 input is taken as binary, text with a comma is a
/// decimal byte list and text made only of hex digits, whitespace and colons is hex.
/// Anything else is taken as binary.
pub fn decode_input(data: &[u8], encoding: InputEncoding) -> Result<Vec<u8>, InputError> {
    match encoding {
        InputEncoding::Binary => Ok(data.to_vec()),
        InputEncoding::Bytes => parse_byte_list(as_text(data)?),
        InputEncoding::Hex => parse_hex(as_text(data)?),
        InputEncoding::Auto => {
            let Ok(text) = std::str::from_utf8(data) else {
                return Ok(data.to_vec());
            };

            let text = text.trim();
            if text.contains(',') {
                return parse_byte_list(text);
            }

            if !text.is_empty() && text.chars().all(is_hex_char) {
                return parse_hex(text);
            }

            Ok(data.to_vec())
        }
    }
}

/// Parse `"226, 67, 0, 1"` style lists
pub fn parse_byte_list(text: &str) -> Result<Vec<u8>, InputError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u8>()
                .map_err(|_| InputError::InvalidByte(token.to_string()))
        })
        .collect()
}

pub fn parse_hex(text: &str) -> Result<Vec<u8>, InputError> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);

    let digits: String = text.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
    Ok(hex::decode(digits)?)
}

fn as_text(data: &[u8]) -> Result<&str, InputError> {
    std::str::from_utf8(data).map_err(|_| InputError::NotText)
}

fn is_hex_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c.is_whitespace() || c == ':'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_decimal_byte_lists() {
        let bytes = parse_byte_list("209, 1, 13,\n85 2").unwrap();
        assert_eq!(bytes, vec![209, 1, 13, 85, 2]);
    }

    #[test]
    fn rejects_out_of_range_bytes() {
        let error = parse_byte_list("209, 256").unwrap_err();
        assert_eq!(error, InputError::InvalidByte("256".to_string()));
    }

    #[test]
    fn parses_hex_with_separators() {
        assert_eq!(parse_hex("D1:01:0D").unwrap(), vec![0xD1, 0x01, 0x0D]);
        assert_eq!(parse_hex("0xd1010d55").unwrap(), vec![0xD1, 0x01, 0x0D, 0x55]);
        assert_eq!(parse_hex("d1 01\n0d").unwrap(), vec![0xD1, 0x01, 0x0D]);
    }

    #[test]
    fn odd_hex_is_an_error() {
        assert!(matches!(parse_hex("d10"), Err(InputError::InvalidHex(_))));
    }

    #[test]
    fn auto_detects_format() {
        assert_eq!(decode_input(b"3, 0, 254\n", InputEncoding::Auto).unwrap(), vec![3, 0, 254]);
        assert_eq!(decode_input(b"0300FE", InputEncoding::Auto).unwrap(), vec![3, 0, 254]);

        let binary = [0xD1, 0x01, 0x00, 0x54];
        assert_eq!(decode_input(&binary, InputEncoding::Auto).unwrap(), binary.to_vec());
    }

    #[test]
    fn encoding_from_str() {
        assert_eq!("hex".parse::<InputEncoding>().unwrap(), InputEncoding::Hex);
        assert_eq!(InputEncoding::Bytes.to_string(), "bytes");
    }
}
