//! Payload codecs for the Text and URI record types

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct TextPayload {
    pub format: TextPayloadFormat,
    pub language: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum TextPayloadFormat {
    Utf8,
    Utf16,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum PayloadError {
    #[error("payload is empty")]
    Empty,

    #[error("language code of {length} bytes runs past the end of the payload")]
    LanguageOverrun { length: u8 },

    #[error("unknown uri identifier code {0:#04x}")]
    UnknownUriPrefix(u8),
}

/// Status byte: bit 7 set means UTF-16, bit 6 is reserved
const UTF16_FLAG: u8 = 0b1000_0000;
const LANGUAGE_LENGTH_MASK: u8 = 0b0011_1111;

/// URI prefix codes as defined in NFC Forum RTD URI specification
pub const URI_PREFIXES: &[&str] = &[
    "",                           // 0x00 - no prepending
    "http://www.",                // 0x01
    "https://www.",               // 0x02
    "http://",                    // 0x03
    "https://",                   // 0x04
    "tel:",                       // 0x05
    "mailto:",                    // 0x06
    "ftp://anonymous:anonymous@", // 0x07
    "ftp://ftp.",                 // 0x08
    "ftps://",                    // 0x09
    "sftp://",                    // 0x0A
    "smb://",                     // 0x0B
    "nfs://",                     // 0x0C
    "ftp://",                     // 0x0D
    "dav://",                     // 0x0E
    "news:",                      // 0x0F
    "telnet://",                  // 0x10
    "imap:",                      // 0x11
    "rtsp://",                    // 0x12
    "urn:",                       // 0x13
    "pop:",                       // 0x14
    "sip:",                       // 0x15
    "sips:",                      // 0x16
    "tftp:",                      // 0x17
    "btspp://",                   // 0x18
    "btl2cap://",                 // 0x19
    "btgoep://",                  // 0x1A
    "tcpobex://",                 // 0x1B
    "irdaobex://",                // 0x1C
    "file://",                    // 0x1D
    "urn:epc:id:",                // 0x1E
    "urn:epc:tag:",               // 0x1F
    "urn:epc:pat:",               // 0x20
    "urn:epc:raw:",               // 0x21
    "urn:epc:",                   // 0x22
    "urn:nfc:",                   // 0x23
];

pub fn decode_text(payload: &[u8]) -> Result<TextPayload, PayloadError> {
    let (&status, rest) = payload.split_first().ok_or(PayloadError::Empty)?;

    let is_utf16 = status & UTF16_FLAG != 0;
    let language_length = status & LANGUAGE_LENGTH_MASK;

    if language_length as usize > rest.len() {
        return Err(PayloadError::LanguageOverrun {
            length: language_length,
        });
    }

    let (language, text) = rest.split_at(language_length as usize);

    let (format, text) = if is_utf16 {
        (TextPayloadFormat::Utf16, decode_utf16(text))
    } else {
        (TextPayloadFormat::Utf8, String::from_utf8_lossy(text).to_string())
    };

    Ok(TextPayload {
        format,
        language: String::from_utf8_lossy(language).to_string(),
        text,
    })
}

pub fn decode_uri(payload: &[u8]) -> Result<String, PayloadError> {
    let (&code, rest) = payload.split_first().ok_or(PayloadError::Empty)?;
    let prefix = URI_PREFIXES.get(code as usize).ok_or(PayloadError::UnknownUriPrefix(code))?;

    let mut uri = String::with_capacity(prefix.len() + rest.len());
    uri.push_str(prefix);
    uri.push_str(&String::from_utf8_lossy(rest));

    Ok(uri)
}

/// Text payload, always UTF-8 encoded
pub fn encode_text(language: &str, text: &str) -> Vec<u8> {
    let language = &language.as_bytes()[..language.len().min(LANGUAGE_LENGTH_MASK as usize)];

    let mut payload = Vec::with_capacity(1 + language.len() + text.len());
    payload.push(language.len() as u8);
    payload.extend_from_slice(language);
    payload.extend_from_slice(text.as_bytes());
    payload
}

/// URI payload using the longest matching prefix abbreviation
pub fn encode_uri(uri: &str) -> Vec<u8> {
    let (code, prefix) = URI_PREFIXES
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, prefix)| uri.starts_with(**prefix))
        .max_by_key(|(_, prefix)| prefix.len())
        .unwrap_or((0, &""));

    let rest = &uri[prefix.len()..];

    let mut payload = Vec::with_capacity(1 + rest.len());
    payload.push(code as u8);
    payload.extend_from_slice(rest.as_bytes());
    payload
}

fn decode_utf16(bytes: &[u8]) -> String {
    // big endian unless a byte order mark says otherwise
    let (bytes, little_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, false),
        [0xFF, 0xFE, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };

    let units = bytes
        .chunks_exact(2)
        .map(|chunk| {
            let pair = [chunk[0], chunk[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect::<Vec<u16>>();

    String::from_utf16_lossy(&units)
}
