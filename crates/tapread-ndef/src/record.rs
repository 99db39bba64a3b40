use crate::{
    header::NdefHeader,
    payload,
    rtd::{RTD_TEXT, RTD_URI, RecordKind},
    tnf::Tnf,
};

/// A single record of an NDEF message, chunked records already joined
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct NdefRecord {
    pub tnf: Tnf,
    pub type_: Vec<u8>,
    pub id: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

/// A record as it appears on the wire, one chunk of a chunked record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub header: NdefHeader,
    pub type_: Vec<u8>,
    pub id: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    pub fn new(tnf: Tnf, type_: Vec<u8>, payload: Vec<u8>) -> Self {
        Self {
            tnf,
            type_,
            id: None,
            payload,
        }
    }

    pub fn with_id(mut self, id: Vec<u8>) -> Self {
        self.id = Some(id);
        self
    }

    /// Well known text record, UTF-8 encoded
    pub fn text(language: &str, text: &str) -> Self {
        let payload = payload::encode_text(language, text);
        Self::new(Tnf::WellKnown, RTD_TEXT.to_vec(), payload)
    }

    /// Well known URI record, abbreviated with the NFC Forum prefix table
    pub fn uri(uri: &str) -> Self {
        Self::new(Tnf::WellKnown, RTD_URI.to_vec(), payload::encode_uri(uri))
    }

    pub fn mime(mime_type: &str, payload: Vec<u8>) -> Self {
        Self::new(Tnf::Mime, mime_type.as_bytes().to_vec(), payload)
    }

    pub fn kind(&self) -> RecordKind {
        RecordKind::classify(self)
    }

    pub fn type_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.type_).ok()
    }
}

impl From<RawRecord> for NdefRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            tnf: raw.header.type_name_format,
            type_: raw.type_,
            id: raw.id,
            payload: raw.payload,
        }
    }
}
