use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    decoder::{Decoder, PayloadRendering},
    message::NdefMessage,
    message_info::MessageInfo,
    payload::{self, TextPayload},
    reader::{NfcReader, NfcReaderError, ParseResult},
    record::NdefRecord,
    resume::ResumeError,
    rtd::RecordKind,
};
use tapread_macros::impl_default_for;

impl_default_for!(FfiNfcReader);
impl_default_for!(NfcConst);

#[derive(Debug, Clone, uniffi::Object)]
pub struct FfiNfcReader(Arc<Mutex<NfcReader>>);

#[uniffi::export]
impl FfiNfcReader {
    #[uniffi::constructor]
    pub fn new() -> Self {
        let reader = NfcReader::new();
        Self(Arc::new(Mutex::new(reader)))
    }

    #[uniffi::method]
    pub fn parse(&self, data: Vec<u8>) -> Result<ParseResult, NfcReaderError> {
        self.0.lock().parse(data)
    }

    #[uniffi::method]
    pub fn is_resumeable(&self, data: Vec<u8>) -> Result<(), ResumeError> {
        self.0.lock().is_resumeable(data)
    }

    #[uniffi::method]
    pub fn is_started(&self) -> bool {
        self.0.lock().is_started()
    }

    #[uniffi::method]
    pub fn message_info(&self) -> Option<MessageInfo> {
        self.0.lock().message_info().cloned()
    }

    #[uniffi::method]
    pub fn reset(&self) {
        self.0.lock().reset()
    }

    /// Text of a Text record, the full URI of a URI record, otherwise the payload if it is UTF-8
    #[uniffi::method]
    pub fn string_from_record(&self, record: NdefRecord) -> Option<String> {
        match record.kind() {
            RecordKind::Text => payload::decode_text(&record.payload)
                .ok()
                .map(|text| text.text),
            RecordKind::Uri => payload::decode_uri(&record.payload).ok(),
            RecordKind::Unrecognized => String::from_utf8(record.payload).ok(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Object)]
pub struct NfcConst {
    pub number_of_blocks_per_chunk: u16,
    pub bytes_per_block: u16,
}

#[uniffi::export]
impl NfcConst {
    #[uniffi::constructor]
    pub fn new() -> Self {
        Self {
            number_of_blocks_per_chunk: crate::reader::NUMBER_OF_BLOCKS_PER_CHUNK,
            bytes_per_block: crate::reader::BYTES_PER_BLOCK,
        }
    }

    pub fn number_of_blocks_per_chunk(&self) -> u16 {
        self.number_of_blocks_per_chunk
    }

    pub fn bytes_per_block(&self) -> u16 {
        self.bytes_per_block
    }

    pub fn total_bytes_per_chunk(&self) -> u16 {
        self.number_of_blocks_per_chunk() * self.bytes_per_block()
    }
}

#[uniffi::export]
fn ndef_record_kind(record: NdefRecord) -> RecordKind {
    record.kind()
}

#[uniffi::export]
fn ndef_text_payload(record: NdefRecord) -> Option<TextPayload> {
    match record.kind() {
        RecordKind::Text => payload::decode_text(&record.payload).ok(),
        _ => None,
    }
}

#[uniffi::export]
fn ndef_message_labels(message: NdefMessage, rendering: PayloadRendering) -> Vec<String> {
    Decoder::new(rendering).labels(&message).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_from_record_decodes_well_known_payloads() {
        let reader = FfiNfcReader::new();

        let text = reader.string_from_record(NdefRecord::text("en", "Hello"));
        assert_eq!(text.as_deref(), Some("Hello"));

        let uri = reader.string_from_record(NdefRecord::uri("mailto:nfc@example.com"));
        assert_eq!(uri.as_deref(), Some("mailto:nfc@example.com"));

        let mime = reader.string_from_record(NdefRecord::mime("text/plain", b"body".to_vec()));
        assert_eq!(mime.as_deref(), Some("body"));
    }

    #[test]
    fn exported_record_helpers() {
        let text = NdefRecord::text("de", "Hallo");
        assert_eq!(ndef_record_kind(text.clone()), RecordKind::Text);
        assert_eq!(
            ndef_text_payload(text.clone()).map(|payload| payload.language),
            Some("de".to_string())
        );

        let uri = NdefRecord::uri("tel:+15551234");
        assert_eq!(ndef_text_payload(uri.clone()), None);

        let message = NdefMessage::new(vec![text, uri]);
        let labels = ndef_message_labels(message, PayloadRendering::Decoded);
        assert_eq!(
            labels,
            vec![
                "WELL KNOWN: TEXT: Hallo".to_string(),
                "WELL KNOWN: URI: tel:+15551234".to_string(),
            ]
        );
    }

    #[test]
    fn reader_object_tracks_progress() {
        let reader = FfiNfcReader::default();
        assert!(!reader.is_started());

        // NDEF TLV of 16 bytes, only the first 2 are here
        let result = reader.parse(vec![0x03, 0x10, 0xD1, 0x01]).unwrap();
        assert!(matches!(result, ParseResult::Incomplete(_)));
        assert!(reader.is_started());
        assert_eq!(reader.message_info().map(|info| info.message_length), Some(16));

        reader.reset();
        assert!(!reader.is_started());
        assert_eq!(reader.message_info(), None);
    }

    #[test]
    fn chunk_size() {
        assert_eq!(NfcConst::new().total_bytes_per_chunk(), 128);
    }
}
