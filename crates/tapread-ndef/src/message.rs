use crate::{
    decoder::{Decoder, DisplayLabel},
    error::NdefError,
    parser::{self, parse_message_info, parse_ndef_message, parse_ndef_records},
    record::NdefRecord,
};

/// An NDEF message, the records of one discovered tag in tag order
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct NdefMessage {
    pub records: Vec<NdefRecord>,
}

impl NdefMessage {
    pub fn new(records: Vec<NdefRecord>) -> Self {
        Self { records }
    }

    /// Parse a bare NDEF message, records until the one flagged message end
    pub fn from_bytes(data: &[u8]) -> Result<Self, NdefError> {
        let mut stream = parser::stream::new(data);
        let records = parse_ndef_message(&mut stream)?;
        Ok(Self::new(records))
    }

    /// Parse Type 2 tag memory, the NDEF message wrapped in an NDEF TLV
    pub fn from_tag_bytes(data: &[u8]) -> Result<Self, NdefError> {
        let mut stream = parser::stream::new(data);

        let info = parse_message_info(&mut stream).map_err(|error| {
            if error.is_incomplete() {
                NdefError::from(error)
            } else {
                NdefError::NoNdefMessage
            }
        })?;

        let records = parse_ndef_records(&mut stream, &info)?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NdefRecord> {
        self.records.iter()
    }

    /// Labels for the recognized records, decoded with the default [`Decoder`]
    pub fn labels(&self) -> impl Iterator<Item = DisplayLabel> + '_ {
        Decoder::default().into_labels(self)
    }
}

impl FromIterator<NdefRecord> for NdefMessage {
    fn from_iter<I: IntoIterator<Item = NdefRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NdefMessage {
    type Item = &'a NdefRecord;
    type IntoIter = std::slice::Iter<'a, NdefRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{rtd::RecordKind, tnf::Tnf};

    fn fixture(contents: &str) -> Vec<u8> {
        tapread_util::bytes::parse_byte_list(contents).unwrap()
    }

    #[test]
    fn parses_bare_message_fixture() {
        let bytes = fixture(include_str!("../../../test/data/message_bytes.txt"));
        let message = NdefMessage::from_bytes(&bytes).unwrap();

        let kinds = message.iter().map(NdefRecord::kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                RecordKind::Text,
                RecordKind::Uri,
                RecordKind::Unrecognized,
                RecordKind::Unrecognized,
                RecordKind::Unrecognized,
            ]
        );

        assert_eq!(message.records[2].tnf, Tnf::Mime);
        assert_eq!(message.records[2].payload, b"plain body".to_vec());
        assert_eq!(message.records[4].tnf, Tnf::External);
        assert_eq!(message.records[4].type_str(), Some("example.com:tag"));
    }

    #[test]
    fn parses_tag_memory_fixture() {
        let bytes = fixture(include_str!("../../../test/data/tag_dump_bytes.txt"));
        let message = NdefMessage::from_tag_bytes(&bytes).unwrap();

        assert_eq!(message.len(), 2);
        assert_eq!(message.records[0], NdefRecord::text("en", &"NDEF ".repeat(60)));
        assert_eq!(message.records[1], NdefRecord::uri("http://www.nfc-forum.org"));
    }

    #[test]
    fn empty_ndef_tlv_is_an_empty_message() {
        let message = NdefMessage::from_tag_bytes(&[0x03, 0x00, 0xFE]).unwrap();
        assert!(message.is_empty());
        assert_eq!(message.labels().count(), 0);
    }

    #[test]
    fn tag_without_ndef_tlv() {
        let error = NdefMessage::from_tag_bytes(&[0x00, 0x00, 0xFE, 0x00]).unwrap_err();
        assert_eq!(error, NdefError::NoNdefMessage);
    }

    #[test]
    fn truncated_message_reports_missing_bytes() {
        let bytes = fixture(include_str!("../../../test/data/message_bytes.txt"));
        let error = NdefMessage::from_bytes(&bytes[..20]).unwrap_err();
        assert!(matches!(error, NdefError::Truncated { .. }));
    }

    #[test]
    fn labels_use_decoded_payloads() {
        let bytes = fixture(include_str!("../../../test/data/message_bytes.txt"));
        let message = NdefMessage::from_bytes(&bytes).unwrap();

        let labels = message.labels().map(String::from).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "WELL KNOWN: TEXT: Hello, tapread!".to_string(),
                "WELL KNOWN: URI: https://example.com/nfc".to_string(),
            ]
        );
    }
}
