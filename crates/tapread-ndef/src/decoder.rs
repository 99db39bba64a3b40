//! Turns NDEF records into the strings shown to the user

use tracing::warn;

use crate::{
    message::NdefMessage,
    payload::{self, PayloadError},
    record::NdefRecord,
    rtd::RecordKind,
};

tapread_macros::new_type!(DisplayLabel, String);

pub const WELL_KNOWN_LABEL: &str = "WELL KNOWN: ";
pub const TEXT_LABEL: &str = "TEXT: ";
pub const URI_LABEL: &str = "URI: ";

/// How a recognized record's payload is turned into text
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    uniffi::Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayloadRendering {
    /// Apply the Text and URI record rules, language header stripped and URI prefix expanded
    #[default]
    Decoded,

    /// The payload bytes as is, lossy UTF-8
    Raw,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoder {
    rendering: PayloadRendering,
}

impl Decoder {
    pub fn new(rendering: PayloadRendering) -> Self {
        Self { rendering }
    }

    pub fn rendering(&self) -> PayloadRendering {
        self.rendering
    }

    /// Label for a single record, `None` for anything that is not a well known Text or URI
    pub fn label(&self, record: &NdefRecord) -> Option<DisplayLabel> {
        let (kind_label, rendered) = match record.kind() {
            RecordKind::Text => (TEXT_LABEL, self.render(&record.payload, decode_text)),
            RecordKind::Uri => (URI_LABEL, self.render(&record.payload, payload::decode_uri)),
            RecordKind::Unrecognized => return None,
        };

        Some(DisplayLabel::from(format!("{WELL_KNOWN_LABEL}{kind_label}{rendered}")))
    }

    /// Labels of the recognized records in message order, computed as the iterator is driven
    pub fn labels<'a>(
        &'a self,
        message: &'a NdefMessage,
    ) -> impl Iterator<Item = DisplayLabel> + 'a {
        message.iter().filter_map(|record| self.label(record))
    }

    pub(crate) fn into_labels(
        self,
        message: &NdefMessage,
    ) -> impl Iterator<Item = DisplayLabel> + '_ {
        message.iter().filter_map(move |record| self.label(record))
    }

    fn render(&self, bytes: &[u8], decode: fn(&[u8]) -> Result<String, PayloadError>) -> String {
        match self.rendering {
            PayloadRendering::Raw => render_raw(bytes),
            PayloadRendering::Decoded => decode(bytes).unwrap_or_else(|error| {
                warn!("unable to decode payload, showing raw bytes: {error}");
                render_raw(bytes)
            }),
        }
    }
}

fn decode_text(bytes: &[u8]) -> Result<String, PayloadError> {
    payload::decode_text(bytes).map(|text| text.text)
}

fn render_raw(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{rtd::RTD_TEXT, tnf::Tnf};

    fn labels(decoder: Decoder, records: Vec<NdefRecord>) -> Vec<String> {
        let message = NdefMessage::new(records);
        decoder.labels(&message).map(String::from).collect()
    }

    #[test]
    fn text_record_gets_text_label() {
        let labels = labels(Decoder::default(), vec![NdefRecord::text("en", "Hello")]);
        assert_eq!(labels, vec!["WELL KNOWN: TEXT: Hello".to_string()]);
    }

    #[test]
    fn uri_record_gets_uri_label() {
        let records = vec![NdefRecord::uri("http://google.com/maps")];
        let labels = labels(Decoder::default(), records);
        assert_eq!(labels, vec!["WELL KNOWN: URI: http://google.com/maps".to_string()]);
    }

    #[test]
    fn non_well_known_records_are_skipped() {
        let records = vec![
            NdefRecord::mime("text/plain", b"hello".to_vec()),
            NdefRecord::new(Tnf::AbsoluteUri, b"http://google.com".to_vec(), vec![]),
            NdefRecord::new(Tnf::External, RTD_TEXT.to_vec(), b"\x02enHi".to_vec()),
            NdefRecord::new(Tnf::Empty, vec![], vec![]),
        ];

        assert!(labels(Decoder::default(), records).is_empty());
    }

    #[test]
    fn unknown_well_known_types_are_skipped() {
        let records = vec![
            NdefRecord::new(Tnf::WellKnown, b"Sp".to_vec(), vec![]),
            NdefRecord::new(Tnf::WellKnown, b"Hc".to_vec(), vec![0x01]),
        ];

        assert!(labels(Decoder::default(), records).is_empty());
    }

    #[test]
    fn empty_message_has_no_labels() {
        assert!(labels(Decoder::default(), vec![]).is_empty());
    }

    #[test]
    fn labels_keep_message_order_and_skip_unrecognized() {
        let records = vec![
            NdefRecord::uri("tel:+15551234"),
            NdefRecord::mime("application/json", b"{}".to_vec()),
            NdefRecord::text("en", "first"),
            NdefRecord::new(Tnf::WellKnown, b"Sp".to_vec(), vec![]),
            NdefRecord::text("de", "zweite"),
        ];

        let labels = labels(Decoder::default(), records);
        assert_eq!(
            labels,
            vec![
                "WELL KNOWN: URI: tel:+15551234".to_string(),
                "WELL KNOWN: TEXT: first".to_string(),
                "WELL KNOWN: TEXT: zweite".to_string(),
            ]
        );
    }

    #[test]
    fn raw_rendering_keeps_payload_bytes() {
        let records = vec![NdefRecord::text("en", "Hello"), NdefRecord::uri("https://example.com")];

        let labels = labels(Decoder::new(PayloadRendering::Raw), records);
        assert_eq!(
            labels,
            vec![
                "WELL KNOWN: TEXT: \u{2}enHello".to_string(),
                "WELL KNOWN: URI: \u{4}example.com".to_string(),
            ]
        );
    }

    #[test]
    fn malformed_payload_falls_back_to_raw() {
        let records = vec![
            NdefRecord::new(Tnf::WellKnown, b"U".to_vec(), b"\x7Fodd".to_vec()),
            NdefRecord::new(Tnf::WellKnown, b"T".to_vec(), vec![]),
        ];

        let labels = labels(Decoder::default(), records);
        assert_eq!(
            labels,
            vec!["WELL KNOWN: URI: \u{7f}odd".to_string(), "WELL KNOWN: TEXT: ".to_string()]
        );
    }

    #[test]
    fn labels_are_lazy() {
        let message = NdefMessage::new(vec![
            NdefRecord::text("en", "a"),
            NdefRecord::text("en", "b"),
        ]);
        let decoder = Decoder::default();

        let mut labels = decoder.labels(&message);
        assert_eq!(labels.next().map(String::from), Some("WELL KNOWN: TEXT: a".to_string()));
        assert_eq!(labels.next().map(String::from), Some("WELL KNOWN: TEXT: b".to_string()));
        assert_eq!(labels.next(), None);
    }

    #[test]
    fn rendering_from_str() {
        assert_eq!("raw".parse::<PayloadRendering>().unwrap(), PayloadRendering::Raw);
        assert_eq!(PayloadRendering::Decoded.to_string(), "decoded");
        assert_eq!(Decoder::default().rendering(), PayloadRendering::Decoded);
    }
}
