//! NFC Forum well known record type names, only meaningful under [`Tnf::WellKnown`]

use crate::{record::NdefRecord, tnf::Tnf};

pub const RTD_TEXT: &[u8] = b"T";
pub const RTD_URI: &[u8] = b"U";
pub const RTD_SMART_POSTER: &[u8] = b"Sp";

/// The record kinds the decoder knows how to label
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum RecordKind {
    Text,
    Uri,
    Unrecognized,
}

impl RecordKind {
    pub fn classify(record: &NdefRecord) -> Self {
        if record.tnf != Tnf::WellKnown {
            return Self::Unrecognized;
        }

        match record.type_.as_slice() {
            RTD_TEXT => Self::Text,
            RTD_URI => Self::Uri,
            _ => Self::Unrecognized,
        }
    }
}
