use tapread_ndef::{Decoder, NdefError, NdefMessage, PayloadRendering};

use crate::{
    config::ReaderConfig,
    filter::{self, DiscoveryFilter, DispatchTarget},
};

/// Labels of a bare NDEF message read from a tag
#[uniffi::export]
fn decode_message_bytes(
    bytes: Vec<u8>,
    rendering: PayloadRendering,
) -> Result<Vec<String>, NdefError> {
    let message = NdefMessage::from_bytes(&bytes)?;
    Ok(labels(&message, rendering))
}

/// Labels of the NDEF message in a Type 2 tag memory dump
#[uniffi::export]
fn decode_tag_bytes(bytes: Vec<u8>, rendering: PayloadRendering) -> Result<Vec<String>, NdefError> {
    let message = NdefMessage::from_tag_bytes(&bytes)?;
    Ok(labels(&message, rendering))
}

#[uniffi::export]
fn discovery_filters(config: ReaderConfig) -> Vec<DiscoveryFilter> {
    filter::build_filters(&config)
}

#[uniffi::export]
fn dispatch_target(message: NdefMessage) -> Option<DispatchTarget> {
    DispatchTarget::from_message(&message)
}

fn labels(message: &NdefMessage, rendering: PayloadRendering) -> Vec<String> {
    Decoder::new(rendering).labels(message).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decodes_message_bytes() {
        // ME | MB | SR well known text "en" "Hi"
        let bytes = vec![0xD1, 0x01, 0x05, b'T', 0x02, b'e', b'n', b'H', b'i'];
        let labels = decode_message_bytes(bytes, PayloadRendering::Decoded).unwrap();

        assert_eq!(labels, vec!["WELL KNOWN: TEXT: Hi".to_string()]);
    }

    #[test]
    fn decodes_tag_bytes() {
        let mut bytes = vec![0x03, 0x0F, 0xD1, 0x01, 0x0B, b'U', 0x03];
        bytes.extend_from_slice(b"google.com");
        bytes.push(0xFE);

        let labels = decode_tag_bytes(bytes, PayloadRendering::Decoded).unwrap();

        assert_eq!(labels, vec!["WELL KNOWN: URI: http://google.com".to_string()]);
    }

    #[test]
    fn errors_are_reported() {
        let error = decode_tag_bytes(vec![0xFE], PayloadRendering::Decoded).unwrap_err();
        assert_eq!(error, NdefError::NoNdefMessage);
    }
}
