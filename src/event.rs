//! Tag discovery events delivered by the host

use tapread_ndef::{Decoder, DisplayLabel, NdefMessage};

use crate::filter::DispatchTarget;

/// The NDEF messages found in one discovery, in the order the platform reported them
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct DiscoveryEvent {
    pub messages: Vec<NdefMessage>,
}

impl DiscoveryEvent {
    pub fn new(messages: Vec<NdefMessage>) -> Self {
        Self { messages }
    }

    /// An intent without the NDEF messages extra carries no messages
    pub fn from_extras(messages: Option<Vec<NdefMessage>>) -> Self {
        Self::new(messages.unwrap_or_default())
    }

    pub fn labels<'a>(&'a self, decoder: &'a Decoder) -> impl Iterator<Item = DisplayLabel> + 'a {
        self.messages.iter().flat_map(move |message| decoder.labels(message))
    }

    pub fn dispatch_target(&self) -> Option<DispatchTarget> {
        self.messages.first().and_then(DispatchTarget::from_message)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tapread_ndef::{NdefRecord, PayloadRendering, Tnf};

    use super::*;

    #[test]
    fn labels_across_messages_keep_order() {
        let event = DiscoveryEvent::new(vec![
            NdefMessage::new(vec![
                NdefRecord::text("en", "one"),
                NdefRecord::mime("text/plain", vec![]),
            ]),
            NdefMessage::default(),
            NdefMessage::new(vec![NdefRecord::uri("http://google.com")]),
        ]);

        let decoder = Decoder::default();
        let labels = event.labels(&decoder).map(String::from).collect::<Vec<_>>();

        assert_eq!(
            labels,
            vec![
                "WELL KNOWN: TEXT: one".to_string(),
                "WELL KNOWN: URI: http://google.com".to_string(),
            ]
        );
    }

    #[test]
    fn missing_extras_means_no_labels() {
        let event = DiscoveryEvent::from_extras(None);
        let decoder = Decoder::new(PayloadRendering::Raw);

        assert_eq!(event.labels(&decoder).count(), 0);
        assert_eq!(event.dispatch_target(), None);
    }

    #[test]
    fn dispatch_target_comes_from_first_message() {
        let event = DiscoveryEvent::new(vec![
            NdefMessage::new(vec![NdefRecord::new(Tnf::Unknown, vec![], vec![])]),
            NdefMessage::new(vec![NdefRecord::text("en", "ignored")]),
        ]);

        assert_eq!(event.dispatch_target(), None);
    }
}
