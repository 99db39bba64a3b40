//! Foreground dispatch, the host routes discovered tags to the visible screen
//!
//! Dispatch is a platform resource, it is held while the screen is visible and released
//! as soon as it is hidden.

use parking_lot::Mutex;
use tapread_ndef::{Decoder, NdefMessage};
use tracing::{debug, info};

use crate::{
    config::ReaderConfig,
    event::DiscoveryEvent,
    filter::{self, DiscoveryFilter},
};

#[uniffi::export(callback_interface)]
pub trait ForegroundDispatch: Send + Sync + std::fmt::Debug + 'static {
    /// Start routing tags matching `filters` to the app
    fn enable(&self, filters: Vec<DiscoveryFilter>);

    fn disable(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DispatchState {
    #[default]
    Released,
    Held,
}

#[derive(Debug, uniffi::Object)]
pub struct NfcSession {
    dispatch: Box<dyn ForegroundDispatch>,
    filters: Vec<DiscoveryFilter>,
    decoder: Decoder,
    state: Mutex<DispatchState>,
}

#[uniffi::export]
impl NfcSession {
    #[uniffi::constructor]
    pub fn new(dispatch: Box<dyn ForegroundDispatch>, config: ReaderConfig) -> Self {
        let filters = filter::build_filters(&config);
        debug!("session created with {} discovery filters", filters.len());

        Self {
            dispatch,
            filters,
            decoder: Decoder::new(config.rendering),
            state: Mutex::new(DispatchState::default()),
        }
    }

    /// Screen became visible, take foreground dispatch
    #[uniffi::method]
    pub fn on_visible(&self) {
        if self.transition(DispatchState::Held) {
            self.dispatch.enable(self.filters.clone());
        }
    }

    /// Screen was hidden, give foreground dispatch back
    #[uniffi::method]
    pub fn on_hidden(&self) {
        if self.transition(DispatchState::Released) {
            self.dispatch.disable();
        }
    }

    #[uniffi::method]
    pub fn is_dispatch_enabled(&self) -> bool {
        *self.state.lock() == DispatchState::Held
    }

    #[uniffi::method]
    pub fn filters(&self) -> Vec<DiscoveryFilter> {
        self.filters.clone()
    }

    /// Display strings for a discovered tag, one per recognized record
    #[uniffi::method]
    pub fn on_discovery(&self, event: DiscoveryEvent) -> Vec<String> {
        if let Some(message) = event.messages.first() {
            self.log_dispatch(message);
        }

        let labels = event.labels(&self.decoder).map(String::from).collect::<Vec<_>>();
        info!("discovered {} messages, {} labels", event.messages.len(), labels.len());

        labels
    }
}

impl NfcSession {
    /// Move to `next`, false if already there. The lock is released before the host is called
    fn transition(&self, next: DispatchState) -> bool {
        let mut state = self.state.lock();
        if *state == next {
            return false;
        }

        *state = next;
        true
    }

    fn log_dispatch(&self, message: &NdefMessage) {
        match filter::matching_filter(&self.filters, message) {
            Some(filter) => debug!("message matched {filter}"),
            None => debug!("message matches no discovery filter"),
        }
    }
}

impl Drop for NfcSession {
    fn drop(&mut self) {
        if *self.state.get_mut() == DispatchState::Held {
            self.dispatch.disable();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use tapread_ndef::{NdefRecord, PayloadRendering};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Enable(usize),
        Disable,
    }

    #[derive(Debug, Default, Clone)]
    struct RecordingDispatch(Arc<Mutex<Vec<Call>>>);

    impl ForegroundDispatch for RecordingDispatch {
        fn enable(&self, filters: Vec<DiscoveryFilter>) {
            self.0.lock().push(Call::Enable(filters.len()));
        }

        fn disable(&self) {
            self.0.lock().push(Call::Disable);
        }
    }

    fn session(config: ReaderConfig) -> (NfcSession, Arc<Mutex<Vec<Call>>>) {
        let dispatch = RecordingDispatch::default();
        let calls = dispatch.0.clone();
        (NfcSession::new(Box::new(dispatch), config), calls)
    }

    #[test]
    fn dispatch_follows_visibility() {
        let (session, calls) = session(ReaderConfig::default());
        assert!(!session.is_dispatch_enabled());

        session.on_visible();
        session.on_visible();
        assert!(session.is_dispatch_enabled());

        session.on_hidden();
        session.on_hidden();
        assert!(!session.is_dispatch_enabled());

        assert_eq!(*calls.lock(), vec![Call::Enable(2), Call::Disable]);
    }

    /// Host that asks the session for its state from inside the callbacks
    #[derive(Debug, Default, Clone)]
    struct ReentrantDispatch {
        session: Arc<Mutex<Option<Arc<NfcSession>>>>,
        seen: Arc<Mutex<Vec<bool>>>,
    }

    impl ReentrantDispatch {
        fn record_state(&self) {
            let session = self.session.lock().clone();
            if let Some(session) = session {
                self.seen.lock().push(session.is_dispatch_enabled());
            }
        }
    }

    impl ForegroundDispatch for ReentrantDispatch {
        fn enable(&self, _filters: Vec<DiscoveryFilter>) {
            self.record_state();
        }

        fn disable(&self) {
            self.record_state();
        }
    }

    #[test]
    fn host_can_query_the_session_from_callbacks() {
        let dispatch = ReentrantDispatch::default();
        let session = Arc::new(NfcSession::new(
            Box::new(dispatch.clone()),
            ReaderConfig::default(),
        ));

        *dispatch.session.lock() = Some(session.clone());

        session.on_visible();
        session.on_hidden();

        // break the cycle so the session can drop
        dispatch.session.lock().take();

        assert_eq!(*dispatch.seen.lock(), vec![true, false]);
    }

    #[test]
    fn hidden_before_visible_does_nothing() {
        let (session, calls) = session(ReaderConfig::default());
        session.on_hidden();
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn dropping_a_visible_session_releases_dispatch() {
        let (session, calls) = session(ReaderConfig::default());
        session.on_visible();
        drop(session);

        assert_eq!(*calls.lock(), vec![Call::Enable(2), Call::Disable]);
    }

    #[test]
    fn malformed_filters_are_not_registered() {
        let config = ReaderConfig {
            mime_types: vec!["plain".to_string()],
            ..ReaderConfig::default()
        };

        let (session, calls) = session(config);
        session.on_visible();

        assert_eq!(session.filters().len(), 1);
        assert_eq!(*calls.lock(), vec![Call::Enable(1)]);
    }

    #[test]
    fn discovery_produces_labels() {
        let (session, _calls) = session(ReaderConfig::default());

        let event = DiscoveryEvent::new(vec![NdefMessage::new(vec![
            NdefRecord::text("en", "Hello"),
            NdefRecord::mime("text/plain", b"ignored".to_vec()),
            NdefRecord::uri("http://google.com"),
        ])]);

        assert_eq!(
            session.on_discovery(event),
            vec![
                "WELL KNOWN: TEXT: Hello".to_string(),
                "WELL KNOWN: URI: http://google.com".to_string(),
            ]
        );

        assert!(session.on_discovery(DiscoveryEvent::default()).is_empty());
    }

    #[test]
    fn raw_rendering_from_config() {
        let config = ReaderConfig::default().with_rendering(PayloadRendering::Raw);
        let (session, _calls) = session(config);
        assert_eq!(session.decoder.rendering(), PayloadRendering::Raw);

        let event = DiscoveryEvent::new(vec![NdefMessage::new(vec![NdefRecord::text("en", "Hi")])]);
        assert_eq!(session.on_discovery(event), vec!["WELL KNOWN: TEXT: \u{2}enHi".to_string()]);
    }
}
