//! NDEF_DISCOVERED filters, which tags get dispatched to the app
//!
//! The first record of the first message decides where a tag is dispatched: text records
//! look like `text/plain`, URI records like their URI, MIME records like their type and
//! external records like a `vnd.android.nfc://ext/` URI.

use std::fmt;

use tapread_ndef::{
    NdefMessage, NdefRecord, RecordKind, Tnf,
    payload::decode_uri,
    rtd::RTD_SMART_POSTER,
};
use tracing::{debug, warn};
use url::Url;

use crate::config::ReaderConfig;

const EXTERNAL_TYPE_URI_PREFIX: &str = "vnd.android.nfc://ext/";
const TEXT_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, uniffi::Enum)]
pub enum FilterAction {
    #[strum(serialize = "NDEF_DISCOVERED")]
    NdefDiscovered,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FilterData {
    Uri {
        scheme: String,
        authority: Option<String>,
        port: Option<u16>,
    },
    MimeType { mime_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DiscoveryFilter {
    pub action: FilterAction,
    pub data: FilterData,
}

/// What a discovered message looks like to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, uniffi::Enum)]
pub enum DispatchTarget {
    #[display("mime type {mime_type}")]
    MimeType { mime_type: String },

    #[display("uri {uri}")]
    Uri { uri: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum FilterError {
    #[error("malformed mime type {0:?}")]
    MalformedMimeType(String),

    #[error("uri filter needs a scheme")]
    EmptyScheme,
}

/// A lowercased `type/subtype`, either part may be `*`
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct MimeType(String);

impl MimeType {
    pub fn parse(mime_type: &str) -> Result<Self, FilterError> {
        let normalized = normalize_mime_type(mime_type);

        match normalized.find('/') {
            Some(slash) if slash > 0 && normalized.len() > slash + 1 => Ok(Self(normalized)),
            _ => Err(FilterError::MalformedMimeType(mime_type.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, mime_type: &str) -> bool {
        let mime_type = normalize_mime_type(mime_type);

        if self.0 == "*/*" || self.0 == mime_type {
            return true;
        }

        match self.0.strip_suffix("/*") {
            Some(base) => mime_type.split_once('/').is_some_and(|(other, _)| other == base),
            None => false,
        }
    }
}

impl DiscoveryFilter {
    pub fn uri(
        scheme: &str,
        authority: Option<&str>,
        port: Option<u16>,
    ) -> Result<Self, FilterError> {
        let scheme = scheme.trim().to_ascii_lowercase();
        if scheme.is_empty() {
            return Err(FilterError::EmptyScheme);
        }

        let authority = authority.map(|authority| authority.trim().to_ascii_lowercase());

        Ok(Self {
            action: FilterAction::NdefDiscovered,
            data: FilterData::Uri {
                scheme,
                authority,
                port,
            },
        })
    }

    pub fn mime_type(mime_type: &str) -> Result<Self, FilterError> {
        let mime_type = MimeType::parse(mime_type)?;

        Ok(Self {
            action: FilterAction::NdefDiscovered,
            data: FilterData::MimeType {
                mime_type: mime_type.0,
            },
        })
    }

    pub fn matches(&self, target: &DispatchTarget) -> bool {
        match (&self.data, target) {
            (FilterData::MimeType { mime_type }, DispatchTarget::MimeType { mime_type: other }) => {
                MimeType(mime_type.clone()).matches(other)
            }

            (FilterData::Uri { scheme, authority, port }, DispatchTarget::Uri { uri }) => {
                let Ok(url) = Url::parse(uri) else {
                    debug!("unable to parse uri {uri}, not matching");
                    return false;
                };

                url.scheme() == scheme
                    && authority.as_deref().is_none_or(|authority| host_matches(authority, &url))
                    && port.is_none_or(|port| url.port() == Some(port))
            }

            _ => false,
        }
    }
}

impl fmt::Display for DiscoveryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            FilterData::MimeType { mime_type } => {
                write!(f, "{} mime type {mime_type}", self.action)
            }
            FilterData::Uri { scheme, authority, port } => {
                write!(f, "{} uri {scheme}://", self.action)?;

                if let Some(authority) = authority {
                    write!(f, "{authority}")?;
                }

                if let Some(port) = port {
                    write!(f, ":{port}")?;
                }

                Ok(())
            }
        }
    }
}

impl DispatchTarget {
    /// Dispatch target of the first record of the message, `None` when nothing would be dispatched
    pub fn from_message(message: &NdefMessage) -> Option<Self> {
        let record = message.records.first()?;
        Self::from_record(record)
    }

    pub fn from_record(record: &NdefRecord) -> Option<Self> {
        match record.tnf {
            Tnf::WellKnown => match record.kind() {
                RecordKind::Text => Some(Self::MimeType {
                    mime_type: TEXT_MIME_TYPE.to_string(),
                }),
                RecordKind::Uri => {
                    let uri = decode_uri(&record.payload).ok()?;
                    Some(Self::Uri { uri })
                }
                RecordKind::Unrecognized if record.type_ == RTD_SMART_POSTER => {
                    smart_poster_uri(&record.payload).map(|uri| Self::Uri { uri })
                }
                RecordKind::Unrecognized => None,
            },

            Tnf::Mime => {
                let mime_type = record.type_str()?;
                Some(Self::MimeType {
                    mime_type: normalize_mime_type(mime_type),
                })
            }

            Tnf::AbsoluteUri => record.type_str().map(|uri| Self::Uri {
                uri: uri.to_string(),
            }),

            Tnf::External => {
                let type_ = record.type_str()?.to_ascii_lowercase();
                Some(Self::Uri {
                    uri: format!("{EXTERNAL_TYPE_URI_PREFIX}{type_}"),
                })
            }

            Tnf::Empty | Tnf::Unknown | Tnf::Unchanged | Tnf::Reserved => None,
        }
    }
}

/// Build the filters the host registers, malformed entries are logged and left out
pub fn build_filters(config: &ReaderConfig) -> Vec<DiscoveryFilter> {
    let uri_filters = config.uri_filters.iter().map(|filter| {
        DiscoveryFilter::uri(&filter.scheme, filter.authority.as_deref(), filter.port)
    });

    let mime_filters = config
        .mime_types
        .iter()
        .map(|mime_type| DiscoveryFilter::mime_type(mime_type));

    uri_filters
        .chain(mime_filters)
        .filter_map(|filter| match filter {
            Ok(filter) => Some(filter),
            Err(error) => {
                warn!("skipping discovery filter: {error}");
                None
            }
        })
        .collect()
}

/// First filter that would dispatch the message, looking at the first message of the event
pub fn matching_filter<'a>(
    filters: &'a [DiscoveryFilter],
    message: &NdefMessage,
) -> Option<&'a DiscoveryFilter> {
    let target = DispatchTarget::from_message(message)?;
    filters.iter().find(|filter| filter.matches(&target))
}

fn normalize_mime_type(mime_type: &str) -> String {
    let without_params = mime_type.split(';').next().unwrap_or_default();
    without_params.trim().to_ascii_lowercase()
}

/// A leading `*` matches any host ending in the rest of the authority
fn host_matches(authority: &str, url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };

    let host = host.to_ascii_lowercase();
    match authority.strip_prefix('*') {
        Some(suffix) => host.ends_with(suffix),
        None => host == authority,
    }
}

fn smart_poster_uri(payload: &[u8]) -> Option<String> {
    let message = NdefMessage::from_bytes(payload).ok()?;
    let record = message.iter().find(|record| record.kind() == RecordKind::Uri)?;
    decode_uri(&record.payload).ok()
}
