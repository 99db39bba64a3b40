use winnow::error::{ContextError, ErrMode, Needed};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum NdefError {
    #[error("not enough data, need at least {needed} more bytes")]
    Truncated { needed: u64 },

    #[error("no NDEF message found in the tag data")]
    NoNdefMessage,

    #[error("records overrun the reported NDEF message length of {length} bytes")]
    RecordOverrun { length: u32 },

    #[error("invalid chunked record sequence: {0}")]
    ChunkSequence(String),

    #[error("error parsing the NDEF message: {0}")]
    Parsing(String),
}

impl From<ErrMode<ContextError>> for NdefError {
    fn from(error: ErrMode<ContextError>) -> Self {
        match error {
            ErrMode::Incomplete(Needed::Size(size)) => Self::Truncated {
                needed: size.get() as u64,
            },
            ErrMode::Incomplete(Needed::Unknown) => Self::Truncated { needed: 1 },
            error => Self::Parsing(error.to_string()),
        }
    }
}
