//! Incremental reading of Type 2 tag memory
//!
//! Tags are read a chunk of blocks at a time, the reader is fed every chunk together with
//! the bytes it handed back last time until the whole NDEF message is available.

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use winnow::{
    ModalResult,
    error::{ErrMode, Needed},
};

use crate::{
    error::NdefError,
    message::NdefMessage,
    message_info::MessageInfo,
    parser::{
        self, parse_message_info,
        stream::{Stream, StreamExt},
    },
    record::RawRecord,
    resume::ResumeError,
};

/// Number of blocks read at a time from the NFC chip
pub const NUMBER_OF_BLOCKS_PER_CHUNK: u16 = 32;

/// Number of bytes per block read from the NFC chip
pub const BYTES_PER_BLOCK: u16 = 4;

/// The largest length the 3 byte NDEF TLV length field can hold
const MAX_MESSAGE_LENGTH: usize = u16::MAX as usize;

#[derive(Debug, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum NfcReaderError {
    #[error("Error parsing the NDEF message: {0}")]
    ParsingError(String),

    #[error("Not enough data to parse, need at least enough to parse the message info")]
    NotEnoughData,

    #[error("The tag does not contain an NDEF message")]
    NoNdefMessage,

    #[error("Trying to parse a message that has already been parsed")]
    AlreadyParsed,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ParseResult {
    /// The whole NDEF message was read
    Complete(MessageInfo, NdefMessage),

    /// Incomplete, need more data to parse the message
    Incomplete(ParsingMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ParsingMessage {
    pub message_info: MessageInfo,

    /// Prepend these to the next chunk read from the tag
    pub left_over_bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParserState {
    #[default]
    NotStarted,
    Parsing(ParsingContext),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingContext {
    pub message_info: MessageInfo,

    /// Bytes of the NDEF message, counted from after the NDEF TLV header
    pub needed: u32,
    first_block_hash: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfcReader {
    state: ParserState,
}

impl NfcReader {
    pub fn new() -> NfcReader {
        NfcReader {
            state: ParserState::default(),
        }
    }

    /// Parse the entire message if possible, if not return the unused data and the message info
    pub fn parse(&mut self, data: Vec<u8>) -> Result<ParseResult, NfcReaderError> {
        match &mut self.state {
            ParserState::NotStarted => {
                let mut stream = parser::stream::new(&data);
                let message_info = parse_message_info(&mut stream).map_err(|error| {
                    if error.is_incomplete() {
                        NfcReaderError::NotEnoughData
                    } else {
                        NfcReaderError::NoNdefMessage
                    }
                })?;

                debug!(?message_info, "found ndef message");

                self.state = ParserState::Parsing(ParsingContext {
                    message_info,
                    needed: message_info.message_length,
                    first_block_hash: get_first_block_hash(&data),
                });

                self.parse_incomplete(stream)
            }

            ParserState::Parsing(_) => self.parse_incomplete(data),

            ParserState::Complete => Err(NfcReaderError::AlreadyParsed),
        }
    }

    fn parse_incomplete<'a>(
        &mut self,
        data: impl StreamExt + 'a,
    ) -> Result<ParseResult, NfcReaderError> {
        let ParserState::Parsing(parsing) = &mut self.state else {
            return Err(NfcReaderError::ParsingError("reader is not parsing a message".into()));
        };

        // need more data to parse the message
        if data.len() < parsing.needed as usize {
            debug!("not enough data to parse message, continuing");

            return Ok(ParseResult::Incomplete(ParsingMessage {
                message_info: parsing.message_info,
                left_over_bytes: data.to_vec(),
            }));
        }

        // have enough data to parse the message
        debug!("enough data to parse message, trying to parse");

        let available = data.len();
        let mut stream: Stream<'_> = data.to_stream();
        let message_length = parsing.message_info.message_length as usize;

        match parse_tag_records(&mut stream, message_length) {
            Ok(raw) => {
                let records_len = parser::records_len(&raw);
                if records_len > message_length {
                    warn!("records overrun the reported message length, using {records_len} bytes");
                    parsing.message_info.grow_to(checked_message_length(records_len)?);
                }

                let records = parser::assemble_records(raw)
                    .map_err(|error| NfcReaderError::ParsingError(error.to_string()))?;

                let result = ParseResult::Complete(parsing.message_info, NdefMessage::new(records));
                self.state = ParserState::Complete;
                Ok(result)
            }

            Err(ErrMode::Incomplete(needed)) => {
                warn!("incomplete, need more data, incorrect message length was reported");

                let needed = match needed {
                    Needed::Size(size) => size.get(),
                    Needed::Unknown => 1,
                };

                let message_length = checked_message_length(available.saturating_add(needed))?;
                parsing.message_info.grow_to(message_length);
                parsing.needed = parsing.message_info.message_length;

                Ok(ParseResult::Incomplete(ParsingMessage {
                    message_info: parsing.message_info,
                    left_over_bytes: data.to_vec(),
                }))
            }

            Err(error) => {
                let error = NdefError::from(error);
                Err(NfcReaderError::ParsingError(error.to_string()))
            }
        }
    }

    /// Check that a chunk read from a tag belongs to the message being parsed
    pub fn is_resumeable(&mut self, data: Vec<u8>) -> Result<(), ResumeError> {
        let expected_bytes = (BYTES_PER_BLOCK * NUMBER_OF_BLOCKS_PER_CHUNK) as u32;
        let data_len = u32::try_from(data.len()).unwrap_or(u32::MAX);

        if data_len < expected_bytes {
            return Err(ResumeError::BlockSizeMismatch {
                expected: expected_bytes,
                actual: data_len,
            });
        }

        let parsing_state = match &mut self.state {
            ParserState::Parsing(parsing_state) => parsing_state,
            ParserState::Complete => return Err(ResumeError::AlreadyParsed),
            ParserState::NotStarted => {
                warn!("resuming a message that was never started, starting from the beginning");
                return Ok(());
            }
        };

        let Some(first_block_hash) = &get_first_block_hash(&data) else {
            return Err(ResumeError::UnableToGetFirstBlockHash);
        };

        let Some(existing_first_block_hash) = &parsing_state.first_block_hash else {
            return Err(ResumeError::UnableToGetFirstBlockHash);
        };

        // scanning a different tag
        if first_block_hash != existing_first_block_hash {
            return Err(ResumeError::BlocksDoNotMatch);
        }

        Ok(())
    }

    /// Check if the reader is started
    pub fn is_started(&self) -> bool {
        matches!(self.state, ParserState::Parsing(_))
    }

    /// Get the message info, if we have that info
    pub fn message_info(&self) -> Option<&MessageInfo> {
        match &self.state {
            ParserState::Parsing(parsing_state) => Some(&parsing_state.message_info),
            ParserState::Complete | ParserState::NotStarted => None,
        }
    }

    /// Forget the current message, the next chunk starts a new read
    pub fn reset(&mut self) {
        self.state = ParserState::NotStarted;
    }
}

/// Records up to the reported length, when a record runs past it the reported length was
/// wrong and records are read up to the one flagged message end
fn parse_tag_records(
    input: &mut Stream<'_>,
    message_length: usize,
) -> ModalResult<Vec<RawRecord>> {
    let mut records = parser::parse_raw_records(input, Some(message_length))?;

    let overrun = parser::records_len(&records) > message_length;
    let ended = records.last().is_some_and(|record| record.header.message_end);

    if overrun && !ended {
        records.extend(parser::parse_raw_records(input, None)?);
    }

    Ok(records)
}

/// A grown message length, rejected when no NDEF TLV could describe it
fn checked_message_length(message_length: usize) -> Result<u32, NfcReaderError> {
    if message_length > MAX_MESSAGE_LENGTH {
        return Err(NfcReaderError::ParsingError(format!(
            "record length of {message_length} bytes is larger than any NDEF message"
        )));
    }

    Ok(message_length as u32)
}

fn get_first_block_hash(data: &[u8]) -> Option<String> {
    let hash_bytes_length = (BYTES_PER_BLOCK * NUMBER_OF_BLOCKS_PER_CHUNK) as usize;
    if data.len() < hash_bytes_length {
        return None;
    }

    let data = &data[..hash_bytes_length];

    let mut sha256 = Sha256::new();
    sha256.update(data);
    let hash = sha256.finalize();

    let hash = hex::encode(hash);
    Some(hash)
}
