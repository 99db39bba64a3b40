//! NDEF message parsing and decoding for NFC tags

uniffi::setup_scaffolding!();

pub mod decoder;
pub mod error;
pub mod ffi;
pub mod header;
pub mod message;
pub mod message_info;
pub mod parser;
pub mod payload;
pub mod reader;
pub mod record;
pub mod resume;
pub mod rtd;
pub mod tnf;

pub use decoder::{Decoder, DisplayLabel, PayloadRendering};
pub use error::NdefError;
pub use message::NdefMessage;
pub use reader::{
    BYTES_PER_BLOCK, NUMBER_OF_BLOCKS_PER_CHUNK, NfcReader, NfcReaderError, ParseResult,
};
pub use record::NdefRecord;
pub use rtd::{RTD_SMART_POSTER, RTD_TEXT, RTD_URI, RecordKind};
pub use tnf::Tnf;
