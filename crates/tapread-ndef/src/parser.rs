pub mod stream;

use stream::Stream;
use winnow::{
    ModalResult, Parser,
    binary::{
        Endianness, be_u8, be_u16,
        bits::{bits, bool as take_bool, take as take_bits},
    },
    combinator::fail,
    error::{ContextError, ErrMode},
    token::{any, take},
};

use crate::{
    error::NdefError,
    header::NdefHeader,
    message_info::MessageInfo,
    record::{NdefRecord, RawRecord},
    tnf::Tnf,
};

// Type 2 tag TLV block types
const NULL_TLV: u8 = 0x00;
const LOCK_CONTROL_TLV: u8 = 0x01;
const MEMORY_CONTROL_TLV: u8 = 0x02;
const NDEF_TLV: u8 = 0x03;
const PROPRIETARY_TLV: u8 = 0xFD;

/// A TLV length byte of 0xFF means a 2 byte big endian length follows
const LONG_TLV_LENGTH: u8 = 0xFF;

/// Parse the records of a bare NDEF message, stops after the record flagged message end
pub fn parse_ndef_message(input: &mut Stream<'_>) -> Result<Vec<NdefRecord>, NdefError> {
    let raw = parse_raw_records(input, None)?;
    assemble_records(raw)
}

/// Parse the records of a message whose length was reported by the NDEF TLV
pub fn parse_ndef_records(
    input: &mut Stream<'_>,
    info: &MessageInfo,
) -> Result<Vec<NdefRecord>, NdefError> {
    let message_length = info.message_length as usize;
    let raw = parse_raw_records(input, Some(message_length))?;

    if records_len(&raw) > message_length {
        return Err(NdefError::RecordOverrun {
            length: info.message_length,
        });
    }

    assemble_records(raw)
}

/// Walk the TLV blocks of Type 2 tag memory up to and including the NDEF TLV header
///
/// Fails on a terminator or unknown TLV, there is no NDEF message on the tag
pub fn parse_message_info(input: &mut Stream<'_>) -> ModalResult<MessageInfo> {
    let mut header_length = 0_u32;

    loop {
        let tlv_type = be_u8.parse_next(input)?;
        header_length += 1;

        match tlv_type {
            NULL_TLV => continue,

            LOCK_CONTROL_TLV | MEMORY_CONTROL_TLV | PROPRIETARY_TLV => {
                let (length, length_size) = parse_tlv_length(input)?;
                take(length as usize).void().parse_next(input)?;
                header_length += length_size + length as u32;
            }

            NDEF_TLV => {
                let (length, length_size) = parse_tlv_length(input)?;
                header_length += length_size;
                return Ok(MessageInfo::new(length, header_length));
            }

            _ => return fail.parse_next(input),
        }
    }
}

pub fn parse_ndef_record(input: &mut Stream<'_>) -> ModalResult<RawRecord> {
    let header = parse_header.parse_next(input)?;
    let type_ = parse_type(input, header.type_length)?;
    let id = parse_id(input, header.id_length)?;
    let payload = parse_payload(input, header.payload_length)?;

    Ok(RawRecord {
        header,
        type_,
        id,
        payload,
    })
}

/// Join chunked records, the initial chunk carries the type and id, the rest
/// only carry payload and must be [`Tnf::Unchanged`]
pub fn assemble_records(raw: Vec<RawRecord>) -> Result<Vec<NdefRecord>, NdefError> {
    let mut records = Vec::with_capacity(raw.len());
    let mut chunked: Option<NdefRecord> = None;

    for record in raw {
        let is_unchanged = record.header.type_name_format == Tnf::Unchanged;

        if let Some(initial) = chunked.as_mut() {
            if !is_unchanged || !record.type_.is_empty() || record.id.is_some() {
                return Err(NdefError::ChunkSequence(
                    "continuation chunk must be unchanged with no type or id".to_string(),
                ));
            }

            initial.payload.extend_from_slice(&record.payload);

            // last chunk
            if !record.header.chunked {
                records.extend(chunked.take());
            }

            continue;
        }

        if is_unchanged {
            return Err(NdefError::ChunkSequence(
                "unchanged record without an initial chunk".to_string(),
            ));
        }

        if record.header.chunked {
            chunked = Some(record.into());
        } else {
            records.push(record.into());
        }
    }

    if chunked.is_some() {
        return Err(NdefError::ChunkSequence(
            "message ended in the middle of a chunked record".to_string(),
        ));
    }

    Ok(records)
}

/// Encoded size of the records, as described by their headers
pub fn records_len(records: &[RawRecord]) -> usize {
    records.iter().map(|record| record.header.record_len()).sum()
}

/// Records until the one flagged message end, or until `limit` bytes of records were read
pub fn parse_raw_records(
    input: &mut Stream<'_>,
    limit: Option<usize>,
) -> ModalResult<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut total_parsed_bytes = 0;

    if limit == Some(0) {
        return Ok(records);
    }

    loop {
        let record = parse_ndef_record.parse_next(input)?;
        total_parsed_bytes += record.header.record_len();

        let message_end = record.header.message_end;
        records.push(record);

        if message_end {
            break;
        }

        // parsed all bytes dictated by the reported length
        if limit.is_some_and(|limit| total_parsed_bytes >= limit) {
            break;
        }
    }

    Ok(records)
}

// private
fn parse_tlv_length(input: &mut Stream<'_>) -> ModalResult<(u16, u32)> {
    let length_indicator = be_u8.parse_next(input)?;

    if length_indicator == LONG_TLV_LENGTH {
        Ok((be_u16.parse_next(input)?, 3))
    } else {
        Ok((length_indicator as u16, 1))
    }
}

fn parse_header_byte(input: &mut Stream<'_>) -> ModalResult<(bool, bool, bool, bool, bool, u8)> {
    bits::<_, _, ErrMode<ContextError>, _, _>((
        take_bool,
        take_bool,
        take_bool,
        take_bool,
        take_bool,
        take_bits(3_u8),
    ))
    .parse_next(input)
}

fn parse_header(input: &mut Stream<'_>) -> ModalResult<NdefHeader> {
    let (message_begin, message_end, chunked, short_record, has_id_length, type_name_format) =
        parse_header_byte(input)?;

    let type_length = winnow::binary::u8.parse_next(input)?;

    let payload_length = if short_record {
        any.map(|x: u8| x as u32).parse_next(input)?
    } else {
        winnow::binary::u32(Endianness::Big).parse_next(input)?
    };

    let id_length = if has_id_length {
        Some(any.parse_next(input)?)
    } else {
        None
    };

    Ok(NdefHeader {
        message_begin,
        message_end,
        chunked,
        short_record,
        has_id_length,
        type_name_format: Tnf::from_bits(type_name_format),
        type_length,
        payload_length,
        id_length,
    })
}

fn parse_type(input: &mut Stream<'_>, type_length: u8) -> ModalResult<Vec<u8>> {
    take(type_length as usize).map(|s: &[u8]| s.to_vec()).parse_next(input)
}

fn parse_id(input: &mut Stream<'_>, id_length: Option<u8>) -> ModalResult<Option<Vec<u8>>> {
    if let Some(id_len) = id_length {
        take(id_len as usize).map(|s: &[u8]| Some(s.to_vec())).parse_next(input)
    } else {
        Ok(None)
    }
}

fn parse_payload(input: &mut Stream<'_>, payload_length: u32) -> ModalResult<Vec<u8>> {
    take(payload_length as usize).map(|s: &[u8]| s.to_vec()).parse_next(input)
}
