/// Where the NDEF message sits in Type 2 tag memory, read from the NDEF TLV
#[derive(Debug, PartialEq, Eq, Clone, Copy, uniffi::Record)]
pub struct MessageInfo {
    /// Bytes from the start of the tag data to the end of the NDEF message
    pub full_message_length: u32,

    /// The NDEF message length, as reported by the NDEF TLV
    pub message_length: u32,

    /// Bytes before the message: skipped TLVs plus the NDEF TLV type and length fields
    pub header_length: u32,
}

impl MessageInfo {
    pub fn new(message_length: u16, header_length: u32) -> Self {
        let message_length = message_length as u32;

        Self {
            full_message_length: header_length.saturating_add(message_length),
            message_length,
            header_length,
        }
    }

    /// The reported length was too short, the records need `message_length` bytes
    ///
    /// Never shrinks the message
    pub(crate) fn grow_to(&mut self, message_length: u32) {
        if message_length <= self.message_length {
            return;
        }

        self.message_length = message_length;
        self.full_message_length = self.header_length.saturating_add(message_length);
    }
}
