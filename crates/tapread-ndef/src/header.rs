use crate::tnf::Tnf;

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct NdefHeader {
    pub message_begin: bool,
    pub message_end: bool,
    pub chunked: bool,
    pub short_record: bool,
    pub has_id_length: bool,
    pub type_name_format: Tnf,
    pub type_length: u8,
    pub payload_length: u32,
    pub id_length: Option<u8>,
}

impl NdefHeader {
    /// Encoded size of the whole record this header describes
    pub fn record_len(&self) -> usize {
        let payload_length_size = if self.short_record { 1 } else { 4 };
        let id_length = self.id_length.map(usize::from).unwrap_or_default();
        let id_length_size = usize::from(self.id_length.is_some());

        // flags byte + type length byte
        2 + payload_length_size
            + id_length_size
            + self.type_length as usize
            + id_length
            + self.payload_length as usize
    }
}
