#[derive(Debug, Clone, PartialEq, Eq, uniffi::Error, thiserror::Error)]
pub enum ResumeError {
    /// The first chunk of the new read is not the first chunk of the tag being read
    #[error("Blocks do not match, this is a different tag")]
    BlocksDoNotMatch,

    #[error("The reader had already parsed the message")]
    AlreadyParsed,

    /// The bytes passed in need to cover at least one full chunk,
    /// NUMBER_OF_BLOCKS_PER_CHUNK * BYTES_PER_BLOCK
    #[error("Block size mismatch, expected {expected}, got {actual}")]
    BlockSizeMismatch { expected: u32, actual: u32 },

    #[error("Unable to get first block hash")]
    UnableToGetFirstBlockHash,
}
