// ABOUTME: Error types for device tree blob decoding and traversal
// ABOUTME: Splits failures into malformed-header and malformed-token-stream kinds

use thiserror::Error;

/// Main error type for DTB operations
///
/// The first group of variants can only come out of [`DeviceTree::new`], the
/// second group out of decoding the structure block.
///
/// [`DeviceTree::new`]: crate::DeviceTree::new
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DtbError {
    /// Invalid magic number in DTB header
    #[error("invalid magic number {0:#010x} in DTB header")]
    InvalidMagic(u32),
    /// Buffer is too short to hold the header fields
    #[error("buffer of {0} bytes is too short for a DTB header")]
    TruncatedHeader(usize),
    /// Declared total size is larger than the supplied buffer
    #[error("declared DTB size {declared} exceeds buffer length {available}")]
    SizeExceedsBuffer {
        /// `totalsize` from the header
        declared: u32,
        /// Physical length of the buffer
        available: usize,
    },
    /// Structure or strings block escapes the declared size
    #[error("{block} block at {offset:#x}+{size:#x} escapes DTB of {total} bytes")]
    BlockOutOfBounds {
        /// Which block failed the check
        block: &'static str,
        /// Block offset from the header
        offset: u32,
        /// Block size
        size: u32,
        /// Declared total size
        total: u32,
    },
    /// First token of the structure block is not a node start
    #[error("structure block does not begin with a root node")]
    RootNotNode,

    /// Unknown token id in structure block
    #[error("invalid token {token:#010x} at structure offset {offset:#x}")]
    InvalidToken {
        /// Raw token id
        token: u32,
        /// Structure block offset of the token
        offset: usize,
    },
    /// Word read from an offset that is not 4-byte aligned
    #[error("unaligned read at offset {0:#x}")]
    AlignmentError(usize),
    /// Read would run past the end of its region
    #[error("read at offset {0:#x} runs out of bounds")]
    OutOfBounds(usize),
    /// Name without a NUL terminator before the end of its region
    #[error("unterminated name at offset {0:#x}")]
    UnterminatedName(usize),
    /// Name bytes are not valid UTF-8
    #[error("name at offset {0:#x} is not valid UTF-8")]
    InvalidName(usize),
    /// Property name offset points outside the strings block
    #[error("string offset {offset:#x} outside strings block of {size} bytes")]
    StringOffsetOutOfRange {
        /// Offset taken from the property token
        offset: u32,
        /// Size of the strings block
        size: u32,
    },
}

impl DtbError {
    /// Whether this error means the header itself was rejected
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            DtbError::InvalidMagic(_)
                | DtbError::TruncatedHeader(_)
                | DtbError::SizeExceedsBuffer { .. }
                | DtbError::BlockOutOfBounds { .. }
                | DtbError::RootNotNode
        )
    }
}
