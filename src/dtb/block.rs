// ABOUTME: Decoded structure-block records with zero-copy property views
// ABOUTME: One borrowed byte range read as text, string list, or big-endian words

use super::endian::to_native;
use super::tokens::DtbToken;
use core::iter::FusedIterator;

/// One decoded token from the structure block
///
/// Produced by [`DeviceTree::decode`] and by the traversal APIs. A block only
/// borrows the DTB buffer, so it is `Copy` and can be kept around while
/// iteration continues.
///
/// [`DeviceTree::decode`]: crate::DeviceTree::decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Kind of token this block was decoded from
    pub token: DtbToken,
    /// Node or property name, empty for tokens that carry none
    pub name: &'a str,
    /// Property payload, empty for anything but properties
    pub data: &'a [u8],
    /// Structure block offset of the token id
    pub start: usize,
    /// Structure block offset of the following token
    pub end: usize,
}

impl<'a> Block<'a> {
    /// Change in tree depth caused by this token
    pub fn nesting_delta(&self) -> i32 {
        self.token.nesting_delta()
    }

    /// Whether this block starts a node
    pub fn is_node(&self) -> bool {
        self.token == DtbToken::BeginNode
    }

    /// Whether this block is a property
    pub fn is_property(&self) -> bool {
        self.token == DtbToken::Property
    }

    /// Length of the property payload in bytes
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Payload as text, up to the first NUL
    ///
    /// Returns `None` for an empty payload or one that is not UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        let text = match self.data.iter().position(|&b| b == 0) {
            Some(nul) => &self.data[..nul],
            None if self.data.is_empty() => return None,
            None => self.data,
        };
        core::str::from_utf8(text).ok()
    }

    /// Payload as a list of NUL-separated strings (e.g. `compatible`)
    pub fn strings(&self) -> StringList<'a> {
        StringList { data: self.data }
    }

    /// Payload as host-order 32-bit cells; trailing bytes are ignored
    pub fn words(&self) -> Words<'a> {
        Words {
            chunks: self.data.chunks_exact(4),
            convert: true,
        }
    }

    /// Payload cells exactly as stored, still in big-endian order
    ///
    /// Pass each value through [`to_native`](crate::dtb::endian::to_native)
    /// to interpret it.
    pub fn raw_words(&self) -> Words<'a> {
        Words {
            chunks: self.data.chunks_exact(4),
            convert: false,
        }
    }

    /// Payload as a single `u32` cell
    pub fn as_u32(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.data.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    /// Payload as a single `u64` (two cells)
    pub fn as_u64(&self) -> Option<u64> {
        let bytes: [u8; 8] = self.data.try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }
}

/// Iterator over the 32-bit cells of a property payload
#[derive(Debug, Clone)]
pub struct Words<'a> {
    chunks: core::slice::ChunksExact<'a, u8>,
    convert: bool,
}

impl Iterator for Words<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        let raw = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        Some(if self.convert { to_native(raw) } else { raw })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Words<'_> {}
impl FusedIterator for Words<'_> {}

/// Iterator over the NUL-separated strings of a property payload
///
/// Entries that are not valid UTF-8 are skipped.
#[derive(Debug, Clone)]
pub struct StringList<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for StringList<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.data.is_empty() {
            let (entry, rest) = match self.data.iter().position(|&b| b == 0) {
                Some(nul) => (&self.data[..nul], &self.data[nul + 1..]),
                None => (self.data, &[][..]),
            };
            self.data = rest;
            if let Ok(s) = core::str::from_utf8(entry) {
                return Some(s);
            }
        }
        None
    }
}

impl FusedIterator for StringList<'_> {}
