// ABOUTME: Validated, read-only view over a caller-owned DTB buffer
// ABOUTME: Provides the DeviceTree entry point for decoding, lookup and iteration

use super::block::Block;
use super::endian::read_word;
use super::error::DtbError;
use super::header::DtbHeader;
use super::iter::{Cursor, MatchKind};
use super::memory::MemoryReservations;
use super::path;
use super::tokens::{self, DtbToken};

/// A device tree blob that passed header validation
///
/// Holds nothing but borrows into the buffer and the decoded header, so it is
/// cheap to copy and never allocates. All offsets handed to [`decode`] are
/// relative to the start of the structure block.
///
/// [`decode`]: DeviceTree::decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTree<'a> {
    data: &'a [u8],
    header: DtbHeader,
    root: Block<'a>,
}

impl<'a> DeviceTree<'a> {
    /// Validate the header of `buf` and locate the root node
    ///
    /// `buf` may be longer than the blob it holds; only the first
    /// `totalsize` bytes are ever read.
    pub fn new(buf: &'a [u8]) -> Result<Self, DtbError> {
        let header = DtbHeader::parse(buf).inspect_err(|err| {
            log::debug!("rejecting DTB header: {err}");
        })?;

        let mut tree = Self {
            data: &buf[..header.totalsize as usize],
            header,
            root: Block {
                token: DtbToken::BeginNode,
                name: "",
                data: &[],
                start: 0,
                end: 0,
            },
        };

        let root = tokens::decode(&tree, 0).inspect_err(|err| {
            log::debug!("failed to decode DTB root node: {err}");
        })?;
        if root.token != DtbToken::BeginNode {
            log::debug!("DTB structure block starts with {:?}", root.token);
            return Err(DtbError::RootNotNode);
        }
        tree.root = root;

        log::debug!(
            "DTB v{} with {} bytes: structure {:#x}+{:#x}, strings {:#x}+{:#x}",
            header.version,
            header.totalsize,
            header.off_dt_struct,
            header.size_dt_struct,
            header.off_dt_strings,
            header.size_dt_strings
        );
        Ok(tree)
    }

    /// Build a tree from a DTB located at a raw address
    ///
    /// # Safety
    /// `ptr` must be readable for at least 8 bytes, and for the blob's whole
    /// declared `totalsize` if it carries a valid magic. That memory must stay
    /// valid and unmodified for `'a`.
    pub unsafe fn from_ptr(ptr: *const u8) -> Result<Self, DtbError> {
        // SAFETY: the caller guarantees the first two header words are readable
        let head = unsafe { core::slice::from_raw_parts(ptr, 8) };
        let totalsize = DtbHeader::peek_totalsize(head)?;
        // SAFETY: the caller guarantees `totalsize` bytes are readable for `'a`
        let buf = unsafe { core::slice::from_raw_parts(ptr, totalsize as usize) };
        Self::new(buf)
    }

    /// The validated header
    pub fn header(&self) -> &DtbHeader {
        &self.header
    }

    /// The logical blob, `totalsize` bytes long
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The root node
    pub fn root(&self) -> &Block<'a> {
        &self.root
    }

    /// The structure block
    pub fn structure_block(&self) -> &'a [u8] {
        let start = self.header.off_dt_struct as usize;
        &self.data[start..start + self.header.size_dt_struct as usize]
    }

    /// The strings block
    pub fn strings_block(&self) -> &'a [u8] {
        let start = self.header.off_dt_strings as usize;
        &self.data[start..start + self.header.size_dt_strings as usize]
    }

    /// Decode the single token at structure offset `offset`
    pub fn decode(&self, offset: usize) -> Result<Block<'a>, DtbError> {
        tokens::decode(self, offset)
    }

    /// Iterate the direct children of `parent` (root if `None`) matching `kind`
    pub fn iter<'t>(&'t self, parent: Option<&Block<'a>>, kind: MatchKind) -> Cursor<'t, 'a> {
        Cursor::new(self, parent.unwrap_or(&self.root), kind)
    }

    /// Iterate the direct child nodes of `parent` (root if `None`)
    pub fn children<'t>(&'t self, parent: Option<&Block<'a>>) -> Cursor<'t, 'a> {
        self.iter(parent, MatchKind::Node)
    }

    /// Iterate the properties of `parent` (root if `None`)
    pub fn properties<'t>(&'t self, parent: Option<&Block<'a>>) -> Cursor<'t, 'a> {
        self.iter(parent, MatchKind::Property)
    }

    /// Resolve a slash-separated `path` below `start` (root if `None`)
    ///
    /// Returns `Ok(None)` when nothing matches and an error when the blob
    /// turns out to be corrupted along the way.
    pub fn find(
        &self,
        start: Option<&Block<'a>>,
        kind: MatchKind,
        path: &str,
    ) -> Result<Option<Block<'a>>, DtbError> {
        path::find(self, start.unwrap_or(&self.root), kind, path)
    }

    /// Find a node by path from the root (e.g. "/cpus/cpu@0")
    pub fn find_node(&self, path: &str) -> Result<Option<Block<'a>>, DtbError> {
        self.find(None, MatchKind::Node, path)
    }

    /// Find a property by path from the root (e.g. "/chosen/bootargs")
    pub fn find_property(&self, path: &str) -> Result<Option<Block<'a>>, DtbError> {
        self.find(None, MatchKind::Property, path)
    }

    /// Iterate the memory reservation block
    pub fn memory_reservations(&self) -> MemoryReservations<'a> {
        MemoryReservations::new(self.data, self.header.off_mem_rsvmap as usize)
    }

    /// Read the word at structure offset `offset`
    pub(crate) fn struct_word(&self, offset: usize) -> Result<u32, DtbError> {
        let absolute = (self.header.off_dt_struct as usize)
            .checked_add(offset)
            .ok_or(DtbError::OutOfBounds(offset))?;
        if absolute % 4 != 0 {
            return Err(DtbError::AlignmentError(offset));
        }
        read_word(self.structure_block(), offset).ok_or(DtbError::OutOfBounds(offset))
    }

    /// Read the NUL-terminated node name at structure offset `offset`
    ///
    /// The name has to start inside the structure block but may only be cut
    /// off by the end of the blob.
    pub(crate) fn node_name_at(&self, offset: usize) -> Result<&'a str, DtbError> {
        if offset >= self.structure_block().len() {
            return Err(DtbError::OutOfBounds(offset));
        }
        let absolute = self.header.off_dt_struct as usize + offset;
        let tail = &self.data[absolute..];
        let nul = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(DtbError::UnterminatedName(offset))?;
        core::str::from_utf8(&tail[..nul]).map_err(|_| DtbError::InvalidName(offset))
    }

    /// Read the NUL-terminated string at strings block offset `offset`
    pub(crate) fn string_at(&self, offset: u32) -> Result<&'a str, DtbError> {
        let strings = self.strings_block();
        let tail = strings
            .get(offset as usize..)
            .filter(|tail| !tail.is_empty())
            .ok_or(DtbError::StringOffsetOutOfRange {
                offset,
                size: self.header.size_dt_strings,
            })?;
        let nul = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(DtbError::UnterminatedName(offset as usize))?;
        core::str::from_utf8(&tail[..nul]).map_err(|_| DtbError::InvalidName(offset as usize))
    }
}
