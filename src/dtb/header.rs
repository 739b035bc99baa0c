// ABOUTME: DTB header structure definitions and validation
// ABOUTME: Handles the 40-byte device tree blob header format

use super::endian::read_word;
use super::error::DtbError;

/// DTB header structure (40 bytes total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtbHeader {
    /// Magic number (should be 0xd00dfeed)
    pub magic: u32,
    /// Total size of the DTB
    pub totalsize: u32,
    /// Offset to structure block
    pub off_dt_struct: u32,
    /// Offset to strings block
    pub off_dt_strings: u32,
    /// Offset to memory reservation block
    pub off_mem_rsvmap: u32,
    /// Version of the DTB format
    pub version: u32,
    /// Last compatible version
    pub last_comp_version: u32,
    /// Boot CPU ID
    pub boot_cpuid_phys: u32,
    /// Size of strings block
    pub size_dt_strings: u32,
    /// Size of structure block
    pub size_dt_struct: u32,
}

impl DtbHeader {
    /// DTB magic number constant
    pub const MAGIC: u32 = 0xd00d_feed;

    /// Header size in bytes
    pub const SIZE: usize = 40;

    const OFF_MAGIC: usize = 0;
    const OFF_TOTALSIZE: usize = 4;
    const OFF_DT_STRUCT: usize = 8;
    const OFF_DT_STRINGS: usize = 12;
    const OFF_MEM_RSVMAP: usize = 16;
    const OFF_VERSION: usize = 20;
    const OFF_LAST_COMP_VERSION: usize = 24;
    const OFF_BOOT_CPUID_PHYS: usize = 28;
    const OFF_SIZE_DT_STRINGS: usize = 32;
    const OFF_SIZE_DT_STRUCT: usize = 36;

    /// Parse and validate the header at the start of `input`
    ///
    /// Checks run in order: magic, declared size against `input.len()`, then
    /// both block ranges against the declared size. A buffer longer than the
    /// declared size is accepted.
    pub fn parse(input: &[u8]) -> Result<Self, DtbError> {
        let word = |offset: usize| {
            read_word(input, offset).ok_or(DtbError::TruncatedHeader(input.len()))
        };

        let magic = word(Self::OFF_MAGIC)?;
        if magic != Self::MAGIC {
            return Err(DtbError::InvalidMagic(magic));
        }

        let totalsize = word(Self::OFF_TOTALSIZE)?;
        if totalsize as usize > input.len() {
            return Err(DtbError::SizeExceedsBuffer {
                declared: totalsize,
                available: input.len(),
            });
        }

        // Everything past here must come from inside the declared size
        let logical = &input[..totalsize as usize];
        let word = |offset: usize| {
            read_word(logical, offset).ok_or(DtbError::TruncatedHeader(logical.len()))
        };

        let header = DtbHeader {
            magic,
            totalsize,
            off_dt_struct: word(Self::OFF_DT_STRUCT)?,
            off_dt_strings: word(Self::OFF_DT_STRINGS)?,
            off_mem_rsvmap: word(Self::OFF_MEM_RSVMAP)?,
            version: word(Self::OFF_VERSION)?,
            last_comp_version: word(Self::OFF_LAST_COMP_VERSION)?,
            boot_cpuid_phys: word(Self::OFF_BOOT_CPUID_PHYS)?,
            size_dt_strings: word(Self::OFF_SIZE_DT_STRINGS)?,
            size_dt_struct: word(Self::OFF_SIZE_DT_STRUCT)?,
        };

        header.check_block("structure", header.off_dt_struct, header.size_dt_struct)?;
        header.check_block("strings", header.off_dt_strings, header.size_dt_strings)?;

        Ok(header)
    }

    /// Read just the declared total size from a header
    pub(crate) fn peek_totalsize(input: &[u8]) -> Result<u32, DtbError> {
        let word = |offset: usize| {
            read_word(input, offset).ok_or(DtbError::TruncatedHeader(input.len()))
        };
        let magic = word(Self::OFF_MAGIC)?;
        if magic != Self::MAGIC {
            return Err(DtbError::InvalidMagic(magic));
        }
        word(Self::OFF_TOTALSIZE)
    }

    fn check_block(&self, block: &'static str, offset: u32, size: u32) -> Result<(), DtbError> {
        let fits = offset
            .checked_add(size)
            .is_some_and(|end| end <= self.totalsize);
        if fits {
            Ok(())
        } else {
            Err(DtbError::BlockOutOfBounds {
                block,
                offset,
                size,
                total: self.totalsize,
            })
        }
    }
}
