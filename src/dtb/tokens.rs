// ABOUTME: DTB structure block token definitions and single-token decoding
// ABOUTME: Turns the word at a structure offset into a Block and the next offset

use super::block::Block;
use super::endian::align_to_word;
use super::error::DtbError;
use super::parser::DeviceTree;

/// DTB token constants as defined in the device tree specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtbToken {
    /// Begin node token (0x00000001)
    BeginNode,
    /// End node token (0x00000002)
    EndNode,
    /// Property token (0x00000003)
    Property,
    /// No-op token (0x00000004)
    Nop,
    /// End of structure token (0x00000009)
    End,
}

impl DtbToken {
    /// Begin node token constant
    pub const FDT_BEGIN_NODE: u32 = 0x00000001;
    /// End node token constant
    pub const FDT_END_NODE: u32 = 0x00000002;
    /// Property token constant
    pub const FDT_PROP: u32 = 0x00000003;
    /// No-op token constant
    pub const FDT_NOP: u32 = 0x00000004;
    /// End of structure token constant
    pub const FDT_END: u32 = 0x00000009;

    /// Convert u32 value to DtbToken
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            Self::FDT_BEGIN_NODE => Some(DtbToken::BeginNode),
            Self::FDT_END_NODE => Some(DtbToken::EndNode),
            Self::FDT_PROP => Some(DtbToken::Property),
            Self::FDT_NOP => Some(DtbToken::Nop),
            Self::FDT_END => Some(DtbToken::End),
            _ => None,
        }
    }

    /// Convert DtbToken to u32 value
    pub fn to_u32(self) -> u32 {
        match self {
            DtbToken::BeginNode => Self::FDT_BEGIN_NODE,
            DtbToken::EndNode => Self::FDT_END_NODE,
            DtbToken::Property => Self::FDT_PROP,
            DtbToken::Nop => Self::FDT_NOP,
            DtbToken::End => Self::FDT_END,
        }
    }

    /// Change in tree depth caused by this token
    pub fn nesting_delta(self) -> i32 {
        match self {
            DtbToken::BeginNode => 1,
            DtbToken::EndNode => -1,
            DtbToken::Property | DtbToken::Nop | DtbToken::End => 0,
        }
    }
}

/// Decode the token at structure offset `offset`
///
/// An offset at or beyond the end of the structure block yields an `End`
/// block, since there is nothing left to read.
pub(crate) fn decode<'a>(tree: &DeviceTree<'a>, offset: usize) -> Result<Block<'a>, DtbError> {
    let struct_size = tree.structure_block().len();
    if offset >= struct_size {
        return Ok(Block {
            token: DtbToken::End,
            name: "",
            data: &[],
            start: offset,
            end: offset,
        });
    }

    let value = tree.struct_word(offset)?;
    let token = DtbToken::from_u32(value).ok_or(DtbError::InvalidToken {
        token: value,
        offset,
    })?;

    let payload = offset + 4;
    let mut block = Block {
        token,
        name: "",
        data: &[],
        start: offset,
        end: payload,
    };

    match token {
        DtbToken::BeginNode => {
            let name = tree.node_name_at(payload)?;
            // The terminating NUL is part of the padded name
            let padded = align_to_word(name.len() + 1).ok_or(DtbError::OutOfBounds(payload))?;
            block.name = name;
            block.end = payload + padded;
        }
        DtbToken::Property => {
            let len = tree.struct_word(payload)? as usize;
            let name_offset = tree.struct_word(payload + 4)?;
            let data_start = payload + 8;
            block.data = data_start
                .checked_add(len)
                .and_then(|data_end| tree.structure_block().get(data_start..data_end))
                .ok_or(DtbError::OutOfBounds(data_start))?;
            block.name = tree.string_at(name_offset)?;
            block.end = align_to_word(len)
                .and_then(|padded| data_start.checked_add(padded))
                .ok_or(DtbError::OutOfBounds(data_start))?;
        }
        DtbToken::EndNode | DtbToken::Nop | DtbToken::End => {}
    }

    log::trace!(
        "decoded {:?} {:?} at {:#x}..{:#x}",
        block.token,
        block.name,
        block.start,
        block.end
    );
    Ok(block)
}
