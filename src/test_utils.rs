// ABOUTME: Test-only builder that assembles device tree blobs in memory
// ABOUTME: Produces both well-formed blobs and deliberately broken token streams

use crate::dtb::{DtbHeader, DtbToken};

/// Assembles a DTB: header, reservation block, structure block, strings block
#[derive(Debug, Default)]
pub(crate) struct DtbBuilder {
    reservations: Vec<(u64, u64)>,
    structure_padding: usize,
    structure: Vec<u8>,
    strings: Vec<u8>,
}

impl DtbBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reserve(mut self, address: u64, size: u64) -> Self {
        self.reservations.push((address, size));
        self
    }

    /// Insert `bytes` of filler in front of the structure block
    pub(crate) fn structure_padding(mut self, bytes: usize) -> Self {
        self.structure_padding = bytes;
        self
    }

    pub(crate) fn raw_word(mut self, word: u32) -> Self {
        self.structure.extend_from_slice(&word.to_be_bytes());
        self
    }

    pub(crate) fn begin_node(mut self, name: &str) -> Self {
        self = self.raw_word(DtbToken::FDT_BEGIN_NODE);
        self.structure.extend_from_slice(name.as_bytes());
        self.structure.push(0);
        self.pad_structure();
        self
    }

    pub(crate) fn end_node(self) -> Self {
        self.raw_word(DtbToken::FDT_END_NODE)
    }

    pub(crate) fn nop(self) -> Self {
        self.raw_word(DtbToken::FDT_NOP)
    }

    pub(crate) fn prop(self, name: &str, data: &[u8]) -> Self {
        self.prop_with_len(name, data.len() as u32, data)
    }

    pub(crate) fn prop_str(self, name: &str, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.prop(name, &data)
    }

    pub(crate) fn prop_cells(self, name: &str, cells: &[u32]) -> Self {
        let data: Vec<u8> = cells.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.prop(name, &data)
    }

    /// Property whose length field says `len` regardless of `data`
    pub(crate) fn prop_with_len(mut self, name: &str, len: u32, data: &[u8]) -> Self {
        let name_offset = self.intern(name);
        self = self.raw_word(DtbToken::FDT_PROP);
        self = self.raw_word(len).raw_word(name_offset);
        self.structure.extend_from_slice(data);
        self.pad_structure();
        self
    }

    /// Property pointing at an arbitrary strings block offset
    pub(crate) fn prop_with_name_offset(mut self, name_offset: u32, data: &[u8]) -> Self {
        self = self.raw_word(DtbToken::FDT_PROP);
        self = self.raw_word(data.len() as u32).raw_word(name_offset);
        self.structure.extend_from_slice(data);
        self.pad_structure();
        self
    }

    /// Append FDT_END and lay out the blob
    pub(crate) fn finish(self) -> Vec<u8> {
        self.raw_word(DtbToken::FDT_END).finish_raw()
    }

    /// Lay out the blob with the structure block exactly as built
    pub(crate) fn finish_raw(self) -> Vec<u8> {
        let off_mem_rsvmap = DtbHeader::SIZE;
        let off_dt_struct =
            off_mem_rsvmap + (self.reservations.len() + 1) * 16 + self.structure_padding;
        let off_dt_strings = off_dt_struct + self.structure.len();
        let totalsize = off_dt_strings + self.strings.len();

        let mut blob = Vec::with_capacity(totalsize);
        for word in [
            DtbHeader::MAGIC,
            totalsize as u32,
            off_dt_struct as u32,
            off_dt_strings as u32,
            off_mem_rsvmap as u32,
            17,
            16,
            0,
            self.strings.len() as u32,
            self.structure.len() as u32,
        ] {
            blob.extend_from_slice(&word.to_be_bytes());
        }
        for (address, size) in self.reservations.iter().copied().chain([(0, 0)]) {
            blob.extend_from_slice(&address.to_be_bytes());
            blob.extend_from_slice(&size.to_be_bytes());
        }
        blob.resize(off_dt_struct, 0);
        blob.extend_from_slice(&self.structure);
        blob.extend_from_slice(&self.strings);
        blob
    }

    fn pad_structure(&mut self) {
        let padded = self.structure.len().next_multiple_of(4);
        self.structure.resize(padded, 0);
    }

    fn intern(&mut self, name: &str) -> u32 {
        let mut offset = 0;
        while offset < self.strings.len() {
            let end = offset
                + self.strings[offset..]
                    .iter()
                    .position(|&b| b == 0)
                    .unwrap_or(self.strings.len() - offset);
            if &self.strings[offset..end] == name.as_bytes() {
                return offset as u32;
            }
            offset = end + 1;
        }
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);
        offset
    }
}

/// The example tree used throughout the tests:
///
/// ```text
/// / {
///     prop1 = "stuff";
///     prop2 = <0x01234567 0xAABBCCDD>;
///     node1 {
///         prop3 = "more stuff";
///         node2 {
///             prop4 = <0x555>;
///         };
///     };
/// };
/// ```
pub(crate) fn sample_tree() -> Vec<u8> {
    DtbBuilder::new()
        .begin_node("")
        .prop_str("prop1", "stuff")
        .prop_cells("prop2", &[0x0123_4567, 0xAABB_CCDD])
        .begin_node("node1")
        .prop_str("prop3", "more stuff")
        .begin_node("node2")
        .prop_cells("prop4", &[0x555])
        .end_node()
        .end_node()
        .end_node()
        .finish()
}
