// ABOUTME: Byte-order conversion between DTB wire words and host words
// ABOUTME: Every 32-bit read from the blob goes through these helpers

/// Convert a word as stored in the blob (big-endian) to host order
///
/// Use this on words obtained from [`Block::raw_words`] to get their value.
///
/// [`Block::raw_words`]: crate::Block::raw_words
#[inline]
pub const fn to_native(word: u32) -> u32 {
    u32::from_be(word)
}

/// Convert a host-order word to the blob's big-endian order
#[inline]
pub const fn to_dt(word: u32) -> u32 {
    word.to_be()
}

/// Read the big-endian word at `offset`, `None` if it does not fit in `buf`
#[inline]
pub(crate) fn read_word(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    let raw = u32::from_ne_bytes(bytes.try_into().ok()?);
    Some(to_native(raw))
}

/// Round a byte count up to the next multiple of 4
#[inline]
pub(crate) const fn align_to_word(n: usize) -> Option<usize> {
    match n.checked_add(3) {
        Some(v) => Some(v & !3),
        None => None,
    }
}
