// ABOUTME: Memory reservation block reading for device tree blobs
// ABOUTME: Yields (address, size) pairs lazily until the (0, 0) terminator

use super::error::DtbError;
use core::iter::FusedIterator;

/// Memory reservation entry with address and size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReservation {
    /// Physical address of reserved memory region
    pub address: u64,
    /// Size of reserved memory region
    pub size: u64,
}

impl MemoryReservation {
    /// Size of each reservation entry in bytes (address + size)
    pub const SIZE: usize = 16;
}

/// Iterator over the memory reservation block
///
/// Ends at the terminating `(0, 0)` entry. An entry that would run past the
/// end of the blob, or a block offset that is not 8-byte aligned, yields one
/// error and then ends.
#[derive(Debug, Clone)]
pub struct MemoryReservations<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> MemoryReservations<'a> {
    pub(crate) fn new(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            offset,
            done: false,
        }
    }

    fn read_u64(&self, offset: usize) -> Option<u64> {
        let bytes = self.data.get(offset..offset.checked_add(8)?)?;
        Some(u64::from_be_bytes(bytes.try_into().ok()?))
    }

    fn read_entry(&self) -> Result<MemoryReservation, DtbError> {
        if self.offset % 8 != 0 {
            return Err(DtbError::AlignmentError(self.offset));
        }
        let address = self
            .read_u64(self.offset)
            .ok_or(DtbError::OutOfBounds(self.offset))?;
        let size = self
            .read_u64(self.offset + 8)
            .ok_or(DtbError::OutOfBounds(self.offset + 8))?;
        Ok(MemoryReservation { address, size })
    }
}

impl Iterator for MemoryReservations<'_> {
    type Item = Result<MemoryReservation, DtbError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_entry() {
            Ok(MemoryReservation { address: 0, size: 0 }) => {
                self.done = true;
                None
            }
            Ok(entry) => {
                self.offset += MemoryReservation::SIZE;
                Some(Ok(entry))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for MemoryReservations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceTree;
    use crate::test_utils::DtbBuilder;

    fn entries(data: &[u8]) -> Vec<Result<MemoryReservation, DtbError>> {
        MemoryReservations::new(data, 0).collect()
    }

    #[test]
    fn test_memory_reservation_parse_empty() {
        let data = vec![
            // Terminating entry (0, 0)
            0, 0, 0, 0, 0, 0, 0, 0, // address = 0
            0, 0, 0, 0, 0, 0, 0, 0, // size = 0
        ];

        assert!(entries(&data).is_empty());
    }

    #[test]
    fn test_memory_reservation_parse_multiple() {
        let data = vec![
            // First entry: address=0x1000, size=0x2000
            0, 0, 0, 0, 0, 0, 0x10, 0, // address = 0x1000
            0, 0, 0, 0, 0, 0, 0x20, 0, // size = 0x2000
            // Second entry: address=0x3000, size=0x4000
            0, 0, 0, 0, 0, 0, 0x30, 0, // address = 0x3000
            0, 0, 0, 0, 0, 0, 0x40, 0, // size = 0x4000
            // Terminating entry (0, 0)
            0, 0, 0, 0, 0, 0, 0, 0, // address = 0
            0, 0, 0, 0, 0, 0, 0, 0, // size = 0
        ];

        assert_eq!(
            entries(&data),
            [
                Ok(MemoryReservation {
                    address: 0x1000,
                    size: 0x2000
                }),
                Ok(MemoryReservation {
                    address: 0x3000,
                    size: 0x4000
                }),
            ]
        );
    }

    #[test]
    fn test_memory_reservation_missing_terminator() {
        let data = vec![
            0, 0, 0, 0, 0, 0, 0x10, 0, // address = 0x1000
            0, 0, 0, 0, 0, 0, 0x20, 0, // size = 0x2000
            0, 0, 0, 0, // cut short
        ];

        assert_eq!(
            entries(&data),
            [
                Ok(MemoryReservation {
                    address: 0x1000,
                    size: 0x2000
                }),
                Err(DtbError::OutOfBounds(16)),
            ]
        );
    }

    #[test]
    fn test_memory_reservation_unaligned() {
        let data = [0u8; 32];
        let found: Vec<_> = MemoryReservations::new(&data, 4).collect();
        assert_eq!(found, [Err(DtbError::AlignmentError(4))]);
    }

    #[test]
    fn test_memory_reservations_from_tree() {
        let blob = DtbBuilder::new()
            .reserve(0x8000_0000, 0x10_0000)
            .reserve(0x9000_0000, 0x1000)
            .begin_node("")
            .end_node()
            .finish();
        let tree = DeviceTree::new(&blob).unwrap();

        let found: Result<Vec<_>, _> = tree.memory_reservations().collect();
        assert_eq!(
            found.unwrap(),
            [
                MemoryReservation {
                    address: 0x8000_0000,
                    size: 0x10_0000
                },
                MemoryReservation {
                    address: 0x9000_0000,
                    size: 0x1000
                },
            ]
        );
    }
}
