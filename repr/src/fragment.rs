//! Fragment Table
//!
//! Fragments are combined into fragment blocks of at most block_size bytes long. This table
//! describes the location and size of these fragment blocks, not the fragments within them.
//!
//! This table is stored in two levels: The fragment block entries are stored in metadata blocks,
//! and the file offsets to these metadata blocks are stored at the offset specified by the
//! `fragment_table_start` field of the superblock.
//!
//! Each metadata block can store 512 fragment block entries (16 bytes per fragment block entry),
//! so there will be `ceil(fragment_entry_count / 512.0)` metadata blocks (and the same number of
//! `u64` offsets stored at `fragment_table_start`)
//!
//! To read the list of fragment block entries, read `ceil(fragment_entry_count / 512.0)` `u64`
//! offsets starting at `fragment_table_start`, then read the metadata blocks at the offsets read,
//! interpreting the data of the metadata blocks as a packed array of fragment block entries.

use zerocopy::byteorder::{LittleEndian as LE, U32, U64};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// Fragment block entry
#[derive(Debug, Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(C)]
pub struct Entry {
    /// The offset within the archive where the fragment block starts
    pub start: U64<LE>,
    /// The size of the fragment block on disk
    ///
    /// If the block is uncompressed, the `0x1000000` (`1<<24`) bit will be set. Because the max
    /// value of block_size is 1 MiB (`1<<20`), and the size of a fragment block should be less
    /// than `block_size`, the uncompressed bit will never be set by the size.
    pub size: Size,
    /// This field is unused
    pub _unused: U32<LE>,
}

impl Entry {
    pub fn new(start: u64, size: Size) -> Self {
        Self {
            start: U64::new(start),
            size,
            _unused: U32::ZERO,
        }
    }
}

/// The index of an entry in the fragment table, as stored in file inodes
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Idx(pub u32);

impl Idx {
    /// Stored in a file inode which does not end in a fragment
    pub const NONE: Idx = Idx(0xFFFF_FFFF);

    pub fn get(self) -> Option<u32> {
        if self == Self::NONE {
            None
        } else {
            Some(self.0)
        }
    }
}

pub use crate::datablock::Size;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_layout() {
        let entry = Entry::new(0x1122_3344_5566_7788, Size::new(100, true));
        assert_eq!(
            entry.as_bytes(),
            &[
                0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 100, 0, 0, 1, 0, 0, 0, 0
            ][..]
        );
    }

    #[test]
    fn no_fragment() {
        assert_eq!(Idx::NONE.get(), None);
        assert_eq!(Idx(7).get(), Some(7));
    }
}
