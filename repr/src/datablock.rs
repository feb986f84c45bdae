//! Data blocks
//!
//! File contents are split into `block_size` chunks which are compressed independently and stored
//! back to back starting at the file inode's `blocks_start`. The inode records the on disk size of
//! every block; a size of zero is a sparse block (all zeros, nothing stored on disk).

use std::fmt;
use zerocopy::byteorder::{LittleEndian as LE, U32};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// The max size of a datablock: 1 MiB
pub const MAX_SIZE: usize = 1024 * 1024;

#[derive(Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(transparent)]
pub struct Size(pub U32<LE>);

impl Size {
    pub const UNCOMPRESSED_FLAG: u32 = 1 << 24;
    pub const ZERO: Size = Size(U32::ZERO);

    pub fn new(mut size: u32, uncompressed: bool) -> Self {
        assert!(size as usize <= MAX_SIZE);
        if uncompressed {
            size |= Self::UNCOMPRESSED_FLAG;
        }
        Self(U32::new(size))
    }

    /// The number of bytes the block occupies on disk
    pub fn size(self) -> u32 {
        self.0.get() & !Self::UNCOMPRESSED_FLAG
    }

    pub fn uncompressed(self) -> bool {
        self.0.get() & Self::UNCOMPRESSED_FLAG != 0
    }

    /// A sparse block is not stored at all, and reads as `block_size` zero bytes
    pub fn is_sparse(self) -> bool {
        self.0.get() == 0
    }
}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Size")
            .field("size", &self.size())
            .field("uncompressed", &self.uncompressed())
            .finish()
    }
}
