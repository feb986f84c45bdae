//! Metadata blocks are compressed in 8KiB blocks. A metadata block is prefixed by a u16 header.
//! The highest bit of the header is set if the block is stored uncompressed (this will happen if
//! the block grew when compressed, or e.g. the `UNCOMPRESSED_INODES` superblock flag is set).
//! The lower 15 bits specifies the size of the metadata block (not including the header) on disk.
//!
//! To read a metadata block, read a u16.
//! If the highest bit is set (size & 0x8000 == 0x8000) the following data is uncompressed.
//! Mask out the highest bit to get the size of the block data on disk
//! (this should always be <= 8KiB). Read that many bytes. If the data is compressed,
//! uncompress the data. In pseudocode:
//!
//! ```text
//! header = read_u16(offset=offset)
//! data_size = header & 0x7FFF
//! uncompressed = header & 0x8000
//! data = read(offset=offset+2, len=data_size)
//! if(!uncompressed) {
//!     data = uncompress(data)
//! }
//! return data
//! ```
//!
//! Neither the size on disk, nor the uncompressed size should exceed 8KiB. The uncompressed size
//! should always be equal to 8KiB, with the exception of the last metadata block of a section,
//! which may have an uncompressed size less than 8KiB.
//!
//! Offsets into a run of metadata blocks (inode references, directory locations) are given as a
//! pair: the byte offset of a metadata block header relative to the start of the run, and a byte
//! offset into the uncompressed data of that block.

use zerocopy::byteorder::{LittleEndian as LE, U16};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// The maximum uncompressed size of a metadata block
pub const SIZE: usize = 8 * 1024;

pub const UNCOMPRESSED_FLAG: u16 = 0x8000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(transparent)]
pub struct Header(pub U16<LE>);

impl Header {
    pub fn new(size: u16, uncompressed: bool) -> Self {
        assert!(usize::from(size) <= SIZE);
        let flag = if uncompressed { UNCOMPRESSED_FLAG } else { 0 };
        Header(U16::new(size | flag))
    }

    /// Return true if the following block is stored uncompressed
    pub fn uncompressed(self) -> bool {
        self.0.get() & UNCOMPRESSED_FLAG == UNCOMPRESSED_FLAG
    }

    /// The size in bytes (on disk) of the following metadata block
    pub fn size(self) -> u16 {
        self.0.get() & !UNCOMPRESSED_FLAG
    }
}
