//! Directory Table
//!
//! Directory listings are stored in metadata blocks. A listing is a sequence of headers, each
//! followed by one or more entries. The directory inode records where the listing starts and how
//! many bytes it spans.

use zerocopy::byteorder::{LittleEndian as LE, I16, U16, U32};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// The size recorded in directory inodes is this many bytes larger than the listing itself.
///
/// The extra bytes account for the implicit `.` and `..` entries, which are not stored.
pub const SIZE_OFFSET: u32 = 3;

/// The maximum number of entries following a single header
pub const MAX_ENTRIES_PER_HEADER: u32 = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(C)]
pub struct Header {
    /// One less than the number of entries following the header
    pub count: U32<LE>,
    /// The index of the block in the Inode Table where the inodes is stored
    pub start: U32<LE>,
    /// An arbitrary inode number.
    ///
    /// The entries that follow store their inode number as a difference to this.
    /// Typically the inode numbers are allocated in a continuous sequence for all children
    /// of a directory and the header simply stores the first one.
    /// Hard links of course break the sequence and require a new header if they are further
    /// away than +/- 32k of this number. Inode number allocation and picking of the reference
    /// could of course be optimized to prevent this
    pub inode_number: U32<LE>,
}

impl Header {
    /// The number of entries following this header
    pub fn entry_count(&self) -> u64 {
        u64::from(self.count.get()) + 1
    }
}

/// A directory entry
///
/// A directory entry is followed by a string of size `name_size + 1`
///
/// The basic and extended inode types both have a size field that stores the uncompressed size of
/// all the directory entries (including all headers) belonging to the inode.
/// This field is used to deduce if more data is following while iterating over directory entries,
/// even without knowing how many headers and partial lists there will be.
#[derive(Debug, Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(C)]
pub struct Entry {
    /// An offset into the uncompressed inode metadata block
    pub offset: U16<LE>,
    /// The difference of this inode's number to the reference stored in the header
    pub inode_offset: I16<LE>,
    /// The inode kind
    ///
    /// **For extended inodes, the corresponding basic type is stored here instead**
    pub kind: U16<LE>,
    /// One less than the size of the entry name
    pub name_size: U16<LE>,
}

impl Entry {
    pub fn name_len(&self) -> usize {
        usize::from(self.name_size.get()) + 1
    }
}
