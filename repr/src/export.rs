//! Export Table
//!
//! To support NFS exports, the export table maps inode numbers to inode references. The entry for
//! inode number `n` is stored at index `n - 1`. Like the other lookup tables it is stored in two
//! levels, with 1024 references per metadata block.
//!
//! The table is only present if the `EXPORTABLE` superblock flag is set.

use crate::inode;
use zerocopy::byteorder::{LittleEndian as LE, U64};
use zerocopy::{AsBytes, FromBytes, Unaligned};

#[derive(Debug, Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(transparent)]
pub struct Entry(pub U64<LE>);

impl Entry {
    pub fn new(inode_ref: inode::Ref) -> Self {
        Entry(U64::new(inode_ref.0))
    }

    pub fn inode_ref(self) -> inode::Ref {
        inode::Ref(self.0.get())
    }
}
