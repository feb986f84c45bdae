//! User/Group IDs
//!
//! Inodes store 16 bit indexes into a table of 32 bit ids, stored as a two level table of at most
//! 2048 ids per metadata block.

use zerocopy::byteorder::{LittleEndian as LE, U32};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// UID/GIDs are both stored as u32s. Both UIDs and GIDs are treated as IDs
#[derive(Debug, Copy, Clone, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
#[repr(transparent)]
pub struct Id(pub U32<LE>);

impl Id {
    pub fn new(id: u32) -> Self {
        Id(U32::new(id))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}
