//! A squashfs filesystem consists of a maximum of nine parts, packed together on a byte alignment:
//!
//! * [Superblock](superblock/index.html)
//! * [Compression Options](compression/options/index.html)
//! * [Datablocks & Fragments](datablock/index.html)
//! * [Inode Table](inode/index.html)
//! * [Directory Table](directory/index.html)
//! * [Fragment Table](fragment/index.html)
//! * [Export Table](export/index.html)
//! * [UID/GID Lookup Table](uid_gid/index.html)
//! * Xattr Table
//!
//! Everything on disk is little-endian. The structs in this crate use the `zerocopy` byteorder
//! types, so they can be read directly out of a decompressed buffer on any host.

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use zerocopy::{AsBytes, FromBytes};

use std::fmt;
use std::fmt::Write;

pub mod compression;
pub mod datablock;
pub mod directory;
pub mod export;
pub mod fragment;
pub mod inode;
pub mod metablock;
pub mod superblock;
pub mod uid_gid;

/// Data blocks are between 4KiB and 1MiB
pub const BLOCK_LOG_MIN: u16 = 12;
pub const BLOCK_LOG_MAX: u16 = 20;

/// An entry of a two level lookup table
///
/// The fragment, export and id tables are all stored the same way: the entries are packed into
/// metadata blocks, and a flat array of `u64` offsets to those metadata blocks is stored at the
/// table start recorded in the superblock. Every metadata block but the last holds exactly
/// `PER_METABLOCK` entries.
pub trait TableEntry: AsBytes + FromBytes + Copy {
    /// Human readable name of the table, for diagnostics
    const TABLE_NAME: &'static str;
    /// The number of entries stored in a single (full) metadata block
    const PER_METABLOCK: usize;
}

impl TableEntry for fragment::Entry {
    const TABLE_NAME: &'static str = "fragment table";
    const PER_METABLOCK: usize = 512;
}

impl TableEntry for uid_gid::Id {
    const TABLE_NAME: &'static str = "id table";
    const PER_METABLOCK: usize = 2048;
}

impl TableEntry for export::Entry {
    const TABLE_NAME: &'static str = "export table";
    const PER_METABLOCK: usize = 1024;
}

const_assert_eq!(
    <fragment::Entry as TableEntry>::PER_METABLOCK * std::mem::size_of::<fragment::Entry>(),
    metablock::SIZE
);
const_assert_eq!(
    <uid_gid::Id as TableEntry>::PER_METABLOCK * std::mem::size_of::<uid_gid::Id>(),
    metablock::SIZE
);
const_assert_eq!(
    <export::Entry as TableEntry>::PER_METABLOCK * std::mem::size_of::<export::Entry>(),
    metablock::SIZE
);

bitflags! {
    #[derive(Default)]
    pub struct Mode: u16 {
        const OTHER_EXEC =  0o000_001;
        const OTHER_WRITE = 0o000_002;
        const OTHER_READ =  0o000_004;
        const GROUP_EXEC =  0o000_010;
        const GROUP_WRITE = 0o000_020;
        const GROUP_READ =  0o000_040;
        const USER_EXEC =   0o000_100;
        const USER_WRITE =  0o000_200;
        const USER_READ =   0o000_400;
        const BIT_STICKY =  0o001_000;
        const BIT_SGID =    0o002_000;
        const BIT_SUID =    0o004_000;

        const TYPE_FIFO =   0o010_000;
        const TYPE_CHAR =   0o020_000;
        const TYPE_DIR  =   0o040_000;
        const TYPE_BLOCK =  0o060_000;
        const TYPE_FILE =   0o100_000;
        const TYPE_LINK =   0o120_000;
        const TYPE_SOCKET = 0o140_000;

    }
}

impl Mode {
    pub const O755: Mode = Mode { bits: 0o000_755 };
    pub const PERM_MASK: Mode = Mode { bits: 0o007_777 };
    pub const TYPE_MASK: Mode = Mode { bits: 0o170_000 };
    pub const NONE: Mode = Mode { bits: 0 };
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let type_char = match *self & Mode::TYPE_MASK {
            Mode::TYPE_DIR => 'd',
            Mode::TYPE_CHAR => 'c',
            Mode::TYPE_BLOCK => 'b',
            Mode::TYPE_FILE => '-',
            Mode::TYPE_LINK => 'l',
            Mode::TYPE_SOCKET => 's',
            Mode::TYPE_FIFO => 'p',
            _ => '?',
        };
        let user_r = if self.contains(Mode::USER_READ) {
            'r'
        } else {
            '-'
        };
        let user_w = if self.contains(Mode::USER_WRITE) {
            'w'
        } else {
            '-'
        };
        let user_x = match *self & (Mode::USER_EXEC | Mode::BIT_SUID) {
            Mode::NONE => '-',
            Mode::USER_EXEC => 'x',
            Mode::BIT_SUID => 'S',
            // Both
            _ => 's',
        };

        let group_r = if self.contains(Mode::GROUP_READ) {
            'r'
        } else {
            '-'
        };
        let group_w = if self.contains(Mode::GROUP_WRITE) {
            'w'
        } else {
            '-'
        };
        let group_x = match *self & (Mode::GROUP_EXEC | Mode::BIT_SGID) {
            Mode::NONE => '-',
            Mode::GROUP_EXEC => 'x',
            Mode::BIT_SGID => 'S',
            // Both
            _ => 's',
        };

        let other_r = if self.contains(Mode::OTHER_READ) {
            'r'
        } else {
            '-'
        };
        let other_w = if self.contains(Mode::OTHER_WRITE) {
            'w'
        } else {
            '-'
        };
        let other_x = match *self & (Mode::OTHER_EXEC | Mode::BIT_STICKY) {
            Mode::NONE => '-',
            Mode::OTHER_EXEC => 'x',
            Mode::BIT_STICKY => 'T',
            // Both
            _ => 't',
        };

        f.write_char(type_char)?;
        f.write_char(user_r)?;
        f.write_char(user_w)?;
        f.write_char(user_x)?;
        f.write_char(group_r)?;
        f.write_char(group_w)?;
        f.write_char(group_x)?;
        f.write_char(other_r)?;
        f.write_char(other_w)?;
        f.write_char(other_x)?;

        Ok(())
    }
}

#[test]
fn mode_tests() {
    let mode = Mode { bits: 0o754 } | Mode::TYPE_FILE;
    assert_eq!(&format!("{}", mode), "-rwxr-xr--");
    let mode = mode | Mode::BIT_STICKY;
    assert_eq!(&format!("{}", mode), "-rwxr-xr-T");
}

#[test]
fn table_capacities() {
    // These must match squashfs-tools exactly, or every entry after the first block is misaligned
    assert_eq!(<fragment::Entry as TableEntry>::PER_METABLOCK, 512);
    assert_eq!(<uid_gid::Id as TableEntry>::PER_METABLOCK, 2048);
    assert_eq!(<export::Entry as TableEntry>::PER_METABLOCK, 1024);
}
