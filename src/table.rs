//! Two level lookup tables
//!
//! The fragment, id and export tables share one layout: the entries are packed into metadata
//! blocks, and a flat array of little-endian `u64` offsets to those blocks is stored at the start
//! offset recorded in the superblock. Every block but the last holds exactly
//! [`TableEntry::PER_METABLOCK`] entries, so the number of blocks, and the number of entries in
//! each, follow from the total entry count alone.

use std::cmp;

use byteorder::{ByteOrder, LittleEndian};
use positioned_io::ReadAt;
use repr::TableEntry;

use crate::compression::Decompressor;
use crate::errors::Result;
use crate::metadata::{read_exact_at, MetadataReader};

/// The number of metadata blocks needed to store `count` entries of `T`
pub(crate) fn block_count<T: TableEntry>(count: usize) -> usize {
    (count + T::PER_METABLOCK - 1) / T::PER_METABLOCK
}

/// Read all `count` entries of the table whose block offsets are stored at `start`
pub(crate) fn read_table<T: TableEntry, R: ReadAt + ?Sized>(
    reader: &R,
    decompressor: &dyn Decompressor,
    start: u64,
    count: usize,
) -> Result<Vec<T>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let mut raw_offsets = vec![0; block_count::<T>(count) * 8];
    read_exact_at(reader, start, &mut raw_offsets)?;
    let mut offsets = vec![0; raw_offsets.len() / 8];
    LittleEndian::read_u64_into(&raw_offsets, &mut offsets);

    // Counts come from the superblock; grow as blocks are actually read
    let mut entries = Vec::with_capacity(cmp::min(count, T::PER_METABLOCK));
    for &offset in &offsets {
        let in_block = cmp::min(T::PER_METABLOCK, count - entries.len());
        let mut metadata = MetadataReader::new(reader, decompressor, offset);
        for _ in 0..in_block {
            entries.push(metadata.read::<T>()?);
        }
    }
    debug_assert_eq!(entries.len(), count);
    Ok(entries)
}
