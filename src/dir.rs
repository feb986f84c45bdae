//! Directory listings
//!
//! A listing is a run of headers, each followed by up to 256 entries. Entries store their inode
//! number as a signed difference from the header's, and their inode location as an offset into the
//! inode table block named by the header. Nothing in the listing marks its end: the directory inode
//! records its size, which is the only way to know when to stop.

use bstr::BString;
use positioned_io::ReadAt;
use repr::directory;
use repr::inode::{self as raw, Kind};
use std::convert::TryFrom;
use std::mem;

use crate::errors::{Error, Result};
use crate::inode::FileType;
use crate::metadata::MetadataReader;

/// An entry in a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: BString,
    pub file_type: FileType,
    pub inode_number: u32,
    /// Location of the entry's inode in the inode table
    pub inode_ref: raw::Ref,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Decode exactly `len` bytes of listing from `reader`
pub(crate) fn read_entries<R: ReadAt + ?Sized>(
    reader: &mut MetadataReader<'_, R>,
    len: usize,
) -> Result<Vec<DirEntry>> {
    let mut remaining = len;
    let mut entries = Vec::new();
    while remaining > 0 {
        take(&mut remaining, mem::size_of::<directory::Header>())?;
        let header: directory::Header = reader.read()?;
        let count = header.entry_count();
        if count > u64::from(directory::MAX_ENTRIES_PER_HEADER) {
            return Err(Error::invalid_metadata(format!(
                "Directory header with {} entries",
                count
            )));
        }
        let base = header.inode_number.get();

        for _ in 0..count {
            take(&mut remaining, mem::size_of::<directory::Entry>())?;
            let entry: directory::Entry = reader.read()?;
            let name_len = entry.name_len();
            take(&mut remaining, name_len)?;
            let name = BString::from(reader.read_vec(name_len)?);

            let delta = entry.inode_offset.get();
            let inode_number = u32::try_from(i64::from(base) + i64::from(delta)).map_err(|_| {
                Error::invalid_metadata(format!(
                    "Inode number {} {:+} of {:?} out of range",
                    base, delta, name
                ))
            })?;
            let file_type = FileType::from_kind(Kind(entry.kind.get())).ok_or_else(|| {
                Error::invalid_metadata(format!(
                    "Unknown inode type {} for {:?}",
                    entry.kind.get(),
                    name
                ))
            })?;

            entries.push(DirEntry {
                name,
                file_type,
                inode_number,
                inode_ref: raw::Ref::new(header.start.get(), entry.offset.get()),
            });
        }
    }
    Ok(entries)
}

fn take(remaining: &mut usize, n: usize) -> Result<()> {
    *remaining = remaining
        .checked_sub(n)
        .ok_or_else(|| Error::invalid_metadata("Directory listing overruns its size"))?;
    Ok(())
}
