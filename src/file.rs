//! Reading the contents of regular files
//!
//! A file of `file_size` bytes is split into `block_size` chunks. Each chunk is either stored in a
//! data block of its own (compressed, uncompressed, or sparse), or, for the final partial chunk,
//! packed into a shared fragment block with the tails of other files. Data blocks are stored back to
//! back, so the position of a block is the sum of the on-disk sizes of the blocks before it.

use positioned_io::ReadAt;
use std::cmp;
use std::fmt;
use std::io::{self, SeekFrom};

use crate::errors::{Error, Result};
use crate::inode::{Content, Inode};
use crate::read::Archive;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Chunk {
    Block(usize),
    /// The part of the file stored in a fragment
    Tail,
}

/// A handle to the contents of a regular file
///
/// Implements [`io::Read`] and [`io::Seek`]. At most one decoded block is held at a time.
pub struct File<R> {
    archive: Archive<R>,
    inode_number: u32,
    content: Content,
    /// Offset of each data block relative to `content.blocks_start`
    block_offsets: Vec<u64>,
    position: u64,
    cached: Option<(Chunk, Vec<u8>)>,
}

impl<R> fmt::Debug for File<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("inode_number", &self.inode_number)
            .field("file_size", &self.content.file_size)
            .field("position", &self.position)
            .field("cached", &self.cached.as_ref().map(|(chunk, _)| chunk))
            .finish()
    }
}

impl<R: ReadAt> File<R> {
    pub(crate) fn new(archive: Archive<R>, inode: &Inode) -> Result<Self> {
        let content = inode.content().ok_or(Error::NotAFile {
            inode_number: inode.inode_number,
        })?;

        let mut block_offsets = Vec::with_capacity(content.block_sizes.len());
        let mut offset = 0u64;
        for size in &content.block_sizes {
            block_offsets.push(offset);
            offset = offset
                .checked_add(u64::from(size.size()))
                .and_then(|end| end.checked_add(content.blocks_start).map(|_| end))
                .ok_or_else(|| {
                    Error::invalid_metadata(format!(
                        "Data blocks of inode {} extend past the end of the archive",
                        inode.inode_number
                    ))
                })?;
        }

        Ok(Self {
            archive,
            inode_number: inode.inode_number,
            content: content.clone(),
            block_offsets,
            position: 0,
            cached: None,
        })
    }

    pub fn len(&self) -> u64 {
        self.content.file_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inode_number(&self) -> u32 {
        self.inode_number
    }

    /// Read from `offset`, without moving the position used by `Read`
    ///
    /// Fills as much of `buf` as the file allows, returning 0 only at or past the end of the file.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let position = offset.saturating_add(total as u64);
            if position >= self.content.file_size {
                break;
            }
            let (chunk, chunk_start, chunk_len) = self.chunk_at(position)?;
            let data = self.chunk_data(chunk, chunk_len)?;
            let within = (position - chunk_start) as usize;
            let n = cmp::min(buf.len() - total, data.len() - within);
            buf[total..total + n].copy_from_slice(&data[within..within + n]);
            total += n;
        }
        Ok(total)
    }

    /// The chunk holding `position`, where it starts, and its length
    fn chunk_at(&self, position: u64) -> Result<(Chunk, u64, usize)> {
        let block_size = u64::from(self.archive.block_size());
        let index = position / block_size;
        let block_count = self.content.block_sizes.len() as u64;
        let (chunk, start) = if index < block_count {
            (Chunk::Block(index as usize), index * block_size)
        } else if self.content.fragment.is_some() {
            (Chunk::Tail, block_count * block_size)
        } else {
            return Err(Error::invalid_metadata(format!(
                "Inode {} has no data for offset {}",
                self.inode_number, position
            )));
        };
        let len = cmp::min(block_size, self.content.file_size - start) as usize;
        Ok((chunk, start, len))
    }

    fn chunk_data(&mut self, chunk: Chunk, len: usize) -> Result<&[u8]> {
        let File {
            archive,
            inode_number,
            content,
            block_offsets,
            cached,
            ..
        } = self;
        if !matches!(cached, Some((cached_chunk, _)) if *cached_chunk == chunk) {
            let mut data = cached.take().map(|(_, data)| data).unwrap_or_default();
            load_chunk(archive, *inode_number, content, block_offsets, chunk, len, &mut data)?;
            return Ok(cached.insert((chunk, data)).1.as_slice());
        }
        Ok(cached.as_ref().map_or(&[][..], |(_, data)| data.as_slice()))
    }
}

/// Decode `chunk` into `data`, leaving exactly `len` bytes
fn load_chunk<R: ReadAt>(
    archive: &Archive<R>,
    inode_number: u32,
    content: &Content,
    block_offsets: &[u64],
    chunk: Chunk,
    len: usize,
    data: &mut Vec<u8>,
) -> Result<()> {
    match chunk {
        Chunk::Block(index) => {
            let size = content.block_sizes[index];
            if size.is_sparse() {
                data.clear();
                data.resize(len, 0);
                return Ok(());
            }
            archive.read_block(content.blocks_start + block_offsets[index], size, data)?;
            if data.len() < len {
                return Err(Error::invalid_metadata(format!(
                    "Block {} of inode {} holds {} bytes, expected {}",
                    index,
                    inode_number,
                    data.len(),
                    len
                )));
            }
            data.truncate(len);
        }
        Chunk::Tail => {
            let fragment = content.fragment.ok_or_else(|| {
                Error::invalid_metadata(format!("Inode {} has no fragment", inode_number))
            })?;
            let entry = archive.fragment(fragment.index)?;
            archive.read_block(entry.start.get(), entry.size, data)?;

            let start = fragment.offset as usize;
            let end = start
                .checked_add(len)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| {
                    Error::invalid_metadata(format!(
                        "Tail of inode {} ({} bytes at {}) outside fragment {} ({} bytes)",
                        inode_number,
                        len,
                        start,
                        fragment.index,
                        data.len()
                    ))
                })?;
            data.copy_within(start..end, 0);
            data.truncate(len);
        }
    }
    Ok(())
}

impl<R: ReadAt> io::Read for File<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.read_at(self.position, buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<R: ReadAt> io::Seek for File<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(position) => {
                self.position = position;
                return Ok(position);
            }
            SeekFrom::End(offset) => (self.len(), offset),
            SeekFrom::Current(offset) => (self.position, offset),
        };
        let position = if offset >= 0 {
            base.checked_add(offset as u64)
        } else {
            base.checked_sub(offset.unsigned_abs())
        };
        match position {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
