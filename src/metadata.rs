//! Reading runs of metadata blocks as one continuous stream
//!
//! The inode table, the directory table and the entries of the lookup tables are all stored as a
//! sequence of independently compressed metadata blocks (see [`repr::metablock`]). A
//! [`MetadataReader`] starts at the header of one of these blocks and decompresses blocks lazily,
//! one at a time, as reads reach the end of the current one.

use std::cmp;
use std::io;

use positioned_io::ReadAt;
use repr::metablock;
use zerocopy::{AsBytes, FromBytes};

use crate::compression::Decompressor;
use crate::errors::{Error, Result};

/// `read_exact_at`, reporting a short read as [`Error::Truncated`]
pub(crate) fn read_exact_at<R: ReadAt + ?Sized>(
    reader: &R,
    position: u64,
    buf: &mut [u8],
) -> Result<()> {
    let len = buf.len();
    reader.read_exact_at(position, buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::Truncated { position, len },
        _ => Error::Io(e),
    })
}

pub struct MetadataReader<'a, R: ?Sized> {
    reader: &'a R,
    decompressor: &'a dyn Decompressor,
    /// Absolute position of the next metadata block header
    position: u64,
    block: Vec<u8>,
    compressed: Vec<u8>,
    block_len: usize,
    cursor: usize,
}

impl<'a, R: ReadAt + ?Sized> MetadataReader<'a, R> {
    /// Start reading at the metadata block header at `position`
    ///
    /// Nothing is read until the first read or skip.
    pub fn new(reader: &'a R, decompressor: &'a dyn Decompressor, position: u64) -> Self {
        Self {
            reader,
            decompressor,
            position,
            block: vec![0; metablock::SIZE],
            compressed: Vec::new(),
            block_len: 0,
            cursor: 0,
        }
    }

    /// The absolute position of the next metadata block header which has not been read yet
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read exactly `buf.len()` bytes, continuing into following blocks as needed
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        self.consume(buf.len(), |chunk| {
            buf[filled..filled + chunk.len()].copy_from_slice(chunk);
            filled += chunk.len();
        })
    }

    /// Skip `n` bytes
    ///
    /// Every block skipped over is still read and decompressed: offsets are into uncompressed
    /// data, so there is no way to know where they land without decompressing.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.consume(n, |_| {})
    }

    /// Read a fixed size on disk structure
    pub fn read<T: AsBytes + FromBytes>(&mut self) -> Result<T> {
        let mut value = T::new_zeroed();
        self.read_exact(value.as_bytes_mut())?;
        Ok(value)
    }

    /// Read `n` bytes into a new vec
    ///
    /// The vec grows as data is actually read, so a corrupt length fails with
    /// [`Error::Truncated`] rather than a huge allocation.
    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut result = Vec::with_capacity(cmp::min(n, metablock::SIZE));
        self.consume(n, |chunk| result.extend_from_slice(chunk))?;
        Ok(result)
    }

    /// Read whatever is left of the current block, loading the next block if it is used up
    pub fn read_block(&mut self) -> Result<Vec<u8>> {
        if self.cursor == self.block_len {
            self.next_block()?;
        }
        let rest = self.block[self.cursor..self.block_len].to_vec();
        self.cursor = self.block_len;
        Ok(rest)
    }

    fn consume<F: FnMut(&[u8])>(&mut self, n: usize, mut f: F) -> Result<()> {
        let mut remaining = n;
        while remaining > 0 {
            if self.cursor == self.block_len {
                self.next_block()?;
            }
            let len = cmp::min(remaining, self.block_len - self.cursor);
            f(&self.block[self.cursor..self.cursor + len]);
            self.cursor += len;
            remaining -= len;
        }
        Ok(())
    }

    fn next_block(&mut self) -> Result<()> {
        let block_start = self.position;
        let mut header = metablock::Header::new_zeroed();
        read_exact_at(self.reader, block_start, header.as_bytes_mut())?;

        let size = usize::from(header.size());
        if size == 0 {
            return Err(Error::invalid_metadata(format!(
                "Empty metadata block at {}",
                block_start
            )));
        }
        if size > metablock::SIZE {
            return Err(Error::invalid_metadata(format!(
                "Metadata block at {} is {} bytes, larger than {}",
                block_start,
                size,
                metablock::SIZE
            )));
        }

        let payload_start = block_start + header.as_bytes().len() as u64;
        let block_len = if header.uncompressed() {
            read_exact_at(self.reader, payload_start, &mut self.block[..size])?;
            size
        } else {
            self.compressed.resize(size, 0);
            read_exact_at(self.reader, payload_start, &mut self.compressed)?;
            self.decompressor
                .decompress(&self.compressed, &mut self.block)
                .map_err(|source| Error::Decompression {
                    position: block_start,
                    source,
                })?
        };

        self.position = payload_start + size as u64;
        self.block_len = block_len;
        self.cursor = 0;
        Ok(())
    }
}
