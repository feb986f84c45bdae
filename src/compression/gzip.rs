use flate2::FlushDecompress;
use std::cell::RefCell;
use std::{fmt, io};
use thread_local::ThreadLocal;

/// zlib streams, as written by squashfs-tools' gzip compressor
///
/// Each thread reuses its own `flate2::Decompress`, reset before every block.
#[derive(Default)]
pub struct Gzip {
    decompressors: ThreadLocal<RefCell<flate2::Decompress>>,
}

impl Gzip {
    pub fn new() -> Self {
        Self::default()
    }
}

impl super::Decompressor for Gzip {
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
        let mut decompressor = self
            .decompressors
            .get_or(|| RefCell::new(flate2::Decompress::new(true)))
            .borrow_mut();
        decompressor.reset(true);
        loop {
            let in_offset = min_mem(decompressor.total_in(), src.len());
            let input = &src[in_offset..];

            let out_offset = min_mem(decompressor.total_out(), dst.len());
            let output = &mut dst[out_offset..];

            let status = decompressor.decompress(input, output, FlushDecompress::Finish)?;
            match status {
                flate2::Status::StreamEnd => break,
                flate2::Status::Ok
                    if min_mem(decompressor.total_in(), src.len()) > in_offset
                        || min_mem(decompressor.total_out(), dst.len()) > out_offset =>
                {
                    continue
                }
                flate2::Status::Ok => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "gzip stream does not fit in the output buffer",
                    ))
                }
                flate2::Status::BufError => return Err(io::ErrorKind::UnexpectedEof.into()),
            }
        }
        Ok(decompressor.total_out() as usize)
    }
}

impl fmt::Debug for Gzip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gzip").finish()
    }
}

fn min_mem(file_size: u64, mem_size: usize) -> usize {
    if file_size < mem_size as u64 {
        file_size as usize
    } else {
        mem_size
    }
}
