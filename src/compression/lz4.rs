use std::io;

/// LZ4 block format (squashfs only writes `LZ4_LEGACY` blocks, without frame headers)
#[derive(Debug, Default, Copy, Clone)]
pub struct Lz4;

impl super::Decompressor for Lz4 {
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
        lz4_flex::block::decompress_into(src, dst)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
