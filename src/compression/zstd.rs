use std::io;

#[derive(Debug, Default, Copy, Clone)]
pub struct Zstd;

impl super::Decompressor for Zstd {
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
        zstd::bulk::decompress_to_buffer(src, dst)
    }
}
