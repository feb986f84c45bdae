use std::io;

/// Both formats decode into a scratch buffer first: `lzma-rs` only writes to `io::Write`
fn decompress_with<F>(src: &[u8], dst: &mut [u8], decode: F) -> io::Result<usize>
where
    F: FnOnce(&mut &[u8], &mut Vec<u8>) -> Result<(), lzma_rs::error::Error>,
{
    let mut output = Vec::with_capacity(dst.len());
    let mut input = src;
    decode(&mut input, &mut output).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if output.len() > dst.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "decompressed {} bytes into a buffer of {}",
                output.len(),
                dst.len()
            ),
        ));
    }
    dst[..output.len()].copy_from_slice(&output);
    Ok(output.len())
}

#[cfg(feature = "xz")]
#[derive(Debug, Default, Copy, Clone)]
pub struct Xz;

#[cfg(feature = "xz")]
impl super::Decompressor for Xz {
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
        decompress_with(src, dst, |input, output| {
            lzma_rs::xz_decompress(input, output)
        })
    }
}

/// The legacy `.lzma` format, with a 13 byte header
#[cfg(feature = "lzma")]
#[derive(Debug, Default, Copy, Clone)]
pub struct Lzma;

#[cfg(feature = "lzma")]
impl super::Decompressor for Lzma {
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
        decompress_with(src, dst, |input, output| {
            lzma_rs::lzma_decompress(input, output)
        })
    }
}
