//! Decompression backends
//!
//! The archive only needs a single capability from a compression algorithm: decompress one
//! independently compressed block into a buffer of known maximum size. Each algorithm is behind a
//! cargo feature; archives using an algorithm which was not compiled in fail to open with
//! [`Error::DisabledCompression`](crate::Error::DisabledCompression).

use repr::compression::options;
use repr::compression::Id as CompressionId;
use std::{fmt, io};
use zerocopy::FromBytes;

use crate::errors::{Error, Result};

#[cfg(feature = "gzip")]
pub mod gzip;

#[cfg(feature = "lz4")]
pub mod lz4;

#[cfg(any(feature = "xz", feature = "lzma"))]
pub mod xz;

#[cfg(feature = "zstd")]
pub mod zstd;

/// Decompress a single block
///
/// Implementations must be usable from several threads at once.
pub trait Decompressor: fmt::Debug + Send + Sync {
    /// Decompress all of `src` into `dst`, returning the number of bytes written
    ///
    /// `dst` is sized to the largest valid output. Output which does not fit is an error.
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize>;
}

impl<D: Decompressor + ?Sized> Decompressor for Box<D> {
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> io::Result<usize> {
        (**self).decompress(src, dst)
    }
}

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    ZLib = CompressionId::GZIP.0,
    Lzma = CompressionId::LZMA.0,
    Lzo = CompressionId::LZO.0,
    Xz = CompressionId::XZ.0,
    Lz4 = CompressionId::LZ4.0,
    Zstd = CompressionId::ZSTD.0,
    Unknown = 0,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Kind {
    pub fn from_id(id: CompressionId) -> Kind {
        match id {
            CompressionId::GZIP => Kind::ZLib,
            CompressionId::LZMA => Kind::Lzma,
            CompressionId::LZO => Kind::Lzo,
            CompressionId::XZ => Kind::Xz,
            CompressionId::LZ4 => Kind::Lz4,
            CompressionId::ZSTD => Kind::Zstd,
            _ => Kind::Unknown,
        }
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::ZLib => "gzip",
            Kind::Lzma => "lzma",
            Kind::Lzo => "lzo",
            Kind::Xz => "xz",
            Kind::Lz4 => "lz4",
            Kind::Zstd => "zstd",
            Kind::Unknown => "unknown",
        }
    }

    pub fn supported(self) -> bool {
        match self {
            Kind::ZLib => cfg!(feature = "gzip"),
            Kind::Lzma => cfg!(feature = "lzma"),
            // There is no lzo backend
            Kind::Lzo => false,
            Kind::Xz => cfg!(feature = "xz"),
            Kind::Lz4 => cfg!(feature = "lz4"),
            Kind::Zstd => cfg!(feature = "zstd"),
            Kind::Unknown => false,
        }
    }

    /// A decompressor for this kind, if it was compiled in
    pub fn decompressor(self) -> Option<Box<dyn Decompressor>> {
        match self {
            #[cfg(feature = "gzip")]
            Kind::ZLib => Some(Box::new(gzip::Gzip::new())),
            #[cfg(feature = "lzma")]
            Kind::Lzma => Some(Box::new(xz::Lzma)),
            #[cfg(feature = "xz")]
            Kind::Xz => Some(Box::new(xz::Xz)),
            #[cfg(feature = "lz4")]
            Kind::Lz4 => Some(Box::new(lz4::Lz4)),
            #[cfg(feature = "zstd")]
            Kind::Zstd => Some(Box::new(zstd::Zstd)),
            _ => None,
        }
    }

    /// Decode and validate the compressor options stored after the superblock
    pub fn read_options(self, data: &[u8]) -> Result<Options> {
        let options = match self {
            Kind::ZLib => {
                let gzip: options::Gzip = read_option(self, data)?;
                let level = gzip.compression_level.get();
                if !(1..=9).contains(&level) {
                    return Err(unsupported(format!("Invalid gzip compression level ({})", level)));
                }
                let window_size = gzip.window_size.get();
                if !(8..=15).contains(&window_size) {
                    return Err(unsupported(format!("Invalid gzip window size ({})", window_size)));
                }
                if gzip.strategies().is_none() {
                    return Err(unsupported(format!(
                        "Unknown gzip strategies ({:#x})",
                        gzip.strategies.get()
                    )));
                }
                Options::Gzip(gzip)
            }
            Kind::Xz => {
                let xz: options::Xz = read_option(self, data)?;
                if !xz.dictionary_size_valid() {
                    return Err(unsupported(format!(
                        "Invalid xz dictionary size ({})",
                        xz.dictionary_size.get()
                    )));
                }
                if xz.executable_filters().is_none() {
                    return Err(unsupported(format!(
                        "Unknown xz filters ({:#x})",
                        xz.executable_filters.get()
                    )));
                }
                Options::Xz(xz)
            }
            Kind::Lz4 => {
                let lz4: options::Lz4 = read_option(self, data)?;
                if lz4.version.get() != options::Lz4::LEGACY {
                    return Err(unsupported(format!("Invalid lz4 version ({})", lz4.version.get())));
                }
                if lz4.flags().is_none() {
                    return Err(unsupported(format!("Unknown lz4 flags ({:#x})", lz4.flags.get())));
                }
                Options::Lz4(lz4)
            }
            Kind::Zstd => {
                let zstd: options::Zstd = read_option(self, data)?;
                let level = zstd.compression_level.get();
                if !(1..=22).contains(&level) {
                    return Err(unsupported(format!("Invalid zstd compression level ({})", level)));
                }
                Options::Zstd(zstd)
            }
            Kind::Lzo => {
                let lzo: options::Lzo = read_option(self, data)?;
                let algorithm = lzo.algorithm();
                if !algorithm.is_known() {
                    return Err(unsupported(format!("Unknown lzo algorithm ({})", algorithm.0)));
                }
                let level = lzo.level.get();
                let level_valid = if algorithm == options::LzoAlgorithm::X_999 {
                    (1..=9).contains(&level)
                } else {
                    level == 0
                };
                if !level_valid {
                    return Err(unsupported(format!(
                        "Invalid lzo compression level ({}) for algorithm {}",
                        level, algorithm.0
                    )));
                }
                Options::Lzo(lzo)
            }
            Kind::Lzma | Kind::Unknown => {
                return Err(unsupported(format!("{} has no compressor options", self)));
            }
        };
        Ok(options)
    }
}

/// Compressor options stored in the archive
///
/// None of the supported decompressors need these, they are only validated and logged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Options {
    Gzip(options::Gzip),
    Xz(options::Xz),
    Lz4(options::Lz4),
    Zstd(options::Zstd),
    Lzo(options::Lzo),
}

fn read_option<T: FromBytes>(kind: Kind, data: &[u8]) -> Result<T> {
    let size = std::mem::size_of::<T>();
    data.get(..size)
        .and_then(T::read_from)
        .ok_or_else(|| {
            unsupported(format!(
                "{} compressor options need {} bytes, got {}",
                kind,
                size,
                data.len()
            ))
        })
}

fn unsupported(err: String) -> Error {
    Error::UnsupportedOption { err }
}
