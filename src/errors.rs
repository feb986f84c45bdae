use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "Magic mismatch: expected {:#x}, got {:#x}",
        repr::superblock::MAGIC,
        .magic
    )]
    BadMagic { magic: u32 },
    #[error("Invalid archive version {major}.{minor}: only version 4.0 is supported")]
    BadVersion { major: u16, minor: u16 },
    #[error("Block size {block_size} does not match block log {block_log}")]
    InconsistentBlockLog { block_size: u32, block_log: u16 },
    #[error("Unknown compression type: {id}")]
    UnsupportedCompression { id: u16 },
    #[error("unsquash built without support for {kind}")]
    DisabledCompression { kind: crate::compression::Kind },
    #[error("Unknown superblock flags in {flags:#x}")]
    UnknownFlags { flags: u16 },
    #[error("Unsupported option: {err}")]
    UnsupportedOption { err: String },
    #[error("Unexpected end of archive reading {len} bytes at offset {position}")]
    Truncated { position: u64, len: usize },
    #[error("Unable to decompress block at offset {position}: {source}")]
    Decompression { position: u64, source: io::Error },
    #[error("Invalid metadata: {err}")]
    InvalidMetadata { err: String },
    #[error("{table} index {index} is out of range ({len} entries)")]
    OutOfRange {
        table: &'static str,
        index: u64,
        len: usize,
    },
    #[error("Inode {inode_number} is not a directory")]
    NotADirectory { inode_number: u32 },
    #[error("Inode {inode_number} is not a regular file")]
    NotAFile { inode_number: u32 },
    #[error("Archive is not exportable")]
    NotExportable,
    #[error("No such file or directory: {path}")]
    NotFound { path: String },
    #[error("Unable to open {}: {source}", .path.display())]
    UnableToOpen { path: PathBuf, source: io::Error },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The superblock is not a squashfs 4.0 superblock this build can read
    Format,
    /// The archive ended before a read completed
    Truncated,
    /// A block was rejected by the decompressor
    Decompression,
    /// An operation was invoked on the wrong kind of inode
    TypeMismatch,
    /// Lookup by inode number on an archive without an export table
    NotExportable,
    /// Metadata decoded, but is inconsistent
    Corrupt,
    /// A path lookup failed
    NotFound,
    /// Error from the underlying reader
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadMagic { .. }
            | Error::BadVersion { .. }
            | Error::InconsistentBlockLog { .. }
            | Error::UnsupportedCompression { .. }
            | Error::DisabledCompression { .. }
            | Error::UnknownFlags { .. }
            | Error::UnsupportedOption { .. } => ErrorKind::Format,
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::Decompression { .. } => ErrorKind::Decompression,
            Error::InvalidMetadata { .. } | Error::OutOfRange { .. } => ErrorKind::Corrupt,
            Error::NotADirectory { .. } | Error::NotAFile { .. } => ErrorKind::TypeMismatch,
            Error::NotExportable => ErrorKind::NotExportable,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::UnableToOpen { .. } | Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_metadata(err: impl Into<String>) -> Self {
        Error::InvalidMetadata { err: err.into() }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(e) => e,
            Error::Truncated { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            Error::NotFound { .. } => io::Error::new(io::ErrorKind::NotFound, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
