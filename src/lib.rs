//! Read-only access to squashfs archives
//!
//! ```no_run
//! use std::io::Read;
//!
//! let archive = unsquash::Archive::open("image.squashfs")?;
//! for entry in archive.root_entries() {
//!     println!("{} {:?}", entry.name, entry.file_type);
//! }
//!
//! let inode = archive.lookup("etc/hostname")?;
//! let mut contents = String::new();
//! archive.open_file(&inode)?.read_to_string(&mut contents)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compression;
pub mod config;
pub mod dir;
pub mod errors;
pub mod file;
pub mod inode;
pub mod metadata;
pub mod read;
mod table;

#[cfg(all(test, feature = "gzip"))]
mod test_image;

pub use crate::config::Config;
pub use crate::dir::DirEntry;
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::file::File;
pub use crate::inode::{FileType, Inode};
pub use crate::read::Archive;
pub use repr::Mode;
