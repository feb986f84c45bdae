//! Decoded inodes
//!
//! An [`Inode`] is decoded from the inode table in one pass: the common header, the kind specific
//! structure, and any variable length trailer (block sizes for files, the target for symlinks).

use bstr::{BStr, BString, ByteSlice};
use chrono::{DateTime, Utc};
use positioned_io::ReadAt;
use repr::datablock::Size;
use repr::inode::{self as raw, DeviceNumber, Kind};
use repr::{directory, fragment, Mode};
use std::convert::TryFrom;
use std::time::{Duration, UNIX_EPOCH};

use crate::errors::{Error, Result};
use crate::metadata::MetadataReader;

/// The kind of item an inode describes, without the basic/extended distinction
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FileType {
    Directory,
    File,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
}

impl FileType {
    /// Map a basic or extended inode kind to its file type
    pub fn from_kind(kind: Kind) -> Option<FileType> {
        let file_type = match kind.to_basic() {
            Kind::BASIC_DIR => FileType::Directory,
            Kind::BASIC_FILE => FileType::File,
            Kind::BASIC_SYMLINK => FileType::Symlink,
            Kind::BASIC_BLOCK_DEV => FileType::BlockDevice,
            Kind::BASIC_CHAR_DEV => FileType::CharDevice,
            Kind::BASIC_FIFO => FileType::Fifo,
            Kind::BASIC_SOCKET => FileType::Socket,
            _ => return None,
        };
        Some(file_type)
    }

    /// The `S_IFMT` bits for this file type
    pub fn mode(self) -> Mode {
        match self {
            FileType::Directory => Mode::TYPE_DIR,
            FileType::File => Mode::TYPE_FILE,
            FileType::Symlink => Mode::TYPE_LINK,
            FileType::BlockDevice => Mode::TYPE_BLOCK,
            FileType::CharDevice => Mode::TYPE_CHAR,
            FileType::Fifo => Mode::TYPE_FIFO,
            FileType::Socket => Mode::TYPE_SOCKET,
        }
    }
}

/// Location of a directory listing in the directory table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Offset of the metadata block holding the start of the listing, relative to the directory
    /// table
    pub block_start: u32,
    /// Offset of the listing in the uncompressed metadata block
    pub block_offset: u16,
    /// Size as stored in the inode: 3 bytes more than the listing itself
    pub size: u32,
}

impl Listing {
    /// The number of bytes of headers and entries to decode
    pub fn len(&self) -> usize {
        self.size.saturating_sub(directory::SIZE_OFFSET) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where the tail of a file is stored in a fragment block
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FragmentRef {
    /// Index into the fragment table
    pub index: u32,
    /// Offset of the tail in the uncompressed fragment block
    pub offset: u32,
}

/// Where the data of a regular file is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// Absolute offset of the first data block
    pub blocks_start: u64,
    pub file_size: u64,
    pub fragment: Option<FragmentRef>,
    /// One entry per data block, in order. The blocks are stored back to back from
    /// `blocks_start`, sparse blocks taking no space.
    pub block_sizes: Vec<Size>,
}

impl Content {
    /// The number of block sizes stored for a file of `file_size` bytes
    ///
    /// Files ending in a fragment store no size for the final partial block.
    pub fn block_count(file_size: u64, block_size: u32, has_fragment: bool) -> u64 {
        let block_size = u64::from(block_size);
        let full = file_size / block_size;
        if has_fragment || file_size % block_size == 0 {
            full
        } else {
            full + 1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    pub listing: Listing,
    pub hard_link_count: u32,
    pub parent_inode_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedDir {
    pub dir: Dir,
    /// Number of directory index entries following the inode. They are not decoded.
    pub index_count: u16,
    pub xattr_idx: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedFile {
    pub content: Content,
    /// Bytes saved by sparse blocks
    pub sparse: u64,
    pub hard_link_count: u32,
    pub xattr_idx: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    pub target: BString,
    pub hard_link_count: u32,
    /// Only present for extended symlinks
    pub xattr_idx: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub device: DeviceNumber,
    pub hard_link_count: u32,
    pub xattr_idx: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipc {
    pub hard_link_count: u32,
    pub xattr_idx: Option<u32>,
}

/// The kind specific part of an inode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    BasicDir(Dir),
    ExtendedDir(ExtendedDir),
    BasicFile(Content),
    ExtendedFile(ExtendedFile),
    Symlink(Symlink),
    BlockDevice(Device),
    CharDevice(Device),
    Fifo(Ipc),
    Socket(Ipc),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub kind: Kind,
    pub permissions: Mode,
    /// Index into the id table of the owner
    pub uid_idx: u16,
    /// Index into the id table of the group
    pub gid_idx: u16,
    /// Seconds since the unix epoch
    pub modified_time: u32,
    pub inode_number: u32,
    pub data: Data,
}

impl Inode {
    /// Decode the inode starting at the current position of `reader`
    pub(crate) fn read<R: ReadAt + ?Sized>(
        reader: &mut MetadataReader<'_, R>,
        block_size: u32,
    ) -> Result<Self> {
        let header: raw::Header = reader.read()?;
        let kind = header.kind();
        let data = match kind {
            Kind::BASIC_DIR => {
                let dir: raw::BasicDir = reader.read()?;
                Data::BasicDir(Dir {
                    listing: Listing {
                        block_start: dir.block_idx.get(),
                        block_offset: dir.block_offset.get(),
                        size: u32::from(dir.file_size.get()),
                    },
                    hard_link_count: dir.hard_link_count.get(),
                    parent_inode_number: dir.parent_inode_number.get(),
                })
            }
            Kind::EXT_DIR => {
                let dir: raw::ExtendedDir = reader.read()?;
                Data::ExtendedDir(ExtendedDir {
                    dir: Dir {
                        listing: Listing {
                            block_start: dir.block_idx.get(),
                            block_offset: dir.block_offset.get(),
                            size: dir.file_size.get(),
                        },
                        hard_link_count: dir.hard_link_count.get(),
                        parent_inode_number: dir.parent_inode_number.get(),
                    },
                    index_count: dir.index_count.get(),
                    xattr_idx: dir.xattr_idx.get(),
                })
            }
            Kind::BASIC_FILE => {
                let file: raw::BasicFile = reader.read()?;
                Data::BasicFile(read_content(
                    reader,
                    block_size,
                    u64::from(file.blocks_start.get()),
                    u64::from(file.file_size.get()),
                    file.fragment_block_index.get(),
                    file.block_offset.get(),
                )?)
            }
            Kind::EXT_FILE => {
                let file: raw::ExtendedFile = reader.read()?;
                let content = read_content(
                    reader,
                    block_size,
                    file.blocks_start.get(),
                    file.file_size.get(),
                    file.fragment_block_index.get(),
                    file.block_offset.get(),
                )?;
                Data::ExtendedFile(ExtendedFile {
                    content,
                    sparse: file.sparse.get(),
                    hard_link_count: file.hard_link_count.get(),
                    xattr_idx: file.xattr_idx.get(),
                })
            }
            Kind::BASIC_SYMLINK | Kind::EXT_SYMLINK => {
                let symlink: raw::Symlink = reader.read()?;
                let target_size = usize::try_from(symlink.target_size.get())
                    .map_err(|_| Error::invalid_metadata("Symlink target too large"))?;
                let target = BString::from(reader.read_vec(target_size)?);
                let xattr_idx = read_xattr_idx(reader, kind)?;
                Data::Symlink(Symlink {
                    target,
                    hard_link_count: symlink.hard_link_count.get(),
                    xattr_idx,
                })
            }
            Kind::BASIC_BLOCK_DEV | Kind::BASIC_CHAR_DEV => {
                let device: raw::BasicDevice = reader.read()?;
                let device = Device {
                    device: DeviceNumber(device.device.get()),
                    hard_link_count: device.hard_link_count.get(),
                    xattr_idx: None,
                };
                if kind == Kind::BASIC_BLOCK_DEV {
                    Data::BlockDevice(device)
                } else {
                    Data::CharDevice(device)
                }
            }
            Kind::EXT_BLOCK_DEV | Kind::EXT_CHAR_DEV => {
                let device: raw::ExtendedDevice = reader.read()?;
                let device = Device {
                    device: DeviceNumber(device.device.get()),
                    hard_link_count: device.hard_link_count.get(),
                    xattr_idx: Some(device.xattr_idx.get()),
                };
                if kind == Kind::EXT_BLOCK_DEV {
                    Data::BlockDevice(device)
                } else {
                    Data::CharDevice(device)
                }
            }
            Kind::BASIC_FIFO | Kind::BASIC_SOCKET => {
                let ipc: raw::BasicIpc = reader.read()?;
                let ipc = Ipc {
                    hard_link_count: ipc.hard_link_count.get(),
                    xattr_idx: None,
                };
                if kind == Kind::BASIC_FIFO {
                    Data::Fifo(ipc)
                } else {
                    Data::Socket(ipc)
                }
            }
            Kind::EXT_FIFO | Kind::EXT_SOCKET => {
                let ipc: raw::ExtendedIpc = reader.read()?;
                let ipc = Ipc {
                    hard_link_count: ipc.hard_link_count.get(),
                    xattr_idx: Some(ipc.xattr_idx.get()),
                };
                if kind == Kind::EXT_FIFO {
                    Data::Fifo(ipc)
                } else {
                    Data::Socket(ipc)
                }
            }
            Kind(other) => {
                return Err(Error::invalid_metadata(format!(
                    "Unknown inode type {} for inode {}",
                    other,
                    header.inode_number.get()
                )))
            }
        };

        Ok(Inode {
            kind,
            permissions: Mode::from_bits_truncate(header.permissions.get()) & Mode::PERM_MASK,
            uid_idx: header.uid_idx.get(),
            gid_idx: header.gid_idx.get(),
            modified_time: header.modified_time.get(),
            inode_number: header.inode_number.get(),
            data,
        })
    }

    pub fn file_type(&self) -> FileType {
        match self.data {
            Data::BasicDir(_) | Data::ExtendedDir(_) => FileType::Directory,
            Data::BasicFile(_) | Data::ExtendedFile(_) => FileType::File,
            Data::Symlink(_) => FileType::Symlink,
            Data::BlockDevice(_) => FileType::BlockDevice,
            Data::CharDevice(_) => FileType::CharDevice,
            Data::Fifo(_) => FileType::Fifo,
            Data::Socket(_) => FileType::Socket,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.file_type() == FileType::File
    }

    /// Permissions combined with the file type bits, as in `st_mode`
    pub fn mode(&self) -> Mode {
        self.permissions | self.file_type().mode()
    }

    pub fn modified(&self) -> DateTime<Utc> {
        timestamp(self.modified_time)
    }

    /// The directory listing location, for directories
    pub fn listing(&self) -> Option<&Listing> {
        match &self.data {
            Data::BasicDir(dir) => Some(&dir.listing),
            Data::ExtendedDir(ext) => Some(&ext.dir.listing),
            _ => None,
        }
    }

    /// The data location, for regular files
    pub fn content(&self) -> Option<&Content> {
        match &self.data {
            Data::BasicFile(content) => Some(content),
            Data::ExtendedFile(ext) => Some(&ext.content),
            _ => None,
        }
    }

    /// The size of a regular file, or the target length of a symlink
    pub fn file_size(&self) -> u64 {
        match &self.data {
            Data::Symlink(symlink) => symlink.target.len() as u64,
            _ => self.content().map_or(0, |content| content.file_size),
        }
    }

    pub fn symlink_target(&self) -> Option<&BStr> {
        match &self.data {
            Data::Symlink(symlink) => Some(symlink.target.as_bstr()),
            _ => None,
        }
    }

    /// The device number, for block and character devices
    pub fn device(&self) -> Option<DeviceNumber> {
        match &self.data {
            Data::BlockDevice(device) | Data::CharDevice(device) => Some(device.device),
            _ => None,
        }
    }

    pub fn hard_link_count(&self) -> u32 {
        match &self.data {
            Data::BasicDir(dir) => dir.hard_link_count,
            Data::ExtendedDir(ext) => ext.dir.hard_link_count,
            Data::BasicFile(_) => 1,
            Data::ExtendedFile(ext) => ext.hard_link_count,
            Data::Symlink(symlink) => symlink.hard_link_count,
            Data::BlockDevice(device) | Data::CharDevice(device) => device.hard_link_count,
            Data::Fifo(ipc) | Data::Socket(ipc) => ipc.hard_link_count,
        }
    }

    /// Index into the xattr id table, if the inode has extended attributes
    pub fn xattr_idx(&self) -> Option<u32> {
        let idx = match &self.data {
            Data::ExtendedDir(ext) => Some(ext.xattr_idx),
            Data::ExtendedFile(ext) => Some(ext.xattr_idx),
            Data::Symlink(symlink) => symlink.xattr_idx,
            Data::BlockDevice(device) | Data::CharDevice(device) => device.xattr_idx,
            Data::Fifo(ipc) | Data::Socket(ipc) => ipc.xattr_idx,
            Data::BasicDir(_) | Data::BasicFile(_) => None,
        };
        idx.filter(|&idx| idx != raw::NO_XATTR)
    }
}

pub(crate) fn timestamp(seconds: u32) -> DateTime<Utc> {
    DateTime::from(UNIX_EPOCH + Duration::from_secs(u64::from(seconds)))
}

fn read_content<R: ReadAt + ?Sized>(
    reader: &mut MetadataReader<'_, R>,
    block_size: u32,
    blocks_start: u64,
    file_size: u64,
    fragment_index: u32,
    fragment_offset: u32,
) -> Result<Content> {
    let fragment = fragment::Idx(fragment_index)
        .get()
        .map(|index| FragmentRef {
            index,
            offset: fragment_offset,
        });
    let block_count = Content::block_count(file_size, block_size, fragment.is_some());
    let block_count = usize::try_from(block_count)
        .map_err(|_| Error::invalid_metadata(format!("File size {} too large", file_size)))?;

    // Sizes come from the archive, so don't trust them for the allocation
    let mut block_sizes = Vec::with_capacity(block_count.min(repr::metablock::SIZE / 4));
    for _ in 0..block_count {
        block_sizes.push(reader.read::<Size>()?);
    }
    Ok(Content {
        blocks_start,
        file_size,
        fragment,
        block_sizes,
    })
}

fn read_xattr_idx<R: ReadAt + ?Sized>(
    reader: &mut MetadataReader<'_, R>,
    kind: Kind,
) -> Result<Option<u32>> {
    if kind.is_extended() {
        let idx: zerocopy::byteorder::U32<zerocopy::byteorder::LittleEndian> = reader.read()?;
        Ok(Some(idx.get()))
    } else {
        Ok(None)
    }
}

#[cfg(all(test, feature = "gzip"))]
mod tests {
    use super::*;
    use crate::compression::gzip::Gzip;
    use crate::errors::ErrorKind;
    use crate::test_image::{self, MetablockWriter};
    use zerocopy::{AsBytes, FromBytes};

    const BLOCK_SIZE: u32 = 4096;

    fn decode(bytes: &[u8]) -> Result<Inode> {
        let mut writer = MetablockWriter::new(true);
        writer.write_raw(bytes);
        let (image, _) = writer.finish();
        let gzip = Gzip::new();
        let mut reader = MetadataReader::new(&image, &gzip, 0);
        Inode::read(&mut reader, BLOCK_SIZE)
    }

    fn with_header(kind: Kind, body: &[u8]) -> Vec<u8> {
        let mut bytes = test_image::header(kind, 42).as_bytes().to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    fn file_bytes(file_size: u32, fragment: u32, sizes: &[Size]) -> Vec<u8> {
        let mut file = raw::BasicFile::new_zeroed();
        file.blocks_start.set(96);
        file.file_size.set(file_size);
        file.fragment_block_index.set(fragment);
        file.block_offset.set(10);
        let mut bytes = with_header(Kind::BASIC_FILE, file.as_bytes());
        for size in sizes {
            bytes.extend_from_slice(size.as_bytes());
        }
        bytes
    }

    #[test]
    fn basic_file_without_fragment() {
        let sizes = [Size::new(4096, true), Size::ZERO, Size::new(100, false)];
        let inode = decode(&file_bytes(10000, fragment::Idx::NONE.0, &sizes)).unwrap();
        assert_eq!(inode.file_type(), FileType::File);
        assert_eq!(inode.inode_number, 42);
        let content = inode.content().unwrap();
        assert_eq!(content.blocks_start, 96);
        assert_eq!(content.file_size, 10000);
        assert_eq!(content.fragment, None);
        assert_eq!(content.block_sizes, sizes);
    }

    #[test]
    fn basic_file_with_fragment() {
        // 10000 bytes ending in a fragment: only the two full blocks have sizes
        let sizes = [Size::new(4096, true), Size::new(200, false)];
        let mut bytes = file_bytes(10000, 3, &sizes);
        // Anything following the inode is not part of it
        bytes.extend_from_slice(&[0xFF; 8]);
        let inode = decode(&bytes).unwrap();
        let content = inode.content().unwrap();
        assert_eq!(
            content.fragment,
            Some(FragmentRef {
                index: 3,
                offset: 10
            })
        );
        assert_eq!(content.block_sizes, sizes);
    }

    #[test]
    fn block_counts() {
        assert_eq!(Content::block_count(0, 4096, false), 0);
        assert_eq!(Content::block_count(4096, 4096, false), 1);
        assert_eq!(Content::block_count(4097, 4096, false), 2);
        assert_eq!(Content::block_count(4097, 4096, true), 1);
        assert_eq!(Content::block_count(100, 4096, true), 0);
        assert_eq!(Content::block_count(8192, 4096, true), 2);
    }

    #[test]
    fn extended_file() {
        let mut file = raw::ExtendedFile::new_zeroed();
        file.blocks_start.set(1 << 40);
        file.file_size.set(3 * 4096);
        file.sparse.set(4096);
        file.hard_link_count.set(2);
        file.fragment_block_index.set(fragment::Idx::NONE.0);
        file.xattr_idx.set(raw::NO_XATTR);
        let mut bytes = with_header(Kind::EXT_FILE, file.as_bytes());
        for size in &[Size::new(10, false), Size::ZERO, Size::new(4096, true)] {
            bytes.extend_from_slice(size.as_bytes());
        }

        let inode = decode(&bytes).unwrap();
        assert_eq!(inode.file_type(), FileType::File);
        assert_eq!(inode.hard_link_count(), 2);
        assert_eq!(inode.xattr_idx(), None);
        let content = inode.content().unwrap();
        assert_eq!(content.blocks_start, 1 << 40);
        assert_eq!(content.block_sizes.len(), 3);
        assert!(content.block_sizes[1].is_sparse());
        match &inode.data {
            Data::ExtendedFile(ext) => assert_eq!(ext.sparse, 4096),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn directories() {
        let mut dir = raw::BasicDir::new_zeroed();
        dir.block_idx.set(1234);
        dir.block_offset.set(56);
        dir.file_size.set(3);
        dir.hard_link_count.set(2);
        dir.parent_inode_number.set(7);
        let inode = decode(&with_header(Kind::BASIC_DIR, dir.as_bytes())).unwrap();
        assert!(inode.is_dir());
        assert_eq!(
            inode.listing(),
            Some(&Listing {
                block_start: 1234,
                block_offset: 56,
                size: 3
            })
        );
        assert!(inode.listing().unwrap().is_empty());

        let mut dir = raw::ExtendedDir::new_zeroed();
        dir.block_idx.set(99);
        dir.file_size.set(100_003);
        dir.index_count.set(4);
        dir.xattr_idx.set(5);
        let inode = decode(&with_header(Kind::EXT_DIR, dir.as_bytes())).unwrap();
        assert_eq!(inode.file_type(), FileType::Directory);
        assert_eq!(inode.listing().unwrap().len(), 100_000);
        assert_eq!(inode.xattr_idx(), Some(5));
    }

    #[test]
    fn symlinks() {
        let mut symlink = raw::Symlink::new_zeroed();
        symlink.hard_link_count.set(1);
        symlink.target_size.set(9);
        let mut bytes = with_header(Kind::BASIC_SYMLINK, symlink.as_bytes());
        bytes.extend_from_slice(b"hello.txt");
        let inode = decode(&bytes).unwrap();
        assert_eq!(inode.file_type(), FileType::Symlink);
        assert_eq!(inode.symlink_target().unwrap(), "hello.txt");
        assert_eq!(inode.file_size(), 9);

        let mut bytes = with_header(Kind::EXT_SYMLINK, symlink.as_bytes());
        bytes.extend_from_slice(b"hello.txt");
        bytes.extend_from_slice(&17u32.to_le_bytes());
        let inode = decode(&bytes).unwrap();
        assert_eq!(inode.xattr_idx(), Some(17));
    }

    #[test]
    fn devices_and_ipc() {
        let mut device = raw::BasicDevice::new_zeroed();
        device.hard_link_count.set(1);
        device.device.set(DeviceNumber::new(1, 3).0);
        let inode = decode(&with_header(Kind::BASIC_CHAR_DEV, device.as_bytes())).unwrap();
        assert_eq!(inode.file_type(), FileType::CharDevice);
        let number = inode.device().unwrap();
        assert_eq!((number.major(), number.minor()), (1, 3));
        assert_eq!(inode.mode().to_string(), "crwxr-xr-x");

        let inode = decode(&with_header(Kind::BASIC_BLOCK_DEV, device.as_bytes())).unwrap();
        assert_eq!(inode.file_type(), FileType::BlockDevice);

        let mut ipc = raw::ExtendedIpc::new_zeroed();
        ipc.hard_link_count.set(3);
        ipc.xattr_idx.set(raw::NO_XATTR);
        let inode = decode(&with_header(Kind::EXT_FIFO, ipc.as_bytes())).unwrap();
        assert_eq!(inode.file_type(), FileType::Fifo);
        assert_eq!(inode.hard_link_count(), 3);
        assert_eq!(inode.xattr_idx(), None);

        let inode = decode(&with_header(Kind::EXT_SOCKET, ipc.as_bytes())).unwrap();
        assert_eq!(inode.file_type(), FileType::Socket);
    }

    #[test]
    fn unknown_kind() {
        for &kind in &[0, 15, 0xFFFF] {
            let err = decode(&with_header(Kind(kind), &[0; 32])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Corrupt, "kind {}", kind);
        }
    }

    #[test]
    fn truncated_block_list() {
        // Claims 3 blocks, stores 1
        let bytes = file_bytes(10000, fragment::Idx::NONE.0, &[Size::new(4096, true)]);
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
    }

    #[test]
    fn header_fields() {
        let inode = decode(&file_bytes(0, fragment::Idx::NONE.0, &[])).unwrap();
        assert_eq!(inode.kind, Kind::BASIC_FILE);
        assert_eq!(inode.permissions, Mode::O755);
        assert_eq!(inode.uid_idx, 0);
        assert_eq!(inode.gid_idx, 1);
        assert_eq!(inode.modified_time, test_image::MTIME);
        assert_eq!(inode.modified(), timestamp(test_image::MTIME));
        assert_eq!(inode.mode().to_string(), "-rwxr-xr-x");
        assert_eq!(inode.hard_link_count(), 1);
    }

    #[test]
    fn file_types() {
        assert_eq!(FileType::from_kind(Kind::EXT_DIR), Some(FileType::Directory));
        assert_eq!(FileType::from_kind(Kind::BASIC_SOCKET), Some(FileType::Socket));
        assert_eq!(FileType::from_kind(Kind(0)), None);
        assert_eq!(FileType::from_kind(Kind(15)), None);
    }
}
