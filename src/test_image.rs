//! Builds small squashfs images in memory for tests

use flate2::write::ZlibEncoder;
use flate2::Compression;
use repr::datablock::Size;
use repr::inode::{self as raw, Kind};
use repr::superblock::{Flags, Superblock};
use repr::{directory, export, fragment, metablock, superblock, uid_gid};
use std::io::Write;
use std::mem;
use zerocopy::{AsBytes, FromBytes};

/// Modification time of every inode and of the archive
pub(crate) const MTIME: u32 = 1_600_000_000;

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Packs data into metadata blocks
///
/// Blocks are written as soon as they are full, so `position` after a write which ends exactly at
/// a block boundary points at the start of the next block.
#[derive(Debug, Default)]
pub(crate) struct MetablockWriter {
    compress: bool,
    output: Vec<u8>,
    current_block: Vec<u8>,
    block_starts: Vec<u32>,
}

impl MetablockWriter {
    pub fn new(compress: bool) -> Self {
        Self {
            compress,
            ..Self::default()
        }
    }

    pub fn position(&self) -> raw::Ref {
        raw::Ref::new(
            self.output.len().try_into().unwrap(),
            self.current_block.len().try_into().unwrap(),
        )
    }

    pub fn write<T: AsBytes + ?Sized>(&mut self, item: &T) {
        self.write_raw(item.as_bytes())
    }

    pub fn write_raw(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let n = (metablock::SIZE - self.current_block.len()).min(data.len());
            let (head, tail) = data.split_at(n);
            self.current_block.extend_from_slice(head);
            if self.current_block.len() == metablock::SIZE {
                self.flush();
            }
            data = tail;
        }
    }

    /// End the current block early
    pub fn flush(&mut self) {
        if self.current_block.is_empty() {
            return;
        }
        self.block_starts.push(self.output.len().try_into().unwrap());
        let block = mem::take(&mut self.current_block);
        let compressed = if self.compress {
            Some(compress(&block)).filter(|compressed| compressed.len() < block.len())
        } else {
            None
        };
        let (data, uncompressed) = match &compressed {
            Some(compressed) => (&compressed[..], false),
            None => (&block[..], true),
        };
        let header = metablock::Header::new(data.len().try_into().unwrap(), uncompressed);
        self.output.extend_from_slice(header.as_bytes());
        self.output.extend_from_slice(data);
    }

    /// The written blocks, and the offset of each block header
    pub fn finish(mut self) -> (Vec<u8>, Vec<u32>) {
        self.flush();
        (self.output, self.block_starts)
    }
}

/// Append a two level table of `entries` to `image`, returning the offset of the block offsets
pub(crate) fn write_table<T: AsBytes>(image: &mut Vec<u8>, entries: &[T], compress: bool) -> u64 {
    let mut writer = MetablockWriter::new(compress);
    for entry in entries {
        writer.write(entry);
    }
    let (blocks, block_starts) = writer.finish();
    let base = image.len() as u64;
    image.extend_from_slice(&blocks);

    let start = image.len() as u64;
    for block_start in block_starts {
        image.extend_from_slice(&(base + u64::from(block_start)).to_le_bytes());
    }
    start
}

/// An inode header with 0755 permissions, uid index 0 and gid index 1
pub(crate) fn header(kind: Kind, inode_number: u32) -> raw::Header {
    let mut header = raw::Header::new_zeroed();
    header.inode_type.set(kind.0);
    header.permissions.set(0o755);
    header.uid_idx.set(0);
    header.gid_idx.set(1);
    header.modified_time.set(MTIME);
    header.inode_number.set(inode_number);
    header
}

/// An inode added to an [`ImageBuilder`]
#[derive(Debug, Copy, Clone)]
pub(crate) struct Node {
    pub kind: Kind,
    pub inode_number: u32,
    pub inode_ref: raw::Ref,
}

/// Assembles an image from data blocks, inodes and listings
///
/// Children must be added before the directories holding them, and the root last.
#[derive(Debug)]
pub(crate) struct ImageBuilder {
    pub block_log: u16,
    pub flags: Flags,
    pub ids: Vec<u32>,
    image: Vec<u8>,
    inodes: MetablockWriter,
    dirs: MetablockWriter,
    fragments: Vec<fragment::Entry>,
    exports: Vec<(u32, raw::Ref)>,
}

impl ImageBuilder {
    pub fn new(block_log: u16) -> Self {
        Self::with_compressor_options(block_log, None)
    }

    /// Store `options` as the compressor options block following the superblock
    pub fn with_compressor_options(block_log: u16, options: Option<&[u8]>) -> Self {
        let mut image = vec![0; superblock::SIZE];
        let mut flags = Flags::EXPORTABLE | Flags::NO_XATTRS;
        if let Some(options) = options {
            let mut writer = MetablockWriter::new(false);
            writer.write_raw(options);
            image.extend_from_slice(&writer.finish().0);
            flags |= Flags::COMPRESSOR_OPTIONS;
        }
        Self {
            block_log,
            flags,
            ids: vec![1000, 100],
            image,
            inodes: MetablockWriter::new(true),
            dirs: MetablockWriter::new(true),
            fragments: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn block_size(&self) -> u32 {
        1 << self.block_log
    }

    /// The offset the next data block will be written at
    pub fn data_position(&self) -> u64 {
        self.image.len() as u64
    }

    /// Write a data block, compressed if asked and it helps
    pub fn add_block(&mut self, data: &[u8], compress: bool) -> Size {
        assert!(data.len() <= self.block_size() as usize);
        let compressed = if compress {
            Some(self::compress(data)).filter(|compressed| compressed.len() < data.len())
        } else {
            None
        };
        match compressed {
            Some(compressed) => {
                self.image.extend_from_slice(&compressed);
                Size::new(compressed.len() as u32, false)
            }
            None => {
                self.image.extend_from_slice(data);
                Size::new(data.len() as u32, true)
            }
        }
    }

    /// Write a fragment block, returning its index in the fragment table
    pub fn add_fragment_block(&mut self, data: &[u8], compress: bool) -> u32 {
        let start = self.data_position();
        let size = self.add_block(data, compress);
        self.add_fragment_entry(fragment::Entry::new(start, size))
    }

    pub fn add_fragment_entry(&mut self, entry: fragment::Entry) -> u32 {
        self.fragments.push(entry);
        (self.fragments.len() - 1) as u32
    }

    /// Append raw bytes to the inode table, recording the inode for the export table
    pub fn add_inode(&mut self, header: raw::Header, body: &[u8]) -> Node {
        let inode_ref = self.inodes.position();
        self.inodes.write(&header);
        self.inodes.write_raw(body);
        let inode_number = header.inode_number.get();
        self.exports.push((inode_number, inode_ref));
        Node {
            kind: header.kind(),
            inode_number,
            inode_ref,
        }
    }

    pub fn file(
        &mut self,
        inode_number: u32,
        blocks_start: u64,
        file_size: u64,
        fragment: Option<(u32, u32)>,
        block_sizes: &[Size],
    ) -> Node {
        let (fragment_index, fragment_offset) = fragment.unwrap_or((fragment::Idx::NONE.0, 0));
        let mut body = Vec::new();
        let kind = match (blocks_start.try_into(), file_size.try_into()) {
            (Ok(blocks_start), Ok(file_size)) => {
                let mut file = raw::BasicFile::new_zeroed();
                file.blocks_start.set(blocks_start);
                file.fragment_block_index.set(fragment_index);
                file.block_offset.set(fragment_offset);
                file.file_size.set(file_size);
                body.extend_from_slice(file.as_bytes());
                Kind::BASIC_FILE
            }
            _ => {
                let mut file = raw::ExtendedFile::new_zeroed();
                file.blocks_start.set(blocks_start);
                file.file_size.set(file_size);
                file.hard_link_count.set(1);
                file.fragment_block_index.set(fragment_index);
                file.block_offset.set(fragment_offset);
                file.xattr_idx.set(raw::NO_XATTR);
                body.extend_from_slice(file.as_bytes());
                Kind::EXT_FILE
            }
        };
        for size in block_sizes {
            body.extend_from_slice(size.as_bytes());
        }
        self.add_inode(header(kind, inode_number), &body)
    }

    pub fn ext_file(
        &mut self,
        inode_number: u32,
        blocks_start: u64,
        file_size: u64,
        fragment: Option<(u32, u32)>,
        block_sizes: &[Size],
    ) -> Node {
        let (fragment_index, fragment_offset) = fragment.unwrap_or((fragment::Idx::NONE.0, 0));
        let mut file = raw::ExtendedFile::new_zeroed();
        file.blocks_start.set(blocks_start);
        file.file_size.set(file_size);
        file.hard_link_count.set(1);
        file.fragment_block_index.set(fragment_index);
        file.block_offset.set(fragment_offset);
        file.xattr_idx.set(raw::NO_XATTR);
        let mut body = file.as_bytes().to_vec();
        for size in block_sizes {
            body.extend_from_slice(size.as_bytes());
        }
        self.add_inode(header(Kind::EXT_FILE, inode_number), &body)
    }

    pub fn symlink(&mut self, inode_number: u32, target: &str) -> Node {
        let mut symlink = raw::Symlink::new_zeroed();
        symlink.hard_link_count.set(1);
        symlink.target_size.set(target.len() as u32);
        let mut body = symlink.as_bytes().to_vec();
        body.extend_from_slice(target.as_bytes());
        self.add_inode(header(Kind::BASIC_SYMLINK, inode_number), &body)
    }

    pub fn device(&mut self, inode_number: u32, kind: Kind, major: u32, minor: u32) -> Node {
        let mut device = raw::BasicDevice::new_zeroed();
        device.hard_link_count.set(1);
        device.device.set(raw::DeviceNumber::new(major, minor).0);
        self.add_inode(header(kind, inode_number), device.as_bytes())
    }

    pub fn ipc(&mut self, inode_number: u32, kind: Kind) -> Node {
        let mut ipc = raw::BasicIpc::new_zeroed();
        ipc.hard_link_count.set(1);
        self.add_inode(header(kind, inode_number), ipc.as_bytes())
    }

    /// Write the listing of `children` to the directory table, and a directory inode for it
    pub fn dir(&mut self, inode_number: u32, parent: u32, children: &[(&str, Node)]) -> Node {
        let listing = encode_listing(children);
        let size = listing.len() as u32 + directory::SIZE_OFFSET;
        self.raw_dir(inode_number, parent, &listing, size)
    }

    /// A directory inode with an arbitrary listing and recorded size
    pub fn raw_dir(&mut self, inode_number: u32, parent: u32, listing: &[u8], size: u32) -> Node {
        let start = self.dirs.position();
        self.dirs.write_raw(listing);
        let block_idx: u32 = start.block_start().try_into().unwrap();

        match u16::try_from(size) {
            Ok(size) => {
                let mut dir = raw::BasicDir::new_zeroed();
                dir.block_idx.set(block_idx);
                dir.hard_link_count.set(2);
                dir.file_size.set(size);
                dir.block_offset.set(start.start_offset());
                dir.parent_inode_number.set(parent);
                self.add_inode(header(Kind::BASIC_DIR, inode_number), dir.as_bytes())
            }
            Err(_) => {
                let mut dir = raw::ExtendedDir::new_zeroed();
                dir.hard_link_count.set(2);
                dir.file_size.set(size);
                dir.block_idx.set(block_idx);
                dir.parent_inode_number.set(parent);
                dir.block_offset.set(start.start_offset());
                dir.xattr_idx.set(raw::NO_XATTR);
                self.add_inode(header(Kind::EXT_DIR, inode_number), dir.as_bytes())
            }
        }
    }

    /// Lay out the tables and superblock after the data
    pub fn finish(self, root: Node) -> Vec<u8> {
        let ImageBuilder {
            block_log,
            flags,
            ids,
            mut image,
            inodes,
            dirs,
            fragments,
            exports,
        } = self;
        let inode_table_start = image.len() as u64;
        image.extend_from_slice(&inodes.finish().0);
        let directory_table_start = image.len() as u64;
        image.extend_from_slice(&dirs.finish().0);

        let fragment_table_start = write_table(&mut image, &fragments, true);

        let inode_count = exports.iter().map(|&(number, _)| number).max().unwrap_or(0);
        let export_table_start = if flags.contains(Flags::EXPORTABLE) {
            let mut table = vec![export::Entry::new(raw::Ref(0)); inode_count as usize];
            for (number, inode_ref) in exports {
                table[number as usize - 1] = export::Entry::new(inode_ref);
            }
            write_table(&mut image, &table, true)
        } else {
            u64::MAX
        };

        let ids: Vec<_> = ids.into_iter().map(uid_gid::Id::new).collect();
        let id_table_start = write_table(&mut image, &ids, true);

        let mut sb = Superblock::new_zeroed();
        sb.magic.set(superblock::MAGIC);
        sb.inode_count.set(inode_count);
        sb.modification_time.set(MTIME);
        sb.block_size.set(1 << block_log);
        sb.fragment_entry_count.set(fragments.len() as u32);
        sb.compression_id.set(repr::compression::Id::GZIP.0);
        sb.block_log.set(block_log);
        sb.flags.set(flags.bits());
        sb.id_count.set(ids.len() as u16);
        sb.version_major.set(superblock::VERSION_MAJOR);
        sb.version_minor.set(superblock::VERSION_MINOR);
        sb.root_inode_ref.set(root.inode_ref.0);
        sb.bytes_used.set(image.len() as u64);
        sb.id_table_start.set(id_table_start);
        sb.xattr_id_table_start.set(u64::MAX);
        sb.inode_table_start.set(inode_table_start);
        sb.directory_table_start.set(directory_table_start);
        sb.fragment_table_start.set(fragment_table_start);
        sb.export_table_start.set(export_table_start);
        image[..superblock::SIZE].copy_from_slice(sb.as_bytes());
        image
    }
}

/// Encode a directory listing, starting a new header whenever the inode block changes, the inode
/// number is too far from the header's, or the header is full
pub(crate) fn encode_listing(children: &[(&str, Node)]) -> Vec<u8> {
    let mut listing = Vec::new();
    let mut i = 0;
    while i < children.len() {
        let first = children[i].1;
        let block = first.inode_ref.block_start();
        let base = first.inode_number;
        let run = children[i..]
            .iter()
            .take(directory::MAX_ENTRIES_PER_HEADER as usize)
            .take_while(|(_, node)| {
                node.inode_ref.block_start() == block
                    && i16::try_from(i64::from(node.inode_number) - i64::from(base)).is_ok()
            })
            .count();

        let mut dir_header = directory::Header::new_zeroed();
        dir_header.count.set(run as u32 - 1);
        dir_header.start.set(block as u32);
        dir_header.inode_number.set(base);
        listing.extend_from_slice(dir_header.as_bytes());

        for (name, node) in &children[i..i + run] {
            let mut entry = directory::Entry::new_zeroed();
            entry.offset.set(node.inode_ref.start_offset());
            entry
                .inode_offset
                .set((i64::from(node.inode_number) - i64::from(base)) as i16);
            entry.kind.set(node.kind.to_basic().0);
            entry.name_size.set(name.len() as u16 - 1);
            listing.extend_from_slice(entry.as_bytes());
            listing.extend_from_slice(name.as_bytes());
        }
        i += run;
    }
    listing
}

pub(crate) const HELLO: &[u8] = b"Hello, world!\n";
pub(crate) const NESTED: &[u8] = b"nested\n";

/// Contents of the sample archive
///
/// ```text
/// /
/// ├── big.bin      10000 bytes: a compressed block, a raw block, and a tail in fragment 0
/// ├── dir/
/// │   ├── fifo
/// │   ├── nested.txt   extended file, entirely in fragment 0
/// │   └── null         character device 1:3
/// ├── hello.txt    entirely in fragment 0
/// ├── link -> hello.txt
/// └── sparse.bin   a raw block, a sparse block, and a compressed partial block
/// ```
pub(crate) struct Sample {
    pub image: Vec<u8>,
    pub big: Vec<u8>,
    pub sparse: Vec<u8>,
}

pub(crate) fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 ^ seed).collect()
}

pub(crate) fn sample() -> Sample {
    let mut builder = ImageBuilder::new(12);
    let block_size = builder.block_size() as usize;

    let big = pattern(10000, 1);
    let big_start = builder.data_position();
    let big_sizes = [
        builder.add_block(&big[..block_size], true),
        builder.add_block(&big[block_size..2 * block_size], false),
    ];

    let mut sparse = pattern(block_size, 2);
    sparse.resize(2 * block_size, 0);
    sparse.extend(pattern(2048, 3));
    let sparse_start = builder.data_position();
    let sparse_sizes = [
        builder.add_block(&sparse[..block_size], false),
        Size::ZERO,
        builder.add_block(&sparse[2 * block_size..], true),
    ];

    let mut fragment_block = Vec::new();
    let hello_offset = fragment_block.len() as u32;
    fragment_block.extend_from_slice(HELLO);
    let big_offset = fragment_block.len() as u32;
    fragment_block.extend_from_slice(&big[2 * block_size..]);
    let nested_offset = fragment_block.len() as u32;
    fragment_block.extend_from_slice(NESTED);
    let fragment = builder.add_fragment_block(&fragment_block, true);

    let hello = builder.file(1, 0, HELLO.len() as u64, Some((fragment, hello_offset)), &[]);
    let big_node = builder.file(
        2,
        big_start,
        big.len() as u64,
        Some((fragment, big_offset)),
        &big_sizes,
    );
    let sparse_node = builder.file(3, sparse_start, sparse.len() as u64, None, &sparse_sizes);
    let link = builder.symlink(4, "hello.txt");
    let nested = builder.ext_file(
        5,
        0,
        NESTED.len() as u64,
        Some((fragment, nested_offset)),
        &[],
    );
    let null = builder.device(6, Kind::BASIC_CHAR_DEV, 1, 3);
    let fifo = builder.ipc(7, Kind::BASIC_FIFO);
    let dir = builder.dir(
        8,
        9,
        &[("fifo", fifo), ("nested.txt", nested), ("null", null)],
    );
    let root = builder.dir(
        9,
        10,
        &[
            ("big.bin", big_node),
            ("dir", dir),
            ("hello.txt", hello),
            ("link", link),
            ("sparse.bin", sparse_node),
        ],
    );

    Sample {
        image: builder.finish(root),
        big,
        sparse,
    }
}
