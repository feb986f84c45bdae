use bstr::ByteSlice;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use positioned_io::{RandomAccessFile, ReadAt};
use repr::datablock::Size;
use repr::superblock::{Flags, Superblock};
use repr::{export, fragment, inode, metablock, uid_gid, TableEntry};
use slog::{Drain, Logger};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use zerocopy::{AsBytes, FromBytes};

use crate::compression::{self, Decompressor};
use crate::config::{self, Config};
use crate::dir::{self, DirEntry};
use crate::errors::{Error, Result};
use crate::file::File;
use crate::inode::{self as decoded, Inode};
use crate::metadata::{read_exact_at, MetadataReader};
use crate::table::{self, read_table};

/// An open squashfs archive
///
/// Cloning is cheap: clones share the reader and all loaded tables.
pub struct Archive<R> {
    inner: Arc<ArchiveInner<R>>,
}

static_assertions::assert_impl_all!(Archive<Vec<u8>>: Send, Sync, Clone);

impl<R> Clone for Archive<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("superblock", &self.inner.image.superblock)
            .field("compression_kind", &self.inner.compression_kind)
            .finish()
    }
}

struct ArchiveInner<R> {
    image: Image<R>,
    flags: Flags,
    compression_kind: compression::Kind,
    compression_options: Option<compression::Options>,
    fragments: Vec<fragment::Entry>,
    ids: Vec<uid_gid::Id>,
    exports: OnceCell<Vec<export::Entry>>,
    root: Inode,
    root_entries: Vec<DirEntry>,
    logger: Logger,
}

/// The reader, and what is needed to decode metadata from it
struct Image<R> {
    reader: R,
    superblock: Superblock,
    decompressor: Box<dyn Decompressor>,
}

fn default_logger() -> Logger {
    slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!())
}

impl Archive<RandomAccessFile> {
    pub fn open<P: AsRef<Path>>(p: P) -> Result<Self> {
        Archive::open_with_logger(p, default_logger())
    }

    pub fn open_with_logger<P: AsRef<Path>>(p: P, logger: Logger) -> Result<Self> {
        Self::open_with_config(p, Config::default(), logger)
    }

    pub fn open_with_config<P: AsRef<Path>>(p: P, config: Config, logger: Logger) -> Result<Self> {
        Self::_open_with_config(p.as_ref(), config, logger)
    }

    fn _open_with_config(path: &Path, config: Config, logger: Logger) -> Result<Self> {
        let path_str = path.display().to_string();
        let logger = logger.new(slog::o!("file" => path_str));
        let file = RandomAccessFile::open(path).map_err(|source| Error::UnableToOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_config(file, config, logger)
    }
}

impl<R: ReadAt> Archive<R> {
    pub fn new(reader: R) -> Result<Self> {
        Self::with_logger(reader, default_logger())
    }

    pub fn with_logger(reader: R, logger: Logger) -> Result<Self> {
        Self::with_config(reader, Config::default(), logger)
    }

    /// Open an archive: validate the superblock, load the fragment and id tables, and decode the
    /// root directory
    pub fn with_config(reader: R, config: Config, logger: Logger) -> Result<Self> {
        let mut superblock = Superblock::new_zeroed();
        read_exact_at(&reader, 0, superblock.as_bytes_mut())?;
        log_superblock(&logger, &superblock);

        let compression_kind =
            validate_superblock(&superblock, config.decompressor.is_some())?;
        let flags = match Flags::from_bits(superblock.flags.get()) {
            Some(flags) => flags,
            None => match config.unknown_flags {
                config::UnknownFlags::Reject => {
                    return Err(Error::UnknownFlags {
                        flags: superblock.flags.get(),
                    });
                }
                config::UnknownFlags::Ignore => {
                    slog::warn!(logger, "Ignoring unknown superblock flags";
                        "flags" => format_args!("{:#x}", superblock.flags.get()));
                    superblock.flags()
                }
            },
        };

        let decompressor = match config.decompressor {
            Some(decompressor) => decompressor,
            None => compression_kind
                .decompressor()
                .ok_or(Error::DisabledCompression {
                    kind: compression_kind,
                })?,
        };
        let image = Image {
            reader,
            superblock,
            decompressor,
        };

        let compression_options = if flags.contains(Flags::COMPRESSOR_OPTIONS) {
            let data = image.metadata(repr::superblock::SIZE as u64).read_block()?;
            let options = compression_kind.read_options(&data)?;
            slog::debug!(logger, "Read compressor options"; "options" => ?options);
            Some(options)
        } else {
            None
        };
        slog::info!(logger, "Loaded compressor"; "compression_kind" => %compression_kind);

        let fragments = if flags.contains(Flags::NO_FRAGMENTS) {
            Vec::new()
        } else {
            image.load_table::<fragment::Entry>(
                &logger,
                superblock.fragment_table_start.get(),
                superblock.fragment_entry_count.get() as usize,
            )?
        };
        let ids = image.load_table::<uid_gid::Id>(
            &logger,
            superblock.id_table_start.get(),
            usize::from(superblock.id_count.get()),
        )?;

        let exports = if config.export_table == config::ExportTable::Eager
            && flags.contains(Flags::EXPORTABLE)
        {
            OnceCell::from(image.load_exports(&logger)?)
        } else {
            OnceCell::new()
        };

        let root = image.inode(superblock.root_inode_ref())?;
        if !root.is_dir() {
            return Err(Error::NotADirectory {
                inode_number: root.inode_number,
            });
        }
        let root_entries = image.read_dir(&root)?;
        slog::debug!(logger, "Read root directory";
            "inode_number" => root.inode_number,
            "entries" => root_entries.len());

        Ok(Self {
            inner: Arc::new(ArchiveInner {
                image,
                flags,
                compression_kind,
                compression_options,
                fragments,
                ids,
                exports,
                root,
                root_entries,
                logger,
            }),
        })
    }

    pub fn superblock(&self) -> &Superblock {
        &self.inner.image.superblock
    }

    /// Superblock flags, without any unknown bits
    pub fn flags(&self) -> Flags {
        self.inner.flags
    }

    pub fn block_size(&self) -> u32 {
        self.inner.image.block_size()
    }

    pub fn compression_kind(&self) -> compression::Kind {
        self.inner.compression_kind
    }

    pub fn compression_options(&self) -> Option<&compression::Options> {
        self.inner.compression_options.as_ref()
    }

    /// When the archive was created
    pub fn modified(&self) -> DateTime<Utc> {
        decoded::timestamp(self.superblock().modification_time.get())
    }

    pub fn inode_count(&self) -> u32 {
        self.superblock().inode_count.get()
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    pub fn root(&self) -> &Inode {
        &self.inner.root
    }

    pub fn root_entries(&self) -> &[DirEntry] {
        &self.inner.root_entries
    }

    pub fn fragment_table(&self) -> &[fragment::Entry] {
        &self.inner.fragments
    }

    pub fn id_table(&self) -> &[uid_gid::Id] {
        &self.inner.ids
    }

    /// The export table, loading it on first use
    ///
    /// Fails with [`Error::NotExportable`] if the archive was not built with one.
    pub fn export_table(&self) -> Result<&[export::Entry]> {
        if !self.inner.flags.contains(Flags::EXPORTABLE) {
            return Err(Error::NotExportable);
        }
        let table = self
            .inner
            .exports
            .get_or_try_init(|| self.inner.image.load_exports(&self.inner.logger))?;
        Ok(table.as_slice())
    }

    /// Decode the inode at `inode_ref`
    pub fn inode(&self, inode_ref: inode::Ref) -> Result<Inode> {
        self.inner.image.inode(inode_ref)
    }

    /// Find an inode by its number, through the export table
    pub fn inode_by_number(&self, inode_number: u32) -> Result<Inode> {
        let table = self.export_table()?;
        let entry = inode_number
            .checked_sub(1)
            .and_then(|idx| table.get(idx as usize))
            .ok_or(Error::OutOfRange {
                table: export::Entry::TABLE_NAME,
                index: u64::from(inode_number),
                len: table.len(),
            })?;
        self.inode(entry.inode_ref())
    }

    pub fn inode_of(&self, entry: &DirEntry) -> Result<Inode> {
        self.inode(entry.inode_ref)
    }

    /// The entries of a directory, excluding `.` and `..`
    pub fn read_dir(&self, inode: &Inode) -> Result<Vec<DirEntry>> {
        self.inner.image.read_dir(inode)
    }

    /// Open a regular file for reading
    pub fn open_file(&self, inode: &Inode) -> Result<File<R>> {
        File::new(self.clone(), inode)
    }

    /// Resolve a `/` separated path from the root directory
    ///
    /// Empty components and `.` are skipped, `..` moves to the parent (staying at the root).
    pub fn lookup<P: AsRef<[u8]>>(&self, path: P) -> Result<Inode> {
        let path = path.as_ref();
        let mut stack = vec![self.root().clone()];
        for component in path.split_str("/") {
            match component {
                b"" | b"." => continue,
                b".." => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                    continue;
                }
                _ => {}
            }

            let dir = &stack[stack.len() - 1];
            if !dir.is_dir() {
                return Err(Error::NotADirectory {
                    inode_number: dir.inode_number,
                });
            }
            let owned_entries;
            let entries = if stack.len() == 1 {
                self.root_entries()
            } else {
                owned_entries = self.read_dir(dir)?;
                &owned_entries[..]
            };
            let entry = entries
                .iter()
                .find(|entry| entry.name == component)
                .ok_or_else(|| Error::NotFound {
                    path: path.to_str_lossy().into_owned(),
                })?;
            let inode = self.inode_of(entry)?;
            stack.push(inode);
        }
        stack.pop().ok_or_else(|| Error::invalid_metadata("Empty lookup stack"))
    }

    /// The owner id of `inode`
    pub fn uid(&self, inode: &Inode) -> Result<u32> {
        self.id(inode.uid_idx)
    }

    /// The group id of `inode`
    pub fn gid(&self, inode: &Inode) -> Result<u32> {
        self.id(inode.gid_idx)
    }

    fn id(&self, idx: u16) -> Result<u32> {
        self.inner
            .ids
            .get(usize::from(idx))
            .map(|id| id.get())
            .ok_or(Error::OutOfRange {
                table: uid_gid::Id::TABLE_NAME,
                index: u64::from(idx),
                len: self.inner.ids.len(),
            })
    }

    pub(crate) fn fragment(&self, index: u32) -> Result<fragment::Entry> {
        self.inner
            .fragments
            .get(index as usize)
            .copied()
            .ok_or(Error::OutOfRange {
                table: fragment::Entry::TABLE_NAME,
                index: u64::from(index),
                len: self.inner.fragments.len(),
            })
    }

    /// Read a data or fragment block into `dst`, which is left holding the decoded bytes
    pub(crate) fn read_block(&self, position: u64, size: Size, dst: &mut Vec<u8>) -> Result<()> {
        self.inner.image.read_block(position, size, dst)
    }
}

impl<R: ReadAt> Image<R> {
    fn block_size(&self) -> u32 {
        self.superblock.block_size.get()
    }

    fn metadata(&self, position: u64) -> MetadataReader<'_, R> {
        MetadataReader::new(&self.reader, &*self.decompressor, position)
    }

    /// A metadata reader positioned at `offset` in the block at `block_start` of a table
    fn metadata_at(
        &self,
        table_start: u64,
        block_start: u64,
        offset: u16,
    ) -> Result<MetadataReader<'_, R>> {
        if usize::from(offset) >= metablock::SIZE {
            return Err(Error::invalid_metadata(format!(
                "Offset {} outside of a metadata block",
                offset
            )));
        }
        let position = table_start.checked_add(block_start).ok_or_else(|| {
            Error::invalid_metadata(format!(
                "Metadata block {} past the end of the archive",
                block_start
            ))
        })?;
        let mut reader = self.metadata(position);
        reader.skip(usize::from(offset))?;
        Ok(reader)
    }

    fn load_table<T: TableEntry>(&self, logger: &Logger, start: u64, count: usize) -> Result<Vec<T>> {
        let entries = read_table::<T, R>(&self.reader, &*self.decompressor, start, count)?;
        slog::debug!(logger, "Loaded {}", T::TABLE_NAME;
            "entries" => entries.len(),
            "blocks" => table::block_count::<T>(count),
            "start" => start);
        Ok(entries)
    }

    fn load_exports(&self, logger: &Logger) -> Result<Vec<export::Entry>> {
        self.load_table(
            logger,
            self.superblock.export_table_start.get(),
            self.superblock.inode_count.get() as usize,
        )
    }

    fn inode(&self, inode_ref: inode::Ref) -> Result<Inode> {
        let mut reader = self.metadata_at(
            self.superblock.inode_table_start.get(),
            inode_ref.block_start(),
            inode_ref.start_offset(),
        )?;
        Inode::read(&mut reader, self.block_size())
    }

    fn read_dir(&self, inode: &Inode) -> Result<Vec<DirEntry>> {
        let listing = inode.listing().ok_or(Error::NotADirectory {
            inode_number: inode.inode_number,
        })?;
        if listing.is_empty() {
            return Ok(Vec::new());
        }
        let mut reader = self.metadata_at(
            self.superblock.directory_table_start.get(),
            u64::from(listing.block_start),
            listing.block_offset,
        )?;
        dir::read_entries(&mut reader, listing.len())
    }

    fn read_block(&self, position: u64, size: Size, dst: &mut Vec<u8>) -> Result<()> {
        let block_size = self.block_size() as usize;
        let disk_size = size.size() as usize;
        if disk_size > block_size {
            return Err(Error::invalid_metadata(format!(
                "Block at {} is {} bytes, larger than the block size",
                position, disk_size
            )));
        }

        if size.uncompressed() {
            dst.resize(disk_size, 0);
            read_exact_at(&self.reader, position, dst)?;
        } else {
            let mut compressed = vec![0; disk_size];
            read_exact_at(&self.reader, position, &mut compressed)?;
            dst.resize(block_size, 0);
            let len = self
                .decompressor
                .decompress(&compressed, dst)
                .map_err(|source| Error::Decompression { position, source })?;
            dst.truncate(len);
        }
        Ok(())
    }
}

fn validate_superblock(superblock: &Superblock, custom_decompressor: bool) -> Result<compression::Kind> {
    if superblock.magic.get() != repr::superblock::MAGIC {
        return Err(Error::BadMagic {
            magic: superblock.magic.get(),
        });
    }
    if superblock.version_major.get() != repr::superblock::VERSION_MAJOR
        || superblock.version_minor.get() != repr::superblock::VERSION_MINOR
    {
        return Err(Error::BadVersion {
            major: superblock.version_major.get(),
            minor: superblock.version_minor.get(),
        });
    }
    let block_log = superblock.block_log.get();
    if !superblock.block_log_matches()
        || !(repr::BLOCK_LOG_MIN..=repr::BLOCK_LOG_MAX).contains(&block_log)
    {
        return Err(Error::InconsistentBlockLog {
            block_size: superblock.block_size.get(),
            block_log,
        });
    }

    let compression_kind = compression::Kind::from_id(superblock.compression_id());
    if compression_kind == compression::Kind::Unknown {
        return Err(Error::UnsupportedCompression {
            id: superblock.compression_id.get(),
        });
    }
    if !compression_kind.supported() && !custom_decompressor {
        return Err(Error::DisabledCompression {
            kind: compression_kind,
        });
    }
    Ok(compression_kind)
}

fn log_superblock(logger: &Logger, superblock: &Superblock) {
    slog::debug!(logger, "Read superblock";
        "magic" => superblock.magic.get(),
        "inode_count" => superblock.inode_count.get(),
        "modification_time" => superblock.modification_time.get(),
        "block_size" => superblock.block_size.get(),
        "fragment_entry_count" => superblock.fragment_entry_count.get(),
        "compression_id" => superblock.compression_id.get(),
        "block_log" => superblock.block_log.get(),
        "flags" => superblock.flags.get(),
        "id_count" => superblock.id_count.get(),
        "version_major" => superblock.version_major.get(),
        "version_minor" => superblock.version_minor.get(),
        "root_inode_ref" => superblock.root_inode_ref.get(),
        "bytes_used" => superblock.bytes_used.get(),
        "id_table_start" => superblock.id_table_start.get(),
        "xattr_id_table_start" => superblock.xattr_id_table_start.get(),
        "inode_table_start" => superblock.inode_table_start.get(),
        "directory_table_start" => superblock.directory_table_start.get(),
        "fragment_table_start" => superblock.fragment_table_start.get(),
        "export_table_start" => superblock.export_table_start.get()
    )
}
