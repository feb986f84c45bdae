use crate::compression::Decompressor;

/// What to do with superblock flags this crate does not know about
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnknownFlags {
    /// Refuse to open the archive
    Reject,
    /// Open the archive, dropping the unknown bits
    Ignore,
}

impl Default for UnknownFlags {
    fn default() -> Self {
        UnknownFlags::Reject
    }
}

/// When to load the export table of an exportable archive
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExportTable {
    /// Load the table on the first lookup by inode number
    Lazy,
    /// Load the table while opening the archive
    ///
    /// A corrupt export table will then fail the open
    Eager,
}

impl Default for ExportTable {
    fn default() -> Self {
        ExportTable::Lazy
    }
}

/// Options for opening an [`Archive`](crate::Archive)
#[derive(Debug, Default)]
pub struct Config {
    pub(crate) unknown_flags: UnknownFlags,
    pub(crate) export_table: ExportTable,
    pub(crate) decompressor: Option<Box<dyn Decompressor>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown_flags(&mut self, unknown_flags: UnknownFlags) -> &mut Self {
        self.unknown_flags = unknown_flags;
        self
    }

    pub fn export_table(&mut self, export_table: ExportTable) -> &mut Self {
        self.export_table = export_table;
        self
    }

    /// Use `decompressor` for every compressed block, instead of picking one from the compression
    /// id in the superblock
    pub fn decompressor(&mut self, decompressor: Box<dyn Decompressor>) -> &mut Self {
        self.decompressor = Some(decompressor);
        self
    }
}
