//! Index (staging area) reader
//!
//! The index stores the snapshot that would be committed next. This engine
//! reads it to build the middle layer of the three-way comparison; the only
//! write it ever performs is refreshing the stat cache of entries proven
//! unchanged (behind the `update_index` option).
//!
//! Entries carrying a non-zero merge stage mark conflicted paths; those are
//! kept aside and excluded from regular entry lookups.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{
    ENTRY_BLOCK, ENTRY_MIN_SIZE, EntryMetadata, IndexEntry,
};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Stage-0 entries mapped by path
    entries: BTreeMap<Box<Path>, IndexEntry>,
    /// Stage > 0 entries (unresolved conflicts) grouped by path
    conflicts: BTreeMap<Box<Path>, Vec<IndexEntry>>,
    /// Index file header metadata
    header: IndexHeader,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            conflicts: BTreeMap::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.conflicts.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk.
    ///
    /// Reads the index file, parses the header and entries, and verifies
    /// the trailer checksum. A missing index file yields an empty index
    /// (freshly initialized repository).
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.clear();

        if !self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    /// Whether the path itself is staged (any stage).
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries.contains_key(path) || self.conflicts.contains_key(path)
    }

    /// Whether any staged entry lives under the given directory.
    pub fn has_entries_under(&self, dir: &Path) -> bool {
        self.entries.keys().any(|path| path.starts_with(dir))
            || self.conflicts.keys().any(|path| path.starts_with(dir))
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn conflicted_paths(&self) -> impl Iterator<Item = &Path> {
        self.conflicts.keys().map(AsRef::as_ref)
    }

    pub fn is_conflicted(&self, path: &Path) -> bool {
        self.conflicts.contains_key(path)
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.conflicts.is_empty()
    }

    fn parse_header(&self, reader: &mut Checksum) -> Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::parse(&header_bytes)?;

        if header.marker != SIGNATURE {
            return Err(Error::CorruptIndex("invalid signature".into()));
        }

        if header.version != VERSION {
            return Err(Error::CorruptIndex(format!(
                "unsupported version {}",
                header.version
            )));
        }

        Ok(header.entries_count)
    }

    /// Parse all entries, handling variable-length paths with 8-byte
    /// alignment. Stage > 0 entries land in the conflict set.
    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> Result<()> {
        for _ in 0..entries_count {
            let entry_bytes = reader.read(ENTRY_MIN_SIZE)?;
            let mut entry_bytes = entry_bytes.to_vec();

            while entry_bytes[entry_bytes.len() - 1] != 0 {
                entry_bytes = [entry_bytes, reader.read(ENTRY_BLOCK)?.to_vec()].concat();
            }

            let entry_reader = std::io::Cursor::new(Bytes::from(entry_bytes));
            let entry = IndexEntry::deserialize(entry_reader)?;

            self.store_entry(entry);
        }

        self.header.entries_count = entries_count;

        Ok(())
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        let key = entry.path.clone().into_boxed_path();

        if entry.stage() > 0 {
            // conflict sides displace any stage-0 view of the path
            self.entries.remove(&key);
            self.conflicts.entry(key).or_default().push(entry);
        } else if !self.conflicts.contains_key(&key) {
            self.entries.insert(key, entry);
        }
    }

    fn total_entries(&self) -> u32 {
        (self.entries.len() + self.conflicts.values().map(Vec::len).sum::<usize>()) as u32
    }

    /// Stage an entry. Used when building repositories (fixtures, tools);
    /// the status engine itself never stages content.
    pub fn add(&mut self, entry: IndexEntry) {
        self.store_entry(entry);
        self.header.entries_count = self.total_entries();
        self.changed = true;
    }

    /// Refresh the stat cache of an entry whose content was proven
    /// unchanged.
    pub fn update_entry_stat(&mut self, entry: &IndexEntry, stat: EntryMetadata) {
        let entry_key = entry.path.clone().into_boxed_path();
        if let Some(existing_entry) = self.entries.get_mut(&entry_key) {
            let stage_flags = existing_entry.metadata.flags & 0x3000;
            existing_entry.metadata = EntryMetadata {
                flags: stage_flags | (stat.flags & !0x3000),
                ..stat
            };
            self.changed = true;
        }
    }

    pub fn has_pending_updates(&self) -> bool {
        self.changed
    }

    /// Persist the in-memory entries, stage-0 and conflict sides alike,
    /// in (path, stage) order.
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file while rewriting it.
    pub fn write_updates(&mut self) -> Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        self.header = IndexHeader {
            entries_count: self.total_entries(),
            ..self.header.clone()
        };
        let header_bytes = self.header.serialize()?;
        writer.write(&header_bytes)?;

        let mut ordered: Vec<&IndexEntry> = self
            .entries
            .values()
            .chain(self.conflicts.values().flatten())
            .collect();
        ordered.sort();

        for entry in ordered {
            let entry_bytes = entry.serialize()?;
            writer.write(&entry_bytes)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }
}
