//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path
//! - Content hash (object id)
//! - File metadata (mode, size, timestamps)
//! - Merge stage bits (non-zero during a conflict)
//!
//! ## Entry Format
//!
//! Entries are stored in a binary format with 8-byte alignment. The stat
//! metadata enables fast change detection without reading file content.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Maximum path length representable in the flags word
const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

/// A staged file: path, content hash and stat metadata.
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub path: PathBuf,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps, stage)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Merge stage (0 = resolved, 1-3 = conflict sides).
    pub fn stage(&self) -> u8 {
        ((self.metadata.flags >> 12) & 0x3) as u8
    }

    /// Fast-path stat comparison: size and mode.
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    /// Timestamp comparison; a match means content cannot have changed.
    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.stage() == other.stage()
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.stage().cmp(&other.stage()))
    }
}

/// File metadata stored in index entries.
///
/// Contains both file status information (mode, size, inode) and
/// timestamps with nanosecond precision for accurate change detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: i64,
    /// Change time nanoseconds
    pub ctime_nsec: i64,
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Modification time nanoseconds
    pub mtime_nsec: i64,
    /// Device ID
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// File mode
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u64,
    /// Flags word: 2-bit merge stage and 12-bit name length
    pub flags: u32,
}

impl EntryMetadata {
    pub fn with_stage(mut self, stage: u8) -> Self {
        self.flags = (self.flags & !0x3000) | ((stage as u32 & 0x3) << 12);
        self
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let entry_name = self
            .path
            .to_str()
            .ok_or_else(|| Error::CorruptIndex("non-utf8 entry name".into()))?;
        // stage bits carried through, name length recomputed
        let flags = (self.metadata.flags & 0x3000) | min(entry_name.len(), MAX_PATH_SIZE) as u32;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags as u16)?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // Pad to ENTRY_BLOCK size with at least one null byte
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(reader: impl BufRead) -> Result<Self> {
        let bytes = reader
            .bytes()
            .collect::<std::result::Result<Vec<u8>, std::io::Error>>()?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(Error::CorruptIndex("truncated entry".into()));
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::try_from_u32(byteorder::NetworkEndian::read_u32(&bytes[24..28]))
            .map_err(|_| Error::CorruptIndex("invalid entry mode".into()))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let mut oid_bytes = std::io::Cursor::new(&bytes[40..60]);
        let oid = ObjectId::read_raw_from(&mut oid_bytes)?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]) as u32;

        // Entry name is null-terminated
        let name_end = bytes[62..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::CorruptIndex("missing null terminator in entry name".into()))?;
        let name_bytes = &bytes[62..62 + name_end];
        let path = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| Error::CorruptIndex("non-utf8 entry name".into()))?,
        );

        Ok(IndexEntry {
            path,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = Error;

    /// Build stat metadata from a filesystem entry. The path must be the
    /// absolute on-disk path (executable detection touches the filesystem).
    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self> {
        let mode = if metadata.file_type().is_symlink() {
            EntryMode::Symlink
        } else if metadata.is_dir() {
            EntryMode::Directory
        } else if file_path.is_executable() {
            EntryMode::Executable
        } else {
            EntryMode::Regular
        };

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            flags: 0,
        })
    }
}
