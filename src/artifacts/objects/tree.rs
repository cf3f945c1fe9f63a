//! Tree object
//!
//! Trees represent directory snapshots. They contain entries for files
//! (blobs), subdirectories (other trees) and submodules (gitlinks), along
//! with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// One row of a tree: the object it points at and its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct TreeItem {
    pub oid: ObjectId,
    pub mode: EntryMode,
}

impl TreeItem {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }
}

/// A directory snapshot: name-keyed, byte-ordered entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    entries: BTreeMap<String, TreeItem>,
}

impl Tree {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, TreeItem)>) -> Self {
        Tree {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, TreeItem)> {
        self.entries.into_iter()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (name, item) in &self.entries {
            let header = format!("{:o} {}", item.mode.as_u32(), name);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            item.oid.write_raw_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if *mode_bytes.last().unwrap() != b' ' {
                return Err(Error::MalformedObject("unexpected EOF in tree mode".into()));
            }
            mode_bytes.pop(); // drop the space

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::MalformedObject("non-utf8 tree mode".into()))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || *name_bytes.last().unwrap() != b'\0' {
                return Err(Error::MalformedObject("unexpected EOF in tree name".into()));
            }
            name_bytes.pop(); // drop NUL
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| Error::MalformedObject("non-utf8 tree entry name".into()))?
                .to_owned();

            let oid = ObjectId::read_raw_from(&mut reader)
                .map_err(|_| Error::MalformedObject("unexpected EOF in tree object id".into()))?;

            entries.insert(name, TreeItem::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
