use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeItem};
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Loose object store under `.git/objects`, zlib-compressed, fanned out by
/// the first hash byte.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    /// Read and decompress an object, header included.
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let object_content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ObjectMissing(*object_id));
            }
            Err(err) => return Err(err.into()),
        };

        Self::decompress(object_content.into())
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Blob::deserialize(object_reader)?)),
            ObjectType::Tree => Ok(ObjectBox::Tree(Tree::deserialize(object_reader)?)),
            ObjectType::Commit => Ok(ObjectBox::Commit(Commit::deserialize(object_reader)?)),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(blob),
            _ => Err(Error::MalformedObject(format!("{object_id} is not a blob"))),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(tree),
            _ => Err(Error::MalformedObject(format!("{object_id} is not a tree"))),
        }
    }

    /// Flatten the tree reachable from `oid` (a tree or a commit) into a
    /// path-keyed map of non-tree entries.
    pub fn flatten_tree(&self, oid: &ObjectId) -> Result<BTreeMap<PathBuf, TreeItem>> {
        let root = match self.parse_object(oid)? {
            ObjectBox::Tree(tree) => tree,
            ObjectBox::Commit(commit) => self.parse_object_as_tree(commit.tree_oid())?,
            ObjectBox::Blob(_) => {
                return Err(Error::MalformedObject(format!("{oid} is not a tree")));
            }
        };

        let mut entries = BTreeMap::new();
        self.flatten_tree_into(root, Path::new(""), &mut entries)?;
        Ok(entries)
    }

    fn flatten_tree_into(
        &self,
        tree: Tree,
        prefix: &Path,
        entries: &mut BTreeMap<PathBuf, TreeItem>,
    ) -> Result<()> {
        for (name, item) in tree.into_entries() {
            let path = prefix.join(name);

            if item.is_tree() {
                let subtree = self.parse_object_as_tree(&item.oid)?;
                self.flatten_tree_into(subtree, &path, entries)?;
            } else {
                entries.insert(path, item);
            }
        }

        Ok(())
    }

    /// Write an object to the store unless it already exists; returns its id.
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            let object_dir = object_path
                .parent()
                .ok_or_else(|| Error::MalformedObject("invalid object path".into()))?;
            std::fs::create_dir_all(object_dir)?;

            self.write_object(&object_path, &object_id, object.serialize()?)?;
        }

        Ok(object_id)
    }

    /// Build and store the tree hierarchy for a flat path-keyed entry map;
    /// returns the root tree id. Entries must be non-tree items.
    pub fn store_tree_from_entries(
        &self,
        entries: &BTreeMap<PathBuf, TreeItem>,
    ) -> Result<ObjectId> {
        let mut items = BTreeMap::new();

        let mut subtrees: BTreeMap<String, BTreeMap<PathBuf, TreeItem>> = BTreeMap::new();
        for (path, item) in entries {
            let mut components = path.components();
            let first = components
                .next()
                .and_then(|c| c.as_os_str().to_str())
                .ok_or_else(|| Error::MalformedObject("empty tree entry path".into()))?
                .to_string();
            let rest: PathBuf = components.collect();

            if rest.as_os_str().is_empty() {
                items.insert(first, *item);
            } else {
                subtrees.entry(first).or_default().insert(rest, *item);
            }
        }

        for (name, subtree_entries) in subtrees {
            let subtree_oid = self.store_tree_from_entries(&subtree_entries)?;
            items.insert(name, TreeItem::new(subtree_oid, EntryMode::Directory));
        }

        self.store(&Tree::from_entries(items))
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn write_object(
        &self,
        object_path: &Path,
        object_id: &ObjectId,
        object_content: Bytes,
    ) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::MalformedObject("invalid object path".into()))?;
        let temp_object_path = object_dir.join(format!("tmp-obj-{}", object_id.to_short_oid()));

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)?;
        file.write_all(&object_content)?;

        // rename makes the store update atomic
        std::fs::rename(&temp_object_path, object_path)?;

        Ok(())
    }

    fn compress(data: Bytes) -> Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data)?;

        Ok(encoder.finish()?.into())
    }

    fn decompress(data: Bytes) -> Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }
}
