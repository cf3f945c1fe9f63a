//! Shared fixture builder: assembles real on-disk repositories (loose
//! objects, v2 index, HEAD ref) through the library's own writers.

// each test binary uses its own subset of the helpers
#![allow(dead_code)]

use bytes::Bytes;
use sift::areas::database::Database;
use sift::areas::index::Index;
use sift::areas::repository::Repository;
use sift::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use sift::artifacts::objects::blob::Blob;
use sift::artifacts::objects::commit::Commit;
use sift::artifacts::objects::entry_mode::EntryMode;
use sift::artifacts::objects::object_id::ObjectId;
use sift::artifacts::objects::tree::TreeItem;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct RepoBuilder {
    dir: assert_fs::TempDir,
}

impl RepoBuilder {
    pub fn init() -> Self {
        let dir = assert_fs::TempDir::new().unwrap();
        let git = dir.path().join(".git");
        std::fs::create_dir_all(git.join("objects")).unwrap();
        std::fs::create_dir_all(git.join("refs").join("heads")).unwrap();
        std::fs::write(git.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        RepoBuilder { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    fn git_path(&self) -> PathBuf {
        self.dir.path().join(".git")
    }

    pub fn database(&self) -> Database {
        Database::new(self.git_path().join("objects").into_boxed_path())
    }

    fn index(&self) -> Index {
        let mut index = Index::new(self.git_path().join("index").into_boxed_path());
        index.rehydrate().unwrap();
        index
    }

    pub fn open(&self) -> Repository {
        Repository::open(self.root()).unwrap()
    }

    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn delete_file(&self, rel: &str) {
        std::fs::remove_file(self.root().join(rel)).unwrap();
    }

    pub fn write_gitignore(&self, patterns: &[&str]) {
        let mut content = patterns.join("\n");
        content.push('\n');
        std::fs::write(self.root().join(".gitignore"), content).unwrap();
    }

    /// Shift the mtime of a file without touching its content, so the stat
    /// heuristic alone can no longer prove it unchanged.
    pub fn touch(&self, rel: &str) {
        let path = self.root().join(rel);
        let meta = std::fs::metadata(&path).unwrap();
        let mtime = filetime::FileTime::from_last_modification_time(&meta);
        let bumped = filetime::FileTime::from_unix_time(mtime.unix_seconds() + 10, 0);
        filetime::set_file_mtime(&path, bumped).unwrap();
    }

    /// Store the given (path, content) pairs as the HEAD commit's tree.
    pub fn commit(&self, files: &[(&str, &str)]) {
        let database = self.database();
        let mut entries = BTreeMap::new();

        for (path, content) in files {
            let blob = Blob::new(Bytes::from(content.as_bytes().to_vec()));
            let oid = database.store(&blob).unwrap();
            entries.insert(PathBuf::from(path), TreeItem::new(oid, EntryMode::Regular));
        }

        let tree_oid = database.store_tree_from_entries(&entries).unwrap();
        let commit = Commit::new(tree_oid, Vec::new(), "fixture commit\n".to_string());
        let commit_oid = database.store(&commit).unwrap();

        std::fs::write(
            self.git_path().join("refs").join("heads").join("main"),
            format!("{commit_oid}\n"),
        )
        .unwrap();
    }

    /// Stage on-disk files: store their blobs and record their current stat
    /// metadata in the index.
    pub fn stage(&self, paths: &[&str]) {
        let database = self.database();
        let mut index = self.index();

        for path in paths {
            let abs = self.root().join(path);
            let content = std::fs::read(&abs).unwrap();
            let oid = database.store(&Blob::new(Bytes::from(content))).unwrap();
            let metadata = std::fs::symlink_metadata(&abs).unwrap();
            let meta = EntryMetadata::try_from((abs.as_path(), metadata)).unwrap();

            index.add(IndexEntry::new(PathBuf::from(path), oid, meta));
        }

        index.write_updates().unwrap();
    }

    /// Stage a path with its content recorded as `content` regardless of
    /// what is on disk (or whether anything is on disk at all).
    pub fn stage_with_content(&self, path: &str, content: &str) {
        let database = self.database();
        let mut index = self.index();

        let blob = Blob::new(Bytes::from(content.as_bytes().to_vec()));
        let oid = database.store(&blob).unwrap();
        let meta = EntryMetadata {
            size: content.len() as u64,
            mode: EntryMode::Regular,
            ..Default::default()
        };

        index.add(IndexEntry::new(PathBuf::from(path), oid, meta));
        index.write_updates().unwrap();
    }

    /// Stage a path pointing at an arbitrary object id, regardless of what
    /// is on disk.
    pub fn stage_raw(&self, path: &str, oid: ObjectId, size: u64) {
        let mut index = self.index();
        let meta = EntryMetadata {
            size,
            mode: EntryMode::Regular,
            ..Default::default()
        };

        index.add(IndexEntry::new(PathBuf::from(path), oid, meta));
        index.write_updates().unwrap();
    }

    /// Record an unresolved conflict: stage-2 and stage-3 sides for one
    /// path.
    pub fn stage_conflict(&self, path: &str, ours: &str, theirs: &str) {
        let database = self.database();
        let mut index = self.index();

        for (content, stage) in [(ours, 2u8), (theirs, 3u8)] {
            let blob = Blob::new(Bytes::from(content.as_bytes().to_vec()));
            let oid = database.store(&blob).unwrap();
            let meta = EntryMetadata {
                size: content.len() as u64,
                mode: EntryMode::Regular,
                ..Default::default()
            }
            .with_stage(stage);

            index.add(IndexEntry::new(PathBuf::from(path), oid, meta));
        }

        index.write_updates().unwrap();
    }

    /// A file that is committed, staged and untouched on disk.
    pub fn tracked_clean(&self, path: &str, content: &str) {
        self.write_file(path, content);
        self.commit(&[(path, content)]);
        self.stage(&[path]);
    }
}

/// Paths of the reported entries, in order.
pub fn paths(entries: &[sift::artifacts::status::entry::StatusEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.path.to_string_lossy().into_owned())
        .collect()
}
