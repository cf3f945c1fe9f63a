//! Working directory scanning and hashing.
//!
//! The scanner walks the checkout and reports one record per on-disk file:
//! its stat metadata, whether ignore rules cover it, and whether it could
//! not be read. Unreadable entries never abort the walk; they are flagged
//! and scanning continues. Directory collapsing (reporting `dir/` instead
//! of its contents) is an aggregation concern and happens downstream, which
//! keeps the scan independent of the index snapshot.

use crate::artifacts::ignore::IgnoreMatcher;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

/// Shared cancellation handle for a running scan.
///
/// The scan only produces a read-only sequence, so abandoning it midway
/// leaves no state to clean up; the query fails with `Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One scanned working-tree record.
#[derive(Debug, Clone)]
pub struct ScanItem {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Stat metadata; absent when the entry was unreadable
    pub metadata: Option<EntryMetadata>,
    /// Whether ignore rules cover this path
    pub ignored: bool,
    /// Topmost ignored ancestor directory, when `ignored` came from one
    pub ignore_root: Option<PathBuf>,
    /// Whether stat or directory listing failed on this entry
    pub unreadable: bool,
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk the whole working tree in byte order, one record per file.
    ///
    /// `.git` is never entered. Ignore rules are evaluated per entry, with
    /// matched directories propagated to everything beneath them.
    pub fn scan(&self, cancel: &CancelFlag) -> Result<Vec<ScanItem>> {
        let matcher = IgnoreMatcher::load(&self.path);
        let mut items = Vec::new();
        // stack of ignored ancestor directories along the current walk path
        let mut ignored_roots: Vec<PathBuf> = Vec::new();

        let walker = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");

        for entry in walker {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // a directory we could not list, or a stat failure;
                    // flag it and keep walking
                    if let Some(path) = err.path()
                        && let Ok(rel) = path.strip_prefix(self.path.as_ref())
                    {
                        items.push(ScanItem {
                            path: rel.to_path_buf(),
                            metadata: None,
                            ignored: false,
                            ignore_root: None,
                            unreadable: true,
                        });
                    }
                    continue;
                }
            };

            let Ok(rel) = entry.path().strip_prefix(self.path.as_ref()) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue; // the root itself
            }
            let rel = rel.to_path_buf();

            while let Some(root) = ignored_roots.last() {
                if rel.starts_with(root) {
                    break;
                }
                ignored_roots.pop();
            }

            let is_dir = entry.file_type().is_dir();
            let inherited = ignored_roots.last().cloned();
            let self_ignored = matcher.is_ignored(&rel, is_dir);

            if is_dir {
                if self_ignored && inherited.is_none() {
                    ignored_roots.push(rel);
                }
                continue; // directories are implied by their contents
            }

            let ignored = self_ignored || inherited.is_some();
            let ignore_root = inherited;

            match entry.metadata() {
                Ok(metadata) => {
                    // a dangling symlink has no target to stat or hash later
                    if metadata.file_type().is_symlink() && !entry.path().exists() {
                        items.push(ScanItem {
                            path: rel,
                            metadata: None,
                            ignored,
                            ignore_root,
                            unreadable: true,
                        });
                        continue;
                    }
                    let stat = EntryMetadata::try_from((entry.path(), metadata))?;
                    items.push(ScanItem {
                        path: rel,
                        metadata: Some(stat),
                        ignored,
                        ignore_root,
                        unreadable: false,
                    });
                }
                Err(_) => items.push(ScanItem {
                    path: rel,
                    metadata: None,
                    ignored,
                    ignore_root,
                    unreadable: true,
                }),
            }
        }

        Ok(items)
    }

    /// File content as it would be stored: symlinks read as their target
    /// path, never followed.
    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let file_path = self.path.join(file_path);
        let metadata = std::fs::symlink_metadata(&file_path)?;

        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&file_path)?;
            return Ok(target.into_os_string().into_encoded_bytes().into());
        }

        Ok(std::fs::read(file_path)?.into())
    }

    /// Content-hash a working-tree file as a blob, without storing it.
    pub fn hash_file(&self, file_path: &Path) -> Result<ObjectId> {
        let data = self.read_file(file_path)?;
        Blob::new(data).object_id()
    }
}
