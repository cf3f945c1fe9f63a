//! Three-way per-path classification.
//!
//! For every path present in any of the three snapshots (HEAD tree, index,
//! working tree) the comparator derives the head-to-index and
//! index-to-workdir deltas. Working-tree content is hashed lazily: only
//! when size and mode still match the index entry but the timestamps do
//! not, so an untouched checkout never reads file content.

use crate::areas::index::Index;
use crate::areas::workspace::{ScanItem, Workspace};
use crate::artifacts::diff::delta::{Delta, DeltaFile, DeltaStatus};
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::tree::TreeItem;
use crate::artifacts::status::entry::StatusEntry;
use crate::artifacts::status::options::StatusOptions;
use crate::artifacts::status::status_flag::StatusFlag;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Result of one comparison pass, before rename refinement and filtering.
#[derive(Debug, Default)]
pub struct Comparison {
    pub entries: Vec<StatusEntry>,
    /// Index entries whose content proved unchanged but whose stat cache
    /// is stale; refreshed when `update_index` is set
    pub refreshable: Vec<(PathBuf, EntryMetadata)>,
    /// Topmost ignored ancestor per ignored path, for directory collapsing
    pub ignore_roots: BTreeMap<PathBuf, PathBuf>,
}

#[derive(Debug, new)]
pub struct Comparator<'r> {
    head: &'r BTreeMap<PathBuf, TreeItem>,
    index: &'r Index,
    worktree: &'r BTreeMap<PathBuf, ScanItem>,
    workspace: &'r Workspace,
    options: &'r StatusOptions,
}

impl Comparator<'_> {
    pub fn compare(&self) -> crate::errors::Result<Comparison> {
        let mut comparison = Comparison::default();

        let paths: BTreeSet<&Path> = self
            .head
            .keys()
            .map(PathBuf::as_path)
            .chain(self.index.entries().map(|entry| entry.path.as_path()))
            .chain(self.index.conflicted_paths())
            .chain(self.worktree.keys().map(PathBuf::as_path))
            .collect();

        for path in paths {
            if self.index.is_conflicted(path) {
                comparison.entries.push(StatusEntry::new(
                    path.to_path_buf(),
                    StatusFlag::CONFLICTED,
                    None,
                    None,
                ));
                continue;
            }

            let head_item = self.head.get(path);
            let index_entry = self.index.entry_by_path(path);
            let scan_item = self.worktree.get(path);

            let head_to_index = self.compare_head_to_index(path, head_item, index_entry);
            let (index_to_workdir, wt_flag) =
                self.compare_index_to_workdir(path, index_entry, scan_item, &mut comparison)?;

            let mut status = wt_flag;
            if let Some(delta) = &head_to_index {
                status |= Self::index_flag(delta.status);
            }
            if let Some(delta) = &index_to_workdir {
                status |= Self::workdir_flag(delta.status);
            }

            if !status.is_empty() || head_to_index.is_some() || index_to_workdir.is_some() {
                comparison.entries.push(StatusEntry::new(
                    path.to_path_buf(),
                    status,
                    head_to_index,
                    index_to_workdir,
                ));
            } else if self.options.include_unmodified && index_entry.is_some() {
                comparison
                    .entries
                    .push(StatusEntry::current(path.to_path_buf()));
            }
        }

        Ok(comparison)
    }

    fn compare_head_to_index(
        &self,
        path: &Path,
        head_item: Option<&TreeItem>,
        index_entry: Option<&IndexEntry>,
    ) -> Option<Delta> {
        let old = head_item.map(|item| {
            DeltaFile::new(path.to_path_buf(), item.oid, item.mode, 0)
        });
        let new = index_entry.map(|entry| {
            DeltaFile::new(
                path.to_path_buf(),
                entry.oid,
                entry.metadata.mode,
                entry.metadata.size,
            )
        });

        Delta::from_sides(old, new)
    }

    /// The worktree side. Returns the delta plus any flag that has no delta
    /// of its own (IGNORED, WT_UNREADABLE).
    fn compare_index_to_workdir(
        &self,
        path: &Path,
        index_entry: Option<&IndexEntry>,
        scan_item: Option<&ScanItem>,
        comparison: &mut Comparison,
    ) -> crate::errors::Result<(Option<Delta>, StatusFlag)> {
        let old = index_entry.map(|entry| {
            DeltaFile::new(
                path.to_path_buf(),
                entry.oid,
                entry.metadata.mode,
                entry.metadata.size,
            )
        });

        let Some(item) = scan_item else {
            // gitlinks appear as directories on disk, which the scan never
            // reports; their absence from the scan is not a deletion
            if index_entry.is_some_and(|entry| entry.metadata.mode.is_submodule()) {
                return Ok((None, StatusFlag::empty()));
            }
            return Ok((old.map(Delta::deleted), StatusFlag::empty()));
        };

        if item.unreadable {
            return Ok((None, StatusFlag::WT_UNREADABLE));
        }

        let Some(entry) = index_entry else {
            if item.ignored {
                if let Some(root) = &item.ignore_root {
                    comparison
                        .ignore_roots
                        .insert(path.to_path_buf(), root.clone());
                }
                return Ok((None, StatusFlag::IGNORED));
            }
            let meta = item.metadata.as_ref().cloned().unwrap_or_default();
            let new = DeltaFile::unhashed(path.to_path_buf(), meta.mode, meta.size);
            return Ok((Some(Delta::added(new)), StatusFlag::empty()));
        };

        let Some(meta) = item.metadata.as_ref() else {
            return Ok((None, StatusFlag::WT_UNREADABLE));
        };

        if entry.metadata.mode.class() != meta.mode.class() {
            let new = DeltaFile::unhashed(path.to_path_buf(), meta.mode, meta.size);
            return Ok((Delta::from_sides(old, Some(new)), StatusFlag::empty()));
        }

        if !entry.stat_match(meta) {
            let new = DeltaFile::unhashed(path.to_path_buf(), meta.mode, meta.size);
            return Ok((Delta::from_sides(old, Some(new)), StatusFlag::empty()));
        }

        if entry.times_match(meta) {
            return Ok((None, StatusFlag::empty()));
        }

        if self.options.no_refresh {
            let new = DeltaFile::unhashed(path.to_path_buf(), meta.mode, meta.size);
            return Ok((Delta::from_sides(old, Some(new)), StatusFlag::empty()));
        }

        // stat inconclusive: hash the content to settle it
        let oid = self.workspace.hash_file(path)?;
        if oid == entry.oid {
            comparison
                .refreshable
                .push((path.to_path_buf(), meta.clone()));
            return Ok((None, StatusFlag::empty()));
        }

        let new = DeltaFile::new(path.to_path_buf(), oid, meta.mode, meta.size);
        Ok((Delta::from_sides(old, Some(new)), StatusFlag::empty()))
    }

    pub(crate) fn index_flag(status: DeltaStatus) -> StatusFlag {
        match status {
            DeltaStatus::Added => StatusFlag::INDEX_NEW,
            DeltaStatus::Deleted => StatusFlag::INDEX_DELETED,
            DeltaStatus::Modified => StatusFlag::INDEX_MODIFIED,
            DeltaStatus::Renamed => StatusFlag::INDEX_RENAMED,
            DeltaStatus::Typechange => StatusFlag::INDEX_TYPECHANGE,
            DeltaStatus::Unmodified => StatusFlag::empty(),
        }
    }

    pub(crate) fn workdir_flag(status: DeltaStatus) -> StatusFlag {
        match status {
            DeltaStatus::Added => StatusFlag::WT_NEW,
            DeltaStatus::Deleted => StatusFlag::WT_DELETED,
            DeltaStatus::Modified => StatusFlag::WT_MODIFIED,
            DeltaStatus::Renamed => StatusFlag::WT_RENAMED,
            DeltaStatus::Typechange => StatusFlag::WT_TYPECHANGE,
            DeltaStatus::Unmodified => StatusFlag::empty(),
        }
    }
}
