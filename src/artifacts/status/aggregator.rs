//! Status orchestration.
//!
//! The three snapshot loads (HEAD tree, index, working-tree scan) have no
//! ordering dependency and fan out concurrently; the first failure aborts
//! the whole query tagged with the failing stage, never yielding partial
//! results. The merged comparison is then refined (renames), collapsed
//! (untracked/ignored directories), filtered and sorted.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::areas::workspace::{CancelFlag, ScanItem};
use crate::artifacts::diff::delta::{Delta, DeltaFile, DeltaStatus};
use crate::artifacts::diff::rename::RenameDetector;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::tree::TreeItem;
use crate::artifacts::status::comparator::{Comparator, Comparison};
use crate::artifacts::status::entry::StatusEntry;
use crate::artifacts::status::options::StatusOptions;
use crate::artifacts::status::status_flag::StatusFlag;
use crate::errors::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Index,
    Workdir,
}

pub async fn compute(
    repository: &Repository,
    options: &StatusOptions,
    cancel: CancelFlag,
) -> Result<Vec<StatusEntry>> {
    let head_load = async {
        load_head_tree(repository).map_err(|err| err.at_stage("head-tree"))
    };
    let index_load = async { repository.load_index().map_err(|err| err.at_stage("index")) };
    let scan_load = async {
        repository
            .workspace()
            .scan(&cancel)
            .map_err(|err| err.at_stage("worktree-scan"))
    };

    let (head, mut index, items) = tokio::try_join!(head_load, index_load, scan_load)?;

    let worktree: BTreeMap<PathBuf, ScanItem> = items
        .into_iter()
        .map(|item| (item.path.clone(), item))
        .collect();

    let comparison = Comparator::new(&head, &index, &worktree, repository.workspace(), options)
        .compare()
        .map_err(|err| err.at_stage("comparison"))?;
    let Comparison {
        entries,
        refreshable,
        ignore_roots,
    } = comparison;

    let mut entries = entries;
    if options.renames_head_to_index || options.renames_index_to_workdir {
        let detector = RenameDetector::new(
            repository.database(),
            repository.workspace(),
            options.rename_threshold,
            options.renames_from_rewrites,
        );
        if options.renames_head_to_index {
            entries = refine_renames(entries, Side::Index, &detector)
                .map_err(|err| err.at_stage("rename-detection"))?;
        }
        if options.renames_index_to_workdir {
            entries = refine_renames(entries, Side::Workdir, &detector)
                .map_err(|err| err.at_stage("rename-detection"))?;
        }
    }

    if !options.recurse_untracked_dirs {
        entries = collapse_untracked(entries, &index);
    }
    if !options.recurse_ignored_dirs {
        entries = collapse_ignored(entries, &ignore_roots);
    }

    entries = filter(entries, options);

    if options.update_index && !options.no_refresh {
        refresh_index(&mut index, &refreshable)?;
    }

    sort(&mut entries, options);

    Ok(entries)
}

fn load_head_tree(repository: &Repository) -> Result<BTreeMap<PathBuf, TreeItem>> {
    match repository.refs().read_head()? {
        Some(oid) => repository.database().flatten_tree(&oid),
        None => Ok(BTreeMap::new()),
    }
}

/// Replace matched deleted/added pairs on one comparison side with renamed
/// deltas, re-keying each entry under the delta's reported path.
fn refine_renames(
    entries: Vec<StatusEntry>,
    side: Side,
    detector: &RenameDetector<'_>,
) -> Result<Vec<StatusEntry>> {
    let mut map: BTreeMap<PathBuf, StatusEntry> = entries
        .into_iter()
        .map(|entry| (entry.path.clone(), entry))
        .collect();

    let side_mask = match side {
        Side::Index => StatusFlag::INDEX_SIDE,
        Side::Workdir => StatusFlag::WT_SIDE,
    };

    let mut pool = Vec::new();
    let mut touched = BTreeSet::new();
    for entry in map.values_mut() {
        let slot = match side {
            Side::Index => &mut entry.head_to_index,
            Side::Workdir => &mut entry.index_to_workdir,
        };
        let Some(delta) = slot.take() else { continue };

        match delta.status {
            DeltaStatus::Added | DeltaStatus::Deleted | DeltaStatus::Modified => {
                entry.status &= !side_mask;
                touched.insert(entry.path.clone());
                pool.push(delta);
            }
            _ => *slot = Some(delta),
        }
    }

    for delta in detector.refine(pool)? {
        let path = delta.path().to_path_buf();
        let flag = match side {
            Side::Index => Comparator::index_flag(delta.status),
            Side::Workdir => Comparator::workdir_flag(delta.status),
        };

        let entry = map
            .entry(path.clone())
            .or_insert_with(|| StatusEntry::current(path));
        entry.status |= flag;
        match side {
            Side::Index => entry.head_to_index = Some(delta),
            Side::Workdir => entry.index_to_workdir = Some(delta),
        }
    }

    // a rename's old path may leave a drained entry behind
    map.retain(|path, entry| !(touched.contains(path) && entry.is_vacant()));

    Ok(map.into_values().collect())
}

/// Collapse each untracked file into its topmost ancestor directory that
/// contains no index entries, reported as a single `dir/` record.
fn collapse_untracked(entries: Vec<StatusEntry>, index: &Index) -> Vec<StatusEntry> {
    let mut kept = Vec::new();
    let mut dirs: BTreeMap<PathBuf, StatusEntry> = BTreeMap::new();

    for entry in entries {
        if entry.status.is_untracked()
            && let Some(root) = untracked_root(&entry.path, index)
        {
            let dir_path = as_dir_path(&root);
            dirs.entry(dir_path.clone()).or_insert_with(|| {
                let new = DeltaFile::unhashed(dir_path.clone(), EntryMode::Directory, 0);
                StatusEntry::new(
                    dir_path,
                    StatusFlag::WT_NEW,
                    None,
                    Some(Delta::added(new)),
                )
            });
            continue;
        }
        kept.push(entry);
    }

    kept.extend(dirs.into_values());
    kept
}

/// Shortest ancestor directory of `path` with no staged entries beneath it.
fn untracked_root(path: &Path, index: &Index) -> Option<PathBuf> {
    let components: Vec<_> = path.components().collect();
    let mut prefix = PathBuf::new();

    for component in &components[..components.len().saturating_sub(1)] {
        prefix.push(component);
        if !index.has_entries_under(&prefix) {
            return Some(prefix);
        }
    }

    None
}

fn collapse_ignored(
    entries: Vec<StatusEntry>,
    ignore_roots: &BTreeMap<PathBuf, PathBuf>,
) -> Vec<StatusEntry> {
    let mut kept = Vec::new();
    let mut dirs: BTreeMap<PathBuf, StatusEntry> = BTreeMap::new();

    for entry in entries {
        if entry.status.contains(StatusFlag::IGNORED)
            && let Some(root) = ignore_roots.get(&entry.path)
        {
            let dir_path = as_dir_path(root);
            dirs.entry(dir_path.clone()).or_insert_with(|| {
                StatusEntry::new(dir_path, StatusFlag::IGNORED, None, None)
            });
            continue;
        }
        kept.push(entry);
    }

    kept.extend(dirs.into_values());
    kept
}

fn as_dir_path(root: &Path) -> PathBuf {
    let mut dir = root.to_path_buf();
    dir.push("");
    dir
}

fn filter(entries: Vec<StatusEntry>, options: &StatusOptions) -> Vec<StatusEntry> {
    let mut result = Vec::new();

    for mut entry in entries {
        if entry.status.contains(StatusFlag::WT_UNREADABLE) {
            if options.include_unreadable_as_untracked {
                entry.status = (entry.status & !StatusFlag::WT_UNREADABLE) | StatusFlag::WT_NEW;
                let new = DeltaFile::unhashed(entry.path.clone(), EntryMode::Regular, 0);
                entry.index_to_workdir = Some(Delta::added(new));
            } else if !options.include_unreadable {
                continue;
            }
        }

        if entry.status.contains(StatusFlag::IGNORED) && !options.include_ignored {
            continue;
        }
        if entry.status.is_untracked() && !options.include_untracked {
            continue;
        }
        if entry.is_vacant() && !options.include_unmodified {
            continue;
        }
        if options.exclude_submodules
            && (entry
                .head_to_index
                .as_ref()
                .is_some_and(Delta::is_submodule)
                || entry
                    .index_to_workdir
                    .as_ref()
                    .is_some_and(Delta::is_submodule))
        {
            continue;
        }
        if !matches_any_path(&entry, options) {
            continue;
        }

        result.push(entry);
    }

    result
}

/// An entry passes the pathspec filter through its reported path or the
/// old path of either delta (so a rename shows up when only its source
/// matches).
fn matches_any_path(entry: &StatusEntry, options: &StatusOptions) -> bool {
    if options.matches_pathspec(&entry.path) {
        return true;
    }

    entry
        .head_to_index
        .as_ref()
        .and_then(Delta::old_path)
        .is_some_and(|path| options.matches_pathspec(path))
        || entry
            .index_to_workdir
            .as_ref()
            .and_then(Delta::old_path)
            .is_some_and(|path| options.matches_pathspec(path))
}

/// Write back the stat caches of entries whose content hashing proved them
/// unchanged. The only mutation the status engine ever performs.
fn refresh_index(
    index: &mut Index,
    refreshable: &[(PathBuf, crate::artifacts::index::index_entry::EntryMetadata)],
) -> Result<()> {
    for (path, meta) in refreshable {
        if let Some(entry) = index.entry_by_path(path).cloned() {
            index.update_entry_stat(&entry, meta.clone());
        }
    }

    if index.has_pending_updates() {
        index
            .write_updates()
            .map_err(|err| err.at_stage("index-refresh"))?;
    }

    Ok(())
}

fn sort(entries: &mut [StatusEntry], options: &StatusOptions) {
    if options.sort_case_insensitively && !options.sort_case_sensitively {
        entries.sort_by(|a, b| {
            let ka = a.path.as_os_str().as_encoded_bytes().to_ascii_lowercase();
            let kb = b.path.as_os_str().as_encoded_bytes().to_ascii_lowercase();
            ka.cmp(&kb).then_with(|| {
                a.path
                    .as_os_str()
                    .as_encoded_bytes()
                    .cmp(b.path.as_os_str().as_encoded_bytes())
            })
        });
    } else {
        entries.sort_by(|a, b| {
            a.path
                .as_os_str()
                .as_encoded_bytes()
                .cmp(b.path.as_os_str().as_encoded_bytes())
        });
    }
}
