//! Rename detection over a set of deltas from one comparison side.
//!
//! Deleted and added deltas form the candidate pools. Every (deleted, added)
//! pair of the same kind (file vs submodule) is scored for content
//! similarity; pairs at or above the threshold are matched greedily in
//! descending score order and become a single renamed delta. Matching is
//! one-to-one and deterministic, not an optimal assignment.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::diff::delta::{Delta, DeltaFile, DeltaFlags, DeltaStatus};
use crate::artifacts::objects::blob::Blob;
use crate::errors::{Error, Result};
use std::collections::BTreeMap;

/// Minimum similarity for a (deleted, added) pair to become a rename.
pub const DEFAULT_RENAME_THRESHOLD: u8 = 50;

/// A same-path modification below this similarity counts as a full rewrite
/// and its sides may pair with other paths (`renames_from_rewrites`).
pub const REWRITE_BREAK_THRESHOLD: u8 = 30;

/// Line-multiset similarity of two contents, as a 0..=100 percentage.
///
/// `100 * 2 * common_lines / (lines_a + lines_b)`. Identical content scores
/// 100 (two empty files included), disjoint content scores 0, and the score
/// never decreases when a differing line is made equal.
pub fn similarity(a: &[u8], b: &[u8]) -> u8 {
    if a == b {
        return 100;
    }

    let mut counts: BTreeMap<&[u8], usize> = BTreeMap::new();
    let mut total_a = 0usize;
    for line in a.split_inclusive(|byte| *byte == b'\n') {
        *counts.entry(line).or_default() += 1;
        total_a += 1;
    }

    let mut common = 0usize;
    let mut total_b = 0usize;
    for line in b.split_inclusive(|byte| *byte == b'\n') {
        total_b += 1;
        if let Some(count) = counts.get_mut(line)
            && *count > 0
        {
            *count -= 1;
            common += 1;
        }
    }

    if total_a + total_b == 0 {
        return 100;
    }

    (200 * common / (total_a + total_b)) as u8
}

/// candidate side, with the rewrite it was broken out of (if any)
#[derive(Debug)]
struct Candidate {
    file: DeltaFile,
    rewrite: Option<usize>,
}

#[derive(Debug)]
pub struct RenameDetector<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
    threshold: u8,
    break_rewrites: bool,
}

impl<'r> RenameDetector<'r> {
    pub fn new(
        database: &'r Database,
        workspace: &'r Workspace,
        threshold: u8,
        break_rewrites: bool,
    ) -> Self {
        RenameDetector {
            database,
            workspace,
            threshold: threshold.clamp(1, 100),
            break_rewrites,
        }
    }

    /// Refine one comparison side's deltas, replacing matched
    /// deleted/added pairs with renamed deltas.
    pub fn refine(&self, deltas: Vec<Delta>) -> Result<Vec<Delta>> {
        let mut kept = Vec::new();
        let mut old_pool: Vec<Candidate> = Vec::new();
        let mut new_pool: Vec<Candidate> = Vec::new();
        let mut rewrites: Vec<Delta> = Vec::new();

        for delta in deltas {
            match delta.status {
                DeltaStatus::Deleted => {
                    let file = delta.old_file.clone().ok_or_else(|| {
                        Error::MalformedObject("deleted delta without old side".into())
                    })?;
                    old_pool.push(Candidate {
                        file,
                        rewrite: None,
                    });
                }
                DeltaStatus::Added => {
                    let file = delta.new_file.clone().ok_or_else(|| {
                        Error::MalformedObject("added delta without new side".into())
                    })?;
                    new_pool.push(Candidate {
                        file,
                        rewrite: None,
                    });
                }
                DeltaStatus::Modified if self.break_rewrites => {
                    match (&delta.old_file, &delta.new_file) {
                        (Some(old), Some(new))
                            if self.score_pair(old, new)?.0 < REWRITE_BREAK_THRESHOLD =>
                        {
                            let id = rewrites.len();
                            old_pool.push(Candidate {
                                file: old.clone(),
                                rewrite: Some(id),
                            });
                            new_pool.push(Candidate {
                                file: new.clone(),
                                rewrite: Some(id),
                            });
                            rewrites.push(delta);
                        }
                        _ => kept.push(delta),
                    }
                }
                _ => kept.push(delta),
            }
        }

        if old_pool.is_empty() || new_pool.is_empty() {
            kept.extend(rewrites);
            kept.extend(old_pool.into_iter().map(|c| Delta::deleted(c.file)));
            kept.extend(new_pool.into_iter().map(|c| Delta::added(c.file)));
            return Ok(kept);
        }

        // score every cross pair once, then match greedily
        let mut scored: Vec<(u8, usize, usize, bool)> = Vec::new();
        for (oi, old) in old_pool.iter().enumerate() {
            for (ni, new) in new_pool.iter().enumerate() {
                // a rewrite's own halves stay a modification, never a rename
                if old.rewrite.is_some() && old.rewrite == new.rewrite {
                    continue;
                }
                let (score, binary) = self.score_pair(&old.file, &new.file)?;
                if score >= self.threshold {
                    scored.push((score, oi, ni, binary));
                }
            }
        }

        // descending score; equal scores resolved by (old path, new path)
        // byte order so the result never depends on map iteration order
        scored.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| old_pool[a.1].file.path.cmp(&old_pool[b.1].file.path))
                .then_with(|| new_pool[a.2].file.path.cmp(&new_pool[b.2].file.path))
        });

        let mut old_used = vec![false; old_pool.len()];
        let mut new_used = vec![false; new_pool.len()];

        for (score, oi, ni, binary) in scored {
            if old_used[oi] || new_used[ni] {
                continue;
            }
            old_used[oi] = true;
            new_used[ni] = true;

            let mut delta = Delta::renamed(
                old_pool[oi].file.clone(),
                new_pool[ni].file.clone(),
                score,
            );
            if binary {
                delta.flags |= DeltaFlags::BINARY;
            }
            kept.push(delta);
        }

        // a rewrite whose halves both stayed unpaired goes back to being
        // the original modification
        let mut rewrite_restored = vec![false; rewrites.len()];
        for (oi, old) in old_pool.iter().enumerate() {
            if old_used[oi] {
                continue;
            }
            if let Some(id) = old.rewrite {
                let partner_unpaired = new_pool
                    .iter()
                    .enumerate()
                    .any(|(ni, new)| new.rewrite == Some(id) && !new_used[ni]);
                if partner_unpaired {
                    rewrite_restored[id] = true;
                    continue;
                }
            }
            kept.push(Delta::deleted(old.file.clone()));
        }
        for (ni, new) in new_pool.iter().enumerate() {
            if new_used[ni] {
                continue;
            }
            if let Some(id) = new.rewrite
                && rewrite_restored[id]
            {
                continue;
            }
            kept.push(Delta::added(new.file.clone()));
        }
        for (id, delta) in rewrites.into_iter().enumerate() {
            if rewrite_restored[id] {
                kept.push(delta);
            }
        }

        Ok(kept)
    }

    fn score_pair(&self, old: &DeltaFile, new: &DeltaFile) -> Result<(u8, bool)> {
        if old.mode.is_submodule() != new.mode.is_submodule() {
            return Ok((0, false));
        }
        if old.has_valid_id() && new.has_valid_id() && old.oid == new.oid {
            return Ok((100, false));
        }
        if old.mode.is_submodule() {
            // differing gitlink commits share no scorable content
            return Ok((0, false));
        }

        // a side that cannot be read scores zero instead of failing the query
        let old_content = match self.content_of(old) {
            Ok(content) => content,
            Err(Error::Io(_)) => return Ok((0, false)),
            Err(err) => return Err(err),
        };
        let new_content = match self.content_of(new) {
            Ok(content) => content,
            Err(Error::Io(_)) => return Ok((0, false)),
            Err(err) => return Err(err),
        };
        let binary = old_content.is_binary() || new_content.is_binary();

        Ok((similarity(old_content.data(), new_content.data()), binary))
    }

    /// Content of a delta side: the object store when the hash is known,
    /// the working tree otherwise (untracked files are not stored).
    fn content_of(&self, file: &DeltaFile) -> Result<Blob> {
        if file.has_valid_id() {
            match self.database.parse_object_as_blob(&file.oid) {
                Ok(blob) => return Ok(blob),
                Err(Error::ObjectMissing(_)) => {}
                Err(err) => return Err(err),
            }
        }

        Ok(Blob::new(self.workspace.read_file(&file.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"a\nb\nc\n", b"a\nb\nc\n", 100)]
    #[case(b"", b"", 100)]
    #[case(b"a\nb\n", b"c\nd\n", 0)]
    #[case(b"a\nb\nc\nd\n", b"a\nb\nc\nx\n", 75)]
    #[case(b"a\n", b"", 0)]
    fn similarity_scores(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: u8) {
        assert_eq!(similarity(a, b), expected);
    }

    #[test]
    fn similarity_counts_duplicate_lines_as_a_multiset() {
        // one side has the line twice, the other once
        assert_eq!(similarity(b"x\nx\n", b"x\n"), 66);
    }

    #[test]
    fn similarity_is_monotonic_in_shared_lines() {
        let base = b"a\nb\nc\nd\n";
        let one_off = b"a\nb\nc\nz\n";
        let two_off = b"a\nb\ny\nz\n";
        assert!(similarity(base, one_off) > similarity(base, two_off));
    }
}
