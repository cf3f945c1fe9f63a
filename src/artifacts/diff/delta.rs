use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use derive_new::new;
use std::path::PathBuf;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DeltaFlags: u8 {
        /// Content contains NUL bytes
        const BINARY = 0b001;
        /// Every populated side carries a real content hash
        const VALID_ID = 0b010;
        /// The new side exists on disk or in the store
        const EXISTS = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaStatus {
    Unmodified,
    Added,
    Deleted,
    Modified,
    Renamed,
    Typechange,
}

impl DeltaStatus {
    pub fn status_char(&self) -> char {
        match self {
            DeltaStatus::Unmodified => ' ',
            DeltaStatus::Added => 'A',
            DeltaStatus::Deleted => 'D',
            DeltaStatus::Modified => 'M',
            DeltaStatus::Renamed => 'R',
            DeltaStatus::Typechange => 'T',
        }
    }
}

/// One side of a delta: where the content was and what it hashed to.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DeltaFile {
    pub path: PathBuf,
    pub oid: ObjectId,
    pub mode: EntryMode,
    pub size: u64,
}

impl DeltaFile {
    /// Side descriptor for a file whose content hash is not known yet
    /// (unhashed working-tree file).
    pub fn unhashed(path: PathBuf, mode: EntryMode, size: u64) -> Self {
        DeltaFile::new(path, ObjectId::zero(), mode, size)
    }

    pub fn has_valid_id(&self) -> bool {
        !self.oid.is_zero()
    }
}

/// A single path's change between two snapshot layers.
///
/// Renamed deltas carry both sides; added deltas only the new side;
/// deleted deltas only the old side.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub status: DeltaStatus,
    pub old_file: Option<DeltaFile>,
    pub new_file: Option<DeltaFile>,
    /// Similarity percentage, populated on renamed deltas
    pub similarity: Option<u8>,
    pub flags: DeltaFlags,
}

impl Delta {
    /// Classify a change from the two sides of a path.
    ///
    /// Equal sides yield no delta; a mode-class change (blob, symlink,
    /// gitlink) is a typechange, anything else with both sides present is a
    /// plain modification.
    pub fn from_sides(old: Option<DeltaFile>, new: Option<DeltaFile>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(Self::added(new)),
            (Some(old), None) => Some(Self::deleted(old)),
            (Some(old), Some(new)) => {
                if old.oid == new.oid && old.mode == new.mode && old.has_valid_id() {
                    return None;
                }
                if old.mode.class() != new.mode.class() {
                    Some(Self::with_status(DeltaStatus::Typechange, old, new))
                } else {
                    Some(Self::with_status(DeltaStatus::Modified, old, new))
                }
            }
            (None, None) => None,
        }
    }

    pub fn added(new: DeltaFile) -> Self {
        let flags = Self::side_flags(None, Some(&new)) | DeltaFlags::EXISTS;
        Delta {
            status: DeltaStatus::Added,
            old_file: None,
            new_file: Some(new),
            similarity: None,
            flags,
        }
    }

    pub fn deleted(old: DeltaFile) -> Self {
        let flags = Self::side_flags(Some(&old), None);
        Delta {
            status: DeltaStatus::Deleted,
            old_file: Some(old),
            new_file: None,
            similarity: None,
            flags,
        }
    }

    pub fn renamed(old: DeltaFile, new: DeltaFile, similarity: u8) -> Self {
        let flags = Self::side_flags(Some(&old), Some(&new)) | DeltaFlags::EXISTS;
        Delta {
            status: DeltaStatus::Renamed,
            old_file: Some(old),
            new_file: Some(new),
            similarity: Some(similarity),
            flags,
        }
    }

    fn with_status(status: DeltaStatus, old: DeltaFile, new: DeltaFile) -> Self {
        let flags = Self::side_flags(Some(&old), Some(&new)) | DeltaFlags::EXISTS;
        Delta {
            status,
            old_file: Some(old),
            new_file: Some(new),
            similarity: None,
            flags,
        }
    }

    fn side_flags(old: Option<&DeltaFile>, new: Option<&DeltaFile>) -> DeltaFlags {
        let all_valid = old.is_none_or(DeltaFile::has_valid_id)
            && new.is_none_or(DeltaFile::has_valid_id);

        if all_valid {
            DeltaFlags::VALID_ID
        } else {
            DeltaFlags::empty()
        }
    }

    pub fn old_path(&self) -> Option<&std::path::Path> {
        self.old_file.as_ref().map(|file| file.path.as_path())
    }

    pub fn new_path(&self) -> Option<&std::path::Path> {
        self.new_file.as_ref().map(|file| file.path.as_path())
    }

    /// The path this delta is reported under (the new side when present).
    pub fn path(&self) -> &std::path::Path {
        self.new_path()
            .or_else(|| self.old_path())
            .unwrap_or_else(|| std::path::Path::new(""))
    }

    pub fn is_submodule(&self) -> bool {
        self.old_file
            .as_ref()
            .is_some_and(|file| file.mode.is_submodule())
            || self
                .new_file
                .as_ref()
                .is_some_and(|file| file.mode.is_submodule())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::path::Path;

    fn file(path: &str, hex: &str, mode: EntryMode) -> DeltaFile {
        DeltaFile::new(
            PathBuf::from(path),
            ObjectId::parse(hex).unwrap(),
            mode,
            10,
        )
    }

    const A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn identical_sides_produce_no_delta() {
        let side = file("a.txt", A, EntryMode::Regular);
        assert_eq!(Delta::from_sides(Some(side.clone()), Some(side)), None);
    }

    #[test]
    fn added_carries_only_the_new_side() {
        let delta = Delta::from_sides(None, Some(file("a.txt", A, EntryMode::Regular))).unwrap();

        assert_eq!(delta.status, DeltaStatus::Added);
        assert!(delta.old_file.is_none());
        assert!(delta.new_file.is_some());
        assert!(delta.flags.contains(DeltaFlags::EXISTS));
    }

    #[test]
    fn deleted_carries_only_the_old_side() {
        let delta = Delta::from_sides(Some(file("a.txt", A, EntryMode::Regular)), None).unwrap();

        assert_eq!(delta.status, DeltaStatus::Deleted);
        assert!(delta.new_file.is_none());
        assert!(!delta.flags.contains(DeltaFlags::EXISTS));
    }

    #[rstest]
    #[case(EntryMode::Regular, EntryMode::Executable, DeltaStatus::Modified)]
    #[case(EntryMode::Regular, EntryMode::Symlink, DeltaStatus::Typechange)]
    #[case(EntryMode::Regular, EntryMode::Submodule, DeltaStatus::Typechange)]
    fn mode_changes_classify_by_mode_class(
        #[case] old_mode: EntryMode,
        #[case] new_mode: EntryMode,
        #[case] expected: DeltaStatus,
    ) {
        let delta =
            Delta::from_sides(Some(file("a", A, old_mode)), Some(file("a", B, new_mode))).unwrap();

        assert_eq!(delta.status, expected);
    }

    #[test]
    fn renamed_carries_both_sides_and_similarity() {
        let delta = Delta::renamed(
            file("old.txt", A, EntryMode::Regular),
            file("new.txt", A, EntryMode::Regular),
            87,
        );

        assert_eq!(delta.status, DeltaStatus::Renamed);
        assert_eq!(delta.similarity, Some(87));
        assert_eq!(delta.old_path().unwrap(), Path::new("old.txt"));
        assert_eq!(delta.path(), Path::new("new.txt"));
    }

    #[test]
    fn unhashed_side_clears_valid_id() {
        let unhashed = DeltaFile::unhashed(PathBuf::from("a.txt"), EntryMode::Regular, 10);
        let delta = Delta::from_sides(Some(file("a.txt", A, EntryMode::Regular)), Some(unhashed))
            .unwrap();

        assert!(!delta.flags.contains(DeltaFlags::VALID_ID));
    }
}
