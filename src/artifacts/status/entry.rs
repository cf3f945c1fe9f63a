use crate::artifacts::diff::delta::Delta;
use crate::artifacts::status::status_flag::StatusFlag;
use derive_new::new;
use std::path::PathBuf;

/// One reported path: its combined state and the deltas on each side.
#[derive(Debug, Clone, new)]
pub struct StatusEntry {
    /// Path the entry is reported under (the new path for renames)
    pub path: PathBuf,
    pub status: StatusFlag,
    pub head_to_index: Option<Delta>,
    pub index_to_workdir: Option<Delta>,
}

impl StatusEntry {
    pub fn current(path: PathBuf) -> Self {
        StatusEntry::new(path, StatusFlag::empty(), None, None)
    }

    /// Entirely empty entries only survive under `include_unmodified`.
    pub fn is_vacant(&self) -> bool {
        self.status.is_current() && self.head_to_index.is_none() && self.index_to_workdir.is_none()
    }
}
