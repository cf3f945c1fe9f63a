use bitflags::bitflags;

bitflags! {
    /// Combined per-path state across both comparison sides.
    ///
    /// An empty set means "current". At most one index-side and one
    /// worktree-side state bit is set per path; IGNORED and CONFLICTED
    /// appear alone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlag: u16 {
        const INDEX_NEW        = 1 << 0;
        const INDEX_MODIFIED   = 1 << 1;
        const INDEX_DELETED    = 1 << 2;
        const INDEX_RENAMED    = 1 << 3;
        const INDEX_TYPECHANGE = 1 << 4;
        const WT_NEW           = 1 << 5;
        const WT_MODIFIED      = 1 << 6;
        const WT_DELETED       = 1 << 7;
        const WT_TYPECHANGE    = 1 << 8;
        const WT_RENAMED       = 1 << 9;
        const WT_UNREADABLE    = 1 << 10;
        const IGNORED          = 1 << 11;
        const CONFLICTED       = 1 << 12;
    }
}

impl StatusFlag {
    pub const INDEX_SIDE: StatusFlag = StatusFlag::INDEX_NEW
        .union(StatusFlag::INDEX_MODIFIED)
        .union(StatusFlag::INDEX_DELETED)
        .union(StatusFlag::INDEX_RENAMED)
        .union(StatusFlag::INDEX_TYPECHANGE);

    pub const WT_SIDE: StatusFlag = StatusFlag::WT_NEW
        .union(StatusFlag::WT_MODIFIED)
        .union(StatusFlag::WT_DELETED)
        .union(StatusFlag::WT_TYPECHANGE)
        .union(StatusFlag::WT_RENAMED);

    pub fn is_current(&self) -> bool {
        self.is_empty()
    }

    pub fn is_untracked(&self) -> bool {
        self.contains(StatusFlag::WT_NEW) && !self.intersects(StatusFlag::INDEX_SIDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_current() {
        assert!(StatusFlag::empty().is_current());
        assert!(!StatusFlag::WT_MODIFIED.is_current());
    }

    #[test]
    fn untracked_means_worktree_new_only() {
        assert!(StatusFlag::WT_NEW.is_untracked());
        assert!(!(StatusFlag::WT_NEW | StatusFlag::INDEX_NEW).is_untracked());
        assert!(!StatusFlag::INDEX_NEW.is_untracked());
    }
}
