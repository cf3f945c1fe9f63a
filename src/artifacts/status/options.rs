use crate::artifacts::diff::rename::DEFAULT_RENAME_THRESHOLD;
use std::path::Path;

/// Status query configuration.
///
/// Explicit named fields rather than an opaque bitset; everything defaults
/// to off, matching the plain `status` behavior of showing tracked changes
/// only.
#[derive(Debug, Clone)]
pub struct StatusOptions {
    pub include_untracked: bool,
    pub include_ignored: bool,
    pub include_unmodified: bool,
    pub exclude_submodules: bool,
    /// Report each file inside an untracked directory instead of the
    /// single collapsed `dir/` entry
    pub recurse_untracked_dirs: bool,
    pub recurse_ignored_dirs: bool,
    /// Treat pathspecs as literal full paths instead of prefixes/globs
    pub disable_pathspec_match: bool,
    pub renames_head_to_index: bool,
    pub renames_index_to_workdir: bool,
    /// Also feed same-path full rewrites into the rename candidate pools
    pub renames_from_rewrites: bool,
    pub sort_case_sensitively: bool,
    pub sort_case_insensitively: bool,
    /// Skip content hashing entirely; stat mismatches report as modified
    pub no_refresh: bool,
    /// Write refreshed stat caches back to the index file
    pub update_index: bool,
    pub include_unreadable: bool,
    pub include_unreadable_as_untracked: bool,
    pub pathspecs: Vec<String>,
    /// Minimum similarity percentage for rename pairing
    pub rename_threshold: u8,
}

impl Default for StatusOptions {
    fn default() -> Self {
        StatusOptions {
            include_untracked: false,
            include_ignored: false,
            include_unmodified: false,
            exclude_submodules: false,
            recurse_untracked_dirs: false,
            recurse_ignored_dirs: false,
            disable_pathspec_match: false,
            renames_head_to_index: false,
            renames_index_to_workdir: false,
            renames_from_rewrites: false,
            sort_case_sensitively: false,
            sort_case_insensitively: false,
            no_refresh: false,
            update_index: false,
            include_unreadable: false,
            include_unreadable_as_untracked: false,
            pathspecs: Vec::new(),
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
        }
    }
}

impl StatusOptions {
    /// Whether a path passes the pathspec filter.
    ///
    /// Without pathspecs everything matches. A pathspec matches itself,
    /// anything under it, and `*`-suffix globs; with
    /// `disable_pathspec_match` only exact full paths match.
    pub fn matches_pathspec(&self, path: &Path) -> bool {
        if self.pathspecs.is_empty() {
            return true;
        }

        self.pathspecs.iter().any(|spec| {
            let spec_path = Path::new(spec);
            if self.disable_pathspec_match {
                return path == spec_path;
            }

            if let Some(prefix) = spec.strip_suffix('*') {
                return path.to_string_lossy().starts_with(prefix);
            }

            path == spec_path || path.starts_with(spec_path)
        })
    }
}
