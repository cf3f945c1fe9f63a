//! Ignore-rule matching for the working-tree scan.
//!
//! Implements the subset of ignore-file semantics the scanner needs:
//! literal names, directory-only rules (`build/`), anchored rules
//! (`/target` or `docs/out`), single `*` wildcards and `!` negation, with
//! last-match-wins precedence. Rules come from `.gitignore` at the
//! repository root.

use std::path::Path;

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
}

impl IgnoreMatcher {
    /// Load the root `.gitignore`. A missing or unreadable file yields an
    /// empty matcher; ignore rules are advisory, never a failure source.
    pub fn load(workspace_root: &Path) -> Self {
        match std::fs::read_to_string(workspace_root.join(".gitignore")) {
            Ok(content) => Self::from_patterns(content.lines()),
            Err(_) => Self::default(),
        }
    }

    pub fn from_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        let rules = patterns
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let (negated, line) = match line.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, line),
                };
                let (dir_only, line) = match line.strip_suffix('/') {
                    Some(rest) => (true, rest),
                    None => (false, line),
                };
                let anchored = line.starts_with('/') || line.trim_start_matches('/').contains('/');

                IgnoreRule {
                    pattern: line.trim_start_matches('/').to_string(),
                    negated,
                    dir_only,
                    anchored,
                }
            })
            .collect();

        IgnoreMatcher { rules }
    }

    /// Whether a workspace-relative path matches the ignore rules.
    ///
    /// Only the path itself is consulted; the scanner propagates a matched
    /// directory down to its children.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let mut ignored = false;

        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            if rule.matches(path) {
                ignored = !rule.negated;
            }
        }

        ignored
    }
}

impl IgnoreRule {
    fn matches(&self, path: &Path) -> bool {
        if self.anchored {
            path.to_str().is_some_and(|p| glob_match(&self.pattern, p))
        } else {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| glob_match(&self.pattern, name))
        }
    }
}

/// Minimal wildcard matcher: `*` spans any run of characters except `/`.
fn glob_match(pattern: &str, target: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == target,
        Some((prefix, rest)) => {
            let Some(remainder) = target.strip_prefix(prefix) else {
                return false;
            };
            // try every split point for this star, longest-prefix first
            for split in (0..=remainder.len()).rev() {
                if !remainder.is_char_boundary(split) || remainder[..split].contains('/') {
                    continue;
                }
                if glob_match(rest, &remainder[split..]) {
                    return true;
                }
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("target", "target", true)]
    #[case("*.log", "debug.log", true)]
    #[case("*.log", "logs/debug.log", true)] // basename rule applies anywhere
    #[case("*.log", "debug.txt", false)]
    #[case("build/out", "build/out", true)]
    #[case("build/out", "other/build/out", false)] // anchored
    #[case("build/*.o", "build/a.o", true)]
    #[case("build/*.o", "build/sub/a.o", false)] // star does not cross '/'
    fn pattern_matching(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
        let matcher = IgnoreMatcher::from_patterns([pattern]);
        assert_eq!(matcher.is_ignored(Path::new(path), false), expected);
    }

    #[test]
    fn dir_only_rules_skip_files() {
        let matcher = IgnoreMatcher::from_patterns(["build/"]);
        assert!(matcher.is_ignored(Path::new("build"), true));
        assert!(!matcher.is_ignored(Path::new("build"), false));
    }

    #[test]
    fn negation_last_match_wins() {
        let matcher = IgnoreMatcher::from_patterns(["*.log", "!keep.log"]);
        assert!(matcher.is_ignored(Path::new("debug.log"), false));
        assert!(!matcher.is_ignored(Path::new("keep.log"), false));
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let matcher = IgnoreMatcher::from_patterns(["# a comment", "", "tmp"]);
        assert!(matcher.is_ignored(Path::new("tmp"), false));
        assert!(!matcher.is_ignored(Path::new("# a comment"), false));
    }
}
