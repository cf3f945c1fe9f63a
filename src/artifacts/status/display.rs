//! Status rendering: porcelain two-letter codes and the long format.

use crate::artifacts::diff::delta::{Delta, DeltaStatus};
use crate::artifacts::status::entry::StatusEntry;
use crate::artifacts::status::status_flag::StatusFlag;
use colored::Colorize;
use std::fmt::Write as _;

const LABEL_WIDTH: usize = 8;

/// Machine-readable output, one `XY path` line per entry.
pub fn porcelain(entries: &[StatusEntry]) -> String {
    let mut out = String::new();

    for entry in entries {
        let line = if entry.status.contains(StatusFlag::CONFLICTED) {
            format!("UU {}", entry.path.display())
        } else if entry.status.contains(StatusFlag::IGNORED) {
            format!("!! {}", entry.path.display())
        } else if entry.status.is_untracked() {
            format!("?? {}", entry.path.display())
        } else {
            let x = side_char(&entry.head_to_index);
            let y = side_char(&entry.index_to_workdir);
            format!("{}{} {}", x, y, rename_aware_path(entry))
        };
        // writing to a String cannot fail
        let _ = writeln!(out, "{line}");
    }

    out
}

fn side_char(delta: &Option<Delta>) -> char {
    delta
        .as_ref()
        .map(|delta| delta.status.status_char())
        .unwrap_or(' ')
}

fn rename_aware_path(entry: &StatusEntry) -> String {
    let renamed = entry
        .head_to_index
        .as_ref()
        .or(entry.index_to_workdir.as_ref())
        .filter(|delta| delta.status == DeltaStatus::Renamed);

    match renamed {
        Some(delta) => match (delta.old_path(), delta.new_path()) {
            (Some(old), Some(new)) => format!("{} -> {}", old.display(), new.display()),
            _ => entry.path.display().to_string(),
        },
        None => entry.path.display().to_string(),
    }
}

/// Human-readable sectioned output, colored the way git colors it.
pub fn long_format(entries: &[StatusEntry]) -> String {
    let mut out = String::new();

    let staged: Vec<_> = entries
        .iter()
        .filter(|e| e.status.intersects(StatusFlag::INDEX_SIDE))
        .collect();
    let unstaged: Vec<_> = entries
        .iter()
        .filter(|e| e.status.intersects(StatusFlag::WT_SIDE) && !e.status.is_untracked())
        .collect();
    let conflicted: Vec<_> = entries
        .iter()
        .filter(|e| e.status.contains(StatusFlag::CONFLICTED))
        .collect();
    let untracked: Vec<_> = entries
        .iter()
        .filter(|e| e.status.is_untracked())
        .collect();
    let ignored: Vec<_> = entries
        .iter()
        .filter(|e| e.status.contains(StatusFlag::IGNORED))
        .collect();

    if !staged.is_empty() {
        let _ = writeln!(out, "Changes to be committed:");
        for entry in &staged {
            let label = delta_label(&entry.head_to_index);
            let _ = writeln!(
                out,
                "{:>width$}{}{}",
                "",
                label.green(),
                rename_aware_path(entry).green(),
                width = LABEL_WIDTH
            );
        }
        let _ = writeln!(out);
    }

    if !unstaged.is_empty() {
        let _ = writeln!(out, "Changes not staged for commit:");
        for entry in &unstaged {
            let label = delta_label(&entry.index_to_workdir);
            let _ = writeln!(
                out,
                "{:>width$}{}{}",
                "",
                label.red(),
                rename_aware_path(entry).red(),
                width = LABEL_WIDTH
            );
        }
        let _ = writeln!(out);
    }

    if !conflicted.is_empty() {
        let _ = writeln!(out, "Unmerged paths:");
        for entry in &conflicted {
            let _ = writeln!(
                out,
                "{:>width$}{}{}",
                "",
                "unmerged:   ".red(),
                entry.path.display().to_string().red(),
                width = LABEL_WIDTH
            );
        }
        let _ = writeln!(out);
    }

    if !untracked.is_empty() {
        let _ = writeln!(out, "Untracked files:");
        for entry in &untracked {
            let _ = writeln!(
                out,
                "{:>width$}{}",
                "",
                entry.path.display().to_string().red(),
                width = LABEL_WIDTH
            );
        }
        let _ = writeln!(out);
    }

    if !ignored.is_empty() {
        let _ = writeln!(out, "Ignored files:");
        for entry in &ignored {
            let _ = writeln!(
                out,
                "{:>width$}{}",
                "",
                entry.path.display(),
                width = LABEL_WIDTH
            );
        }
        let _ = writeln!(out);
    }

    if out.is_empty() {
        out.push_str("nothing to report, working tree clean\n");
    }

    out
}

fn delta_label(delta: &Option<Delta>) -> &'static str {
    match delta.as_ref().map(|delta| delta.status) {
        Some(DeltaStatus::Added) => "new file:   ",
        Some(DeltaStatus::Modified) => "modified:   ",
        Some(DeltaStatus::Deleted) => "deleted:    ",
        Some(DeltaStatus::Renamed) => "renamed:    ",
        Some(DeltaStatus::Typechange) => "typechange: ",
        _ => "",
    }
}
