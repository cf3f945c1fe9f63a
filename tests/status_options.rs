mod common;

use common::{RepoBuilder, paths};
use pretty_assertions::assert_eq;
use sift::artifacts::status::options::StatusOptions;
use sift::artifacts::status::status_flag::StatusFlag;

#[tokio::test]
async fn pathspecs_limit_the_report_to_matching_prefixes() {
    let repo = RepoBuilder::init();
    repo.write_file("src/main.rs", "fn main() {}\n");
    repo.write_file("docs/readme.md", "# readme\n");

    let entries = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            recurse_untracked_dirs: true,
            pathspecs: vec!["src".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["src/main.rs"]);
}

#[tokio::test]
async fn literal_pathspecs_require_exact_paths() {
    let repo = RepoBuilder::init();
    repo.write_file("src/main.rs", "fn main() {}\n");
    repo.write_file("src/lib.rs", "pub mod x;\n");

    let options = StatusOptions {
        include_untracked: true,
        recurse_untracked_dirs: true,
        disable_pathspec_match: true,
        pathspecs: vec!["src".to_string()],
        ..Default::default()
    };
    let entries = repo.open().status(&options).await.unwrap();
    assert!(entries.is_empty());

    let exact = StatusOptions {
        pathspecs: vec!["src/lib.rs".to_string()],
        ..options
    };
    let entries = repo.open().status(&exact).await.unwrap();
    assert_eq!(paths(&entries), ["src/lib.rs"]);
}

#[tokio::test]
async fn case_insensitive_sort_folds_ascii_case() {
    let repo = RepoBuilder::init();
    repo.write_file("Beta.txt", "b\n");
    repo.write_file("alpha.txt", "a\n");

    let byte_order = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paths(&byte_order), ["Beta.txt", "alpha.txt"]);

    let folded = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            sort_case_insensitively: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paths(&folded), ["alpha.txt", "Beta.txt"]);
}

#[tokio::test]
async fn sensitive_sort_wins_when_both_flags_are_set() {
    let repo = RepoBuilder::init();
    repo.write_file("Beta.txt", "b\n");
    repo.write_file("alpha.txt", "a\n");

    let entries = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            sort_case_sensitively: true,
            sort_case_insensitively: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["Beta.txt", "alpha.txt"]);
}

#[tokio::test]
async fn no_refresh_reports_touched_files_without_hashing() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("same.txt", "content\n");
    repo.touch("same.txt");

    let entries = repo
        .open()
        .status(&StatusOptions {
            no_refresh: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["same.txt"]);
    assert_eq!(entries[0].status, StatusFlag::WT_MODIFIED);
}

#[tokio::test]
async fn update_index_persists_the_refreshed_stat_cache() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("same.txt", "content\n");
    repo.touch("same.txt");

    let repository = repo.open();
    let stale = repository.load_index().unwrap();
    let stale_mtime = stale
        .entry_by_path(std::path::Path::new("same.txt"))
        .unwrap()
        .metadata
        .mtime;

    let entries = repository
        .status(&StatusOptions {
            update_index: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(entries.is_empty());

    let refreshed = repository.load_index().unwrap();
    let refreshed_mtime = refreshed
        .entry_by_path(std::path::Path::new("same.txt"))
        .unwrap()
        .metadata
        .mtime;
    assert_eq!(refreshed_mtime, stale_mtime + 10);
}
