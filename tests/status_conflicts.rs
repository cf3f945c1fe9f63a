mod common;

use common::{RepoBuilder, paths};
use pretty_assertions::assert_eq;
use sift::artifacts::status::options::StatusOptions;
use sift::artifacts::status::status_flag::StatusFlag;

#[tokio::test]
async fn conflicted_path_is_flagged_and_nothing_else() {
    let repo = RepoBuilder::init();
    repo.write_file("clash.txt", "mine, actually\n");
    repo.stage_conflict("clash.txt", "mine\n", "theirs\n");

    let entries = repo
        .open()
        .status(&StatusOptions::default())
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["clash.txt"]);
    let entry = &entries[0];
    assert_eq!(entry.status, StatusFlag::CONFLICTED);
    // no further head/worktree classification on conflicted paths
    assert!(entry.head_to_index.is_none());
    assert!(entry.index_to_workdir.is_none());
}

#[tokio::test]
async fn conflicts_sit_beside_regular_changes() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("app.rs", "fn main() {}\n");
    repo.write_file("app.rs", "fn main() { run() }\n");
    repo.write_file("clash.txt", "mine, actually\n");
    repo.stage_conflict("clash.txt", "mine\n", "theirs\n");

    let entries = repo
        .open()
        .status(&StatusOptions::default())
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["app.rs", "clash.txt"]);
    assert_eq!(entries[0].status, StatusFlag::WT_MODIFIED);
    assert_eq!(entries[1].status, StatusFlag::CONFLICTED);
}
