mod common;

use bytes::Bytes;
use common::{RepoBuilder, paths};
use pretty_assertions::assert_eq;
use sift::artifacts::diff::delta::DeltaStatus;
use sift::artifacts::objects::blob::Blob;
use sift::artifacts::objects::entry_mode::EntryMode;
use sift::artifacts::objects::tree::TreeItem;
use sift::artifacts::status::options::StatusOptions;
use sift::artifacts::status::status_flag::StatusFlag;
use sift::errors::Error;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const POEM: &str = "roses are red\nviolets are blue\nsugar is sweet\nand so are you\n";

#[tokio::test]
async fn moved_file_becomes_a_worktree_rename() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("old.txt", POEM);
    repo.delete_file("old.txt");
    repo.write_file("new.txt", POEM);

    let entries = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            renames_index_to_workdir: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["new.txt"]);
    let entry = &entries[0];
    assert_eq!(entry.status, StatusFlag::WT_RENAMED);

    let delta = entry.index_to_workdir.as_ref().unwrap();
    assert_eq!(delta.status, DeltaStatus::Renamed);
    assert_eq!(delta.old_path().unwrap(), Path::new("old.txt"));
    assert_eq!(delta.new_path().unwrap(), Path::new("new.txt"));
    assert_eq!(delta.similarity, Some(100));
}

#[tokio::test]
async fn without_the_option_a_move_stays_deleted_plus_added() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("old.txt", POEM);
    repo.delete_file("old.txt");
    repo.write_file("new.txt", POEM);

    let entries = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["new.txt", "old.txt"]);
    assert_eq!(entries[0].status, StatusFlag::WT_NEW);
    assert_eq!(entries[1].status, StatusFlag::WT_DELETED);
}

#[tokio::test]
async fn dissimilar_content_is_not_paired() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("old.txt", POEM);
    repo.delete_file("old.txt");
    repo.write_file("new.txt", "completely\ndifferent\nwords\nhere\n");

    let entries = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            renames_index_to_workdir: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["new.txt", "old.txt"]);
}

#[tokio::test]
async fn threshold_governs_partial_matches() {
    let repo = RepoBuilder::init();
    // one of four lines survives the move: similarity 25
    repo.tracked_clean("old.txt", "keep\na\nb\nc\n");
    repo.delete_file("old.txt");
    repo.write_file("new.txt", "keep\nx\ny\nz\n");

    let strict = StatusOptions {
        include_untracked: true,
        renames_index_to_workdir: true,
        ..Default::default()
    };
    let entries = repo.open().status(&strict).await.unwrap();
    assert_eq!(paths(&entries), ["new.txt", "old.txt"]);

    let lenient = StatusOptions {
        rename_threshold: 20,
        ..strict
    };
    let entries = repo.open().status(&lenient).await.unwrap();
    assert_eq!(paths(&entries), ["new.txt"]);
    assert_eq!(
        entries[0].index_to_workdir.as_ref().unwrap().similarity,
        Some(25)
    );
}

#[tokio::test]
async fn staged_move_becomes_a_head_to_index_rename() {
    let repo = RepoBuilder::init();
    repo.write_file("old.txt", POEM);
    repo.commit(&[("old.txt", POEM)]);
    repo.delete_file("old.txt");
    repo.write_file("new.txt", POEM);
    repo.stage(&["new.txt"]);

    let entries = repo
        .open()
        .status(&StatusOptions {
            renames_head_to_index: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["new.txt"]);
    assert_eq!(entries[0].status, StatusFlag::INDEX_RENAMED);

    let delta = entries[0].head_to_index.as_ref().unwrap();
    assert_eq!(delta.old_path().unwrap(), Path::new("old.txt"));
    assert_eq!(delta.similarity, Some(100));
}

#[tokio::test]
async fn rewrites_release_their_old_content_for_pairing() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("config.txt", POEM);
    // full rewrite in place, old content resurfacing elsewhere
    repo.write_file("config.txt", "entirely\nnew\nsettings\n");
    repo.write_file("archive.txt", POEM);

    let entries = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            renames_index_to_workdir: true,
            renames_from_rewrites: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["archive.txt", "config.txt"]);

    let rename = entries[0].index_to_workdir.as_ref().unwrap();
    assert_eq!(rename.status, DeltaStatus::Renamed);
    assert_eq!(rename.old_path().unwrap(), Path::new("config.txt"));
    assert_eq!(rename.new_path().unwrap(), Path::new("archive.txt"));

    // the rewrite's own new content stays behind as an addition
    assert_eq!(entries[1].status, StatusFlag::WT_NEW);
}

#[tokio::test]
async fn unpaired_rewrite_stays_a_modification() {
    let repo = RepoBuilder::init();
    repo.tracked_clean("config.txt", POEM);
    repo.write_file("config.txt", "entirely\nnew\nsettings\n");

    let entries = repo
        .open()
        .status(&StatusOptions {
            renames_index_to_workdir: true,
            renames_from_rewrites: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(paths(&entries), ["config.txt"]);
    assert_eq!(entries[0].status, StatusFlag::WT_MODIFIED);
}

#[tokio::test]
async fn store_failures_during_rename_scoring_name_their_stage() {
    let repo = RepoBuilder::init();
    let database = repo.database();

    // an index entry whose oid names a tree object, with the file gone
    // from disk, so scoring must consult the store and finds a non-blob
    let blob_oid = database.store(&Blob::new(Bytes::from_static(b"x\n"))).unwrap();
    let mut items = BTreeMap::new();
    items.insert(
        PathBuf::from("inner.txt"),
        TreeItem::new(blob_oid, EntryMode::Regular),
    );
    let tree_oid = database.store_tree_from_entries(&items).unwrap();
    repo.stage_raw("weird.txt", tree_oid, 2);

    repo.write_file("fresh.txt", "x\n");

    let result = repo
        .open()
        .status(&StatusOptions {
            include_untracked: true,
            renames_index_to_workdir: true,
            ..Default::default()
        })
        .await;

    assert!(matches!(
        result,
        Err(Error::StoreFailure {
            stage: "rename-detection",
            ..
        })
    ));
}
