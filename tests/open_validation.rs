mod common;

use common::RepoBuilder;
use sift::areas::repository::Repository;
use sift::errors::Error;

#[test]
fn missing_path_is_not_found() {
    assert!(matches!(
        Repository::open(std::path::Path::new("/definitely/not/here")),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn directory_without_git_is_not_a_repository() {
    let dir = assert_fs::TempDir::new().unwrap();
    assert!(matches!(
        Repository::open(dir.path()),
        Err(Error::NotARepository(_))
    ));
}

#[test]
fn repository_opens_and_exposes_its_paths() {
    let repo = RepoBuilder::init();
    let repository = Repository::open(repo.root()).unwrap();

    assert!(repository.git_path().ends_with(".git"));
    assert_eq!(repository.workspace().path(), repository.path());
}
