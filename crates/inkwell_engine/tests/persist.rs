use std::fs;

use inkwell_engine::{ensure_output_dir, ContentStore};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("drafts");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn each_revision_replaces_the_document() {
    let temp = TempDir::new().unwrap();
    let mut store = ContentStore::new(temp.path().join("post.html"));

    store.save("<p>draft</p>").unwrap();
    assert_eq!(fs::read_to_string(store.target()).unwrap(), "<p>draft</p>");

    store.save("<p>final</p><img src=\"https://cdn.example/a.png\" alt=\"a\">").unwrap();
    assert_eq!(
        fs::read_to_string(store.target()).unwrap(),
        "<p>final</p><img src=\"https://cdn.example/a.png\" alt=\"a\">"
    );
    assert_eq!(store.revisions(), 2);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn parent_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let mut store = ContentStore::new(temp.path().join("site").join("posts").join("a.html"));
    store.save("<p>x</p>").unwrap();
    assert!(temp.path().join("site/posts/a.html").is_file());
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let mut store = ContentStore::new(blocker.join("post.html"));
    assert!(store.save("<p>data</p>").is_err());
    assert_eq!(store.revisions(), 0);
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
