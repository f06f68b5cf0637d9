//! Integration tests for root tree staging on a real filesystem
//!
//! - Copies files to a target path or into a directory
//! - Leaves no target behind when a copy fails
//! - Creates the root skeleton with exact modes regardless of umask
//! - Refuses to touch a read-only filesystem
//! - Sums regular file sizes, ignoring symlinks

mod common;

use std::path::Path;

use assert_fs::prelude::*;
use common::TestRoot;
use enki::core::stage::{copy_file, create_dir_structure, dir_size, exists, ROOT_DIRECTORIES};
use enki::error::FilesystemError;
use enki::infra::{Filesystem, OsFs, ReadOnlyFs};
use predicates::prelude::*;

#[test]
fn test_copy_file_to_target_file() {
    let root = TestRoot::new();
    root.create_file("some/file", b"hello world");

    copy_file(&root.fs(), Path::new("/some/file"), Path::new("/some/otherfile")).unwrap();

    assert_eq!(root.read_file("some/otherfile"), b"hello world");
}

#[test]
fn test_copy_file_into_folder() {
    let root = TestRoot::new();
    root.create_file("some/file", b"hello world");
    root.create_dir("someotherfolder");
    assert!(!root.file_exists("someotherfolder/file"));

    copy_file(&root.fs(), Path::new("/some/file"), Path::new("/someotherfolder")).unwrap();

    assert_eq!(root.read_file("someotherfolder/file"), b"hello world");
}

#[test]
fn test_copy_file_missing_source() {
    let root = TestRoot::new();
    root.create_dir("some");

    let err = copy_file(&root.fs(), Path::new("/some/file"), Path::new("/some/otherfile"))
        .unwrap_err();

    assert!(matches!(err, FilesystemError::NotFound { .. }));
    assert!(!root.file_exists("some/otherfile"));
}

#[test]
fn test_copy_file_read_only_target() {
    let root = TestRoot::new();
    root.create_file("some/file", b"data");
    let fs = ReadOnlyFs::new(root.fs());

    let err = copy_file(&fs, Path::new("/some/file"), Path::new("/some/otherfile")).unwrap_err();

    assert!(matches!(err, FilesystemError::WriteDenied { .. }));
    assert!(!root.file_exists("some/otherfile"));
    assert_eq!(std::fs::read_dir(root.path().join("some")).unwrap().count(), 1);
}

#[test]
fn test_copy_file_follows_symlinked_source() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("real").write_str("linked content").unwrap();
    temp.child("link").symlink_to_file(temp.child("real").path()).unwrap();
    let fs = OsFs::rooted(temp.path());

    copy_file(&fs, Path::new("/link"), Path::new("/copy")).unwrap();

    temp.child("copy").assert("linked content");
    assert!(!std::fs::symlink_metadata(temp.child("copy").path())
        .unwrap()
        .file_type()
        .is_symlink());
}

#[test]
fn test_create_dir_structure() {
    let root = TestRoot::new();
    let fs = root.fs();
    for dir in ROOT_DIRECTORIES {
        assert!(!exists(&fs, &Path::new("/my/root").join(dir.path)).unwrap());
    }

    create_dir_structure(&fs, Path::new("/my/root")).unwrap();

    for dir in ROOT_DIRECTORIES {
        let stat = fs.metadata(&Path::new("/my/root").join(dir.path)).unwrap();
        assert!(stat.is_dir());
        assert_eq!(stat.mode, dir.mode, "mode of {}", dir.path);
    }
    assert_eq!(format!("{:04o}", root.mode("my/root/tmp") & 0o777), "0777");
    assert_ne!(root.mode("my/root/tmp") & 0o1000, 0);
    assert_eq!(format!("{:04o}", root.mode("my/root/sys")), "0555");
}

#[test]
fn test_create_dir_structure_twice_keeps_modes() {
    let root = TestRoot::new();
    let fs = root.fs();

    create_dir_structure(&fs, Path::new("/rootfs")).unwrap();
    create_dir_structure(&fs, Path::new("/rootfs")).unwrap();

    assert_eq!(root.mode("rootfs/tmp"), 0o1777);
    assert_eq!(root.mode("rootfs/sys"), 0o555);
    assert_eq!(root.mode("rootfs/usr/local"), 0o755);
}

#[test]
fn test_create_dir_structure_read_only() {
    let temp = assert_fs::TempDir::new().unwrap();
    let fs = ReadOnlyFs::new(OsFs::rooted(temp.path()));

    let err = create_dir_structure(&fs, Path::new("/my/root")).unwrap_err();

    assert!(matches!(err, FilesystemError::WriteDenied { .. }));
    temp.child("my").assert(predicate::path::missing());
}

#[test]
fn test_dir_size() {
    let root = TestRoot::new();
    root.create_sized_file("folder/file", 1024);
    root.create_sized_file("folder/subfolder/file", 2048);

    assert_eq!(dir_size(&root.fs(), Path::new("/folder")).unwrap(), 3072);
}

#[test]
fn test_dir_size_does_not_follow_symlinks() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("folder/file").write_binary(&[0u8; 512]).unwrap();
    temp.child("elsewhere/big").write_binary(&[0u8; 4096]).unwrap();
    temp.child("folder/dirlink")
        .symlink_to_dir(temp.child("elsewhere").path())
        .unwrap();
    temp.child("folder/filelink")
        .symlink_to_file(temp.child("elsewhere/big").path())
        .unwrap();

    let size = dir_size(&OsFs::rooted(temp.path()), Path::new("/folder")).unwrap();

    assert_eq!(size, 512);
}

#[test]
fn test_dir_size_missing_path() {
    let root = TestRoot::new();
    let err = dir_size(&root.fs(), Path::new("/missing")).unwrap_err();
    assert!(matches!(err, FilesystemError::NotFound { .. }));
}
