//! Integration tests for squashfs image creation

mod common;

use std::ffi::OsString;
use std::io;
use std::path::Path;

use common::TestRoot;
use enki::core::settings::Settings;
use enki::core::squashfs::{
    create_squashfs, default_compression_options, default_squashfs_options,
    is_mksquashfs_available,
};
use enki::error::ToolError;
use enki::infra::{FakeRunner, RunOutput, Runner, SystemRunner};
use predicates::prelude::*;

/// Runner whose programs can never be launched
struct MissingToolRunner;

impl Runner for MissingToolRunner {
    fn run(&self, program: &str, _args: &[OsString]) -> io::Result<RunOutput> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{program}: not found"),
        ))
    }
}

#[test]
fn test_create_squashfs_uses_configured_options() {
    let runner = FakeRunner::new();
    let settings = Settings::default().with_squashfs_options(vec![
        "-noappend".to_string(),
        "-comp".to_string(),
        "gzip".to_string(),
    ]);

    create_squashfs(
        &runner,
        Path::new("/build/rootfs"),
        Path::new("/build/rootfs.img"),
        &settings.squashfs_options(),
    )
    .unwrap();

    runner
        .includes_cmds(&[vec![
            "mksquashfs",
            "/build/rootfs",
            "/build/rootfs.img",
            "-noappend",
            "-comp",
            "gzip",
        ]])
        .unwrap();
}

#[test]
fn test_create_squashfs_with_default_and_compression_options() {
    let runner = FakeRunner::new();
    let mut options = default_squashfs_options();
    options.extend(default_compression_options());

    create_squashfs(&runner, Path::new("source"), Path::new("dest"), &options).unwrap();

    let cmds = runner.cmds();
    assert_eq!(cmds.len(), 1);
    assert_eq!(&cmds[0][3..5], &["-b".to_string(), "1024k".to_string()][..]);
    assert_eq!(&cmds[0][5..7], &["-comp".to_string(), "xz".to_string()][..]);
}

#[test]
fn test_create_squashfs_launch_failure() {
    let err = create_squashfs(
        &MissingToolRunner,
        Path::new("source"),
        Path::new("dest"),
        &["-b".to_string(), "1024k".to_string()],
    )
    .unwrap_err();

    match err {
        ToolError::ExternalToolFailure { command, output } => {
            assert_eq!(command, "mksquashfs source dest -b 1024k");
            assert!(predicate::str::contains("not found").eval(output.as_str()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_create_squashfs_non_zero_exit() {
    let runner = FakeRunner::failing("FATAL ERROR: Could not open source");

    let err = create_squashfs(&runner, Path::new("source"), Path::new("dest"), &[]).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("mksquashfs source dest"));
    assert!(message.contains("Could not open source"));
}

#[test]
fn test_create_squashfs_real_tool() {
    if !is_mksquashfs_available() {
        eprintln!("Skipping test: mksquashfs not installed");
        return;
    }

    let root = TestRoot::new();
    root.create_file("rootfs/etc/hostname", b"enki\n");
    root.create_file("rootfs/usr/bin/tool", b"#!/bin/sh\n");
    let source = root.path().join("rootfs");
    let dest = root.path().join("rootfs.squashfs");

    create_squashfs(
        &SystemRunner,
        &source,
        &dest,
        &["-noappend".to_string(), "-no-progress".to_string()],
    )
    .unwrap();

    assert!(dest.is_file());
    assert!(std::fs::metadata(&dest).unwrap().len() > 0);
}

#[test]
fn test_create_squashfs_real_tool_missing_source() {
    if !is_mksquashfs_available() {
        eprintln!("Skipping test: mksquashfs not installed");
        return;
    }

    let root = TestRoot::new();
    let err = create_squashfs(
        &SystemRunner,
        &root.path().join("does-not-exist"),
        &root.path().join("out.squashfs"),
        &["-noappend".to_string()],
    )
    .unwrap_err();

    assert!(matches!(err, ToolError::ExternalToolFailure { .. }));
}

#[test]
fn test_create_squashfs_real_tool_non_utf8_source() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    if !is_mksquashfs_available() {
        eprintln!("Skipping test: mksquashfs not installed");
        return;
    }

    let root = TestRoot::new();
    let source = root.path().join(OsStr::from_bytes(b"rootfs\xff"));
    std::fs::create_dir(&source).unwrap();
    std::fs::write(source.join("file"), b"data").unwrap();
    let dest = root.path().join("out.squashfs");

    create_squashfs(&SystemRunner, &source, &dest, &["-noappend".to_string()]).unwrap();

    assert!(dest.is_file());
}
