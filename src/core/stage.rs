//! Root tree staging
//!
//! Builds the skeleton of the UKI root filesystem and moves files into it.
//! All operations go through a [`Filesystem`] so they can run against a
//! sandbox or an in-memory tree.
//!
//! Symlinks: [`copy_file`] follows a symlinked source and copies the content
//! it points to. [`dir_size`] never follows symlinks and counts them as zero
//! bytes.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::defaults::{DIR_PERM, NO_WRITE_DIR_PERM, TEMP_DIR_PERM};
use crate::error::FilesystemError;
use crate::infra::{FileKind, Filesystem};

/// A directory created by [`create_dir_structure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectorySpec {
    /// Path relative to the staging root
    pub path: &'static str,
    /// Exact mode applied after creation
    pub mode: u32,
}

/// Directories every staged root gets
pub const ROOT_DIRECTORIES: &[DirectorySpec] = &[
    DirectorySpec {
        path: "sys",
        mode: NO_WRITE_DIR_PERM,
    },
    DirectorySpec {
        path: "proc",
        mode: DIR_PERM,
    },
    DirectorySpec {
        path: "dev",
        mode: DIR_PERM,
    },
    DirectorySpec {
        path: "tmp",
        mode: TEMP_DIR_PERM,
    },
    DirectorySpec {
        path: "boot",
        mode: DIR_PERM,
    },
    DirectorySpec {
        path: "usr/local",
        mode: DIR_PERM,
    },
    DirectorySpec {
        path: "oem",
        mode: DIR_PERM,
    },
];

/// Check whether a path exists
///
/// Not-found maps to `false`; any other failure is an error.
pub fn exists(fs: &dyn Filesystem, path: &Path) -> Result<bool, FilesystemError> {
    match fs.metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FilesystemError::read(path, &e)),
    }
}

/// Create a directory and any missing parents with `mode`
///
/// Existing directories along the way are left untouched.
pub fn mkdir_all(fs: &dyn Filesystem, path: &Path, mode: u32) -> Result<(), FilesystemError> {
    match fs.metadata(path) {
        Ok(stat) if stat.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(FilesystemError::WriteDenied {
                path: path.to_path_buf(),
                error: "exists and is not a directory".to_string(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(FilesystemError::read(path, &e)),
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            mkdir_all(fs, parent, mode)?;
        }
    }

    match fs.mkdir(path, mode) {
        Ok(()) => Ok(()),
        // Lost a race with another creator
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => match fs.metadata(path) {
            Ok(stat) if stat.is_dir() => Ok(()),
            _ => Err(FilesystemError::write(path, &e)),
        },
        Err(e) => Err(FilesystemError::write(path, &e)),
    }
}

/// Copy a file
///
/// If `dest` is an existing directory the copy is placed inside it under the
/// source's file name, otherwise `dest` is the target path. Content is
/// written to a hidden sibling first and renamed into place, so a failed copy
/// never leaves a partial target behind. Mode and timestamps are not copied.
pub fn copy_file(fs: &dyn Filesystem, source: &Path, dest: &Path) -> Result<(), FilesystemError> {
    let mut reader = fs.open(source).map_err(|_| FilesystemError::NotFound {
        path: source.to_path_buf(),
    })?;

    let target = match fs.metadata(dest) {
        Ok(stat) if stat.is_dir() => match source.file_name() {
            Some(name) => dest.join(name),
            None => {
                return Err(FilesystemError::NotFound {
                    path: source.to_path_buf(),
                })
            }
        },
        _ => dest.to_path_buf(),
    };

    let partial = partial_path(&target);
    let copied = write_partial(fs, &mut reader, &partial)
        .and_then(|bytes| fs.rename(&partial, &target).map(|()| bytes));

    match copied {
        Ok(bytes) => {
            tracing::debug!(
                "Copied {} -> {} ({} bytes)",
                source.display(),
                target.display(),
                bytes
            );
            Ok(())
        }
        Err(e) => {
            // The partial may never have been created
            let _ = fs.remove_file(&partial);
            tracing::warn!("Failed to copy {} to {}: {}", source.display(), target.display(), e);
            Err(FilesystemError::write(&target, &e))
        }
    }
}

/// Hidden sibling used while a copy is in flight
fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".partial");
    target.with_file_name(name)
}

fn write_partial(fs: &dyn Filesystem, reader: &mut dyn io::Read, partial: &Path) -> io::Result<u64> {
    let mut writer = fs.create(partial)?;
    let bytes = io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

/// Create the fixed directory skeleton of a root tree
///
/// Creates `root` and every entry of [`ROOT_DIRECTORIES`], then applies each
/// entry's mode explicitly so the result does not depend on the umask.
/// Running it again on a finished tree leaves the same permissions. Stops at
/// the first failure without removing what was already created.
pub fn create_dir_structure(fs: &dyn Filesystem, root: &Path) -> Result<(), FilesystemError> {
    for dir in ROOT_DIRECTORIES {
        let path = root.join(dir.path);
        mkdir_all(fs, &path, DIR_PERM)?;
        fs.set_mode(&path, dir.mode)
            .map_err(|e| FilesystemError::write(&path, &e))?;
        tracing::trace!("Created {} ({:04o})", path.display(), dir.mode);
    }

    tracing::info!("Created root directory structure in {}", root.display());
    Ok(())
}

/// Total size in bytes of all regular files beneath `path`
///
/// Directories count as zero; symlinks are not followed and count as zero.
/// Saturates at `i64::MAX`.
pub fn dir_size(fs: &dyn Filesystem, path: &Path) -> Result<i64, FilesystemError> {
    let stat = fs
        .symlink_metadata(path)
        .map_err(|e| FilesystemError::read(path, &e))?;

    let total = match stat.kind {
        FileKind::File => stat.len,
        FileKind::Dir => tree_size(fs, path)?,
        FileKind::Symlink | FileKind::Other => 0,
    };

    Ok(i64::try_from(total).unwrap_or(i64::MAX))
}

fn tree_size(fs: &dyn Filesystem, dir: &Path) -> Result<u64, FilesystemError> {
    let mut total: u64 = 0;
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let children = fs
            .read_dir(&current)
            .map_err(|e| FilesystemError::read(&current, &e))?;

        for child in children {
            let stat = fs
                .symlink_metadata(&child)
                .map_err(|e| FilesystemError::read(&child, &e))?;
            match stat.kind {
                FileKind::File => total = total.saturating_add(stat.len),
                FileKind::Dir => pending.push(child),
                FileKind::Symlink | FileKind::Other => {}
            }
        }
    }

    Ok(total)
}
