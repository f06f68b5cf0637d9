//! Filesystem capability
//!
//! Every staging operation goes through the [`Filesystem`] trait so it can be
//! backed by the host filesystem ([`OsFs`]), a sandboxed directory
//! ([`OsFs::rooted`]), memory ([`super::memfs::MemFs`]), or wrapped in
//! [`ReadOnlyFs`] to reject all mutation.

use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Component, Path, PathBuf};

use crate::config::defaults::FILE_PERM;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file
    File,
    /// Directory
    Dir,
    /// Symbolic link (only reported by `symlink_metadata`)
    Symlink,
    /// Device, fifo, socket
    Other,
}

/// Metadata subset the staging code relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Entry kind
    pub kind: FileKind,
    /// Length in bytes
    pub len: u64,
    /// Permission bits including setuid, setgid and sticky (`mode & 0o7777`)
    pub mode: u32,
}

impl FileStat {
    /// Whether this is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    /// Whether this is a regular file
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Whether the sticky bit is set
    pub fn is_sticky(&self) -> bool {
        self.mode & 0o1000 != 0
    }

    /// Plain rwx permission bits (`mode & 0o777`)
    pub fn permissions(&self) -> u32 {
        self.mode & 0o777
    }
}

/// Hierarchical filesystem operations used by the stager and checksum code
///
/// Implementations report failures as [`io::Error`]; callers map
/// [`io::ErrorKind::NotFound`] and friends to domain errors.
pub trait Filesystem {
    /// Create or truncate a file for writing
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;

    /// Open a file for reading, following symlinks
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Stat a path, following symlinks
    fn metadata(&self, path: &Path) -> io::Result<FileStat>;

    /// Stat a path without following a trailing symlink
    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat>;

    /// Create a single directory; the parent must exist
    fn mkdir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Set the exact mode of an entry
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// List the children of a directory as `path.join(name)`
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Remove a file or symlink
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Atomically move an entry
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a symlink at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Write a whole file
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = self.create(path)?;
        file.write_all(data)?;
        file.flush()
    }
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        (**self).create(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        (**self).metadata(path)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        (**self).symlink_metadata(path)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).mkdir(path, mode)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).set_mode(path, mode)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        (**self).read_dir(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        (**self).remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).rename(from, to)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        (**self).symlink(target, link)
    }
}

/// Lexically normalize a path into absolute form
///
/// `.` is dropped, `..` pops a component (never above `/`), and relative
/// paths are taken relative to `/`.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(name) => out.push(name),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Host filesystem backend
///
/// With a root set, absolute paths are resolved beneath it, which gives tests
/// a sandbox that behaves like `/`. Symlink targets are written verbatim.
#[derive(Debug, Clone, Default)]
pub struct OsFs {
    root: Option<PathBuf>,
}

impl OsFs {
    /// Operate on host paths unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every path beneath `root`
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Host path backing a filesystem path
    pub fn real_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            None => path.to_path_buf(),
            Some(root) => {
                let normalized = normalize(path);
                match normalized.strip_prefix("/") {
                    Ok(relative) => root.join(relative),
                    Err(_) => root.clone(),
                }
            }
        }
    }
}

fn stat_from(meta: &fs::Metadata) -> FileStat {
    let file_type = meta.file_type();
    let kind = if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_dir() {
        FileKind::Dir
    } else if file_type.is_file() {
        FileKind::File
    } else {
        FileKind::Other
    };

    FileStat {
        kind,
        len: meta.len(),
        mode: meta.permissions().mode() & 0o7777,
    }
}

impl Filesystem for OsFs {
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(FILE_PERM)
            .open(self.real_path(path))?;
        Ok(Box::new(file))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = fs::File::open(self.real_path(path))?;
        if file.metadata()?.is_dir() {
            return Err(io::Error::other(format!(
                "'{}' is a directory",
                path.display()
            )));
        }
        Ok(Box::new(file))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        fs::metadata(self.real_path(path)).map(|m| stat_from(&m))
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        fs::symlink_metadata(self.real_path(path)).map(|m| stat_from(&m))
    }

    fn mkdir(&self, path: &Path, mode: u32) -> io::Result<()> {
        fs::DirBuilder::new()
            .mode(mode)
            .create(self.real_path(path))
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        fs::set_permissions(self.real_path(path), fs::Permissions::from_mode(mode))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(self.real_path(path))? {
            children.push(path.join(entry?.file_name()));
        }
        children.sort();
        Ok(children)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(self.real_path(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(self.real_path(from), self.real_path(to))
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, self.real_path(link))
    }
}

/// Wrapper rejecting every mutating call with `PermissionDenied`
#[derive(Debug, Clone)]
pub struct ReadOnlyFs<F> {
    inner: F,
}

impl<F: Filesystem> ReadOnlyFs<F> {
    /// Wrap a filesystem
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    /// The wrapped filesystem
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

fn read_only(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("read-only filesystem: '{}'", path.display()),
    )
}

impl<F: Filesystem> Filesystem for ReadOnlyFs<F> {
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        Err(read_only(path))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        self.inner.open(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        self.inner.metadata(path)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        self.inner.symlink_metadata(path)
    }

    fn mkdir(&self, path: &Path, _mode: u32) -> io::Result<()> {
        Err(read_only(path))
    }

    fn set_mode(&self, path: &Path, _mode: u32) -> io::Result<()> {
        Err(read_only(path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        Err(read_only(path))
    }

    fn rename(&self, from: &Path, _to: &Path) -> io::Result<()> {
        Err(read_only(from))
    }

    fn symlink(&self, _target: &Path, link: &Path) -> io::Result<()> {
        Err(read_only(link))
    }
}
