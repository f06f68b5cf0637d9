//! In-memory filesystem
//!
//! A deterministic [`Filesystem`] backend for tests. Paths are normalized to
//! absolute form; `/` always exists. Modes are stored exactly as given, there
//! is no umask.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{self, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::filesystem::{normalize, FileKind, FileStat, Filesystem};
use crate::config::defaults::{DIR_PERM, FILE_PERM};

/// Maximum symlinks followed while resolving one path
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum Node {
    Dir { mode: u32 },
    File { data: Vec<u8>, mode: u32 },
    Symlink { target: PathBuf },
}

impl Node {
    fn stat(&self) -> FileStat {
        match self {
            Node::Dir { mode } => FileStat {
                kind: FileKind::Dir,
                len: 0,
                mode: *mode,
            },
            Node::File { data, mode } => FileStat {
                kind: FileKind::File,
                len: data.len() as u64,
                mode: *mode,
            },
            Node::Symlink { target } => FileStat {
                kind: FileKind::Symlink,
                len: target.as_os_str().len() as u64,
                mode: 0o777,
            },
        }
    }
}

type Tree = BTreeMap<PathBuf, Node>;

/// In-memory filesystem; clones share the same tree
#[derive(Debug, Clone)]
pub struct MemFs {
    nodes: Arc<Mutex<Tree>>,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: '{}'", path.display()),
    )
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::other(format!("not a directory: '{}'", path.display()))
}

fn is_a_directory(path: &Path) -> io::Error {
    io::Error::other(format!("is a directory: '{}'", path.display()))
}

fn normal_components(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_os_string()),
            _ => None,
        })
        .collect()
}

/// Resolve symlinks in `path`; the trailing component only when `follow_last`
fn resolve(tree: &Tree, path: &Path, follow_last: bool) -> io::Result<PathBuf> {
    let mut pending: Vec<OsString> = normal_components(&normalize(path));
    pending.reverse();

    let mut current = PathBuf::from("/");
    let mut hops = 0;

    while let Some(name) = pending.pop() {
        let candidate = current.join(&name);
        let is_last = pending.is_empty();

        match tree.get(&candidate) {
            Some(Node::Symlink { target }) if !is_last || follow_last => {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(io::Error::other(format!(
                        "too many levels of symbolic links: '{}'",
                        path.display()
                    )));
                }
                let joined = if target.is_absolute() {
                    target.clone()
                } else {
                    current.join(target)
                };
                for component in normal_components(&normalize(&joined)).into_iter().rev() {
                    pending.push(component);
                }
                current = PathBuf::from("/");
            }
            Some(Node::File { .. }) if !is_last => return Err(not_a_directory(&candidate)),
            _ => current = candidate,
        }
    }

    Ok(current)
}

/// Require an existing directory at the parent of `path`
fn require_parent_dir(tree: &Tree, path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    match tree.get(parent) {
        Some(Node::Dir { .. }) => Ok(()),
        Some(_) => Err(not_a_directory(parent)),
        None => Err(not_found(parent)),
    }
}

impl MemFs {
    /// Create an empty filesystem containing only `/`
    pub fn new() -> Self {
        let mut tree = Tree::new();
        tree.insert(PathBuf::from("/"), Node::Dir { mode: DIR_PERM });
        Self {
            nodes: Arc::new(Mutex::new(tree)),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of entries, including `/`
    pub fn len(&self) -> usize {
        self.tree().len()
    }

    /// Whether only `/` exists
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Full contents of a file
    pub fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let tree = self.tree();
        let resolved = resolve(&tree, path, true)?;
        match tree.get(&resolved) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(_) => Err(is_a_directory(path)),
            None => Err(not_found(path)),
        }
    }
}

/// Writer appending to a file node
struct MemFile {
    nodes: Arc<Mutex<Tree>>,
    path: PathBuf,
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut tree = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        match tree.get_mut(&self.path) {
            Some(Node::File { data, .. }) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Filesystem for MemFs {
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        let mut tree = self.tree();
        let resolved = resolve(&tree, path, true)?;
        require_parent_dir(&tree, &resolved)?;

        match tree.get_mut(&resolved) {
            Some(Node::Dir { .. }) => return Err(is_a_directory(path)),
            Some(Node::File { data, .. }) => data.clear(),
            _ => {
                tree.insert(
                    resolved.clone(),
                    Node::File {
                        data: Vec::new(),
                        mode: FILE_PERM,
                    },
                );
            }
        }

        Ok(Box::new(MemFile {
            nodes: Arc::clone(&self.nodes),
            path: resolved,
        }))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let data = self.read(path)?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let tree = self.tree();
        let resolved = resolve(&tree, path, true)?;
        tree.get(&resolved)
            .map(Node::stat)
            .ok_or_else(|| not_found(path))
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        let tree = self.tree();
        let resolved = resolve(&tree, path, false)?;
        tree.get(&resolved)
            .map(Node::stat)
            .ok_or_else(|| not_found(path))
    }

    fn mkdir(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut tree = self.tree();
        let resolved = resolve(&tree, path, false)?;
        if tree.contains_key(&resolved) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: '{}'", path.display()),
            ));
        }
        require_parent_dir(&tree, &resolved)?;
        tree.insert(resolved, Node::Dir { mode });
        Ok(())
    }

    fn set_mode(&self, path: &Path, new_mode: u32) -> io::Result<()> {
        let mut tree = self.tree();
        let resolved = resolve(&tree, path, true)?;
        match tree.get_mut(&resolved) {
            Some(Node::Dir { mode } | Node::File { mode, .. }) => {
                *mode = new_mode & 0o7777;
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let tree = self.tree();
        let resolved = resolve(&tree, path, true)?;
        match tree.get(&resolved) {
            Some(Node::Dir { .. }) => {}
            Some(_) => return Err(not_a_directory(path)),
            None => return Err(not_found(path)),
        }

        Ok(tree
            .range(resolved.clone()..)
            .filter(|(key, _)| key.parent() == Some(resolved.as_path()))
            .filter_map(|(key, _)| key.file_name().map(|name| path.join(name)))
            .collect())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.tree();
        let resolved = resolve(&tree, path, false)?;
        match tree.get(&resolved) {
            Some(Node::Dir { .. }) => Err(is_a_directory(path)),
            Some(_) => {
                tree.remove(&resolved);
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut tree = self.tree();
        let source = resolve(&tree, from, false)?;
        let target = resolve(&tree, to, false)?;
        if !tree.contains_key(&source) {
            return Err(not_found(from));
        }
        if source == target {
            return Ok(());
        }
        require_parent_dir(&tree, &target)?;
        if let Some(Node::Dir { .. }) = tree.get(&target) {
            return Err(is_a_directory(to));
        }

        let moved: Vec<PathBuf> = tree
            .keys()
            .filter(|key| key.starts_with(&source))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = tree.remove(&key) {
                let suffix = key.strip_prefix(&source).unwrap_or(Path::new(""));
                let new_key = if suffix.as_os_str().is_empty() {
                    target.clone()
                } else {
                    target.join(suffix)
                };
                tree.insert(new_key, node);
            }
        }
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut tree = self.tree();
        let resolved = resolve(&tree, link, false)?;
        if tree.contains_key(&resolved) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: '{}'", link.display()),
            ));
        }
        require_parent_dir(&tree, &resolved)?;
        tree.insert(
            resolved,
            Node::Symlink {
                target: target.to_path_buf(),
            },
        );
        Ok(())
    }
}
