//! Infrastructure layer
//!
//! Handles all I/O: the filesystem and process capabilities, host tool
//! lookup and directory resolution.

pub mod dirs;
pub mod filesystem;
pub mod memfs;
pub mod runner;
pub mod tools;

pub use filesystem::{FileKind, FileStat, Filesystem, OsFs, ReadOnlyFs};
pub use memfs::MemFs;
pub use runner::{FakeRunner, RunOutput, Runner, SystemRunner};
