//! Enki - UKI staging utilities
//!
//! This library prepares the inputs of a Unified Kernel Image build: it stages
//! a root tree with exact permissions, checksums artifacts, compresses the tree
//! into a squashfs image, and assembles the kernel command-line entries.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`core`] - Staging, checksum, squashfs and cmdline logic
//! - [`infra`] - Filesystem and process capabilities, tool lookup, directories
//! - [`config`] - Constants and defaults
//! - [`logging`] - Subscriber setup for `tracing` output
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use enki::core::{cmdline, settings::Settings, squashfs, stage};
//! use enki::infra::{OsFs, SystemRunner};
//!
//! # fn main() -> anyhow::Result<()> {
//! let fs = OsFs::new();
//! let settings = Settings::default();
//!
//! stage::create_dir_structure(&fs, Path::new("/build/rootfs"))?;
//! squashfs::create_squashfs(
//!     &SystemRunner,
//!     Path::new("/build/rootfs"),
//!     Path::new("/build/rootfs.squashfs"),
//!     &settings.squashfs_options(),
//! )?;
//! let entries = cmdline::uki_cmdline(&settings);
//! # let _ = entries;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod logging;

#[cfg(test)]
pub mod test_utils;
