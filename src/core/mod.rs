//! Core staging and assembly logic
//!
//! Filesystem and process access goes through the capabilities in
//! [`crate::infra`]; nothing here touches the host directly except
//! [`settings`] loading its file.
//!
//! # Submodules
//!
//! - [`checksum`] - Streaming SHA-256 of staged files
//! - [`stage`] - Copying, root skeleton creation, tree sizes
//! - [`squashfs`] - `mksquashfs` invocation
//! - [`cmdline`] - UKI kernel command-line entries
//! - [`settings`] - Layered configuration

pub mod checksum;
pub mod cmdline;
pub mod settings;
pub mod squashfs;
pub mod stage;
