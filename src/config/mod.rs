//! Configuration constants
//!
//! - [`defaults`] - Built-in defaults for cmdline, permissions and squashfs

pub mod defaults;
