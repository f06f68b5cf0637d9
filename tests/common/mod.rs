//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use enki::infra::OsFs;
use tempfile::TempDir;

/// Sandboxed staging area
///
/// A temporary directory exposed through an [`OsFs`] rooted at it, so tests
/// can use absolute paths like `/my/root` without touching the host.
pub struct TestRoot {
    /// Temporary directory backing the sandbox
    pub dir: TempDir,
}

impl TestRoot {
    /// Create a new sandbox in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the host path of the sandbox
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Filesystem rooted at the sandbox
    pub fn fs(&self) -> OsFs {
        OsFs::rooted(self.dir.path())
    }

    /// Create a file in the sandbox
    pub fn create_file(&self, name: &str, content: &[u8]) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a sparse file of the given length in the sandbox
    #[allow(dead_code)]
    pub fn create_sized_file(&self, name: &str, len: u64) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let file = std::fs::File::create(path).expect("Failed to create file");
        file.set_len(len).expect("Failed to set file length");
    }

    /// Create a directory in the sandbox
    #[allow(dead_code)]
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a path exists in the sandbox
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the sandbox
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Mode bits of a path in the sandbox (`mode & 0o7777`)
    #[allow(dead_code)]
    pub fn mode(&self, name: &str) -> u32 {
        std::fs::metadata(self.dir.path().join(name))
            .expect("Failed to stat path")
            .permissions()
            .mode()
            & 0o7777
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// 20 repetitions of a 22-byte line
#[allow(dead_code)]
pub fn checksum_test_data() -> String {
    "abcdefghilmnopqrstuvz\n".repeat(20)
}

/// SHA-256 of [`checksum_test_data`]
#[allow(dead_code)]
pub const CHECKSUM_TEST_DATA_SHA256: &str =
    "7f182529f6362ae9cfa952ab87342a7180db45d2c57b52b50a68b6130b15a422";

/// Sample settings TOML for testing
#[allow(dead_code)]
pub const SAMPLE_SETTINGS: &str = r#"
cmdline = ["key=value testkey", "another=value anotherkey"]

[squashfs]
options = ["-noappend", "-comp", "gzip"]
"#;
