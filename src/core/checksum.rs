//! File integrity checksums
//!
//! SHA-256 digests of staged artifacts, computed by streaming the file in
//! fixed-size chunks so images larger than memory can be hashed.

use std::io::{ErrorKind, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::defaults::CHECKSUM_CHUNK_SIZE;
use crate::error::FilesystemError;
use crate::infra::Filesystem;

/// Compute the lowercase hex SHA-256 digest of a file
///
/// The digest depends on the file content only, never on its metadata.
pub fn calc_file_checksum(fs: &dyn Filesystem, path: &Path) -> Result<String, FilesystemError> {
    let mut file = fs.open(path).map_err(|_| FilesystemError::NotFound {
        path: path.to_path_buf(),
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHECKSUM_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FilesystemError::ReadError {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                })
            }
        };
        hasher.update(&buffer[..read]);
        total += read as u64;
    }

    let checksum = hex::encode(hasher.finalize());
    tracing::debug!("sha256 {} ({} bytes) = {}", path.display(), total, checksum);
    Ok(checksum)
}

/// Compare a file's digest against an expected hex string, ignoring case
pub fn verify_file_checksum(
    fs: &dyn Filesystem,
    path: &Path,
    expected: &str,
) -> Result<bool, FilesystemError> {
    let actual = calc_file_checksum(fs, path)?;
    let matches = actual.eq_ignore_ascii_case(expected.trim());
    if !matches {
        tracing::warn!(
            "Checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            actual
        );
    }
    Ok(matches)
}

/// Compute the SHA-256 digest of in-memory data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
