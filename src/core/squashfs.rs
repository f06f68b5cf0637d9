//! Squashfs image creation
//!
//! Wraps `mksquashfs` to compress a staged tree into an image. Options are
//! forwarded verbatim and in order; the tool treats some flags as positional
//! or overriding, so nothing is reordered, deduplicated or validated here.
//!
//! The image itself is opaque: nothing here inspects it after the tool
//! exits. Whether an existing `dest` is appended to or replaced is up to
//! `mksquashfs` (pass `-noappend` to always start fresh).

use std::ffi::OsString;
use std::path::Path;

use crate::config::defaults::{MKSQUASHFS, SQUASHFS_BLOCK_SIZE, SQUASHFS_COMPRESSION};
use crate::error::ToolError;
use crate::infra::tools::command_exists;
use crate::infra::Runner;

/// Build the `mksquashfs` argument list
///
/// Paths are passed through as raw OS strings.
fn squashfs_args(source: &Path, dest: &Path, options: &[String]) -> Vec<OsString> {
    let mut args = Vec::with_capacity(options.len() + 2);
    args.push(source.as_os_str().to_os_string());
    args.push(dest.as_os_str().to_os_string());
    args.extend(options.iter().map(OsString::from));
    args
}

/// Human-readable form of the invocation, for logs and errors
fn display_command(source: &Path, dest: &Path, options: &[String]) -> String {
    let mut command = format!("{} {} {}", MKSQUASHFS, source.display(), dest.display());
    for option in options {
        command.push(' ');
        command.push_str(option);
    }
    command
}

/// Compress `source` into a squashfs image at `dest`
///
/// Runs `mksquashfs source dest options...` and blocks until it exits. A
/// launch failure or non-zero exit returns
/// [`ToolError::ExternalToolFailure`] carrying the captured output. There is
/// no retry and no timeout.
pub fn create_squashfs(
    runner: &dyn Runner,
    source: &Path,
    dest: &Path,
    options: &[String],
) -> Result<(), ToolError> {
    let args = squashfs_args(source, dest, options);
    let command = display_command(source, dest, options);
    tracing::debug!("Running {}", command);

    let output = match runner.run(MKSQUASHFS, &args) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Failed to launch {}: {}", MKSQUASHFS, e);
            return Err(ToolError::ExternalToolFailure {
                command,
                output: e.to_string(),
            });
        }
    };

    if !output.is_success() {
        tracing::error!(
            "{} exited with {:?}: {}",
            MKSQUASHFS,
            output.code,
            output.output.trim()
        );
        return Err(ToolError::ExternalToolFailure {
            command,
            output: output.output,
        });
    }

    tracing::info!(
        "Created squashfs image {} from {}",
        dest.display(),
        source.display()
    );
    Ok(())
}

/// Block size options used when nothing else is configured
pub fn default_squashfs_options() -> Vec<String> {
    vec!["-b".to_string(), SQUASHFS_BLOCK_SIZE.to_string()]
}

/// Compression options tuned for the build architecture
///
/// xz with the branch/call/jump filter matching the target CPU.
pub fn default_compression_options() -> Vec<String> {
    let bcj = if cfg!(any(target_arch = "aarch64", target_arch = "arm")) {
        "arm"
    } else {
        "x86"
    };

    vec![
        "-comp".to_string(),
        SQUASHFS_COMPRESSION.to_string(),
        "-Xbcj".to_string(),
        bcj.to_string(),
    ]
}

/// Check if `mksquashfs` is installed
pub fn is_mksquashfs_available() -> bool {
    command_exists(MKSQUASHFS)
}
