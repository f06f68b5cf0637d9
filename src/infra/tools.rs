//! Host tool lookup
//!
//! Resolves external executables on `$PATH` before a build starts so a
//! missing dependency fails early with a clear message.

use std::path::PathBuf;

use crate::error::ToolError;

/// Check if an executable is available on `$PATH`
pub fn command_exists(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// Resolve an executable on `$PATH`
pub fn find_tool(tool: &str) -> Result<PathBuf, ToolError> {
    which::which(tool).map_err(|_| ToolError::NotFound {
        tool: tool.to_string(),
    })
}

/// Require every tool in `tools`, failing on the first missing one
pub fn require_tools(tools: &[&str]) -> Result<(), ToolError> {
    for tool in tools {
        let path = find_tool(tool)?;
        tracing::debug!("Found {} at {}", tool, path.display());
    }
    Ok(())
}
