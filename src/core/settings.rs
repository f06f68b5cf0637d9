//! Layered settings
//!
//! Settings resolve in three layers: built-in defaults, the `config.toml`
//! settings file, then explicit overrides supplied by the caller (usually
//! from command-line flags). A missing file means defaults.
//!
//! ```toml
//! cmdline = ["key=value testkey", "another=value anotherkey"]
//!
//! [squashfs]
//! options = ["-b", "1024k", "-comp", "xz"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::cmdline::CmdlineSource;
use crate::core::squashfs::default_squashfs_options;
use crate::error::SettingsError;
use crate::infra::dirs::EnkiDirs;

/// Settings for a UKI build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Extra kernel command-line fragments, one UKI entry each
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmdline: Vec<String>,

    /// Squashfs settings
    #[serde(default)]
    pub squashfs: SquashfsSettings,
}

/// Squashfs settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquashfsSettings {
    /// Options passed to `mksquashfs` verbatim; unset means the defaults
    pub options: Option<Vec<String>>,
}

impl Settings {
    /// Load settings from the config directory
    pub fn load(dirs: &EnkiDirs) -> Result<Self, SettingsError> {
        Self::load_from_path(&dirs.settings_path())
    }

    /// Load settings from a specific path
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ParseError` if the file exists but contains
    /// invalid TOML.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        tracing::debug!(
            "Loaded settings from {} ({} cmdline fragments)",
            path.display(),
            settings.cmdline.len()
        );
        Ok(settings)
    }

    /// Save settings to a specific path, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::ReadError {
                path: parent.display().to_string(),
                error: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Override the cmdline fragments when `cmdline` is non-empty
    #[must_use]
    pub fn with_cmdline(mut self, cmdline: Vec<String>) -> Self {
        if !cmdline.is_empty() {
            self.cmdline = cmdline;
        }
        self
    }

    /// Override the squashfs options
    #[must_use]
    pub fn with_squashfs_options(mut self, options: Vec<String>) -> Self {
        self.squashfs.options = Some(options);
        self
    }

    /// Effective squashfs options
    ///
    /// Returns the configured options if set, otherwise the defaults. A
    /// configured empty list stays empty and means the tool's own defaults.
    pub fn squashfs_options(&self) -> Vec<String> {
        self.squashfs
            .options
            .clone()
            .unwrap_or_else(default_squashfs_options)
    }
}

impl CmdlineSource for Settings {
    fn extra_cmdline(&self) -> &[String] {
        &self.cmdline
    }
}
