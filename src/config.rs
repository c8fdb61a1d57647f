//! Packager configuration parsing for packager.toml files

use crate::error::ConfigError;
use crate::packaging::PackagingAction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up next to the scripts
pub const CONFIG_FILE: &str = "packager.toml";

/// Packager configuration loaded from packager.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    pub console: ConsoleConfig,
    pub scripts: ScriptsConfig,
    pub project: ProjectConfig,
    pub notification: NotificationConfig,
}

/// Output pane settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub pane_name: String,
}

/// External build scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub manifest: String,
    pub archive: String,
    /// Overrides the directory of the running binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// How project definition files are recognised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub extensions: Vec<String>,
}

/// User notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            pane_name: "NugetPackager".to_string(),
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            manifest: PackagingAction::BuildManifest.default_script().to_string(),
            archive: PackagingAction::BuildArchive.default_script().to_string(),
            directory: None,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csproj".to_string(), "vbproj".to_string(), "fsproj".to_string()],
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Congratulation!".to_string(),
        }
    }
}

impl ScriptsConfig {
    /// Script file name configured for an action
    pub fn script_for(&self, action: PackagingAction) -> &str {
        match action {
            PackagingAction::BuildManifest => &self.manifest,
            PackagingAction::BuildArchive => &self.archive,
        }
    }
}

impl ProjectConfig {
    /// Check whether a path names a project definition file
    pub fn is_project_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl PackagerConfig {
    /// Load configuration from a packager.toml file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PackagerConfig =
            toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the explicit file if given, else `packager.toml` in `script_dir`, else defaults
    pub fn discover(explicit: Option<&Path>, script_dir: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(dir) = script_dir {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading configuration");
                return Self::from_file(candidate);
            }
        }

        Ok(Self::default())
    }

    /// Write configuration to a packager.toml file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.console.pane_name.trim().is_empty() {
            return Err(ConfigError::Invalid("console.pane_name must not be empty".to_string()));
        }
        for (key, script) in [("scripts.manifest", &self.scripts.manifest), ("scripts.archive", &self.scripts.archive)] {
            if script.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
            // Scripts are looked up by file name inside the script directory.
            if Path::new(script).components().count() != 1 {
                return Err(ConfigError::Invalid(format!("{} must be a bare file name, got '{}'", key, script)));
            }
        }
        if self.project.extensions.is_empty() {
            return Err(ConfigError::Invalid("project.extensions must list at least one extension".to_string()));
        }
        Ok(())
    }
}
