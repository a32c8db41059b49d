//! Configuration management for todolist.
//!
//! Settings come from an optional TOML file:
//!
//! ```toml
//! # ~/.config/todolist/config.toml
//! data_dir = "/home/me/notes"
//! namespace = "todo_prefs"
//! ```
//!
//! The data directory resolves in this order: explicit override (CLI flag or
//! `TODO_DATA_DIR`), `data_dir` from the file, the platform data directory,
//! and finally `./.todolist`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IntoTodoError, Result, TodoError};
use crate::storage::{FileStorage, DEFAULT_NAMESPACE};

/// Application directory name under the platform config/data dirs.
pub const APP_DIR: &str = "todolist";

/// Config file name inside the application config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// User configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    /// Directory holding the namespace document
    pub data_dir: Option<PathBuf>,
    /// Namespace document name (without extension)
    pub namespace: String,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl TodoConfig {
    /// Load configuration from `path`, or defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Config`] if the file can't be read or parsed, or
    /// if the namespace is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TodoError::config_with_path(format!("Failed to read config: {e}"), path.to_path_buf())
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            TodoError::Config { message, .. } => {
                TodoError::config_with_path(message, path.to_path_buf())
            }
            other => other,
        })?;
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Config`] on malformed TOML or an invalid namespace.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).into_todo_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Config`] if the namespace is empty or contains a
    /// path separator.
    pub fn validate(&self) -> Result<()> {
        let namespace = self.namespace.trim();
        if namespace.is_empty() {
            return Err(TodoError::config("namespace must not be empty"));
        }
        if namespace.contains(['/', '\\']) || namespace == "." || namespace == ".." {
            return Err(TodoError::config(format!(
                "namespace '{namespace}' must be a plain file name"
            )));
        }
        Ok(())
    }

    /// Resolve the data directory, preferring `override_dir`.
    #[must_use]
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".todolist"))
    }

    /// Build file storage for this configuration.
    #[must_use]
    pub fn storage(&self, override_dir: Option<&Path>) -> FileStorage {
        FileStorage::with_namespace(self.resolve_data_dir(override_dir), self.namespace.trim())
    }
}
