//! Custom error types for todolist.
//!
//! This module provides structured error types so that callers can tell
//! storage failures apart from corrupt data and from bad user input.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for todolist operations
#[derive(Error, Debug)]
pub enum TodoError {
    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Durable storage could not be read or written
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        path: Option<PathBuf>,
    },

    /// Storage lock could not be acquired
    #[error("Failed to lock {path}: {message}")]
    Lock { path: PathBuf, message: String },

    // =========================================================================
    // Data Errors
    // =========================================================================
    /// Stored blob could not be decoded
    #[error("Failed to decode stored value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// No task matches the given id or prefix
    #[error("No task matches '{query}'")]
    TaskNotFound { query: String },

    /// More than one task matches the given prefix
    #[error("Task id '{query}' is ambiguous ({matches} tasks match)")]
    AmbiguousTaskId { query: String, matches: usize },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TodoError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path: None,
        }
    }

    /// Create a storage error with path
    pub fn storage_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Storage {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TaskNotFound { .. } | Self::AmbiguousTaskId { .. } => 1,
            Self::Storage { .. } | Self::Lock { .. } | Self::Io(_) => 3,
            Self::Decode { .. } => 4,
            Self::Config { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for todolist results
pub type Result<T> = std::result::Result<T, TodoError>;

/// Extension trait for converting foreign errors to TodoError
pub trait IntoTodoError<T> {
    fn into_todo_storage(self) -> Result<T>;
    fn into_todo_config(self) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoTodoError<T> for std::result::Result<T, E> {
    fn into_todo_storage(self) -> Result<T> {
        self.map_err(|e| TodoError::storage(e.into().to_string()))
    }

    fn into_todo_config(self) -> Result<T> {
        self.map_err(|e| TodoError::config(e.into().to_string()))
    }
}
