//! The task value type and its identifier.
//!
//! A [`Task`] is an immutable value: the only change a task ever sees after
//! creation is a full replacement with a copy whose completion flag differs.
//!
//! # Serialized form
//!
//! ```text
//! {"id":"0b7a6c2e-…","description":"Buy milk","isCompleted":false}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Task Identifier
// ============================================================================

/// Globally unique identifier of a task.
///
/// Serialized as the hyphenated UUID text.
///
/// # Example
///
/// ```
/// use todolist::TaskId;
///
/// let id: TaskId = "6f1c2a34-9b1e-4c4e-8f5a-2d3b4c5d6e7f".parse().unwrap();
/// assert_eq!(id.short(), "6f1c2a34");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, for compact display.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ============================================================================
// Task
// ============================================================================

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identity; never changes after creation
    pub id: TaskId,
    /// Trimmed, non-empty text
    pub description: String,
    /// Completion flag
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

impl Task {
    /// Create a task from user input.
    ///
    /// Returns `None` when the input is blank after trimming.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist::Task;
    ///
    /// let task = Task::new("  Buy milk ").unwrap();
    /// assert_eq!(task.description, "Buy milk");
    /// assert!(!task.is_completed);
    /// assert!(Task::new("   ").is_none());
    /// ```
    #[must_use]
    pub fn new(description: &str) -> Option<Self> {
        Self::with_id(TaskId::new(), description)
    }

    /// Create a task with a known id. Blank input yields `None`.
    #[must_use]
    pub fn with_id(id: TaskId, description: &str) -> Option<Self> {
        let description = description.trim();
        if description.is_empty() {
            return None;
        }
        Some(Self {
            id,
            description: description.to_string(),
            is_completed: false,
        })
    }

    /// Copy of this task with the given completion flag.
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            is_completed: completed,
            ..self.clone()
        }
    }
}
