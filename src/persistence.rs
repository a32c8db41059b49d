//! Save/load of the whole task list under a single storage key.
//!
//! The list is encoded as one JSON array and written as a single value, so
//! every save is a full replace and every load a full read.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Result, TodoError};
use crate::storage::KeyValueStorage;
use crate::task::Task;

/// Storage key holding the encoded task list.
pub const TASKS_KEY: &str = "tasks";

/// Reads and writes the task list through a [`KeyValueStorage`].
///
/// # Example
///
/// ```
/// use todolist::{MemoryStorage, PersistenceGateway, Task};
///
/// let mut gateway = PersistenceGateway::new(MemoryStorage::new());
/// assert!(gateway.load().unwrap().is_empty());
///
/// let tasks = vec![Task::new("Buy milk").unwrap()];
/// gateway.save(&tasks).unwrap();
/// assert_eq!(gateway.load().unwrap(), tasks);
/// ```
#[derive(Debug, Clone)]
pub struct PersistenceGateway<S> {
    storage: S,
}

impl<S: KeyValueStorage> PersistenceGateway<S> {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Borrow the storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the storage backend.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Encode `tasks` and overwrite the stored list.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the storage write fails. The
    /// previously stored list is left in place on failure.
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        self.storage.put(TASKS_KEY, &json)?;
        debug!(count = tasks.len(), "tasks saved");
        Ok(())
    }

    /// Read and decode the stored list.
    ///
    /// A key that was never written yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Decode`] if the stored value isn't a task list,
    /// and storage errors as-is. Individual entries with blank descriptions or
    /// repeated ids are dropped rather than failing the whole list.
    pub fn load(&self) -> Result<Vec<Task>> {
        let Some(json) = self.storage.get(TASKS_KEY)? else {
            debug!("no stored tasks");
            return Ok(Vec::new());
        };

        let decoded: Vec<Task> = serde_json::from_str(&json).map_err(|source| TodoError::Decode {
            key: TASKS_KEY.to_string(),
            source,
        })?;
        let tasks = sanitize(decoded);

        debug!(count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    /// Load the stored list, or an empty one if it can't be read.
    ///
    /// This is more lenient than [`load`](Self::load): corrupt or unreadable
    /// data is logged and treated as "no prior data".
    #[must_use]
    pub fn load_or_empty(&self) -> Vec<Task> {
        match self.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("Could not load saved tasks: {e}. Starting with an empty list.");
                Vec::new()
            }
        }
    }
}

/// Rebuild decoded tasks so they satisfy the stored-task invariants.
///
/// Descriptions are re-trimmed. Blank entries and repeated ids are dropped
/// with a warning; everything else is kept in order.
fn sanitize(decoded: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(decoded.len());
    let mut tasks = Vec::with_capacity(decoded.len());

    for raw in decoded {
        let Some(task) = Task::with_id(raw.id, &raw.description) else {
            warn!(id = %raw.id, "Dropping stored task with a blank description");
            continue;
        };
        if !seen.insert(task.id) {
            warn!(id = %task.id, "Dropping stored task with a repeated id");
            continue;
        }
        tasks.push(task.with_completed(raw.is_completed));
    }

    tasks
}
