//! In-memory task collection and its pure transitions.
//!
//! [`TaskStore`] owns the authoritative ordered list of tasks. Every
//! transition borrows the current store and returns a new one, so a caller
//! can persist the result before deciding to adopt it.
//!
//! ```text
//! TaskStore
//!   └── tasks: Vec<Task>        insertion order
//!
//! add ─────────────> push back (fresh id, not completed)
//! set_completed ───> replace in place, matched by id
//! clear_completed ─> retain !is_completed
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};
use crate::task::{Task, TaskId};

// ============================================================================
// Task Counts
// ============================================================================

/// Aggregate task counts for summaries.
///
/// # Example
///
/// ```
/// use todolist::TaskCounts;
///
/// let counts = TaskCounts { remaining: 2, completed: 3 };
/// assert_eq!(counts.total(), 5);
/// assert!(!counts.all_done());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    /// Tasks not yet completed
    pub remaining: usize,
    /// Completed tasks
    pub completed: usize,
}

impl TaskCounts {
    /// Get total task count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.remaining + self.completed
    }

    /// True when nothing remains to be done.
    #[must_use]
    pub fn all_done(&self) -> bool {
        self.remaining == 0
    }
}

// ============================================================================
// Task Store
// ============================================================================

/// Ordered collection of tasks with value-returning transitions.
///
/// # Example
///
/// ```
/// use todolist::TaskStore;
///
/// let (store, added) = TaskStore::new().add("Buy milk");
/// assert!(added);
/// let id = store.tasks()[0].id;
///
/// let store = store.set_completed(id, true);
/// assert_eq!(store.remaining().count(), 0);
/// assert_eq!(store.clear_completed().len(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding previously saved tasks.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Append a task built from `description`.
    ///
    /// The input is trimmed. Blank input leaves the store unchanged and
    /// reports `false`.
    #[must_use]
    pub fn add(&self, description: &str) -> (Self, bool) {
        self.add_with_id(TaskId::new(), description)
    }

    pub(crate) fn add_with_id(&self, id: TaskId, description: &str) -> (Self, bool) {
        match Task::with_id(id, description) {
            Some(task) => {
                let mut tasks = self.tasks.clone();
                tasks.push(task);
                (Self { tasks }, true)
            }
            None => (self.clone(), false),
        }
    }

    /// Set the completion flag of the task with `id`.
    ///
    /// An unknown id is not an error; the store comes back unchanged.
    #[must_use]
    pub fn set_completed(&self, id: TaskId, completed: bool) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    task.with_completed(completed)
                } else {
                    task.clone()
                }
            })
            .collect();
        Self { tasks }
    }

    /// Flip the completion flag of the task with `id`. Unknown ids are ignored.
    #[must_use]
    pub fn toggle(&self, id: TaskId) -> Self {
        match self.get(id) {
            Some(task) => self.set_completed(id, !task.is_completed),
            None => self.clone(),
        }
    }

    /// Remove every completed task, keeping the order of the rest.
    #[must_use]
    pub fn clear_completed(&self) -> Self {
        Self {
            tasks: self.remaining().cloned().collect(),
        }
    }

    /// Tasks not yet completed, in list order.
    pub fn remaining(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(|task| !task.is_completed)
    }

    /// Completed tasks, in list order.
    pub fn completed(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(|task| task.is_completed)
    }

    /// All tasks in list order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Consume the store, yielding its tasks.
    #[must_use]
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Count remaining and completed tasks.
    #[must_use]
    pub fn counts(&self) -> TaskCounts {
        let completed = self.completed().count();
        TaskCounts {
            remaining: self.tasks.len() - completed,
            completed,
        }
    }

    /// Resolve a full id or a unique id prefix to a task id.
    ///
    /// Matching ignores case and hyphens, so both `6f1c2a34` and
    /// `6F1C2A34-9B1E` select the same task.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::TaskNotFound`] if nothing matches and
    /// [`TodoError::AmbiguousTaskId`] if more than one task matches.
    pub fn find_by_prefix(&self, query: &str) -> Result<TaskId> {
        let needle: String = query
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        if needle.is_empty() {
            return Err(TodoError::TaskNotFound {
                query: query.to_string(),
            });
        }

        let matches: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|task| task.id.as_uuid().simple().to_string().starts_with(&needle))
            .map(|task| task.id)
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(TodoError::TaskNotFound {
                query: query.to_string(),
            }),
            _ => Err(TodoError::AmbiguousTaskId {
                query: query.to_string(),
                matches: matches.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn id(s: &str) -> TaskId {
        s.parse().unwrap()
    }

    const ID_A: &str = "aaaaaaaa-0000-4000-8000-000000000001";
    const ID_B: &str = "aaaaaaaa-0000-4000-8000-000000000002";
    const ID_C: &str = "cccccccc-0000-4000-8000-000000000003";

    /// Store with three tasks; the middle one is completed.
    fn sample_store() -> TaskStore {
        let (store, _) = TaskStore::new().add_with_id(id(ID_A), "Buy milk");
        let (store, _) = store.add_with_id(id(ID_B), "Walk dog");
        let (store, _) = store.add_with_id(id(ID_C), "Pay rent");
        store.set_completed(id(ID_B), true)
    }

    // ========================================================================
    // add
    // ========================================================================

    #[test]
    fn test_add_to_empty_store() {
        let (store, added) = TaskStore::new().add("Buy milk");
        assert!(added);
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].description, "Buy milk");
        assert!(!store.tasks()[0].is_completed);
    }

    #[test]
    fn test_add_appends_trimmed_task() {
        let before = sample_store();
        let (after, added) = before.add("  Call mom  ");
        assert!(added);
        assert_eq!(after.len(), before.len() + 1);
        let last = after.tasks().last().unwrap();
        assert_eq!(last.description, "Call mom");
        assert!(!last.is_completed);
        assert_eq!(&after.tasks()[..before.len()], before.tasks());
    }

    #[test]
    fn test_add_blank_is_noop() {
        let before = sample_store();
        for blank in ["", "   ", "\t\n", " \r\n "] {
            let (after, added) = before.add(blank);
            assert!(!added, "{blank:?} should be rejected");
            assert_eq!(after, before);
        }
    }

    #[test]
    fn test_add_does_not_touch_original() {
        let before = TaskStore::new();
        let _ = before.add("Buy milk");
        assert!(before.is_empty());
    }

    #[test]
    fn test_added_ids_are_unique() {
        let mut store = TaskStore::new();
        for i in 0..50 {
            store = store.add(&format!("task {i}")).0;
        }
        let ids: HashSet<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 50);
    }

    // ========================================================================
    // set_completed / toggle
    // ========================================================================

    #[test]
    fn test_set_completed_moves_task_between_views() {
        let (store, _) = TaskStore::new().add_with_id(id(ID_A), "Buy milk");
        let store = store.set_completed(id(ID_A), true);

        assert_eq!(store.remaining().count(), 0);
        let completed: Vec<&Task> = store.completed().collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, id(ID_A));
        assert_eq!(completed[0].description, "Buy milk");
        assert!(completed[0].is_completed);
    }

    #[test]
    fn test_set_completed_keeps_position() {
        let store = sample_store().set_completed(id(ID_A), true);
        let ids: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![id(ID_A), id(ID_B), id(ID_C)]);
    }

    #[test]
    fn test_set_completed_round_trip_restores_store() {
        let original = sample_store();
        for task in original.tasks() {
            let flipped = original.set_completed(task.id, !task.is_completed);
            assert_ne!(flipped, original);
            let restored = flipped.set_completed(task.id, task.is_completed);
            assert_eq!(restored, original);
        }
    }

    #[test]
    fn test_set_completed_unknown_id_is_noop() {
        let store = sample_store();
        assert_eq!(store.set_completed(TaskId::new(), true), store);
    }

    #[test]
    fn test_toggle_flips_flag() {
        let store = sample_store();
        let toggled = store.toggle(id(ID_B));
        assert!(!toggled.get(id(ID_B)).unwrap().is_completed);
        assert_eq!(toggled.toggle(id(ID_B)), store);
        assert_eq!(store.toggle(TaskId::new()), store);
    }

    // ========================================================================
    // clear_completed
    // ========================================================================

    #[test]
    fn test_clear_completed_keeps_remaining_in_order() {
        let cleared = sample_store().clear_completed();
        let ids: Vec<TaskId> = cleared.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![id(ID_A), id(ID_C)]);
        assert_eq!(cleared.completed().count(), 0);
    }

    #[test]
    fn test_clear_completed_two_tasks_one_done() {
        let (store, _) = TaskStore::new().add_with_id(id(ID_A), "Buy milk");
        let (store, _) = store.add_with_id(id(ID_B), "Walk dog");
        let cleared = store.set_completed(id(ID_A), true).clear_completed();
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared.tasks()[0].id, id(ID_B));
    }

    #[test]
    fn test_clear_completed_is_idempotent() {
        let once = sample_store().clear_completed();
        assert_eq!(once.clear_completed(), once);
        assert_eq!(TaskStore::new().clear_completed(), TaskStore::new());
    }

    // ========================================================================
    // views
    // ========================================================================

    #[test]
    fn test_views_partition_the_store() {
        let store = sample_store();
        let remaining: HashSet<TaskId> = store.remaining().map(|t| t.id).collect();
        let completed: HashSet<TaskId> = store.completed().map(|t| t.id).collect();
        let all: HashSet<TaskId> = store.tasks().iter().map(|t| t.id).collect();

        assert!(remaining.is_disjoint(&completed));
        assert_eq!(&remaining | &completed, all);
    }

    #[test]
    fn test_views_on_empty_store() {
        let store = TaskStore::new();
        assert_eq!(store.remaining().count(), 0);
        assert_eq!(store.completed().count(), 0);
        assert!(store.counts().all_done());
    }

    #[test]
    fn test_counts() {
        let counts = sample_store().counts();
        assert_eq!(counts.remaining, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.total(), 3);
        assert!(!counts.all_done());
    }

    // ========================================================================
    // find_by_prefix
    // ========================================================================

    #[test]
    fn test_find_by_full_id() {
        assert_eq!(sample_store().find_by_prefix(ID_C).unwrap(), id(ID_C));
    }

    #[test]
    fn test_find_by_unique_prefix_ignores_case() {
        assert_eq!(sample_store().find_by_prefix("CCC").unwrap(), id(ID_C));
    }

    #[test]
    fn test_find_by_prefix_with_hyphen() {
        let store = sample_store();
        let found = store.find_by_prefix("aaaaaaaa-0000-4000-8000-000000000002");
        assert_eq!(found.unwrap(), id(ID_B));
    }

    #[test]
    fn test_find_by_ambiguous_prefix() {
        let err = sample_store().find_by_prefix("aaaa").unwrap_err();
        assert!(matches!(err, TodoError::AmbiguousTaskId { matches: 2, .. }));
    }

    #[test]
    fn test_find_by_missing_prefix() {
        let store = sample_store();
        assert!(matches!(
            store.find_by_prefix("ffff").unwrap_err(),
            TodoError::TaskNotFound { .. }
        ));
        assert!(matches!(
            store.find_by_prefix("  ").unwrap_err(),
            TodoError::TaskNotFound { .. }
        ));
    }
}
