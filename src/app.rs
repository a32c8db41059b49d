//! Mutate-then-persist command layer.
//!
//! [`TodoApp`] owns the current [`TaskStore`] and the
//! [`PersistenceGateway`]. Each command derives the next store, saves it,
//! and only then adopts it, so the in-memory list never runs ahead of what
//! is on disk.

use tracing::{debug, info};

use crate::error::Result;
use crate::persistence::PersistenceGateway;
use crate::storage::KeyValueStorage;
use crate::store::{TaskCounts, TaskStore};
use crate::task::{Task, TaskId};

/// The task list session: current state plus its durable slot.
///
/// # Example
///
/// ```
/// use todolist::{MemoryStorage, PersistenceGateway, TodoApp};
///
/// let mut app = TodoApp::open(PersistenceGateway::new(MemoryStorage::new()));
/// assert!(app.add("Buy milk").unwrap());
/// let id = app.tasks()[0].id;
/// app.set_completed(id, true).unwrap();
/// assert_eq!(app.clear_completed().unwrap(), 1);
/// assert!(app.tasks().is_empty());
/// ```
#[derive(Debug)]
pub struct TodoApp<S> {
    store: TaskStore,
    gateway: PersistenceGateway<S>,
}

impl<S: KeyValueStorage> TodoApp<S> {
    /// Start a session from whatever the gateway has stored.
    ///
    /// Unreadable or corrupt data is logged and replaced by an empty list.
    #[must_use]
    pub fn open(gateway: PersistenceGateway<S>) -> Self {
        let store = TaskStore::from_tasks(gateway.load_or_empty());
        info!(tasks = store.len(), "task list opened");
        Self { store, gateway }
    }

    /// Add a task. Returns `false` for blank input, which writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be saved.
    pub fn add(&mut self, text: &str) -> Result<bool> {
        let (next, added) = self.store.add(text);
        if added {
            self.commit(next)?;
        } else {
            debug!("ignored blank task description");
        }
        Ok(added)
    }

    /// Mark the task with `id` completed or not. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be saved.
    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<()> {
        let next = self.store.set_completed(id, completed);
        self.commit(next)
    }

    /// Flip completion of the task with `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be saved.
    pub fn toggle(&mut self, id: TaskId) -> Result<()> {
        let next = self.store.toggle(id);
        self.commit(next)
    }

    /// Drop all completed tasks, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be saved.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let next = self.store.clear_completed();
        let removed = self.store.len() - next.len();
        self.commit(next)?;
        Ok(removed)
    }

    /// Save `next` and adopt it. Unchanged lists are not written.
    fn commit(&mut self, next: TaskStore) -> Result<()> {
        if next == self.store {
            return Ok(());
        }
        self.gateway.save(next.tasks())?;
        self.store = next;
        Ok(())
    }

    /// Current list state.
    #[must_use]
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// All tasks in list order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// Tasks not yet completed, in list order.
    pub fn remaining(&self) -> impl Iterator<Item = &Task> + '_ {
        self.store.remaining()
    }

    /// Completed tasks, in list order.
    pub fn completed(&self) -> impl Iterator<Item = &Task> + '_ {
        self.store.completed()
    }

    /// Remaining and completed counts.
    #[must_use]
    pub fn counts(&self) -> TaskCounts {
        self.store.counts()
    }

    /// The persistence gateway this session writes through.
    #[must_use]
    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;
    use crate::persistence::TASKS_KEY;
    use crate::storage::{FileStorage, MemoryStorage};

    /// Storage that counts writes and can be told to fail them.
    #[derive(Debug, Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        writes: usize,
        fail_writes: bool,
    }

    impl KeyValueStorage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn put(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(TodoError::storage("disk full"));
            }
            self.writes += 1;
            self.inner.put(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn memory_app() -> TodoApp<MemoryStorage> {
        TodoApp::open(PersistenceGateway::new(MemoryStorage::new()))
    }

    fn stored(app: &TodoApp<MemoryStorage>) -> Vec<Task> {
        app.gateway().load().unwrap()
    }

    #[test]
    fn test_open_on_fresh_storage_is_empty() {
        let app = memory_app();
        assert!(app.tasks().is_empty());
        assert!(app.counts().all_done());
    }

    #[test]
    fn test_open_with_corrupt_storage_is_empty() {
        let storage = MemoryStorage::new().with_value(TASKS_KEY, "<<garbage>>");
        let app = TodoApp::open(PersistenceGateway::new(storage));
        assert!(app.tasks().is_empty());
    }

    #[test]
    fn test_open_restores_saved_tasks() {
        let mut app = memory_app();
        app.add("Buy milk").unwrap();
        app.add("Walk dog").unwrap();
        let storage = app.gateway().storage().clone();

        let reopened = TodoApp::open(PersistenceGateway::new(storage));
        assert_eq!(reopened.tasks(), app.tasks());
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let mut app = memory_app();

        app.add("Buy milk").unwrap();
        assert_eq!(stored(&app), app.tasks());

        let id = app.tasks()[0].id;
        app.set_completed(id, true).unwrap();
        assert_eq!(stored(&app), app.tasks());

        app.toggle(id).unwrap();
        assert!(!stored(&app)[0].is_completed);

        app.set_completed(id, true).unwrap();
        assert_eq!(app.clear_completed().unwrap(), 1);
        assert!(stored(&app).is_empty());
    }

    #[test]
    fn test_blank_add_writes_nothing() {
        let mut app = TodoApp::open(PersistenceGateway::new(FlakyStorage::default()));
        assert!(!app.add("   ").unwrap());
        assert!(app.tasks().is_empty());
        assert_eq!(app.gateway().storage().writes, 0);
    }

    #[test]
    fn test_noop_transitions_write_nothing() {
        let mut app = TodoApp::open(PersistenceGateway::new(FlakyStorage::default()));
        app.add("Buy milk").unwrap();
        assert_eq!(app.gateway().storage().writes, 1);

        app.set_completed(TaskId::new(), true).unwrap();
        app.toggle(TaskId::new()).unwrap();
        assert_eq!(app.clear_completed().unwrap(), 0);
        let id = app.tasks()[0].id;
        app.set_completed(id, false).unwrap();

        assert_eq!(app.gateway().storage().writes, 1);
    }

    #[test]
    fn test_failed_save_keeps_previous_state() {
        let mut app = TodoApp::open(PersistenceGateway::new(FlakyStorage::default()));
        app.add("Buy milk").unwrap();
        let before = app.store().clone();

        app.gateway.storage_mut().fail_writes = true;

        let err = app.add("Walk dog").unwrap_err();
        assert!(matches!(err, TodoError::Storage { .. }));
        assert_eq!(app.store(), &before);

        let id = app.tasks()[0].id;
        assert!(app.set_completed(id, true).is_err());
        assert!(!app.tasks()[0].is_completed);
    }

    #[test]
    fn test_remaining_and_completed_views() {
        let mut app = memory_app();
        app.add("Buy milk").unwrap();
        app.add("Walk dog").unwrap();
        let milk = app.tasks()[0].id;
        app.set_completed(milk, true).unwrap();

        let remaining: Vec<&str> = app.remaining().map(|t| t.description.as_str()).collect();
        let completed: Vec<&str> = app.completed().map(|t| t.description.as_str()).collect();
        assert_eq!(remaining, vec!["Walk dog"]);
        assert_eq!(completed, vec!["Buy milk"]);
    }

    #[test]
    fn test_add_succeeds_after_opening_corrupt_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        std::fs::write(storage.file_path(), "{\"tasks\": \"[{\\\"id\\\"").unwrap();

        let mut app = TodoApp::open(PersistenceGateway::new(storage));
        assert!(app.tasks().is_empty());

        assert!(app.add("Buy milk").unwrap());
        assert!(app.add("Walk dog").unwrap());

        let reopened = TodoApp::open(PersistenceGateway::new(FileStorage::new(temp_dir.path())));
        assert_eq!(reopened.tasks(), app.tasks());
    }

    #[test]
    fn test_open_keeps_valid_tasks_from_irregular_blob() {
        let blob = r#"[
            {"id":"aaaaaaaa-0000-4000-8000-000000000001","description":"Pay rent","isCompleted":false},
            {"id":"aaaaaaaa-0000-4000-8000-000000000002","description":"Buy milk ","isCompleted":true}
        ]"#;
        let storage = MemoryStorage::new().with_value(TASKS_KEY, blob);
        let mut app = TodoApp::open(PersistenceGateway::new(storage));
        assert_eq!(app.tasks().len(), 2);

        app.add("Walk dog").unwrap();
        let descriptions: Vec<String> = stored(&app).into_iter().map(|t| t.description).collect();
        assert_eq!(descriptions, vec!["Pay rent", "Buy milk", "Walk dog"]);
    }
}
