//! todolist - a persisted single-list task manager
//!
//! Users add short text tasks, mark them complete or incomplete, and clear
//! completed tasks. The whole list is written through to a local key-value
//! store after every change.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`task`] - The `Task` value and its UUID identifier
//! - [`store`] - In-memory list with pure, value-returning transitions
//! - [`storage`] - Key-value backends (file and in-memory)
//! - [`persistence`] - Encodes the whole list under one storage key
//! - [`app`] - Mutate-then-persist command layer
//! - [`config`] - Configuration loading and data directory resolution
//! - [`error`] - Custom error types and handling
//!
//! # Example
//!
//! ```rust,no_run
//! use todolist::{FileStorage, PersistenceGateway, TodoApp};
//!
//! let gateway = PersistenceGateway::new(FileStorage::new(".todolist"));
//! let mut app = TodoApp::open(gateway);
//!
//! app.add("Buy milk")?;
//! for task in app.remaining() {
//!     println!("[ ] {}", task.description);
//! }
//! # Ok::<(), todolist::TodoError>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use error::{IntoTodoError, Result, TodoError};

pub use app::TodoApp;
pub use config::TodoConfig;
pub use persistence::{PersistenceGateway, TASKS_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, DEFAULT_NAMESPACE};
pub use store::{TaskCounts, TaskStore};
pub use task::{Task, TaskId};
