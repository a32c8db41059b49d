//! Key-value storage backends.
//!
//! [`KeyValueStorage`] is the durable slot the persistence gateway writes
//! through. Two backends are provided:
//!
//! - [`FileStorage`] keeps one JSON document per namespace on disk and
//!   replaces it atomically on every write.
//! - [`MemoryStorage`] keeps values in a `HashMap`, for tests and embedding.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{IntoTodoError, Result, TodoError};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "todo_prefs";

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Lock file suffix for concurrent access prevention.
const LOCK_SUFFIX: &str = ".lock";

/// Suffix for an unparsable document set aside on write.
const CORRUPT_SUFFIX: &str = ".corrupt";

/// A string-keyed store of string values.
///
/// # Example
///
/// ```
/// use todolist::{KeyValueStorage, MemoryStorage};
///
/// let mut storage = MemoryStorage::new();
/// storage.put("greeting", "hello").unwrap();
/// assert_eq!(storage.get("greeting").unwrap().as_deref(), Some("hello"));
/// ```
pub trait KeyValueStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store can't be read. A key that was
    /// never written is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable. The previous
    /// value is left in place in that case.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store can't be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ============================================================================
// File Storage
// ============================================================================

/// File-backed storage: `<dir>/<namespace>.json` holds a JSON object
/// mapping keys to string values.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory holding the namespace document.
    dir: PathBuf,
    /// Document name without extension.
    namespace: String,
}

impl FileStorage {
    /// Creates storage for the default namespace in `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_namespace(dir, DEFAULT_NAMESPACE)
    }

    /// Creates storage for `namespace` in `dir`.
    #[must_use]
    pub fn with_namespace(dir: impl AsRef<Path>, namespace: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            namespace: namespace.into(),
        }
    }

    /// Returns the path to the namespace document.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.namespace))
    }

    /// Returns the path to the temporary document.
    #[must_use]
    pub fn tmp_file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json{TMP_SUFFIX}", self.namespace))
    }

    /// Returns the path to the lock file.
    #[must_use]
    pub fn lock_file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json{LOCK_SUFFIX}", self.namespace))
    }

    /// Returns the path an unparsable document is moved to.
    #[must_use]
    pub fn corrupt_file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json{CORRUPT_SUFFIX}", self.namespace))
    }

    /// Checks if the namespace document exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.file_path().exists()
    }

    fn read_document_locked(&self) -> Result<BTreeMap<String, String>> {
        let lock_path = self.lock_file_path();
        let _lock = if lock_path.exists() {
            let lock_file = File::open(&lock_path)?;
            FileExt::lock_shared(&lock_file).map_err(|e| TodoError::Lock {
                path: lock_path.clone(),
                message: e.to_string(),
            })?;
            Some(lock_file)
        } else {
            None
        };

        self.read_document()
    }

    /// Reads the document. Callers hold the lock.
    fn read_document(&self) -> Result<BTreeMap<String, String>> {
        match self.read_contents()? {
            Some(contents) => self.parse_document(&contents),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Raw document text; `None` when the file is missing or blank.
    fn read_contents(&self) -> Result<Option<String>> {
        let path = self.file_path();

        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TodoError::storage_with_path(
                    format!("Failed to open: {e}"),
                    path,
                ))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            TodoError::storage_with_path(format!("Failed to read: {e}"), path.clone())
        })?;

        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(contents))
    }

    fn parse_document(&self, contents: &str) -> Result<BTreeMap<String, String>> {
        serde_json::from_str(contents).map_err(|e| {
            TodoError::storage_with_path(
                format!("Namespace document is not a map of strings: {e}"),
                self.file_path(),
            )
        })
    }

    /// Applies `edit` to the document and replaces it atomically.
    ///
    /// An unparsable document is moved to `<file>.corrupt` and replaced by a
    /// fresh one.
    fn update_document<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        fs::create_dir_all(&self.dir).map_err(|e| {
            TodoError::storage_with_path(format!("Failed to create directory: {e}"), self.dir.clone())
        })?;

        let lock_path = self.lock_file_path();
        let lock_file = File::create(&lock_path)?;
        FileExt::lock_exclusive(&lock_file).map_err(|e| TodoError::Lock {
            path: lock_path.clone(),
            message: e.to_string(),
        })?;

        let mut document = match self.read_contents()? {
            Some(contents) => match self.parse_document(&contents) {
                Ok(document) => document,
                Err(e) => {
                    let corrupt_path = self.corrupt_file_path();
                    warn!(
                        "{e}. Moving it to {} and starting fresh.",
                        corrupt_path.display()
                    );
                    fs::rename(self.file_path(), &corrupt_path).map_err(|e| {
                        TodoError::storage_with_path(
                            format!("Failed to set aside unreadable document: {e}"),
                            corrupt_path.clone(),
                        )
                    })?;
                    BTreeMap::new()
                }
            },
            None => BTreeMap::new(),
        };
        edit(&mut document);

        let json = serde_json::to_string_pretty(&document).into_todo_storage()?;
        let tmp_path = self.tmp_file_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(json.as_bytes())?;
            tmp_file.sync_all()
        };
        write_tmp().map_err(|e| {
            TodoError::storage_with_path(format!("Failed to write: {e}"), tmp_path.clone())
        })?;

        fs::rename(&tmp_path, self.file_path()).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            TodoError::storage_with_path(format!("Failed to replace: {e}"), self.file_path())
        })?;

        debug!(path = %self.file_path().display(), "namespace document written");
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_document_locked()?.remove(key))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.update_document(|doc| {
            doc.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.exists() {
            return Ok(());
        }
        self.update_document(|doc| {
            doc.remove(key);
        })
    }
}

// ============================================================================
// Memory Storage
// ============================================================================

/// Volatile storage backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a single key.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}
