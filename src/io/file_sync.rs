use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::project::Project;
use crate::model::todo::Todo;

use super::lock::FileLock;
use super::{StorageError, atomic_write};

/// Name offered when creating a new bound file
pub const SUGGESTED_FILE_NAME: &str = "todo-app-data.json";

/// Contents of a bound file.
///
/// Both collections are optional on read: a file missing one of them leaves
/// the corresponding in-memory collection alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    #[serde(default)]
    pub todos: Option<Vec<Todo>>,
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
}

/// Whether a data file is attached to the store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    Unbound,
    Bound(PathBuf),
}

impl Binding {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Binding::Unbound => None,
            Binding::Bound(path) => Some(path),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }
}

/// Error from choosing a file
#[derive(Debug, thiserror::Error)]
pub enum PickError {
    /// The user dismissed the picker. Not a failure.
    #[error("file selection cancelled")]
    Cancelled,
    #[error("could not choose a file: {0}")]
    Io(#[from] io::Error),
}

/// Source of file paths for binding (a dialog, a CLI argument, a test stub)
pub trait FilePicker {
    /// Choose an existing file to import from and bind to
    fn pick_existing(&mut self) -> Result<PathBuf, PickError>;
    /// Choose where to create a new file
    fn pick_new(&mut self, suggested_name: &str) -> Result<PathBuf, PickError>;
}

/// Picker that always answers with a fixed path
#[derive(Debug, Clone)]
pub struct PathPicker(pub PathBuf);

impl FilePicker for PathPicker {
    fn pick_existing(&mut self) -> Result<PathBuf, PickError> {
        if !self.0.is_file() {
            return Err(PickError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", self.0.display()),
            )));
        }
        Ok(self.0.clone())
    }

    fn pick_new(&mut self, suggested_name: &str) -> Result<PathBuf, PickError> {
        if self.0.is_dir() {
            return Ok(self.0.join(suggested_name));
        }
        Ok(self.0.clone())
    }
}

/// Write both collections to `path` (pretty-printed, stamped with the save
/// time) while holding the file's write lock. Returns the stamp.
pub fn write_file(
    path: &Path,
    todos: &[Todo],
    projects: &[Project],
    lock_timeout: Duration,
) -> Result<DateTime<Utc>, StorageError> {
    let saved = Utc::now();
    let snapshot = FileSnapshot {
        todos: Some(todos.to_vec()),
        projects: Some(projects.to_vec()),
        last_saved: Some(saved),
    };
    let content = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| StorageError::json(path.display().to_string(), e))?;

    let _lock = FileLock::acquire(path, lock_timeout)?;
    atomic_write(path, content.as_bytes()).map_err(|e| StorageError::io(path, e))?;
    Ok(saved)
}

/// Read and parse a bound file
pub fn read_file(path: &Path) -> Result<FileSnapshot, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| StorageError::json(path.display().to_string(), e))
}
