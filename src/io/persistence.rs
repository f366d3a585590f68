use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::model::workspace::Workspace;
use crate::ops::reorder::initialize_project_orders;
use crate::parse::extract_tags;

use super::StorageError;
use super::file_sync::{self, Binding, FileSnapshot};
use super::kv::{KEY_COLLAPSED, KEY_FILE_PATH, KEY_FILE_PENDING, KEY_PROJECTS, KEY_TODOS, KeyValueStore};

/// Result of reading the local store
#[derive(Debug)]
pub struct LocalLoad {
    pub workspace: Workspace,
    /// True if the Inbox had to be synthesized
    pub created_inbox: bool,
    /// Problems found while reading. Affected collections fall back to empty
    /// in memory and are not written back.
    pub problems: Vec<StorageError>,
}

/// A bound file read on top of the current workspace
#[derive(Debug)]
pub struct FileImport {
    pub workspace: Workspace,
    /// Keys of the collections the file supplied
    pub supplied: Vec<&'static str>,
}

/// Result of `save_changes`
#[derive(Debug)]
pub struct SaveReport {
    pub local: Result<(), StorageError>,
    /// `None` when no file is bound
    pub file: Option<Result<DateTime<Utc>, StorageError>>,
}

impl SaveReport {
    pub fn is_ok(&self) -> bool {
        self.local.is_ok() && !matches!(self.file, Some(Err(_)))
    }
}

/// Reads and writes the collections to the key-value store and, when bound,
/// to a data file.
///
/// A collection that failed to load is never overwritten: collection writes
/// are refused until a file import supplies it again.
pub struct Persistence {
    kv: Box<dyn KeyValueStore>,
    binding: Binding,
    lock_timeout: Duration,
    unreadable: BTreeSet<&'static str>,
}

impl Persistence {
    pub fn new(kv: Box<dyn KeyValueStore>, lock_timeout: Duration) -> Self {
        Persistence {
            kv,
            binding: Binding::Unbound,
            lock_timeout,
            unreadable: BTreeSet::new(),
        }
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    // -----------------------------------------------------------------------
    // Local store
    // -----------------------------------------------------------------------

    /// Read both collections. Missing or unreadable projects, or a project
    /// list without an Inbox, get a fresh Inbox. Tags are recomputed.
    pub fn load_local(&mut self, inbox_color: &str) -> LocalLoad {
        let mut problems = Vec::new();
        let todos: Vec<Todo> = self.read_json(KEY_TODOS, &mut problems).unwrap_or_default();
        let projects: Vec<Project> = self.read_json(KEY_PROJECTS, &mut problems).unwrap_or_default();

        let mut workspace = Workspace::new(todos, projects);
        let created_inbox = reconcile(&mut workspace, inbox_color);
        LocalLoad {
            workspace,
            created_inbox,
            problems,
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &mut self,
        key: &'static str,
        problems: &mut Vec<StorageError>,
    ) -> Option<T> {
        let parsed = match self.kv.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).map_err(|e| StorageError::json(key, e)),
            Ok(None) => return None,
            Err(e) => Err(e),
        };
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                problems.push(e);
                self.unreadable.insert(key);
                None
            }
        }
    }

    /// False while a collection that failed to load is being protected
    pub fn is_writable(&self) -> bool {
        self.unreadable.is_empty()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        match self.unreadable.first() {
            Some(key) => Err(StorageError::Unreadable {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Write both collections, plus the bound path if any
    pub fn save_local(&mut self, ws: &Workspace) -> Result<(), StorageError> {
        self.check_writable()?;
        let todos = serde_json::to_string(&ws.todos).map_err(|e| StorageError::json(KEY_TODOS, e))?;
        let projects =
            serde_json::to_string(&ws.projects).map_err(|e| StorageError::json(KEY_PROJECTS, e))?;
        self.kv.set(KEY_TODOS, &todos)?;
        self.kv.set(KEY_PROJECTS, &projects)?;
        if let Some(path) = self.binding.path() {
            let path = path.display().to_string();
            self.kv.set(KEY_FILE_PATH, &path)?;
        }
        Ok(())
    }

    /// Local write always; file write only when bound. A failed file write
    /// does not undo the local one.
    pub fn save_changes(&mut self, ws: &Workspace) -> SaveReport {
        let local = self.save_local(ws);
        let file = self
            .binding
            .is_bound()
            .then(|| self.save_file(ws));
        let local = local.and_then(|()| self.track_file_sync(file.as_ref()));
        SaveReport { local, file }
    }

    /// Flag the local copy as ahead of the remembered file when this save
    /// did not reach it
    fn track_file_sync(&mut self, file: Option<&Result<DateTime<Utc>, StorageError>>) -> Result<(), StorageError> {
        let behind = match file {
            Some(Ok(_)) => false,
            Some(Err(_)) => true,
            None => self.stored_file_path()?.is_some(),
        };
        if behind {
            self.kv.set(KEY_FILE_PENDING, "true")
        } else {
            self.mark_synced()
        }
    }

    /// The remembered file now matches the local copy
    pub fn mark_synced(&mut self) -> Result<(), StorageError> {
        self.kv.remove(KEY_FILE_PENDING)
    }

    /// True if the local collections hold changes the remembered file lacks
    pub fn file_sync_pending(&self) -> Result<bool, StorageError> {
        Ok(self.kv.get(KEY_FILE_PENDING)?.is_some())
    }

    // -----------------------------------------------------------------------
    // Collapse state
    // -----------------------------------------------------------------------

    pub fn load_collapsed(&self) -> Result<BTreeSet<String>, StorageError> {
        match self.kv.get(KEY_COLLAPSED)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::json(KEY_COLLAPSED, e)),
            None => Ok(BTreeSet::new()),
        }
    }

    pub fn save_collapsed(&mut self, collapsed: &BTreeSet<String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(collapsed).map_err(|e| StorageError::json(KEY_COLLAPSED, e))?;
        self.kv.set(KEY_COLLAPSED, &raw)
    }

    // -----------------------------------------------------------------------
    // Bound file
    // -----------------------------------------------------------------------

    /// Path remembered from an earlier session, if any
    pub fn stored_file_path(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(self
            .kv
            .get(KEY_FILE_PATH)?
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from))
    }

    /// Attach a file and remember its path. The file and the local copy are
    /// taken to agree from here on.
    pub fn bind(&mut self, path: &Path) -> Result<(), StorageError> {
        self.binding = Binding::Bound(path.to_path_buf());
        self.kv.set(KEY_FILE_PATH, &path.display().to_string())?;
        self.mark_synced()
    }

    /// Detach the file and forget its path
    pub fn unbind(&mut self) -> Result<(), StorageError> {
        self.binding = Binding::Unbound;
        self.kv.remove(KEY_FILE_PATH)?;
        self.mark_synced()
    }

    pub fn save_file(&self, ws: &Workspace) -> Result<DateTime<Utc>, StorageError> {
        let path = self.binding.path().ok_or(StorageError::NotBound)?;
        self.export_to(path, ws)
    }

    /// Write the collections to `path` whether or not it is bound
    pub fn export_to(&self, path: &Path, ws: &Workspace) -> Result<DateTime<Utc>, StorageError> {
        self.check_writable()?;
        file_sync::write_file(path, &ws.todos, &ws.projects, self.lock_timeout)
    }

    /// Read a file into a workspace built on top of `current`.
    ///
    /// Collections absent from the file keep their current contents. The
    /// result is reconciled (Inbox ensured, tags recomputed). `current` is
    /// never touched, so a failed read leaves memory as it was.
    pub fn read_into(
        &self,
        path: &Path,
        current: &Workspace,
        inbox_color: &str,
    ) -> Result<FileImport, StorageError> {
        let FileSnapshot { todos, projects, .. } = file_sync::read_file(path)?;
        let mut supplied = Vec::new();
        if todos.is_some() {
            supplied.push(KEY_TODOS);
        }
        if projects.is_some() {
            supplied.push(KEY_PROJECTS);
        }
        let mut workspace = Workspace::new(
            todos.unwrap_or_else(|| current.todos.clone()),
            projects.unwrap_or_else(|| current.projects.clone()),
        );
        reconcile(&mut workspace, inbox_color);
        Ok(FileImport { workspace, supplied })
    }

    /// Take over an imported workspace. Collections the file supplied may be
    /// written again even if their local copy was unreadable.
    pub fn adopt(&mut self, import: FileImport) -> Workspace {
        for key in &import.supplied {
            self.unreadable.remove(key);
        }
        import.workspace
    }
}

/// Bring loaded data back in line with the model's invariants: one Inbox,
/// tags matching text, every todo in a known project, every project ordered.
/// Returns true if the Inbox had to be created.
pub fn reconcile(ws: &mut Workspace, inbox_color: &str) -> bool {
    let created = ws.ensure_inbox(inbox_color);
    initialize_project_orders(ws);
    for todo in &mut ws.todos {
        todo.tags = extract_tags(&todo.text);
    }
    let known: BTreeSet<String> = ws.projects.iter().map(|p| p.id.clone()).collect();
    for todo in ws.todos.iter_mut().filter(|t| !known.contains(&t.project_id)) {
        tracing::debug!(todo = %todo.id, project = %todo.project_id, "orphaned todo moved to inbox");
        todo.project_id = crate::model::project::INBOX_ID.to_string();
    }
    created
}
