pub mod presenter;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::io::StorageError;
use crate::io::file_sync::{Binding, FilePicker, PickError, SUGGESTED_FILE_NAME};
use crate::io::kv::KeyValueStore;
use crate::io::persistence::{FileImport, Persistence, SaveReport};
use crate::model::config::Config;
use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::model::workspace::Workspace;
use crate::ops::view_ops::{self, ArchiveView, ProjectGroup, ViewState};
use crate::ops::{OpError, Outcome, Refusal, project_ops, reorder, todo_ops};

pub use self::presenter::{NullPresenter, Presenter, PresenterEvent, RecordingPresenter, StatusLevel};

/// Error type for file binding operations
#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error(transparent)]
    Pick(#[from] PickError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error type for store mutators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Op(#[from] OpError),
    /// Applied in memory, but a write failed. The failure was already
    /// reported through the presenter.
    #[error("changes could not be saved")]
    Unsaved,
}

/// Which presenter refreshes follow a committed change
#[derive(Debug, Clone, Copy)]
struct Refresh {
    tags: bool,
    badge: bool,
}

impl Refresh {
    const RENDER: Refresh = Refresh {
        tags: false,
        badge: false,
    };
    const TAGS: Refresh = Refresh {
        tags: true,
        badge: false,
    };
    const ALL: Refresh = Refresh {
        tags: true,
        badge: true,
    };
}

/// Owns the workspace and everything that reacts to it.
///
/// Every mutator runs the model operation, persists on a real change, then
/// notifies the presenter. Refusals become status messages and unknown ids
/// are only logged. A failed write becomes a danger-level status message and
/// `StoreError::Unsaved`, while the in-memory state is kept.
pub struct Store {
    workspace: Workspace,
    view: ViewState,
    persistence: Persistence,
    presenter: Box<dyn Presenter>,
    config: Config,
}

impl Store {
    /// Load from the key-value store and, when configured, reconnect to the
    /// file remembered from the last session.
    pub fn open(kv: Box<dyn KeyValueStore>, config: Config, presenter: Box<dyn Presenter>) -> Self {
        let persistence = Persistence::new(kv, Duration::from_millis(config.file.lock_timeout_ms));
        let mut store = Store {
            workspace: Workspace::default(),
            view: ViewState::default(),
            persistence,
            presenter,
            config,
        };
        store.load_from_local();
        if store.config.file.reconnect_on_start {
            // failures are already reported
            let _ = store.reconnect();
        }
        store
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn binding(&self) -> &Binding {
        self.persistence.binding()
    }

    pub fn all_tags(&self) -> Vec<String> {
        view_ops::all_tags(&self.workspace)
    }

    pub fn active_view(&self) -> Vec<ProjectGroup<'_>> {
        view_ops::active_view(&self.workspace, &self.view)
    }

    pub fn archive_view(&self) -> ArchiveView<'_> {
        view_ops::archive_view(&self.workspace)
    }

    pub fn archived_count(&self) -> usize {
        view_ops::archived_count(&self.workspace)
    }

    // -----------------------------------------------------------------------
    // Todos
    // -----------------------------------------------------------------------

    pub fn add_todo(&mut self, text: &str, project_id: Option<&str>) -> Result<String, StoreError> {
        let result = todo_ops::add_todo(&mut self.workspace, text, project_id);
        let id = self.check(result)?;
        tracing::debug!(todo = %id, "added todo");
        self.commit(Refresh::TAGS)?;
        Ok(id)
    }

    pub fn edit_todo(&mut self, id: &str, new_text: &str, new_project_id: Option<&str>) -> Result<(), StoreError> {
        let result = todo_ops::edit_todo(&mut self.workspace, id, new_text, new_project_id);
        self.check(result)?;
        self.commit(Refresh::TAGS)
    }

    pub fn delete_todo(&mut self, id: &str) -> Result<Todo, StoreError> {
        let result = todo_ops::delete_todo(&mut self.workspace, id);
        let removed = self.check(result)?;
        self.commit(Refresh::ALL)?;
        Ok(removed)
    }

    pub fn update_todo_notes(&mut self, id: &str, notes: &str) -> Result<(), StoreError> {
        let result = todo_ops::update_todo_notes(&mut self.workspace, id, notes);
        self.check(result)?;
        self.commit(Refresh::RENDER)?;
        self.presenter.status("Notes saved successfully!", StatusLevel::Success);
        Ok(())
    }

    /// Returns the new `completed` value
    pub fn toggle_complete(&mut self, id: &str) -> Result<bool, StoreError> {
        let result = todo_ops::toggle_complete(&mut self.workspace, id);
        let completed = self.check(result)?;
        self.commit(Refresh::RENDER)?;
        Ok(completed)
    }

    pub fn archive_todo(&mut self, id: &str) -> Result<Outcome, StoreError> {
        let result = todo_ops::archive_todo(&mut self.workspace, id);
        self.commit_if(result, Refresh::ALL)
    }

    pub fn unarchive_todo(&mut self, id: &str) -> Result<Outcome, StoreError> {
        let result = todo_ops::unarchive_todo(&mut self.workspace, id);
        self.commit_if(result, Refresh::ALL)
    }

    pub fn move_todo_to_project(&mut self, id: &str, project_id: &str) -> Result<Outcome, StoreError> {
        let result = todo_ops::move_todo_to_project(&mut self.workspace, id, project_id);
        self.commit_if(result, Refresh::RENDER)
    }

    pub fn reorder_todo(&mut self, id: &str, target: usize) -> Result<Outcome, StoreError> {
        let result = reorder::reorder_todo(&mut self.workspace, id, target);
        self.commit_if(result, Refresh::RENDER)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn add_project(&mut self, name: &str, color: Option<&str>) -> Result<Project, StoreError> {
        let project = project_ops::add_project(
            &mut self.workspace,
            name,
            color,
            &self.config.projects.default_color,
        );
        tracing::debug!(project = %project.id, "added project");
        self.commit(Refresh::RENDER)?;
        Ok(project)
    }

    pub fn edit_project(&mut self, id: &str, new_name: &str) -> Result<(), StoreError> {
        let result = project_ops::edit_project(&mut self.workspace, id, new_name);
        self.check(result)?;
        self.commit(Refresh::RENDER)
    }

    pub fn update_project_notes(&mut self, id: &str, notes: &str) -> Result<(), StoreError> {
        let result = project_ops::update_project_notes(&mut self.workspace, id, notes);
        self.check(result)?;
        self.commit(Refresh::RENDER)?;
        self.presenter.status("Project notes saved!", StatusLevel::Success);
        Ok(())
    }

    pub fn archive_project(&mut self, id: &str) -> Result<(), StoreError> {
        let result = project_ops::archive_project(&mut self.workspace, id);
        self.check(result)?;
        self.commit(Refresh::ALL)
    }

    pub fn unarchive_project(&mut self, id: &str) -> Result<(), StoreError> {
        let result = project_ops::unarchive_project(&mut self.workspace, id);
        self.check(result)?;
        self.commit(Refresh::ALL)
    }

    /// Returns how many todos moved to the Inbox
    pub fn delete_project(&mut self, id: &str) -> Result<usize, StoreError> {
        let result = project_ops::delete_project(&mut self.workspace, id, &self.config.projects.inbox_color);
        let moved = self.check(result)?;
        let collapse_saved = if self.view.collapsed_projects.remove(id) {
            self.save_collapsed()
        } else {
            Ok(())
        };
        self.commit(Refresh::ALL)?;
        collapse_saved?;
        Ok(moved)
    }

    pub fn reorder_project(&mut self, id: &str, target: usize) -> Result<Outcome, StoreError> {
        let result = reorder::reorder_project(&mut self.workspace, id, target);
        self.commit_if(result, Refresh::RENDER)
    }

    pub fn move_project_up(&mut self, id: &str) -> Result<Outcome, StoreError> {
        let result = reorder::move_project_up(&mut self.workspace, id);
        self.commit_if(result, Refresh::RENDER)
    }

    pub fn move_project_down(&mut self, id: &str) -> Result<Outcome, StoreError> {
        let result = reorder::move_project_down(&mut self.workspace, id);
        self.commit_if(result, Refresh::RENDER)
    }

    // -----------------------------------------------------------------------
    // View state
    // -----------------------------------------------------------------------

    /// Returns whether the tag is now active
    pub fn toggle_tag_filter(&mut self, tag: &str) -> bool {
        let active = self.view.toggle_tag_filter(tag);
        self.refresh_filters();
        active
    }

    pub fn focus_tag(&mut self, tag: &str) {
        self.view.focus_tag(tag);
        self.refresh_filters();
    }

    pub fn clear_tag_filters(&mut self) {
        self.view.clear_tag_filters();
        self.refresh_filters();
        self.presenter.status("All tag filters cleared", StatusLevel::Info);
    }

    fn refresh_filters(&mut self) {
        self.presenter.render();
        self.presenter.refresh_tag_filters();
    }

    /// Returns whether the project is now collapsed
    pub fn toggle_project_collapse(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.workspace.project(id).is_none() {
            self.check::<()>(Err(OpError::project_not_found(id)))?;
        }
        let collapsed = self.view.toggle_project_collapse(id);
        let saved = self.save_collapsed();
        self.presenter.render();
        saved?;
        Ok(collapsed)
    }

    pub fn expand_all_projects(&mut self) -> Result<(), StoreError> {
        self.view.expand_all(&self.workspace);
        let saved = self.save_collapsed();
        self.presenter.render();
        saved?;
        self.presenter.status("All projects expanded", StatusLevel::Info);
        Ok(())
    }

    pub fn collapse_all_projects(&mut self) -> Result<(), StoreError> {
        self.view.collapse_all(&self.workspace);
        let saved = self.save_collapsed();
        self.presenter.render();
        saved?;
        self.presenter.status("All projects collapsed", StatusLevel::Info);
        Ok(())
    }

    fn save_collapsed(&mut self) -> Result<(), StoreError> {
        self.persistence
            .save_collapsed(&self.view.collapsed_projects)
            .map_err(|e| {
                self.storage_failure("Error saving collapsed projects", &e);
                StoreError::Unsaved
            })
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Replace the in-memory state with what the key-value store holds
    pub fn load_from_local(&mut self) {
        let load = self.persistence.load_local(&self.config.projects.inbox_color);
        for problem in &load.problems {
            self.storage_failure("Error loading saved data", problem);
        }
        self.workspace = load.workspace;
        if load.created_inbox && load.problems.is_empty() {
            tracing::info!("created inbox project");
            if let Err(e) = self.persistence.save_local(&self.workspace) {
                self.storage_failure("Error saving data", &e);
            }
        }

        match self.persistence.load_collapsed() {
            Ok(collapsed) => self.view.collapsed_projects = collapsed,
            Err(e) => self.storage_failure("Error loading collapsed projects", &e),
        }
        self.view.forget_missing(&self.workspace);
        self.render_all();
    }

    /// False while saved collections that failed to load are protected from
    /// being overwritten. A file import of those collections lifts it.
    pub fn is_writable(&self) -> bool {
        self.persistence.is_writable()
    }

    /// Write everything to the key-value store and, when bound, the file
    pub fn save_changes(&mut self) -> bool {
        let report = self.persistence.save_changes(&self.workspace);
        self.report_save(report)
    }

    /// Write the bound file on request
    pub fn save_to_file(&mut self) -> Result<DateTime<Utc>, FileOpError> {
        if !self.binding().is_bound() {
            self.presenter
                .status("No file selected. Please set a file path first.", StatusLevel::Warning);
            return Err(StorageError::NotBound.into());
        }
        match self.persistence.save_file(&self.workspace) {
            Ok(at) => {
                if let Err(e) = self.persistence.mark_synced() {
                    self.storage_failure("Error saving data", &e);
                }
                self.presenter.status("Data saved to file successfully!", StatusLevel::Success);
                Ok(at)
            }
            Err(e) => {
                self.storage_failure("Error saving to file", &e);
                Err(e.into())
            }
        }
    }

    /// Pick an existing file, import it and bind to it.
    /// Returns `None` when the user cancelled.
    pub fn open_file(&mut self, picker: &mut dyn FilePicker) -> Result<Option<PathBuf>, FileOpError> {
        let Some(path) = self.pick(picker.pick_existing())? else {
            return Ok(None);
        };
        let import = self.read_file(&path)?;
        tracing::info!(path = %path.display(), "bound data file");
        self.install(&path, import)?;
        self.presenter.status(
            &format!("File {} set successfully!", path.display()),
            StatusLevel::Success,
        );
        Ok(Some(path))
    }

    /// Pick a location for a new file, bind to it and export into it.
    /// Returns `None` when the user cancelled. A failed export leaves the
    /// store unbound.
    pub fn create_file(&mut self, picker: &mut dyn FilePicker) -> Result<Option<PathBuf>, FileOpError> {
        let Some(path) = self.pick(picker.pick_new(SUGGESTED_FILE_NAME))? else {
            return Ok(None);
        };
        if let Err(e) = self.persistence.bind(&path) {
            self.storage_failure("Error setting file path", &e);
            return Err(e.into());
        }
        match self.persistence.save_file(&self.workspace) {
            Ok(at) => {
                tracing::info!(path = %path.display(), "created data file");
                self.presenter.autosaved(at);
                self.presenter.status(
                    &format!("File {} set successfully!", path.display()),
                    StatusLevel::Success,
                );
                Ok(Some(path))
            }
            Err(e) => {
                self.storage_failure("Error saving to file", &e);
                if let Err(unbind) = self.persistence.unbind() {
                    self.storage_failure("Error clearing file path", &unbind);
                }
                Err(e.into())
            }
        }
    }

    /// Re-read the bound file. On failure memory is left as it was.
    pub fn load_from_file(&mut self) -> Result<(), FileOpError> {
        let Some(path) = self.binding().path().map(|p| p.to_path_buf()) else {
            self.presenter
                .status("No file selected. Please set a file path first.", StatusLevel::Warning);
            return Err(StorageError::NotBound.into());
        };
        let import = self.read_file(&path)?;
        self.install(&path, import)?;
        self.presenter.status("Data loaded from file successfully!", StatusLevel::Success);
        Ok(())
    }

    /// Bind to the file remembered under `filePath`.
    ///
    /// The file is loaded, unless the local copy holds changes that never
    /// reached it: then the local copy is written out to the file instead.
    /// Returns the path, or `None` when nothing was remembered.
    pub fn reconnect(&mut self) -> Result<Option<PathBuf>, FileOpError> {
        let remembered = self
            .persistence
            .stored_file_path()
            .and_then(|path| Ok((path, self.persistence.file_sync_pending()?)));
        let (path, pending) = match remembered {
            Ok((Some(path), pending)) => (path, pending),
            Ok((None, _)) => return Ok(None),
            Err(e) => {
                self.storage_failure("Error reading file path", &e);
                return Err(e.into());
            }
        };
        if pending && self.persistence.is_writable() {
            return self.push_local(path);
        }

        let import = match self.persistence.read_into(&path, &self.workspace, &self.config.projects.inbox_color) {
            Ok(import) => import,
            Err(e) => {
                self.reconnect_failed(&path, &e);
                return Err(e.into());
            }
        };
        tracing::info!(path = %path.display(), "reconnected data file");
        self.install(&path, import)?;
        Ok(Some(path))
    }

    fn push_local(&mut self, path: PathBuf) -> Result<Option<PathBuf>, FileOpError> {
        let at = match self.persistence.export_to(&path, &self.workspace) {
            Ok(at) => at,
            Err(e) => {
                self.reconnect_failed(&path, &e);
                return Err(e.into());
            }
        };
        if let Err(e) = self.persistence.bind(&path) {
            self.storage_failure("Error setting file path", &e);
            return Err(e.into());
        }
        tracing::info!(path = %path.display(), "reconnected data file, wrote unsynced local changes");
        self.presenter.autosaved(at);
        Ok(Some(path))
    }

    fn reconnect_failed(&mut self, path: &Path, error: &StorageError) {
        tracing::warn!(path = %path.display(), error = %error, "could not reconnect to data file");
        self.presenter.status(
            &format!("Could not reconnect to {}: {error}", path.display()),
            StatusLevel::Warning,
        );
    }

    /// Detach the bound file. The file itself is left alone.
    pub fn unbind(&mut self) -> Result<(), FileOpError> {
        if let Err(e) = self.persistence.unbind() {
            self.storage_failure("Error clearing file path", &e);
            return Err(e.into());
        }
        tracing::info!("unbound data file");
        self.presenter.status("File unlinked.", StatusLevel::Info);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn read_file(&mut self, path: &Path) -> Result<FileImport, FileOpError> {
        self.persistence
            .read_into(path, &self.workspace, &self.config.projects.inbox_color)
            .map_err(|e| {
                self.storage_failure("Error loading from file. Invalid format or access denied", &e);
                e.into()
            })
    }

    /// Bind to `path`, take over what was read from it and write that
    /// through to the local store
    fn install(&mut self, path: &Path, import: FileImport) -> Result<(), StorageError> {
        self.workspace = self.persistence.adopt(import);
        let saved = self
            .persistence
            .bind(path)
            .and_then(|()| self.persistence.save_local(&self.workspace));
        if let Err(e) = &saved {
            self.storage_failure("Error saving data", e);
        }
        self.view.forget_missing(&self.workspace);
        self.render_all();
        saved
    }

    /// Report a failed operation the way its kind calls for
    fn check<T>(&mut self, result: Result<T, OpError>) -> Result<T, OpError> {
        result.inspect_err(|e| match e {
            OpError::NotFound { kind, id } => {
                tracing::debug!(%kind, %id, "operation on missing record ignored");
            }
            OpError::Refused(refusal) => {
                self.presenter.status(&refusal.to_string(), refusal_level(refusal));
            }
        })
    }

    fn commit_if(&mut self, result: Result<Outcome, OpError>, refresh: Refresh) -> Result<Outcome, StoreError> {
        let outcome = self.check(result)?;
        if outcome.changed() {
            self.commit(refresh)?;
        }
        Ok(outcome)
    }

    /// Persist, then refresh the presenter. The change stays in memory even
    /// when a write fails.
    fn commit(&mut self, refresh: Refresh) -> Result<(), StoreError> {
        let saved = self.save_changes();
        self.presenter.render();
        if refresh.tags {
            self.presenter.refresh_tag_filters();
        }
        if refresh.badge {
            self.presenter.refresh_archive_badge();
        }
        if saved { Ok(()) } else { Err(StoreError::Unsaved) }
    }

    fn render_all(&mut self) {
        self.presenter.render();
        self.presenter.refresh_tag_filters();
        self.presenter.refresh_archive_badge();
    }

    fn report_save(&mut self, report: SaveReport) -> bool {
        let ok = report.is_ok();
        if let Err(e) = report.local {
            self.storage_failure("Error saving data", &e);
        }
        match report.file {
            Some(Ok(at)) => self.presenter.autosaved(at),
            Some(Err(e)) => self.storage_failure("Error saving to file", &e),
            None => {}
        }
        ok
    }

    fn pick(&mut self, picked: Result<PathBuf, PickError>) -> Result<Option<PathBuf>, FileOpError> {
        match picked {
            Ok(path) => Ok(Some(path)),
            Err(PickError::Cancelled) => {
                tracing::debug!("file selection cancelled");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "file selection failed");
                self.presenter.status(&e.to_string(), StatusLevel::Danger);
                Err(e.into())
            }
        }
    }

    fn storage_failure(&mut self, context: &str, error: &StorageError) {
        tracing::warn!(error = %error, "{context}");
        self.presenter.status(&format!("{context}: {error}"), StatusLevel::Danger);
    }
}

fn refusal_level(refusal: &Refusal) -> StatusLevel {
    match refusal {
        Refusal::ArchiveInbox | Refusal::DeleteInbox => StatusLevel::Danger,
        Refusal::ReorderInbox | Refusal::IncompleteTodos { .. } => StatusLevel::Warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file_sync::PathPicker;
    use crate::io::kv::MemoryStore;
    use crate::model::project::INBOX_ID;
    use tempfile::TempDir;

    struct CancelPicker;

    impl FilePicker for CancelPicker {
        fn pick_existing(&mut self) -> Result<PathBuf, PickError> {
            Err(PickError::Cancelled)
        }
        fn pick_new(&mut self, _suggested_name: &str) -> Result<PathBuf, PickError> {
            Err(PickError::Cancelled)
        }
    }

    fn open(config: Config) -> (Store, RecordingPresenter) {
        let log = RecordingPresenter::new();
        let store = Store::open(Box::new(MemoryStore::new()), config, Box::new(log.clone()));
        log.take();
        (store, log)
    }

    #[test]
    fn open_empty_store_has_inbox() {
        let (store, _) = open(Config::default());
        assert_eq!(store.workspace().projects.len(), 1);
        assert_eq!(store.workspace().projects[0].id, INBOX_ID);
    }

    #[test]
    fn add_todo_commits_and_refreshes_tags() {
        let (mut store, log) = open(Config::default());
        store.add_todo("buy milk @errands", None).unwrap();
        assert_eq!(
            log.take(),
            vec![PresenterEvent::Render, PresenterEvent::RefreshTagFilters]
        );
    }

    #[test]
    fn not_found_is_silent() {
        let (mut store, log) = open(Config::default());
        assert!(matches!(
            store.toggle_complete("nope"),
            Err(StoreError::Op(OpError::NotFound { .. }))
        ));
        assert!(log.take().is_empty());
    }

    #[test]
    fn refusal_reports_status_without_render() {
        let (mut store, log) = open(Config::default());
        assert!(store.archive_project(INBOX_ID).is_err());
        assert_eq!(
            log.take(),
            vec![PresenterEvent::Status(
                "Cannot archive the Inbox project.".into(),
                StatusLevel::Danger
            )]
        );
    }

    #[test]
    fn unchanged_outcome_does_not_commit() {
        let (mut store, log) = open(Config::default());
        let id = store.add_todo("x", None).unwrap();
        log.take();
        assert_eq!(store.move_todo_to_project(&id, INBOX_ID), Ok(Outcome::Unchanged));
        assert!(log.take().is_empty());
    }

    #[test]
    fn delete_project_forgets_collapse() {
        let (mut store, _) = open(Config::default());
        let project = store.add_project("Work", None).unwrap();
        assert_eq!(store.toggle_project_collapse(&project.id), Ok(true));
        store.delete_project(&project.id).unwrap();
        assert!(!store.view().is_collapsed(&project.id));
    }

    #[test]
    fn collapse_unknown_project_is_not_found() {
        let (mut store, _) = open(Config::default());
        assert!(matches!(
            store.toggle_project_collapse("ghost"),
            Err(StoreError::Op(OpError::NotFound { .. }))
        ));
    }

    #[test]
    fn cancelled_picker_is_silent() {
        let (mut store, log) = open(Config::default());
        assert!(store.open_file(&mut CancelPicker).unwrap().is_none());
        assert!(store.create_file(&mut CancelPicker).unwrap().is_none());
        assert!(!store.binding().is_bound());
        assert!(log.take().is_empty());
    }

    #[test]
    fn create_file_binds_and_autosaves() {
        let tmp = TempDir::new().unwrap();
        let (mut store, log) = open(Config::default());
        let path = store
            .create_file(&mut PathPicker(tmp.path().to_path_buf()))
            .unwrap()
            .unwrap();
        assert_eq!(path, tmp.path().join(SUGGESTED_FILE_NAME));
        assert!(path.exists());
        log.take();

        store.add_todo("after bind", None).unwrap();
        assert!(log.take().contains(&PresenterEvent::Autosaved));
    }

    #[test]
    fn create_file_failure_stays_unbound() {
        let tmp = TempDir::new().unwrap();
        let (mut store, log) = open(Config::default());
        let bad = tmp.path().join("missing/data.json");
        assert!(store.create_file(&mut PathPicker(bad)).is_err());
        assert!(!store.binding().is_bound());
        assert_eq!(log.statuses()[0].1, StatusLevel::Danger);
    }

    #[test]
    fn load_from_file_requires_binding() {
        let (mut store, log) = open(Config::default());
        assert!(matches!(
            store.load_from_file(),
            Err(FileOpError::Storage(StorageError::NotBound))
        ));
        assert_eq!(log.statuses()[0].1, StatusLevel::Warning);
    }

    #[test]
    fn failed_save_is_returned_to_caller() {
        let mut kv = MemoryStore::new();
        kv.set_read_only(true);
        let log = RecordingPresenter::new();
        let mut store = Store::open(Box::new(kv), Config::default(), Box::new(log.clone()));
        log.take();

        assert_eq!(store.add_todo("x", None), Err(StoreError::Unsaved));
        assert_eq!(store.workspace().todos.len(), 1);
        assert_eq!(log.statuses().len(), 1);
        assert_eq!(log.statuses()[0].1, StatusLevel::Danger);

        log.take();
        assert_eq!(store.collapse_all_projects(), Err(StoreError::Unsaved));
        assert!(!log.take().contains(&PresenterEvent::Status(
            "All projects collapsed".into(),
            StatusLevel::Info
        )));
    }

    #[test]
    fn unreadable_local_data_blocks_writes() {
        let kv = MemoryStore::with_entries([(crate::io::kv::KEY_PROJECTS, "[{\"id\":")]);
        let log = RecordingPresenter::new();
        let mut store = Store::open(Box::new(kv), Config::default(), Box::new(log.clone()));
        assert!(!store.is_writable());
        assert_eq!(log.statuses().len(), 1);

        assert_eq!(store.add_todo("x", None), Err(StoreError::Unsaved));
    }
}
