//! End-to-end scenarios against `Store`, using real data directories.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use docket::io::file_sync::PathPicker;
use docket::io::kv::{DirStore, MemoryStore};
use docket::model::config::Config;
use docket::model::project::INBOX_ID;
use docket::ops::{OpError, Outcome, Refusal};
use docket::store::{PresenterEvent, RecordingPresenter, StatusLevel, Store, StoreError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open_dir(dir: &Path, config: Config) -> (Store, RecordingPresenter) {
    let log = RecordingPresenter::new();
    let kv = DirStore::open(dir).unwrap();
    let store = Store::open(Box::new(kv), config, Box::new(log.clone()));
    log.take();
    (store, log)
}

fn open_memory() -> (Store, RecordingPresenter) {
    let log = RecordingPresenter::new();
    let store = Store::open(Box::new(MemoryStore::new()), Config::default(), Box::new(log.clone()));
    log.take();
    (store, log)
}

fn no_reconnect() -> Config {
    let mut config = Config::default();
    config.file.reconnect_on_start = false;
    config
}

fn todo_texts(store: &Store) -> Vec<&str> {
    store.workspace().todos.iter().map(|t| t.text.as_str()).collect()
}

fn inbox_count(store: &Store) -> usize {
    store.workspace().projects.iter().filter(|p| p.id == INBOX_ID).count()
}

// ---------------------------------------------------------------------------
// Model scenarios
// ---------------------------------------------------------------------------

#[test]
fn work_project_lifecycle() {
    let (mut store, _) = open_memory();

    let work = store.add_project("Work", Some("#123456")).unwrap();
    assert_eq!(work.order, Some(1));
    assert_eq!(work.color, "#123456");

    let id = store.add_todo("Ship report @urgent", Some(&work.id)).unwrap();
    let todo = store.workspace().todo(&id).unwrap();
    assert_eq!(todo.tags, vec!["urgent"]);
    assert_eq!(todo.project_id, work.id);
    assert!(!todo.archived);
    assert!(!todo.completed);

    assert_eq!(store.toggle_complete(&id), Ok(true));

    store.archive_project(&work.id).unwrap();
    assert!(store.workspace().project(&work.id).unwrap().archived);
    assert!(store.workspace().todo(&id).unwrap().archived);

    store.unarchive_project(&work.id).unwrap();
    assert!(!store.workspace().project(&work.id).unwrap().archived);
    let todo = store.workspace().todo(&id).unwrap();
    assert!(!todo.archived);
    assert!(todo.completed);
}

#[test]
fn archive_with_open_todos_is_refused() {
    let (mut store, log) = open_memory();
    let work = store.add_project("Work", None).unwrap();
    let id = store.add_todo("still open", Some(&work.id)).unwrap();
    let before = store.workspace().clone();
    log.take();

    let err = store.archive_project(&work.id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Op(OpError::Refused(Refusal::IncompleteTodos { count: 1, .. }))
    ));
    assert_eq!(store.workspace().projects, before.projects);
    assert_eq!(store.workspace().todos, before.todos);
    assert!(!store.workspace().todo(&id).unwrap().archived);

    let statuses = log.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].1, StatusLevel::Warning);
}

#[test]
fn deleting_project_moves_todos_to_inbox() {
    let (mut store, _) = open_memory();
    let home = store.add_project("Home", None).unwrap();
    let a = store.add_todo("paint fence", Some(&home.id)).unwrap();
    let b = store.add_todo("fix sink", Some(&home.id)).unwrap();

    assert_eq!(store.delete_project(&home.id), Ok(2));
    assert!(store.workspace().project(&home.id).is_none());
    for id in [&a, &b] {
        assert_eq!(store.workspace().todo(id).unwrap().project_id, INBOX_ID);
    }
    assert_eq!(inbox_count(&store), 1);
}

#[test]
fn inbox_survives_every_operation() {
    let (mut store, _) = open_memory();
    let p = store.add_project("P", None).unwrap();
    let t = store.add_todo("x @a", Some(&p.id)).unwrap();
    assert!(store.delete_project(INBOX_ID).is_err());
    assert!(store.archive_project(INBOX_ID).is_err());
    assert!(store.reorder_project(INBOX_ID, 3).is_err());
    store.toggle_complete(&t).unwrap();
    store.archive_project(&p.id).unwrap();
    store.delete_project(&p.id).unwrap();
    store.delete_todo(&t).unwrap();

    assert_eq!(inbox_count(&store), 1);
    let inbox = store.workspace().inbox().unwrap();
    assert!(inbox.is_default);
    assert!(!inbox.archived);
    assert_eq!(inbox.order, Some(0));
}

#[test]
fn edit_recomputes_tags() {
    let (mut store, log) = open_memory();
    let id = store.add_todo("buy milk @errands @home", None).unwrap();
    assert_eq!(store.workspace().todo(&id).unwrap().tags, vec!["errands", "home"]);
    log.take();

    store.edit_todo(&id, "buy bread @shop", None).unwrap();
    assert_eq!(store.workspace().todo(&id).unwrap().tags, vec!["shop"]);
    assert_eq!(store.all_tags(), vec!["shop"]);
    assert!(log.take().contains(&PresenterEvent::RefreshTagFilters));
}

#[test]
fn reorder_is_idempotent() {
    let (mut store, _) = open_memory();
    let a = store.add_project("A", None).unwrap();
    let b = store.add_project("B", None).unwrap();
    let c = store.add_project("C", None).unwrap();

    assert_eq!(store.reorder_project(&c.id, 1), Ok(Outcome::Applied));
    let once = store.workspace().projects.clone();
    assert_eq!(store.reorder_project(&c.id, 1), Ok(Outcome::Unchanged));
    assert_eq!(store.workspace().projects, once);

    let order = |id: &str| store.workspace().project(id).unwrap().order;
    assert_eq!(order(INBOX_ID), Some(0));
    assert_eq!(order(&c.id), Some(1));
    assert_eq!(order(&a.id), Some(2));
    assert_eq!(order(&b.id), Some(3));
}

#[test]
fn project_up_down_at_edges() {
    let (mut store, _) = open_memory();
    let a = store.add_project("A", None).unwrap();
    let b = store.add_project("B", None).unwrap();

    assert_eq!(store.move_project_up(&a.id), Ok(Outcome::Unchanged));
    assert_eq!(store.move_project_down(&b.id), Ok(Outcome::Unchanged));
    assert_eq!(store.move_project_down(&a.id), Ok(Outcome::Applied));
    assert_eq!(store.workspace().project(&b.id).unwrap().order, Some(1));
}

#[test]
fn tag_filter_is_or() {
    let (mut store, _) = open_memory();
    store.add_todo("one @a", None).unwrap();
    store.add_todo("two @b", None).unwrap();
    store.add_todo("three", None).unwrap();

    assert!(store.toggle_tag_filter("a"));
    assert!(store.toggle_tag_filter("b"));
    let visible: Vec<String> = store.active_view()[0].todos.iter().map(|t| t.text.clone()).collect();
    assert_eq!(visible, vec!["one @a", "two @b"]);

    store.focus_tag("b");
    assert_eq!(store.active_view()[0].count, 1);
    store.clear_tag_filters();
    assert_eq!(store.active_view()[0].count, 3);
}

#[test]
fn ids_are_unique_under_rapid_creation() {
    let (mut store, _) = open_memory();
    let mut seen = HashSet::new();
    for i in 0..200 {
        let id = store.add_todo(&format!("todo {i}"), None).unwrap();
        assert!(seen.insert(id));
    }
    let project = store.add_project("late", None).unwrap();
    assert!(seen.insert(project.id));
}

// ---------------------------------------------------------------------------
// Persistence scenarios
// ---------------------------------------------------------------------------

#[test]
fn data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let (todo_id, project_id) = {
        let (mut store, _) = open_dir(tmp.path(), Config::default());
        let p = store.add_project("Work", None).unwrap();
        let t = store.add_todo("persist me @now", Some(&p.id)).unwrap();
        store.update_todo_notes(&t, "line one\nline two").unwrap();
        (t, p.id)
    };

    let (store, _) = open_dir(tmp.path(), Config::default());
    let todo = store.workspace().todo(&todo_id).unwrap();
    assert_eq!(todo.project_id, project_id);
    assert_eq!(todo.notes, "line one\nline two");
    assert_eq!(todo.tags, vec!["now"]);
}

#[test]
fn collapse_state_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let id = {
        let (mut store, _) = open_dir(tmp.path(), Config::default());
        let p = store.add_project("Work", None).unwrap();
        assert_eq!(store.toggle_project_collapse(&p.id), Ok(true));
        p.id
    };
    let (mut store, _) = open_dir(tmp.path(), Config::default());
    assert!(store.view().is_collapsed(&id));

    store.expand_all_projects().unwrap();
    let (store, _) = open_dir(tmp.path(), Config::default());
    assert!(!store.view().is_collapsed(&id));
}

#[test]
fn malformed_local_todos_are_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("todos"), "{ not json").unwrap();

    let log = RecordingPresenter::new();
    let store = Store::open(
        Box::new(DirStore::open(tmp.path()).unwrap()),
        Config::default(),
        Box::new(log.clone()),
    );
    assert!(store.workspace().todos.is_empty());
    assert_eq!(inbox_count(&store), 1);
    assert!(
        log.statuses()
            .iter()
            .any(|(_, level)| *level == StatusLevel::Danger)
    );
}

#[test]
fn bound_file_round_trip() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("shared.json");

    let (mut first, _) = open_dir(&tmp.path().join("a"), Config::default());
    first.create_file(&mut PathPicker(file.clone())).unwrap();
    let p = first.add_project("Work", Some("#123456")).unwrap();
    first.add_todo("one @x", Some(&p.id)).unwrap();
    first.add_todo("two", None).unwrap();

    let (mut second, _) = open_dir(&tmp.path().join("b"), Config::default());
    assert_eq!(
        second.open_file(&mut PathPicker(file.clone())).unwrap(),
        Some(file.clone())
    );
    assert_eq!(second.workspace().todos, first.workspace().todos);
    assert_eq!(second.workspace().projects, first.workspace().projects);
    assert_eq!(second.binding().path(), Some(file.as_path()));
}

#[test]
fn reconnects_on_start_when_configured() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let file = tmp.path().join("todo.json");
    {
        let (mut store, _) = open_dir(&data, Config::default());
        store.create_file(&mut PathPicker(file.clone())).unwrap();
        store.add_todo("synced", None).unwrap();
    }

    let (store, _) = open_dir(&data, Config::default());
    assert_eq!(store.binding().path(), Some(file.as_path()));

    let (store, _) = open_dir(&data, no_reconnect());
    assert!(!store.binding().is_bound());
    assert_eq!(store.workspace().todos.len(), 1);
}

#[test]
fn reconnect_picks_up_external_edits() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let file = tmp.path().join("todo.json");
    {
        let (mut store, _) = open_dir(&data, Config::default());
        store.create_file(&mut PathPicker(file.clone())).unwrap();
    }
    // another machine wrote a todo into the shared file
    let (mut other, _) = open_dir(&tmp.path().join("other"), Config::default());
    other.open_file(&mut PathPicker(file.clone())).unwrap();
    other.add_todo("from elsewhere", None).unwrap();

    let (store, _) = open_dir(&data, Config::default());
    assert_eq!(store.workspace().todos.len(), 1);
    assert_eq!(store.workspace().todos[0].text, "from elsewhere");
}

#[test]
fn failed_file_write_keeps_local_save() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let file_dir = tmp.path().join("share");
    fs::create_dir_all(&file_dir).unwrap();

    {
        let (mut store, log) = open_dir(&data, no_reconnect());
        store
            .create_file(&mut PathPicker(file_dir.join("todo.json")))
            .unwrap();
        fs::remove_dir_all(&file_dir).unwrap();
        log.take();

        assert_eq!(store.add_todo("kept locally", None), Err(StoreError::Unsaved));
        let statuses = log.statuses();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].1, StatusLevel::Danger);
        assert!(!log.take().contains(&PresenterEvent::Autosaved));
    }

    let (store, _) = open_dir(&data, no_reconnect());
    assert_eq!(todo_texts(&store), vec!["kept locally"]);
}

#[test]
fn reconnect_after_failed_file_write_keeps_local_changes() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let file = tmp.path().join("todo.json");
    let blocker = tmp.path().join("todo.json.lock");
    {
        let (mut store, _) = open_dir(&data, Config::default());
        store.create_file(&mut PathPicker(file.clone())).unwrap();
        store.add_todo("synced", None).unwrap();

        // a directory where the lock sidecar goes makes every file write fail
        fs::remove_file(&blocker).unwrap();
        fs::create_dir(&blocker).unwrap();
        assert_eq!(store.add_todo("kept locally", None), Err(StoreError::Unsaved));
    }
    fs::remove_dir(&blocker).unwrap();

    let (store, _) = open_dir(&data, Config::default());
    assert_eq!(store.binding().path(), Some(file.as_path()));
    assert_eq!(todo_texts(&store), vec!["synced", "kept locally"]);

    // the file caught up, so the next start imports it as usual
    let (mut other, _) = open_dir(&tmp.path().join("other"), Config::default());
    other.open_file(&mut PathPicker(file.clone())).unwrap();
    assert_eq!(todo_texts(&other), vec!["synced", "kept locally"]);
}

#[test]
fn reconnect_after_missing_file_keeps_local_changes() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let file = tmp.path().join("todo.json");
    {
        let (mut store, _) = open_dir(&data, Config::default());
        store.create_file(&mut PathPicker(file.clone())).unwrap();
    }
    let moved = tmp.path().join("elsewhere.json");
    fs::rename(&file, &moved).unwrap();
    {
        // reconnect fails, so this session runs unbound
        let (mut store, _) = open_dir(&data, Config::default());
        assert!(!store.binding().is_bound());
        store.add_todo("written while away", None).unwrap();
    }
    fs::rename(&moved, &file).unwrap();

    let (store, _) = open_dir(&data, Config::default());
    assert!(store.binding().is_bound());
    assert_eq!(todo_texts(&store), vec!["written while away"]);
}

#[test]
fn unreadable_projects_survive_a_read() {
    let tmp = TempDir::new().unwrap();
    let work_id = {
        let (mut store, _) = open_dir(tmp.path(), Config::default());
        let work = store.add_project("Work", None).unwrap();
        store.add_todo("report", Some(&work.id)).unwrap();
        work.id
    };
    let projects = tmp.path().join("projects");
    let intact = fs::read_to_string(&projects).unwrap();
    let truncated = &intact[..intact.len() / 2];
    fs::write(&projects, truncated).unwrap();
    let todos_before = fs::read_to_string(tmp.path().join("todos")).unwrap();

    {
        let log = RecordingPresenter::new();
        let mut store = Store::open(
            Box::new(DirStore::open(tmp.path()).unwrap()),
            Config::default(),
            Box::new(log.clone()),
        );
        assert!(!store.is_writable());
        assert_eq!(log.statuses()[0].1, StatusLevel::Danger);
        assert_eq!(store.add_todo("later", None), Err(StoreError::Unsaved));
    }

    assert_eq!(fs::read_to_string(&projects).unwrap(), truncated);
    assert_eq!(fs::read_to_string(tmp.path().join("todos")).unwrap(), todos_before);

    // once repaired, the todo is back in its project
    fs::write(&projects, &intact).unwrap();
    let (store, _) = open_dir(tmp.path(), Config::default());
    assert_eq!(store.workspace().todos[0].project_id, work_id);
}

#[test]
fn failed_file_load_leaves_memory_unchanged() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("todo.json");
    let (mut store, log) = open_dir(&tmp.path().join("data"), no_reconnect());
    store.create_file(&mut PathPicker(file.clone())).unwrap();
    store.add_todo("keep me", None).unwrap();
    let before = store.workspace().todos.clone();

    fs::write(&file, "garbage").unwrap();
    log.take();
    assert!(store.load_from_file().is_err());
    assert_eq!(store.workspace().todos, before);
    assert_eq!(log.statuses()[0].1, StatusLevel::Danger);
}

#[test]
fn unbind_forgets_file() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let file = tmp.path().join("todo.json");
    {
        let (mut store, _) = open_dir(&data, Config::default());
        store.create_file(&mut PathPicker(file.clone())).unwrap();
        store.unbind().unwrap();
        assert!(!store.binding().is_bound());
    }
    let (store, _) = open_dir(&data, Config::default());
    assert!(!store.binding().is_bound());
    assert!(file.exists());
}
