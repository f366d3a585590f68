mod init;
pub use init::{cmd_config, cmd_init};

use std::error::Error;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::file_sync::PathPicker;
use crate::io::kv::DirStore;
use crate::ops::OpError;
use crate::ops::reorder::sorted_projects;
use crate::ops::view_ops;
use crate::store::{FileOpError, Store, StoreError};

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "DOCKET_DIR";

/// A failure the store already showed as a status message
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(String);

/// True if `main` should stay quiet about this error
pub fn is_reported(e: &(dyn Error + 'static)) -> bool {
    e.downcast_ref::<Reported>().is_some()
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), |key| std::env::var_os(key))?;

    match cli.command {
        // Setup (no store needed)
        Commands::Init(args) => cmd_init(&data_dir, args),
        Commands::Config(args) => cmd_config(&data_dir, args, json),

        // Read commands
        Commands::List(args) => cmd_list(&data_dir, args, json),
        Commands::Show(args) => cmd_show(&data_dir, args, json),
        Commands::Tags => cmd_tags(&data_dir, json),
        Commands::Archived => cmd_archived(&data_dir, json),

        // Todo commands
        Commands::Add(args) => cmd_add(&data_dir, args, json),
        Commands::Edit(args) => cmd_edit(&data_dir, args),
        Commands::Done(args) => cmd_done(&data_dir, args),
        Commands::Rm(args) => cmd_rm(&data_dir, args),
        Commands::Archive(args) => cmd_archive(&data_dir, args),
        Commands::Unarchive(args) => cmd_unarchive(&data_dir, args),
        Commands::Mv(args) => cmd_mv(&data_dir, args),
        Commands::Note(args) => cmd_note(&data_dir, args),
        Commands::Reorder(args) => cmd_reorder(&data_dir, args),

        // Projects and view state
        Commands::Project(args) => cmd_project(&data_dir, args, json),
        Commands::Collapse(args) => cmd_collapse(&data_dir, args),
        Commands::ExpandAll => op(open_store(&data_dir)?.expand_all_projects()),
        Commands::CollapseAll => op(open_store(&data_dir)?.collapse_all_projects()),

        // Linked file
        Commands::File(args) => cmd_file(&data_dir, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `-C` flag, then `$DOCKET_DIR`, then `$XDG_DATA_HOME/docket`, then
/// `$HOME/.local/share/docket`.
pub fn resolve_data_dir(
    flag: Option<&str>,
    env: impl Fn(&str) -> Option<OsString>,
) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(dir) = flag {
        return Ok(PathBuf::from(dir));
    }
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
    if let Some(dir) = non_empty(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_DATA_HOME") {
        return Ok(PathBuf::from(xdg).join("docket"));
    }
    if let Some(home) = non_empty("HOME") {
        return Ok(PathBuf::from(home).join(".local/share/docket"));
    }
    Err(format!("cannot determine a data directory; pass -C or set {}", DATA_DIR_ENV).into())
}

fn open_store(data_dir: &Path) -> Result<Store, Box<dyn Error>> {
    let config = config_io::read_config(data_dir)?;
    let kv = DirStore::open(data_dir)?;
    Ok(Store::open(Box::new(kv), config, Box::new(CliPresenter)))
}

/// Convert a store result into a CLI error. Refusals and failed writes were
/// already shown.
fn op<T>(result: Result<T, StoreError>) -> Result<T, Box<dyn Error>> {
    result.map_err(|e| match e {
        StoreError::Op(OpError::NotFound { .. }) => e.into(),
        reported => Reported(reported.to_string()).into(),
    })
}

/// Reads still print what loaded, but exit with a failure while saved data
/// could not be read
fn finish_read(store: &Store) -> Result<(), Box<dyn Error>> {
    if store.is_writable() {
        Ok(())
    } else {
        Err(Reported("saved data could not be read".into()).into())
    }
}

/// File operation failures are always shown by the store
fn file_op<T>(result: Result<T, FileOpError>) -> Result<T, Box<dyn Error>> {
    result.map_err(|e| Reported(e.to_string()).into())
}

/// Accept a project ID, or a project name (case-insensitive). Unknown
/// values pass through so the store reports them.
fn resolve_project(store: &Store, key: &str) -> String {
    let ws = store.workspace();
    if ws.project(key).is_some() {
        return key.to_string();
    }
    ws.projects
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(key))
        .map(|p| p.id.clone())
        .unwrap_or_else(|| key.to_string())
}

fn require_text(text: &str) -> Result<(), Box<dyn Error>> {
    if text.trim().is_empty() {
        return Err("todo text cannot be empty".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data_dir: &Path, args: ListArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    let mut tags = args.tags.clone();
    tags.sort();
    tags.dedup();
    for tag in &tags {
        store.toggle_tag_filter(tag.trim_start_matches('@'));
    }
    let project_filter = args.project.as_deref().map(|p| resolve_project(&store, p));

    let mut view = store.view().clone();
    if args.all {
        view.collapsed_projects.clear();
    }
    let groups: Vec<_> = view_ops::active_view(store.workspace(), &view)
        .into_iter()
        .filter(|g| project_filter.as_deref().is_none_or(|id| g.project.id == id))
        .collect();
    if let Some(id) = &project_filter
        && groups.is_empty()
    {
        return Err(OpError::project_not_found(id).into());
    }

    let archived_count = store
        .config()
        .ui
        .show_archived_count
        .then(|| store.archived_count())
        .filter(|&n| n > 0);

    if json {
        let out = ListJson {
            active_tags: view.active_tags.iter().map(String::as_str).collect(),
            projects: groups.iter().map(group_to_json).collect(),
            archived_count,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_listing(&groups, Style::detect()) {
            println!("{}", line);
        }
        if let Some(n) = archived_count {
            println!();
            println!("({} archived)", n);
        }
    }
    finish_read(&store)
}

fn cmd_show(data_dir: &Path, args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let store = open_store(data_dir)?;
    let ws = store.workspace();
    let todo = ws.todo(&args.id).ok_or_else(|| OpError::todo_not_found(&args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(todo)?);
    } else {
        for line in format_todo_detail(todo, ws.project(&todo.project_id)) {
            println!("{}", line);
        }
    }
    finish_read(&store)
}

fn cmd_tags(data_dir: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let store = open_store(data_dir)?;
    let tags = store.all_tags();
    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else {
        for tag in &tags {
            println!("@{}", tag);
        }
    }
    finish_read(&store)
}

fn cmd_archived(data_dir: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let store = open_store(data_dir)?;
    let archive = store.archive_view();
    if json {
        println!("{}", serde_json::to_string_pretty(&archive_to_json(&archive))?);
    } else {
        for line in format_archive(&archive, Style::detect()) {
            println!("{}", line);
        }
    }
    finish_read(&store)
}

// ---------------------------------------------------------------------------
// Todo commands
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    require_text(&args.text)?;
    let mut store = open_store(data_dir)?;
    let project = args.project.as_deref().map(|p| resolve_project(&store, p));
    let id = op(store.add_todo(&args.text, project.as_deref()))?;
    if json {
        println!("{}", serde_json::to_string(&AddedJson { id })?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_edit(data_dir: &Path, args: EditArgs) -> Result<(), Box<dyn Error>> {
    require_text(&args.text)?;
    let mut store = open_store(data_dir)?;
    let project = args.project.as_deref().map(|p| resolve_project(&store, p));
    op(store.edit_todo(&args.id, &args.text, project.as_deref()))
}

fn cmd_done(data_dir: &Path, args: IdArg) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    let completed = op(store.toggle_complete(&args.id))?;
    println!("{} {}", args.id, if completed { "done" } else { "reopened" });
    Ok(())
}

fn cmd_rm(data_dir: &Path, args: IdArg) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    let removed = op(store.delete_todo(&args.id))?;
    println!("Deleted: {}", removed.text);
    Ok(())
}

fn cmd_archive(data_dir: &Path, args: IdArg) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    op(store.archive_todo(&args.id)).map(|_| ())
}

fn cmd_unarchive(data_dir: &Path, args: IdArg) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    op(store.unarchive_todo(&args.id)).map(|_| ())
}

fn cmd_mv(data_dir: &Path, args: MvArgs) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    let project = resolve_project(&store, &args.project);
    op(store.move_todo_to_project(&args.id, &project)).map(|_| ())
}

fn cmd_note(data_dir: &Path, args: NoteArgs) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    op(store.update_todo_notes(&args.id, &args.text))
}

fn cmd_reorder(data_dir: &Path, args: ReorderArgs) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    op(store.reorder_todo(&args.id, args.position)).map(|_| ())
}

// ---------------------------------------------------------------------------
// Projects and view state
// ---------------------------------------------------------------------------

fn cmd_project(data_dir: &Path, args: ProjectCmd, json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    match args.action {
        ProjectAction::Add(add) => {
            let project = op(store.add_project(&add.name, add.color.as_deref()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&project)?);
            } else {
                println!("{}", project.id);
            }
        }
        ProjectAction::List(list) => {
            let ws = store.workspace();
            let mut projects = sorted_projects(ws, false);
            if list.all {
                projects.extend(sorted_projects(ws, true));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else {
                for line in format_project_table(&projects) {
                    println!("{}", line);
                }
            }
            finish_read(&store)?;
        }
        ProjectAction::Rename(rename) => {
            let id = resolve_project(&store, &rename.id);
            op(store.edit_project(&id, &rename.name))?;
        }
        ProjectAction::Note(note) => {
            let id = resolve_project(&store, &note.id);
            op(store.update_project_notes(&id, &note.text))?;
        }
        ProjectAction::Archive(arg) => {
            let id = resolve_project(&store, &arg.id);
            op(store.archive_project(&id))?;
        }
        ProjectAction::Unarchive(arg) => {
            let id = resolve_project(&store, &arg.id);
            op(store.unarchive_project(&id))?;
        }
        ProjectAction::Rm(arg) => {
            let id = resolve_project(&store, &arg.id);
            let moved = op(store.delete_project(&id))?;
            if moved > 0 {
                println!("Moved {} todo(s) to Inbox", moved);
            }
        }
        ProjectAction::Reorder(reorder) => {
            let id = resolve_project(&store, &reorder.id);
            op(store.reorder_project(&id, reorder.position))?;
        }
        ProjectAction::Up(arg) => {
            let id = resolve_project(&store, &arg.id);
            op(store.move_project_up(&id))?;
        }
        ProjectAction::Down(arg) => {
            let id = resolve_project(&store, &arg.id);
            op(store.move_project_down(&id))?;
        }
    }
    Ok(())
}

fn cmd_collapse(data_dir: &Path, args: IdArg) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    let id = resolve_project(&store, &args.id);
    let collapsed = op(store.toggle_project_collapse(&id))?;
    println!("{} {}", id, if collapsed { "collapsed" } else { "expanded" });
    Ok(())
}

// ---------------------------------------------------------------------------
// Linked file
// ---------------------------------------------------------------------------

fn cmd_file(data_dir: &Path, args: FileCmd, json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(data_dir)?;
    match args.action {
        FileAction::Open(arg) => {
            file_op(store.open_file(&mut PathPicker(PathBuf::from(arg.path))))?;
        }
        FileAction::Create(arg) => {
            file_op(store.create_file(&mut PathPicker(PathBuf::from(arg.path))))?;
        }
        FileAction::Load => file_op(store.load_from_file())?,
        FileAction::Save => {
            file_op(store.save_to_file())?;
        }
        FileAction::Unbind => file_op(store.unbind())?,
        FileAction::Status => {
            let path = store.binding().path().map(|p| p.display().to_string());
            if json {
                let out = FileStatusJson {
                    bound: path.is_some(),
                    path,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                match path {
                    Some(p) => println!("linked: {}", p),
                    None => println!("not linked"),
                }
            }
            finish_read(&store)?;
        }
    }
    Ok(())
}
