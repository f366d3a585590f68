use crate::model::project::INBOX_ID;
use crate::model::todo::Todo;
use crate::model::workspace::Workspace;
use crate::parse::extract_tags;

use super::{OpError, Outcome};

// ---------------------------------------------------------------------------
// Todo CRUD
// ---------------------------------------------------------------------------

/// Append a new todo. A missing or empty project id means the Inbox.
/// Returns the new todo's id.
///
/// Empty text is accepted; rejecting it is up to the caller.
pub fn add_todo(ws: &mut Workspace, text: &str, project_id: Option<&str>) -> Result<String, OpError> {
    let project_id = project_id.filter(|p| !p.is_empty()).unwrap_or(INBOX_ID);
    if ws.project(project_id).is_none() {
        return Err(OpError::project_not_found(project_id));
    }
    let id = ws.next_id();
    let todo = Todo::new(
        id.clone(),
        text.to_string(),
        extract_tags(text),
        project_id.to_string(),
    );
    ws.todos.push(todo);
    Ok(id)
}

/// Replace a todo's text (recomputing tags) and optionally its project.
/// An empty `new_project_id` leaves the project unchanged.
pub fn edit_todo(
    ws: &mut Workspace,
    id: &str,
    new_text: &str,
    new_project_id: Option<&str>,
) -> Result<(), OpError> {
    let new_project_id = new_project_id.filter(|p| !p.is_empty());
    if let Some(pid) = new_project_id
        && ws.project(pid).is_none()
    {
        return Err(OpError::project_not_found(pid));
    }
    let todo = ws.todo_mut(id).ok_or_else(|| OpError::todo_not_found(id))?;
    todo.text = new_text.to_string();
    todo.tags = extract_tags(new_text);
    if let Some(pid) = new_project_id {
        todo.project_id = pid.to_string();
    }
    Ok(())
}

/// Remove a todo. Returns the removed record.
pub fn delete_todo(ws: &mut Workspace, id: &str) -> Result<Todo, OpError> {
    let index = ws
        .todos
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| OpError::todo_not_found(id))?;
    Ok(ws.todos.remove(index))
}

pub fn update_todo_notes(ws: &mut Workspace, id: &str, notes: &str) -> Result<(), OpError> {
    let todo = ws.todo_mut(id).ok_or_else(|| OpError::todo_not_found(id))?;
    todo.notes = notes.to_string();
    Ok(())
}

// ---------------------------------------------------------------------------
// State changes
// ---------------------------------------------------------------------------

/// Flip completion. Returns the new `completed` value.
pub fn toggle_complete(ws: &mut Workspace, id: &str) -> Result<bool, OpError> {
    let todo = ws.todo_mut(id).ok_or_else(|| OpError::todo_not_found(id))?;
    todo.completed = !todo.completed;
    Ok(todo.completed)
}

pub fn archive_todo(ws: &mut Workspace, id: &str) -> Result<Outcome, OpError> {
    set_archived(ws, id, true)
}

/// Unarchive a todo. Completion is left as it was.
pub fn unarchive_todo(ws: &mut Workspace, id: &str) -> Result<Outcome, OpError> {
    set_archived(ws, id, false)
}

fn set_archived(ws: &mut Workspace, id: &str, archived: bool) -> Result<Outcome, OpError> {
    let todo = ws.todo_mut(id).ok_or_else(|| OpError::todo_not_found(id))?;
    if todo.archived == archived {
        return Ok(Outcome::Unchanged);
    }
    todo.archived = archived;
    Ok(Outcome::Applied)
}

/// Reassign a todo to another project. Its array position is untouched.
pub fn move_todo_to_project(ws: &mut Workspace, id: &str, project_id: &str) -> Result<Outcome, OpError> {
    let current = ws
        .todo(id)
        .map(|t| t.project_id.as_str())
        .ok_or_else(|| OpError::todo_not_found(id))?;
    if current == project_id {
        return Ok(Outcome::Unchanged);
    }
    if ws.project(project_id).is_none() {
        return Err(OpError::project_not_found(project_id));
    }
    if let Some(todo) = ws.todo_mut(id) {
        todo.project_id = project_id.to_string();
    }
    Ok(Outcome::Applied)
}
