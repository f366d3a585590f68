use crate::model::project::{INBOX_ID, Project};
use crate::model::workspace::Workspace;

use super::{OpError, Refusal};

/// Create a project placed after every existing one.
/// `color` falls back to `default_color` when missing or empty.
pub fn add_project(ws: &mut Workspace, name: &str, color: Option<&str>, default_color: &str) -> Project {
    let order = ws
        .projects
        .iter()
        .filter_map(|p| p.order)
        .max()
        .map_or(0, |max| max + 1);
    let color = color.filter(|c| !c.is_empty()).unwrap_or(default_color);
    let project = Project::new(ws.next_id(), name.to_string(), color.to_string(), Some(order));
    ws.projects.push(project.clone());
    project
}

/// Rename a project
pub fn edit_project(ws: &mut Workspace, id: &str, new_name: &str) -> Result<(), OpError> {
    let project = ws.project_mut(id).ok_or_else(|| OpError::project_not_found(id))?;
    project.name = new_name.to_string();
    Ok(())
}

pub fn update_project_notes(ws: &mut Workspace, id: &str, notes: &str) -> Result<(), OpError> {
    let project = ws.project_mut(id).ok_or_else(|| OpError::project_not_found(id))?;
    project.notes = notes.to_string();
    Ok(())
}

/// Archive a project together with its non-archived todos.
///
/// Refused for the Inbox and for projects that still have incomplete,
/// non-archived todos; nothing changes in either case.
pub fn archive_project(ws: &mut Workspace, id: &str) -> Result<(), OpError> {
    if id == INBOX_ID {
        return Err(Refusal::ArchiveInbox.into());
    }
    let name = ws
        .project(id)
        .map(|p| p.name.clone())
        .ok_or_else(|| OpError::project_not_found(id))?;

    let open = ws.project_todos(id).filter(|t| t.is_open()).count();
    if open > 0 {
        return Err(Refusal::IncompleteTodos {
            project: name,
            count: open,
        }
        .into());
    }

    if let Some(project) = ws.project_mut(id) {
        project.archived = true;
    }
    for todo in ws.todos.iter_mut().filter(|t| t.project_id == id && !t.archived) {
        todo.archived = true;
    }
    Ok(())
}

/// Unarchive a project and every archived todo it owns
pub fn unarchive_project(ws: &mut Workspace, id: &str) -> Result<(), OpError> {
    let project = ws.project_mut(id).ok_or_else(|| OpError::project_not_found(id))?;
    project.archived = false;
    for todo in ws.todos.iter_mut().filter(|t| t.project_id == id && t.archived) {
        todo.archived = false;
    }
    Ok(())
}

/// Delete a project, moving its todos to the Inbox (recreated first if it
/// went missing). Returns how many todos were moved.
pub fn delete_project(ws: &mut Workspace, id: &str, inbox_color: &str) -> Result<usize, OpError> {
    if id == INBOX_ID {
        return Err(Refusal::DeleteInbox.into());
    }
    if ws.project(id).is_none() {
        return Err(OpError::project_not_found(id));
    }

    ws.ensure_inbox(inbox_color);
    ws.projects.retain(|p| p.id != id);

    let mut moved = 0;
    for todo in ws.todos.iter_mut().filter(|t| t.project_id == id) {
        todo.project_id = INBOX_ID.to_string();
        moved += 1;
    }
    Ok(moved)
}
