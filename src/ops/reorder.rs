use std::cmp::Ordering;

use crate::model::project::Project;
use crate::model::workspace::Workspace;

use super::{OpError, Outcome, Refusal};

// ---------------------------------------------------------------------------
// Shared positional reinsertion
// ---------------------------------------------------------------------------

/// Move the item at `from` so it ends up at `target`.
///
/// `target` is clamped into `[pinned, len - 1]`, where `pinned` counts the
/// leading items nothing may be placed before. Returns the final index.
pub fn reinsert<T>(items: &mut Vec<T>, from: usize, target: usize, pinned: usize) -> usize {
    let item = items.remove(from);
    let index = clamp_target(target, pinned, items.len());
    items.insert(index, item);
    index
}

/// Clamp a requested insertion index into the open range `[pinned, len]`
fn clamp_target(target: usize, pinned: usize, len: usize) -> usize {
    target.clamp(pinned.min(len), len)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Display order: Inbox first, then `order` (missing last), then name
/// case-insensitively.
pub fn compare_projects(a: &Project, b: &Project) -> Ordering {
    match (a.is_inbox(), b.is_inbox()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    let a_order = a.order.unwrap_or(u32::MAX);
    let b_order = b.order.unwrap_or(u32::MAX);
    a_order
        .cmp(&b_order)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Projects with the given archived state, in display order
pub fn sorted_projects(ws: &Workspace, archived: bool) -> Vec<&Project> {
    let mut projects: Vec<&Project> = ws.projects.iter().filter(|p| p.archived == archived).collect();
    projects.sort_by(|a, b| compare_projects(a, b));
    projects
}

/// Reassign contiguous orders over a display-ordered slice.
/// Inbox keeps 0; everything else is numbered from 1.
fn renumber(projects: &mut [Project]) {
    let mut next = 1;
    for project in projects.iter_mut() {
        if project.is_inbox() {
            project.order = Some(0);
        } else {
            project.order = Some(next);
            next += 1;
        }
    }
}

/// Move a project to `target` within the projects sharing its archived state.
///
/// `target` is a display index that counts the Inbox, so index 0 is never
/// available to other projects.
pub fn reorder_project(ws: &mut Workspace, id: &str, target: usize) -> Result<Outcome, OpError> {
    let project = ws.project(id).ok_or_else(|| OpError::project_not_found(id))?;
    if project.is_inbox() {
        return Err(Refusal::ReorderInbox.into());
    }
    let archived = project.archived;

    let original = ws.projects.clone();
    let (mut scope, rest): (Vec<Project>, Vec<Project>) = std::mem::take(&mut ws.projects)
        .into_iter()
        .partition(|p| p.archived == archived);
    scope.sort_by(compare_projects);

    let pinned = usize::from(scope.first().is_some_and(Project::is_inbox));
    let from = scope
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| OpError::project_not_found(id))?;
    reinsert(&mut scope, from, target, pinned);
    renumber(&mut scope);

    scope.extend(rest);
    if same_layout(&original, &scope) {
        ws.projects = original;
        return Ok(Outcome::Unchanged);
    }
    ws.projects = scope;
    Ok(Outcome::Applied)
}

/// Compare two project lists by the fields reordering touches, ignoring
/// storage position.
fn same_layout(before: &[Project], after: &[Project]) -> bool {
    before.len() == after.len()
        && before.iter().all(|b| {
            after
                .iter()
                .find(|a| a.id == b.id)
                .is_some_and(|a| a.order == b.order)
        })
}

/// Display index of a project within its archived-state scope
fn display_index(ws: &Workspace, id: &str) -> Result<(usize, usize, usize), OpError> {
    let project = ws.project(id).ok_or_else(|| OpError::project_not_found(id))?;
    if project.is_inbox() {
        return Err(Refusal::ReorderInbox.into());
    }
    let scope = sorted_projects(ws, project.archived);
    let pinned = usize::from(scope.first().is_some_and(|p| p.is_inbox()));
    let index = scope
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| OpError::project_not_found(id))?;
    Ok((index, pinned, scope.len()))
}

pub fn move_project_up(ws: &mut Workspace, id: &str) -> Result<Outcome, OpError> {
    let (index, pinned, _) = display_index(ws, id)?;
    if index <= pinned {
        return Ok(Outcome::Unchanged);
    }
    reorder_project(ws, id, index - 1)
}

pub fn move_project_down(ws: &mut Workspace, id: &str) -> Result<Outcome, OpError> {
    let (index, _, len) = display_index(ws, id)?;
    if index + 1 >= len {
        return Ok(Outcome::Unchanged);
    }
    reorder_project(ws, id, index + 1)
}

/// Renormalize project orders when any project lacks one (or the Inbox is
/// not at 0). Numbering follows display order across all projects.
pub fn initialize_project_orders(ws: &mut Workspace) -> Outcome {
    let needs_init = ws
        .projects
        .iter()
        .any(|p| p.order.is_none() || (p.is_inbox() && p.order != Some(0)));
    if !needs_init {
        return Outcome::Unchanged;
    }
    ws.projects.sort_by(compare_projects);
    renumber(&mut ws.projects);
    Outcome::Applied
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

/// Move a todo to position `target` among the todos of its project.
///
/// The project's todos are re-appended after all other todos in their new
/// order; todos of other projects keep their relative order.
pub fn reorder_todo(ws: &mut Workspace, id: &str, target: usize) -> Result<Outcome, OpError> {
    let project_id = ws
        .todo(id)
        .map(|t| t.project_id.clone())
        .ok_or_else(|| OpError::todo_not_found(id))?;

    let from = ws
        .project_todos(&project_id)
        .position(|t| t.id == id)
        .ok_or_else(|| OpError::todo_not_found(id))?;
    let scope_len = ws.project_todos(&project_id).count();
    if clamp_target(target, 0, scope_len - 1) == from {
        return Ok(Outcome::Unchanged);
    }

    let (mut scope, mut rest): (Vec<_>, Vec<_>) = std::mem::take(&mut ws.todos)
        .into_iter()
        .partition(|t| t.project_id == project_id);
    reinsert(&mut scope, from, target, 0);
    rest.extend(scope);
    ws.todos = rest;
    Ok(Outcome::Applied)
}
