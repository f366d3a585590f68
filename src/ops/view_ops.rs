use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::model::workspace::Workspace;

use super::reorder::sorted_projects;

/// View-only state derived alongside the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Tags used as an OR filter. Empty shows everything.
    pub active_tags: BTreeSet<String>,
    /// Projects whose todo lists are hidden
    pub collapsed_projects: BTreeSet<String>,
}

impl ViewState {
    /// Add or remove a tag filter. Returns whether the tag is now active.
    pub fn toggle_tag_filter(&mut self, tag: &str) -> bool {
        if self.active_tags.remove(tag) {
            false
        } else {
            self.active_tags.insert(tag.to_string());
            true
        }
    }

    /// Filter by exactly one tag
    pub fn focus_tag(&mut self, tag: &str) {
        self.active_tags.clear();
        self.active_tags.insert(tag.to_string());
    }

    pub fn clear_tag_filters(&mut self) {
        self.active_tags.clear();
    }

    pub fn is_visible(&self, todo: &Todo) -> bool {
        is_visible(todo, &self.active_tags)
    }

    /// Collapse or expand a project. Returns whether it is now collapsed.
    pub fn toggle_project_collapse(&mut self, project_id: &str) -> bool {
        if self.collapsed_projects.remove(project_id) {
            false
        } else {
            self.collapsed_projects.insert(project_id.to_string());
            true
        }
    }

    pub fn is_collapsed(&self, project_id: &str) -> bool {
        self.collapsed_projects.contains(project_id)
    }

    /// Expand every non-archived project other than the Inbox
    pub fn expand_all(&mut self, ws: &Workspace) {
        for project in collapsible(ws) {
            self.collapsed_projects.remove(&project.id);
        }
    }

    /// Collapse every non-archived project other than the Inbox
    pub fn collapse_all(&mut self, ws: &Workspace) {
        for project in collapsible(ws) {
            self.collapsed_projects.insert(project.id.clone());
        }
    }

    /// Drop collapse entries for projects that no longer exist
    pub fn forget_missing(&mut self, ws: &Workspace) {
        self.collapsed_projects.retain(|id| ws.project(id).is_some());
    }
}

fn collapsible(ws: &Workspace) -> impl Iterator<Item = &Project> {
    ws.projects.iter().filter(|p| !p.archived && !p.is_inbox())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Sorted union of tags over non-archived todos
pub fn all_tags(ws: &Workspace) -> Vec<String> {
    ws.todos
        .iter()
        .filter(|t| !t.archived)
        .flat_map(|t| t.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// OR semantics: visible when no filter is active or any tag matches
pub fn is_visible(todo: &Todo, active_tags: &BTreeSet<String>) -> bool {
    active_tags.is_empty() || todo.tags.iter().any(|t| active_tags.contains(t))
}

// ---------------------------------------------------------------------------
// Groupings
// ---------------------------------------------------------------------------

/// One project and the todos shown under it
#[derive(Debug)]
pub struct ProjectGroup<'a> {
    pub project: &'a Project,
    /// Visible todos in storage order (empty when collapsed)
    pub todos: Vec<&'a Todo>,
    /// Visible todos, counted even when collapsed
    pub count: usize,
    pub collapsed: bool,
}

/// Non-archived projects in display order with their visible, non-archived
/// todos
pub fn active_view<'a>(ws: &'a Workspace, view: &ViewState) -> Vec<ProjectGroup<'a>> {
    sorted_projects(ws, false)
        .into_iter()
        .map(|project| {
            let todos: Vec<&Todo> = ws
                .project_todos(&project.id)
                .filter(|t| !t.archived && view.is_visible(t))
                .collect();
            let collapsed = view.is_collapsed(&project.id);
            ProjectGroup {
                project,
                count: todos.len(),
                todos: if collapsed { Vec::new() } else { todos },
                collapsed,
            }
        })
        .collect()
}

/// Everything in the archive
#[derive(Debug)]
pub struct ArchiveView<'a> {
    /// Archived projects, by name
    pub projects: Vec<&'a Project>,
    /// Archived todos keyed by project id: Inbox first, then by project name
    pub todos: IndexMap<String, (&'a Project, Vec<&'a Todo>)>,
}

impl ArchiveView<'_> {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.todos.is_empty()
    }
}

pub fn archive_view(ws: &Workspace) -> ArchiveView<'_> {
    let mut projects: Vec<&Project> = ws.projects.iter().filter(|p| p.archived).collect();
    projects.sort_by_key(|p| p.name.to_lowercase());

    let mut todos: IndexMap<String, (&Project, Vec<&Todo>)> = IndexMap::new();
    for todo in ws.todos.iter().filter(|t| t.archived) {
        let Some(project) = ws.project(&todo.project_id) else {
            continue;
        };
        todos
            .entry(project.id.clone())
            .or_insert_with(|| (project, Vec::new()))
            .1
            .push(todo);
    }
    todos.sort_by(|_, (a, _), _, (b, _)| {
        b.is_inbox()
            .cmp(&a.is_inbox())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    ArchiveView { projects, todos }
}

/// Number shown on the archive badge
pub fn archived_count(ws: &Workspace) -> usize {
    ws.todos.iter().filter(|t| t.archived).count()
}
