use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::ops::view_ops::{ArchiveView, ProjectGroup};
use crate::parse::highlight_tags;
use crate::store::{Presenter, StatusLevel};
use crate::util::unicode::{column_width, pad_to_width, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroupJson<'a> {
    #[serde(flatten)]
    pub project: &'a Project,
    pub collapsed: bool,
    pub count: usize,
    pub todos: Vec<&'a Todo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJson<'a> {
    pub active_tags: Vec<&'a str>,
    pub projects: Vec<ProjectGroupJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_count: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedGroupJson<'a> {
    pub project_id: &'a str,
    pub project_name: &'a str,
    pub todos: Vec<&'a Todo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveJson<'a> {
    pub projects: Vec<&'a Project>,
    pub todos: Vec<ArchivedGroupJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusJson {
    pub bound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedJson {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn group_to_json<'a>(group: &ProjectGroup<'a>) -> ProjectGroupJson<'a> {
    ProjectGroupJson {
        project: group.project,
        collapsed: group.collapsed,
        count: group.count,
        todos: group.todos.clone(),
    }
}

pub fn archive_to_json<'a>(archive: &ArchiveView<'a>) -> ArchiveJson<'a> {
    ArchiveJson {
        projects: archive.projects.clone(),
        todos: archive
            .todos
            .values()
            .map(|(project, todos)| ArchivedGroupJson {
                project_id: &project.id,
                project_name: &project.name,
                todos: todos.clone(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// How todo text is decorated on a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Ansi,
}

impl Style {
    /// ANSI when stdout is a terminal
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            Style::Ansi
        } else {
            Style::Plain
        }
    }

    fn text(self, text: &str) -> String {
        match self {
            Style::Plain => text.to_string(),
            Style::Ansi => highlight_tags(text, "\x1b[36m", "\x1b[0m"),
        }
    }
}

fn check_char(todo: &Todo) -> char {
    if todo.completed { 'x' } else { ' ' }
}

/// Format a single todo as a one-line summary
pub fn format_todo_line(todo: &Todo, style: Style) -> String {
    let notes = if todo.notes.is_empty() { "" } else { " +notes" };
    format!("[{}] {}  {}{}", check_char(todo), todo.id, style.text(&todo.text), notes)
}

/// Format a project header for listings
pub fn format_project_header(project: &Project, count: usize, collapsed: bool) -> String {
    let marker = if collapsed { "▸" } else { "▾" };
    format!("{} {} ({}) [{}]", marker, project.name, project.id, count)
}

/// Format the open-project listing
pub fn format_listing(groups: &[ProjectGroup<'_>], style: Style) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format_project_header(group.project, group.count, group.collapsed));
        for todo in &group.todos {
            lines.push(format!("  {}", format_todo_line(todo, style)));
        }
    }
    lines
}

/// Format detailed todo view
pub fn format_todo_detail(todo: &Todo, project: Option<&Project>) -> Vec<String> {
    let mut lines = vec![format!("[{}] {}  {}", check_char(todo), todo.id, todo.text)];
    let project_name = project.map_or(todo.project_id.as_str(), |p| p.name.as_str());
    lines.push(format!("project: {}", project_name));
    if !todo.tags.is_empty() {
        lines.push(format!(
            "tags: {}",
            todo.tags
                .iter()
                .map(|t| format!("@{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    if todo.archived {
        lines.push("archived: yes".to_string());
    }
    lines.push(format!("created: {}", todo.created_at.format("%Y-%m-%d %H:%M")));
    if !todo.notes.is_empty() {
        lines.push("notes:".to_string());
        for line in todo.notes.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

const NAME_MAX: usize = 32;

/// Format a project table: name, id, color, order
pub fn format_project_table(projects: &[&Project]) -> Vec<String> {
    let names: Vec<String> = projects
        .iter()
        .map(|p| truncate_to_width(&p.name, NAME_MAX))
        .collect();
    let name_w = column_width("name", names.iter().map(String::as_str));
    let id_w = column_width("id", projects.iter().map(|p| p.id.as_str()));

    let mut lines = vec![format!(
        " {}  {}  {:<7}  order",
        pad_to_width("name", name_w),
        pad_to_width("id", id_w),
        "color"
    )];
    for (project, name) in projects.iter().zip(&names) {
        let order = project.order.map(|o| o.to_string()).unwrap_or_else(|| "-".into());
        let archived = if project.archived { "  archived" } else { "" };
        lines.push(format!(
            " {}  {}  {:<7}  {}{}",
            pad_to_width(name, name_w),
            pad_to_width(&project.id, id_w),
            project.color,
            order,
            archived
        ));
    }
    lines
}

/// Format the archive
pub fn format_archive(archive: &ArchiveView<'_>, style: Style) -> Vec<String> {
    if archive.is_empty() {
        return vec!["Archive is empty.".to_string()];
    }
    let mut lines = Vec::new();
    if !archive.projects.is_empty() {
        lines.push("Archived projects:".to_string());
        for project in &archive.projects {
            lines.push(format!("  {} ({})", project.name, project.id));
        }
    }
    for (project, todos) in archive.todos.values() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{} ({}):", project.name, project.id));
        for todo in todos {
            lines.push(format!("  {}", format_todo_line(todo, style)));
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Shows status messages on stderr. Listings are printed by the handlers,
/// so render requests are ignored.
#[derive(Debug, Default)]
pub struct CliPresenter;

impl Presenter for CliPresenter {
    fn render(&mut self) {}

    fn status(&mut self, message: &str, level: StatusLevel) {
        match level {
            StatusLevel::Success | StatusLevel::Info => eprintln!("{}", message),
            StatusLevel::Warning => eprintln!("warning: {}", message),
            StatusLevel::Danger => eprintln!("error: {}", message),
        }
    }

    fn refresh_tag_filters(&mut self) {}

    fn refresh_archive_badge(&mut self) {}

    fn autosaved(&mut self, at: DateTime<Utc>) {
        tracing::debug!(at = %at.format("%H:%M:%S"), "autosaved linked file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::INBOX_ID;
    use pretty_assertions::assert_eq;

    fn todo(id: &str, text: &str) -> Todo {
        Todo::new(id.into(), text.into(), crate::parse::extract_tags(text), INBOX_ID.into())
    }

    #[test]
    fn todo_line_marks_completion_and_notes() {
        let mut t = todo("7", "ship @urgent");
        assert_eq!(format_todo_line(&t, Style::Plain), "[ ] 7  ship @urgent");
        t.completed = true;
        t.notes = "soon".into();
        assert_eq!(format_todo_line(&t, Style::Plain), "[x] 7  ship @urgent +notes");
    }

    #[test]
    fn ansi_style_highlights_tags() {
        let t = todo("7", "ship @urgent");
        assert_eq!(
            format_todo_line(&t, Style::Ansi),
            "[ ] 7  ship \x1b[36m@urgent\x1b[0m"
        );
    }

    #[test]
    fn listing_collapsed_project_has_header_only() {
        let inbox = Project::inbox("#03DAC6");
        let work = Project::new("1".into(), "Work".into(), "#123456".into(), Some(1));
        let a = todo("10", "a");
        let groups = vec![
            ProjectGroup {
                project: &inbox,
                todos: vec![&a],
                count: 1,
                collapsed: false,
            },
            ProjectGroup {
                project: &work,
                todos: vec![],
                count: 3,
                collapsed: true,
            },
        ];
        assert_eq!(
            format_listing(&groups, Style::Plain),
            vec![
                "▾ Inbox (inbox) [1]".to_string(),
                "  [ ] 10  a".to_string(),
                String::new(),
                "▸ Work (1) [3]".to_string(),
            ]
        );
    }

    #[test]
    fn project_table_aligns_columns() {
        let inbox = Project::inbox("#03DAC6");
        let work = Project::new("1712".into(), "Work".into(), "#123456".into(), Some(1));
        let lines = format_project_table(&[&inbox, &work]);
        assert_eq!(lines[0], " name   id     color    order");
        assert_eq!(lines[1], " Inbox  inbox  #03DAC6  0");
        assert_eq!(lines[2], " Work   1712   #123456  1");
    }

    #[test]
    fn group_json_flattens_project() {
        let inbox = Project::inbox("#03DAC6");
        let group = ProjectGroup {
            project: &inbox,
            todos: vec![],
            count: 0,
            collapsed: false,
        };
        let value = serde_json::to_value(group_to_json(&group)).unwrap();
        assert_eq!(value["id"], "inbox");
        assert_eq!(value["isDefault"], true);
        assert_eq!(value["collapsed"], false);
        assert!(value["todos"].as_array().unwrap().is_empty());
    }
}
