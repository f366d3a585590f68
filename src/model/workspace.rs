use chrono::Utc;

use super::project::{INBOX_ID, Project};
use super::todo::Todo;

/// The authoritative in-memory collections
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    /// Todos in storage order (order within a project is positional)
    pub todos: Vec<Todo>,
    /// Projects in storage order (display order comes from `order`)
    pub projects: Vec<Project>,
    /// Highest id handed out by `next_id`
    last_id: u64,
}

impl Workspace {
    pub fn new(todos: Vec<Todo>, projects: Vec<Project>) -> Self {
        Workspace {
            todos,
            projects,
            last_id: 0,
        }
    }

    /// Issue a fresh time-based id.
    ///
    /// Ids are millisecond timestamps. When the clock has not moved past the
    /// last issued id or the largest numeric id already stored, the next
    /// integer is used instead, so an id is never handed out twice.
    pub fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let floor = self.last_id.max(self.max_numeric_id());
        let id = if now > floor { now } else { floor + 1 };
        self.last_id = id;
        id.to_string()
    }

    fn max_numeric_id(&self) -> u64 {
        self.todos
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.projects.iter().map(|p| p.id.as_str()))
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }

    pub fn todo(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn todo_mut(&mut self, id: &str) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn inbox(&self) -> Option<&Project> {
        self.project(INBOX_ID)
    }

    /// Todos belonging to a project, in storage order
    pub fn project_todos<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Todo> + 'a {
        self.todos.iter().filter(move |t| t.project_id == project_id)
    }

    /// Make sure exactly one Inbox exists. Returns true if one was created.
    ///
    /// Duplicate Inbox entries (only possible from hand-edited data) are
    /// collapsed to the first.
    pub fn ensure_inbox(&mut self, color: &str) -> bool {
        let mut seen = false;
        self.projects.retain(|p| {
            if !p.is_inbox() {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        });
        if seen {
            if let Some(inbox) = self.project_mut(INBOX_ID) {
                inbox.is_default = true;
                inbox.archived = false;
            }
            return false;
        }
        self.projects.push(Project::inbox(color));
        true
    }
}
