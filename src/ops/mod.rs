pub mod project_ops;
pub mod reorder;
pub mod todo_ops;
pub mod view_ops;

use std::fmt;

/// What kind of record an id referred to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Todo,
    Project,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Todo => write!(f, "todo"),
            EntityKind::Project => write!(f, "project"),
        }
    }
}

/// A mutation the model refuses to perform
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("Cannot archive the Inbox project.")]
    ArchiveInbox,
    #[error("Cannot delete the Inbox project.")]
    DeleteInbox,
    #[error("The Inbox project always stays first.")]
    ReorderInbox,
    #[error("Cannot archive project with incomplete tasks ({count} open in {project}).")]
    IncompleteTodos { project: String, count: usize },
}

/// Error type for model operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("{0}")]
    Refused(#[from] Refusal),
}

impl OpError {
    pub fn todo_not_found(id: &str) -> Self {
        OpError::NotFound {
            kind: EntityKind::Todo,
            id: id.to_string(),
        }
    }

    pub fn project_not_found(id: &str) -> Self {
        OpError::NotFound {
            kind: EntityKind::Project,
            id: id.to_string(),
        }
    }
}

/// Whether a successful operation actually changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
}

impl Outcome {
    pub fn changed(self) -> bool {
        self == Outcome::Applied
    }
}
