use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::project::INBOX_ID;

/// A single todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Time-based id, never reused
    pub id: String,
    /// Text as entered, including any `@tag` tokens
    pub text: String,
    /// Tags extracted from `text` (without the `@` prefix)
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub archived: bool,
    /// Owning project. Missing, null or empty values resolve to the Inbox.
    #[serde(default = "inbox_id", deserialize_with = "project_id_or_inbox")]
    pub project_id: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Create a new, incomplete, unarchived todo
    pub fn new(id: String, text: String, tags: Vec<String>, project_id: String) -> Self {
        Todo {
            id,
            text,
            tags,
            completed: false,
            archived: false,
            project_id,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether this todo counts against archiving its project
    pub fn is_open(&self) -> bool {
        !self.archived && !self.completed
    }
}

fn inbox_id() -> String {
    INBOX_ID.to_string()
}

fn project_id_or_inbox<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(id) if !id.is_empty() => id,
        _ => inbox_id(),
    })
}
