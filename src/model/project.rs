use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id of the default project
pub const INBOX_ID: &str = "inbox";

/// Color given to a freshly synthesized Inbox
pub const DEFAULT_INBOX_COLOR: &str = "#03DAC6";

/// Color given to new projects when none is chosen
pub const DEFAULT_PROJECT_COLOR: &str = "#BB86FC";

/// A named group of todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub notes: String,
    /// True only for the Inbox
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub archived: bool,
    /// Manual sort position. Inbox is always 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: String, name: String, color: String, order: Option<u32>) -> Self {
        Project {
            id,
            name,
            color,
            notes: String::new(),
            is_default: false,
            archived: false,
            order,
            created_at: Utc::now(),
        }
    }

    /// Build the default Inbox project
    pub fn inbox(color: &str) -> Self {
        Project {
            is_default: true,
            ..Project::new(INBOX_ID.to_string(), "Inbox".to_string(), color.to_string(), Some(0))
        }
    }

    pub fn is_inbox(&self) -> bool {
        self.id == INBOX_ID
    }
}
