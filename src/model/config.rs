use serde::{Deserialize, Serialize};

use super::project::{DEFAULT_INBOX_COLOR, DEFAULT_PROJECT_COLOR};

/// Configuration from docket.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub projects: ProjectsConfig,
    #[serde(default)]
    pub file: FileConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// Color for new projects created without one
    #[serde(default = "default_project_color")]
    pub default_color: String,
    /// Color for a synthesized Inbox
    #[serde(default = "default_inbox_color")]
    pub inbox_color: String,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        ProjectsConfig {
            default_color: default_project_color(),
            inbox_color: default_inbox_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Rebind to the remembered file path when the store opens
    #[serde(default = "default_true")]
    pub reconnect_on_start: bool,
    /// How long to wait for the bound file's write lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            reconnect_on_start: true,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show the archived-todo count under `dk list`
    #[serde(default = "default_true")]
    pub show_archived_count: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_archived_count: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_project_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

fn default_inbox_color() -> String {
    DEFAULT_INBOX_COLOR.to_string()
}
