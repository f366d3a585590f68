use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "docket.toml";

/// Written by `dk init`
pub const CONFIG_TEMPLATE: &str = r##"# docket configuration

[projects]
# Color for new projects created without --color
default_color = "#BB86FC"
# Color for the Inbox when it has to be recreated
inbox_color = "#03DAC6"

[file]
# Rebind to the last linked data file on start
reconnect_on_start = true
# Milliseconds to wait for another process writing the linked file
lock_timeout_ms = 5000

[ui]
show_archived_count = true
"##;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse docket.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit docket.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("invalid config key '{0}' (expected table.key)")]
    InvalidKey(String),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Read docket.toml from the data directory. A missing file yields defaults.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(ConfigError::ReadError { path, source: e }),
    }
}

/// Write the commented default config unless one exists.
/// Returns true if a file was written.
pub fn write_default_config(data_dir: &Path, force: bool) -> Result<bool, ConfigError> {
    let path = config_path(data_dir);
    if path.exists() && !force {
        return Ok(false);
    }
    fs::create_dir_all(data_dir).map_err(|e| ConfigError::WriteError {
        path: data_dir.to_path_buf(),
        source: e,
    })?;
    fs::write(&path, CONFIG_TEMPLATE).map_err(|e| ConfigError::WriteError { path, source: e })?;
    Ok(true)
}

/// Set `table.key = value` in docket.toml, preserving comments and layout.
///
/// `value` is parsed as a TOML value when possible (`true`, `5000`) and
/// stored as a string otherwise. The edited document must still parse as a
/// valid config before it is written.
pub fn set_config_value(data_dir: &Path, key: &str, value: &str) -> Result<Config, ConfigError> {
    let (table, field) = key
        .split_once('.')
        .filter(|(t, f)| !t.is_empty() && !f.is_empty() && !f.contains('.'))
        .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;

    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    let mut doc: toml_edit::DocumentMut = text.parse()?;
    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[table][field] = toml_edit::value(parse_value(value));

    let edited = doc.to_string();
    let config: Config = toml::from_str(&edited)?;
    fs::create_dir_all(data_dir).map_err(|e| ConfigError::WriteError {
        path: data_dir.to_path_buf(),
        source: e,
    })?;
    fs::write(&path, edited).map_err(|e| ConfigError::WriteError { path, source: e })?;
    Ok(config)
}

fn parse_value(raw: &str) -> toml_edit::Value {
    if let Ok(b) = raw.parse::<bool>() {
        return b.into();
    }
    if let Ok(n) = raw.parse::<i64>() {
        return n.into();
    }
    raw.into()
}
