use std::path::Path;

use crate::cli::commands::{ConfigAction, ConfigCmd, InitArgs};
use crate::io::config_io::{self, ConfigError};
use crate::model::config::Config;

pub fn cmd_init(data_dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let written = config_io::write_default_config(data_dir, args.force)?;
    let path = config_io::config_path(data_dir);
    if written {
        println!("Initialized docket in {}", data_dir.display());
        println!("  config: {}", path.display());
    } else {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    Ok(())
}

pub fn cmd_config(data_dir: &Path, args: ConfigCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        ConfigAction::Path => {
            println!("{}", config_io::config_path(data_dir).display());
        }
        ConfigAction::Get(get) => {
            let config = config_io::read_config(data_dir)?;
            let value = config_value(&config)?;
            let key = get.key.unwrap_or_default();
            let value = if key.is_empty() {
                &value
            } else {
                lookup(&value, &key)?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(value)?);
            } else {
                for line in format_value(value, &key) {
                    println!("{}", line);
                }
            }
        }
        ConfigAction::Set(set) => {
            config_io::set_config_value(data_dir, &set.key, &set.value)?;
            println!("{} = {}", set.key, set.value);
        }
    }
    Ok(())
}

/// The effective config (file plus defaults) as a JSON tree
fn config_value(config: &Config) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(config)
}

/// Resolve `table.key` (or just `table`) in the config tree
fn lookup<'a>(value: &'a serde_json::Value, key: &str) -> Result<&'a serde_json::Value, ConfigError> {
    key.split('.')
        .try_fold(value, |v, part| v.get(part))
        .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))
}

/// A bare value for a leaf, `table.key = value` lines for a table
fn format_value(value: &serde_json::Value, prefix: &str) -> Vec<String> {
    if !value.is_object() {
        return vec![leaf_text(value)];
    }
    let mut lines = Vec::new();
    flatten_into(value, prefix, &mut lines);
    lines
}

fn leaf_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten_into(value: &serde_json::Value, prefix: &str, lines: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten_into(v, &key, lines);
            }
        }
        leaf => lines.push(format!("{} = {}", prefix, leaf_text(leaf))),
    }
}
