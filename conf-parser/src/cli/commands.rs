//! Command implementations for `conf-edit`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

use super::OutputFormat;
use crate::LineStore;

/// One row of `list --all` output.
#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    key: &'a str,
    value: &'a str,
    commented: bool,
}

fn is_stdin(path: &Path) -> bool {
    path.to_str() == Some("-")
}

/// Load a store from `path`, or from stdin when `path` is `-`.
pub fn load_store(path: &Path) -> Result<LineStore> {
    if is_stdin(path) {
        debug!("Reading config from stdin");
        LineStore::from_reader(io::stdin().lock()).context("Failed to read from stdin")
    } else {
        LineStore::open(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }
}

/// Save `store` back to `path`, or print it when `stdout` is set or the
/// input came from stdin.
pub fn persist_store(store: &LineStore, path: &Path, stdout: bool) -> Result<()> {
    if stdout || is_stdin(path) {
        store
            .write_to(io::stdout().lock())
            .context("Failed to write to stdout")
    } else {
        store
            .save(path)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        info!("Updated {}", path.display());
        Ok(())
    }
}

pub fn execute_get(
    path: &Path,
    key: &str,
    include_commented: bool,
    default: Option<String>,
) -> Result<()> {
    let store = load_store(path)?;
    let value = if include_commented {
        store.get_including_commented(key)
    } else {
        store.get(key)
    };

    match (value, default) {
        (Some(v), _) => println!("{}", v),
        (None, Some(d)) => println!("{}", d),
        (None, None) => bail!("Key '{}' not found in {}", key, path.display()),
    }
    Ok(())
}

pub fn execute_is_commented(path: &Path, key: &str) -> Result<()> {
    let store = load_store(path)?;
    println!("{}", store.is_commented(key));
    Ok(())
}

pub fn execute_list(path: &Path, all: bool, format: OutputFormat) -> Result<()> {
    let store = load_store(path)?;
    let mut out = io::stdout().lock();

    if all {
        let rows: Vec<EntryRow> = store
            .entries()
            .map(|e| EntryRow {
                key: e.key,
                value: e.value(),
                commented: e.is_commented(),
            })
            .collect();

        match format {
            OutputFormat::Text => {
                for row in rows {
                    let marker = if row.commented { "#" } else { "" };
                    writeln!(out, "{}{} = {}", marker, row.key, row.value)?;
                }
            }
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&rows)?)?,
            OutputFormat::JsonPretty => writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?,
        }
    } else {
        let map = store.get_all();
        match format {
            OutputFormat::Text => {
                for (key, value) in &map {
                    writeln!(out, "{} = {}", key, value)?;
                }
            }
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&map)?)?,
            OutputFormat::JsonPretty => writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?,
        }
    }

    out.flush()?;
    Ok(())
}

pub fn execute_set(path: &Path, key: &str, value: &str, stdout: bool) -> Result<()> {
    let mut store = load_store(path)?;
    store.set(key, value);
    persist_store(&store, path, stdout)
}

pub fn execute_comment(path: &Path, key: &str, stdout: bool) -> Result<()> {
    let mut store = load_store(path)?;
    store.comment(key);
    persist_store(&store, path, stdout)
}

pub fn execute_uncomment(path: &Path, key: &str, stdout: bool) -> Result<()> {
    let mut store = load_store(path)?;
    store.uncomment(key);
    persist_store(&store, path, stdout)
}

pub fn execute_cat(path: &Path) -> Result<()> {
    let store = load_store(path)?;
    store
        .write_to(io::stdout().lock())
        .context("Failed to write to stdout")
}
