//! File system helpers shared by the loader and the CLI.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConfError, Result};

/// Overwrite `path` with `contents` without ever leaving a half-written file.
///
/// The bytes go to a temporary file next to the real destination, which is
/// then renamed over it. Symlinks are followed, so the linked file is what
/// gets updated, and an existing file keeps its permissions. If anything fails
/// the previous file content is left as it was.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let target = resolve_target(path)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.flush()?;

    if let Ok(existing) = fs::metadata(&target) {
        temp.as_file().set_permissions(existing.permissions())?;
    }

    temp.persist(&target).map_err(|e| {
        ConfError::Filesystem(format!("Failed to replace {}: {}", target.display(), e.error))
    })?;

    debug!("Wrote {} bytes to {}", contents.len(), target.display());
    Ok(())
}

/// The file a write to `path` should land in: the symlink target when `path`
/// exists, `path` itself otherwise.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    if fs::symlink_metadata(path).is_ok() {
        Ok(fs::canonicalize(path)?)
    } else {
        Ok(path.to_path_buf())
    }
}
