//! Modification-time lookups.
//!
//! Only regular files carry meaningful timestamps here. Directories are never
//! aggregated by this module; callers enumerate them with [`files_under`] and
//! query each member.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// What a path refers to on disk at the moment it is probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Absent,
    File(SystemTime),
    Dir,
}

/// Returns the modification instant of `path`, following symlinks.
pub fn last_modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| BuildError::from_io(path, e))
}

/// Classifies `path` without treating absence as an error.
pub fn probe(path: &Path) -> Result<Entry> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Entry::Dir),
        Ok(meta) => meta
            .modified()
            .map(Entry::File)
            .map_err(|e| BuildError::from_io(path, e)),
        Err(e) => match BuildError::from_io(path, e) {
            BuildError::NotFound { .. } => Ok(Entry::Absent),
            other => Err(other),
        },
    }
}

/// Recursively lists the regular files beneath `dir`, in walk order.
///
/// Symlinked directories are not descended into, which keeps the walk finite
/// even when links form a loop. Symlinks that resolve to regular files are
/// included.
pub fn files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk_error(dir: &Path, err: walkdir::Error) -> BuildError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    match err.into_io_error() {
        Some(io) => BuildError::from_io(path, io),
        None => BuildError::Io {
            path,
            source: std::io::Error::other("filesystem loop"),
        },
    }
}
