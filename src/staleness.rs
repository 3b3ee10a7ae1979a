//! Decides whether a task's outputs are out of date relative to its inputs.
//!
//! Directories are aggregated differently depending on which side they sit
//! on. A target directory is only as fresh as its oldest file, so a partially
//! written output directory still counts as stale. A source directory is
//! newer than a target as soon as any one of its files is.

use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use crate::error::{BuildError, Result};
use crate::mtime::{self, Entry};

/// Returns `true` if the task owning `targets` needs to run.
///
/// Zero targets, or any absent target, is always stale. A missing source is
/// an error rather than a verdict. Equal timestamps count as up to date.
pub fn is_stale<T, S>(targets: &[T], sources: &[S]) -> Result<bool>
where
    T: AsRef<Path>,
    S: AsRef<Path>,
{
    if targets.is_empty() {
        return Ok(true);
    }

    for target in targets {
        let target = target.as_ref();
        let Some(mark) = watermark(target)? else {
            debug!(target = %target.display(), "target missing");
            return Ok(true);
        };

        for source in sources {
            let source = source.as_ref();
            if newer_than(source, mark)? {
                debug!(
                    target = %target.display(),
                    source = %source.display(),
                    "source is newer than target"
                );
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// The instant a target counts as having been built, or `None` if there is
/// nothing there yet.
///
/// For a directory this is the earliest modification instant among the
/// files beneath it. A directory with no files counts as absent.
pub fn watermark(target: &Path) -> Result<Option<SystemTime>> {
    match mtime::probe(target)? {
        Entry::Absent => Ok(None),
        Entry::File(modified) => Ok(Some(modified)),
        Entry::Dir => {
            let mut oldest: Option<SystemTime> = None;
            for file in mtime::files_under(target)? {
                let modified = mtime::last_modified(&file)?;
                oldest = Some(match oldest {
                    Some(current) => current.min(modified),
                    None => modified,
                });
            }
            Ok(oldest)
        }
    }
}

fn newer_than(source: &Path, mark: SystemTime) -> Result<bool> {
    match mtime::probe(source)? {
        Entry::Absent => Err(BuildError::NotFound {
            path: source.to_path_buf(),
        }),
        Entry::File(modified) => Ok(modified > mark),
        Entry::Dir => {
            for file in mtime::files_under(source)? {
                if mtime::last_modified(&file)? > mark {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
