#![allow(dead_code)]

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// A fixed point well in the past so instants set by tests never collide
/// with files written during the test run.
pub fn instant(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000 + secs)
}

/// Writes `path` (creating parent directories) and stamps it with `instant(secs)`.
pub fn touch(path: &Path, secs: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, path.display().to_string()).unwrap();
    set_mtime(path, instant(secs));
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}
