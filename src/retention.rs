//! Housekeeping for the output directory: stale result files are removed
//! before each run.

use std::path::Path;
use std::time::{Duration, SystemTime};

/// Remove `.txt` files in `dir` last modified more than `max_age` ago.
///
/// See [`remove_modified_before`] for the rules.
pub fn sweep_stale_outputs(
    dir: &Path,
    max_age: Duration,
    keep: Option<&Path>,
) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    remove_modified_before(dir, cutoff, keep)
}

/// Remove `.txt` files in `dir` whose modification time is before `cutoff`.
///
/// Only regular files directly inside `dir` are considered. `keep`, if given,
/// is never removed. A missing `dir` is not an error. Files that cannot be
/// inspected or removed are logged and skipped, so one bad entry does not
/// stop the sweep.
///
/// Returns the number of files removed.
///
/// # Errors
///
/// Only a failure to list `dir` itself is returned.
pub fn remove_modified_before(
    dir: &Path,
    cutoff: SystemTime,
    keep: Option<&Path>,
) -> std::io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
            continue;
        }
        if keep.is_some_and(|k| k == path) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| {
            if m.is_file() {
                m.modified().map(Some)
            } else {
                Ok(None)
            }
        }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read file metadata");
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed stale result file");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove stale result file");
            }
        }
    }

    if removed > 0 {
        tracing::info!(dir = %dir.display(), removed = removed, "Stale result files removed");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far_future() -> SystemTime {
        SystemTime::now() + Duration::from_secs(24 * 3600)
    }

    #[test]
    fn test_missing_directory_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(remove_modified_before(&missing, far_future(), None).unwrap(), 0);
    }

    #[test]
    fn test_fresh_files_survive_default_sweep() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("allnews_new.txt"), "x").unwrap();

        let removed = sweep_stale_outputs(dir.path(), Duration::from_secs(3600), None).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("allnews_new.txt").exists());
    }

    #[test]
    fn test_old_txt_files_removed_others_kept() {
        let dir = tempfile::tempdir().unwrap();
        let old_a = dir.path().join("allnews_a.txt");
        let old_b = dir.path().join("allnews_b.txt");
        let other = dir.path().join("notes.md");
        let temp = dir.path().join("allnews_c.txt.tmp.0123abcd");
        let subdir = dir.path().join("archive.txt");
        for p in [&old_a, &old_b, &other, &temp] {
            std::fs::write(p, "x").unwrap();
        }
        std::fs::create_dir(&subdir).unwrap();

        // Everything was modified before a cutoff a day from now
        let removed = remove_modified_before(dir.path(), far_future(), None).unwrap();

        assert_eq!(removed, 2);
        assert!(!old_a.exists());
        assert!(!old_b.exists());
        assert!(other.exists());
        assert!(temp.exists());
        assert!(subdir.exists());
    }

    #[test]
    fn test_keep_path_never_removed() {
        let dir = tempfile::tempdir().unwrap();
        let current = dir.path().join("allnews_current.txt");
        let stale = dir.path().join("allnews_stale.txt");
        std::fs::write(&current, "x").unwrap();
        std::fs::write(&stale, "x").unwrap();

        let removed = remove_modified_before(dir.path(), far_future(), Some(&current)).unwrap();

        assert_eq!(removed, 1);
        assert!(current.exists());
        assert!(!stale.exists());
    }
}
