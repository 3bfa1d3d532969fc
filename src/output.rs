//! Result file writer.
//!
//! Each run gets a fresh `allnews_<YYYYMMDD_HHMMSS>_<8 hex>.txt`. The random
//! suffix keeps two runs started in the same second apart. Files are written
//! to a temporary sibling and renamed into place, so the retention sweep or
//! a downloader never sees half a file.

use crate::article::Article;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Entire file content when a run produced no articles.
pub const NO_ARTICLES_MARKER: &str = "No articles found.";

const FILE_PREFIX: &str = "allnews_";
const FILE_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move '{}' into place at '{}': {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// `allnews_<YYYYMMDD_HHMMSS>_<8 hex>.txt` for the given instant.
pub fn output_file_name(now: DateTime<Local>) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{FILE_PREFIX}{}_{}.{FILE_EXTENSION}",
        now.format("%Y%m%d_%H%M%S"),
        &id[..8]
    )
}

/// File body for `articles`, or [`NO_ARTICLES_MARKER`] when there are none.
pub fn render_articles(articles: &[Article]) -> String {
    if articles.is_empty() {
        return NO_ARTICLES_MARKER.to_string();
    }

    let mut out = String::new();
    for article in articles {
        out.push_str("URL: ");
        out.push_str(article.url());
        out.push_str("\nContent: ");
        out.push_str(article.content());
        out.push_str("\n\n");
    }
    out
}

/// Write `articles` to a new, uniquely named file in `dir`.
///
/// `dir` is created if missing. Returns the path of the file written.
///
/// # Errors
///
/// Any I/O failure is returned; nothing is retried.
pub fn write_articles(dir: &Path, articles: &[Article]) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(output_file_name(Local::now()));
    atomic_write(&path, render_articles(articles).as_bytes())?;

    tracing::info!(
        path = %path.display(),
        articles = articles.len(),
        "Result file written"
    );
    Ok(path)
}

/// Write `content` to `dst` via a randomly named temp file plus rename.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<(), OutputError> {
    let temp_path = dst.with_extension(format!(
        "{FILE_EXTENSION}.tmp.{}",
        Uuid::new_v4().simple()
    ));

    let write_err = |source| OutputError::Write {
        path: temp_path.clone(),
        source,
    };

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails if the path exists, so a planted symlink is never followed
        .open(&temp_path)
        .map_err(write_err)?;

    // Sync before rename so the final name never points at unflushed data
    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    drop(temp_file);

    if let Err(source) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_err(source));
    }

    std::fs::rename(&temp_path, dst).map_err(|source| {
        let _ = std::fs::remove_file(&temp_path);
        OutputError::Rename {
            from: temp_path.clone(),
            to: dst.to_path_buf(),
            source,
        }
    })
}
