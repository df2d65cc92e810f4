//! Filesystem blob storage
//!
//! Raw byte blobs stored one file per key, with atomic writes and
//! modification-time tracking. Every failure is logged and absorbed into a
//! `bool` or `Option` result; callers only ever see present/absent or
//! succeeded/failed.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Encode a cache key into a single filesystem-safe path segment.
///
/// Percent-encoding is injective over arbitrary keys and leaves the empty
/// string unchanged.
pub fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Path for a key rooted at `root`: `root` joined with the encoded key.
pub fn encoded_path(key: &str, root: &Path) -> PathBuf {
    root.join(encode_key(key))
}

/// Write a blob atomically: write to a scratch sibling, then rename into
/// place. The parent directory must already exist.
///
/// The scratch suffix contains `#`, which percent-encoding always escapes,
/// so the scratch path can never collide with another encoded key's blob.
pub async fn write(bytes: &[u8], path: &Path) -> bool {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push("#tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(err) = fs::write(&tmp, bytes).await {
        warn!(path = %path.display(), error = %err, "failed to write blob");
        return false;
    }

    if let Err(err) = fs::rename(&tmp, path).await {
        warn!(path = %path.display(), error = %err, "failed to move blob into place");
        let _ = fs::remove_file(&tmp).await;
        return false;
    }

    true
}

/// Read a blob. Returns `None` if the file is missing or unreadable.
///
/// A successful read refreshes the blob's modification time so that
/// time-based trimming treats it as recently used.
pub async fn read(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => {
            set_modified_time(path, Utc::now()).await;
            Some(bytes)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read blob");
            None
        }
    }
}

/// Delete a file or directory tree. Deleting a missing path is success.
pub async fn delete(path: &Path) -> bool {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to stat item for deletion");
            return false;
        }
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to delete item");
            false
        }
    }
}

/// Create a directory, including intermediate components. Idempotent; fails
/// if a non-directory already occupies the path.
pub async fn create_directory(path: &Path) -> bool {
    match fs::create_dir_all(path).await {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to create directory");
            false
        }
    }
}

/// Recursively list every file under `root`. Order is unspecified.
/// Unreadable subtrees are skipped with a warning.
pub async fn enumerate(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to enumerate directory");
                continue;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => match entry.file_type().await {
                    Ok(file_type) if file_type.is_dir() => pending.push(entry.path()),
                    Ok(_) => files.push(entry.path()),
                    Err(err) => {
                        warn!(path = %entry.path().display(), error = %err, "failed to stat entry");
                    }
                },
                Ok(None) => break,
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "failed to read directory entry");
                    break;
                }
            }
        }
    }

    files
}

/// Modification time of the item at `path`, if it exists.
pub async fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to stat item");
            return None;
        }
    };

    match metadata.modified() {
        Ok(modified) => Some(DateTime::<Utc>::from(modified)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "modification time unavailable");
            None
        }
    }
}

/// Set the modification time of the item at `path`. Returns false if the
/// item is missing or the update fails.
pub async fn set_modified_time(path: &Path, time: DateTime<Utc>) -> bool {
    let file = match std::fs::OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return false,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to open item for touching");
            return false;
        }
    };

    match file.set_modified(time.into()) {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to update modification time");
            false
        }
    }
}
