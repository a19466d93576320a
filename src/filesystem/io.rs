//! Result-producing wrappers around every raw filesystem call.
//!
//! This is the only place where OS errors are translated into [`FsError`].
//! Calls `compio::fs` has no completion-based form for run on the blocking
//! pool so the caller's thread never waits on the disk.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use compio::fs;
use compio::runtime::spawn_blocking;

use super::FsError;
use super::error::MassageExt;
use super::normalize::NormalizeName;

async fn unblock<T, F>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|_| io::Error::other("blocking filesystem task panicked"))?
}

/// Follows symlinks, like `stat(2)`.
pub async fn stat(path: &Path) -> Result<Metadata, FsError> {
    let owned = path.to_path_buf();
    unblock(move || std::fs::metadata(owned)).await.massage(path)
}

/// Names of the direct children of `path`, in filesystem order.
pub async fn read_directory(path: &Path) -> Result<Vec<String>, FsError> {
    let owned = path.to_path_buf();
    let names = unblock(move || {
        std::fs::read_dir(owned)?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<String>>>()
    })
    .await
    .massage(path)?;

    Ok(names.normalize_name())
}

pub async fn read_file(path: &Path) -> Result<Vec<u8>, FsError> {
    fs::read(path).await.massage(path)
}

pub async fn write_file(path: &Path, content: Vec<u8>) -> Result<(), FsError> {
    fs::write(path, content).await.0.massage(path)
}

/// Never fails; an unreadable path counts as absent.
pub async fn exists(path: &Path) -> bool {
    let owned = path.to_path_buf();
    unblock(move || Ok(owned.exists())).await.unwrap_or(false)
}

/// Removes a file, a symlink, or a directory with everything below it.
pub async fn remove_recursive(path: &Path) -> Result<(), FsError> {
    let owned: PathBuf = path.to_path_buf();
    unblock(move || {
        if std::fs::symlink_metadata(&owned)?.is_dir() {
            std::fs::remove_dir_all(&owned)
        } else {
            std::fs::remove_file(&owned)
        }
    })
    .await
    .massage(path)
}

/// Creates `path` and any missing ancestors; succeeds if it already exists.
pub async fn make_directories_recursive(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).await.massage(path)
}

pub async fn rename(old_path: &Path, new_path: &Path) -> Result<(), FsError> {
    fs::rename(old_path, new_path).await.massage(old_path)
}

pub async fn unlink_file(path: &Path) -> Result<(), FsError> {
    fs::remove_file(path).await.massage(path)
}
