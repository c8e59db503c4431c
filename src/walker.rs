//! Concurrent recursive directory walking
//!
//! All entries of a directory are inspected concurrently, and every
//! subdirectory is walked concurrently with its siblings. The first error
//! anywhere in the walk aborts it and the partial listing is dropped.
//!
//! Symbolic links are never followed: an entry whose own type is a link is
//! recorded as a file, whatever it points at. Only the root itself is
//! resolved, so a root given as a link to a directory still works.
//!
//! A directory handle is only held while its entries are read, and at most
//! [`MAX_OPEN_DIRS`] listings run at once, so wide trees stay well under the
//! process descriptor limit.

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, try_join_all};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Semaphore;

use crate::tree::FileTree;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read entry in {}: {source}", path.display())]
    Entry {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to stat {}: {source}", path.display())]
    FileType {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
}

/// Upper bound on directory listings in flight during one walk
pub const MAX_OPEN_DIRS: usize = 64;

/// List the absolute path of every regular file and symlink below `root`.
///
/// Other entry types (FIFOs, sockets, device nodes) are skipped. The order of
/// the result is unspecified.
pub async fn walk(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    let metadata = fs::metadata(root)
        .await
        .map_err(|source| WalkError::ReadDir {
            path: root.to_path_buf(),
            source,
        })?;
    if !metadata.is_dir() {
        return Err(WalkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let limit = Arc::new(Semaphore::new(MAX_OPEN_DIRS));
    walk_dir(root.to_path_buf(), limit).await
}

/// Walk `root` and normalize the result into a root-relative [`FileTree`].
pub async fn build_tree(root: &Path) -> Result<FileTree, WalkError> {
    let files = walk(root).await?;
    tracing::debug!(root = %root.display(), files = files.len(), "Walked tree");
    Ok(FileTree::from_absolute(root, files))
}

/// Walk both roots concurrently. Either failure fails the pair.
pub async fn build_trees(
    source: &Path,
    destination: &Path,
) -> Result<(FileTree, FileTree), WalkError> {
    tokio::try_join!(build_tree(source), build_tree(destination))
}

fn walk_dir(
    dir: PathBuf,
    limit: Arc<Semaphore>,
) -> BoxFuture<'static, Result<Vec<PathBuf>, WalkError>> {
    async move {
        let children = list_dir(&dir, &limit).await?;

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for (path, file_type) in children {
            if file_type.is_dir() {
                subdirs.push(walk_dir(path, Arc::clone(&limit)));
            } else if file_type.is_file() || file_type.is_symlink() {
                files.push(path);
            } else {
                tracing::debug!(path = %path.display(), "Skipping special file");
            }
        }

        for nested in try_join_all(subdirs).await? {
            files.extend(nested);
        }
        Ok(files)
    }
    .boxed()
}

/// Read the path and type of every entry of `dir`.
///
/// A `DirEntry` keeps its directory stream open, so entries are reduced to
/// plain values here. The handle and the permit are both released before
/// this returns and subtrees never hold them.
async fn list_dir(
    dir: &Path,
    limit: &Semaphore,
) -> Result<Vec<(PathBuf, std::fs::FileType)>, WalkError> {
    // The semaphore is never closed, so acquire only fails if that changes.
    let _permit = limit.acquire().await.ok();

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|source| WalkError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut pending = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| WalkError::Entry {
            path: dir.to_path_buf(),
            source,
        })?
    {
        pending.push(entry_type(entry));
    }

    try_join_all(pending).await
}

async fn entry_type(entry: fs::DirEntry) -> Result<(PathBuf, std::fs::FileType), WalkError> {
    let path = entry.path();
    // DirEntry::file_type does not traverse symlinks
    let file_type = entry
        .file_type()
        .await
        .map_err(|source| WalkError::FileType {
            path: path.clone(),
            source,
        })?;
    Ok((path, file_type))
}
