//! File system helpers used to materialize files in the destination.

use std::io;
use std::path::Path;
use tokio::fs;

/// Create every missing ancestor of `path`. Existing directories are fine.
pub async fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// Copy `src` to `dst`, creating the parent directories of `dst` first.
///
/// `src` (after following links) must be a regular file; opening a FIFO or
/// device for reading could block indefinitely. Returns the number of bytes
/// copied.
pub async fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    if !fs::metadata(src).await?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Not a regular file: {}", src.display()),
        ));
    }

    ensure_parent_dir(dst).await?;
    fs::copy(src, dst).await
}

/// Create a symlink at `dst` pointing to `src`, creating the parent
/// directories of `dst` first. Fails if `dst` already exists.
pub async fn create_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    ensure_parent_dir(dst).await?;

    #[cfg(unix)]
    {
        fs::symlink(src, dst).await
    }

    #[cfg(windows)]
    {
        // Windows needs to know up front whether the target is a directory.
        let is_dir = fs::metadata(src)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            fs::symlink_dir(src, dst).await
        } else {
            fs::symlink_file(src, dst).await
        }
    }
}
