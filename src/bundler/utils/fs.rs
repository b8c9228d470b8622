//! File system utilities for bundling.
//!
//! Provides idempotent directory handling, hard links with a copy fallback,
//! and moves that work across filesystems.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    io::{self},
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Hard-links `dst` to `src`, replacing an existing `dst`.
///
/// Falls back to a copy when the two paths are on different filesystems.
pub async fn hard_link_or_copy(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating link directory", parent)?;
    }
    remove_file(dst).await?;

    match fs::hard_link(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!("{} is on another device, copying instead", dst.display());
            fs::copy(src, dst).await.fs_context("copying file", dst)?;
            Ok(())
        }
        Err(e) => Err(e).fs_context("linking file", dst),
    }
}

/// Moves `src` into directory `dir`, keeping its file name.
///
/// Returns the new path. Copies and removes when a rename is not possible.
pub async fn move_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = src.file_name().ok_or_else(|| {
        crate::bundler::error::Error::GenericError(format!("{src:?} has no file name"))
    })?;
    let dst = dir.join(file_name);

    fs::create_dir_all(dir)
        .await
        .fs_context("creating output directory", dir)?;
    remove_file(&dst).await?;

    if fs::rename(src, &dst).await.is_err() {
        fs::copy(src, &dst).await.fs_context("copying file", &dst)?;
        fs::remove_file(src).await.fs_context("removing file", src)?;
    }
    Ok(dst)
}

/// Sets unix permission bits; a no-op elsewhere.
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .await
            .fs_context("setting permissions", path)?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hard_link_replaces_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("simple-0.1");
        let dst = tmp.path().join("usr/bin/hello");
        std::fs::write(&src, b"binary").unwrap();

        hard_link_or_copy(&src, &dst).await.unwrap();
        hard_link_or_copy(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"binary");
    }

    #[tokio::test]
    async fn move_into_relocates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("build/pkg.deb");
        std::fs::create_dir_all(src.parent().unwrap()).unwrap();
        std::fs::write(&src, b"deb").unwrap();

        let moved = move_into(&src, &tmp.path().join("dist")).await.unwrap();
        assert_eq!(moved, tmp.path().join("dist/pkg.deb"));
        assert!(!src.exists());
        assert_eq!(std::fs::read(moved).unwrap(), b"deb");
    }

    #[tokio::test]
    async fn create_dir_all_can_erase() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("rpm");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale"), b"").unwrap();

        create_dir_all(&dir, true).await.unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("stale").exists());
    }
}
