//! Gzip archive of a one-dir bundle.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::Settings,
};
use flate2::{Compression, write::GzEncoder};
use std::path::{Path, PathBuf};

/// Archives the frozen directory as `<dist>/<name>-<version>.tar.gz`.
///
/// Entries are stored under `<name>-<version>/`.
pub async fn bundle_project(settings: &Settings) -> Result<Vec<PathBuf>> {
    let target_name = settings.target_name();
    let source = settings.frozen_path();
    let archive_path = settings
        .dist_directory()
        .join(format!("{target_name}.tar.gz"));

    log::info!("Archiving {} into {}", source.display(), archive_path.display());

    let path = archive_path.clone();
    tokio::task::spawn_blocking(move || write_tar_gz(&source, &target_name, &path))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {e}")))??;

    log::info!("✓ Created archive: {}", archive_path.display());
    Ok(vec![archive_path])
}

/// Writes `dir` into a gzip tarball at `archive_path`, rooted at `arcname`.
pub fn write_tar_gz(dir: &Path, arcname: &str, archive_path: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::GenericError(format!(
            "{} is not a directory, nothing to archive",
            dir.display()
        )));
    }

    let file = std::fs::File::create(archive_path).fs_context("creating archive", archive_path)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder
        .append_dir_all(arcname, dir)
        .fs_context("adding files to archive", dir)?;
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .fs_context("finishing archive", archive_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;

    #[test]
    fn entries_are_rooted_at_target_name() {
        let tmp = tempfile::tempdir().unwrap();
        let bundle = tmp.path().join("simple-0.1");
        std::fs::create_dir_all(bundle.join("_internal")).unwrap();
        std::fs::write(bundle.join("simple-0.1"), b"exe").unwrap();
        std::fs::write(bundle.join("_internal/base_library.zip"), b"zip").unwrap();

        let archive_path = tmp.path().join("simple-0.1.tar.gz");
        write_tar_gz(&bundle, "simple-0.1", &archive_path).unwrap();

        let file = std::fs::File::open(&archive_path).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let mut names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert!(names.iter().all(|n| n.starts_with("simple-0.1")));
        assert!(names.contains(&"simple-0.1/simple-0.1".to_string()));
        assert!(names.contains(&"simple-0.1/_internal/base_library.zip".to_string()));
    }

    #[test]
    fn refuses_to_archive_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("simple-0.1");
        std::fs::write(&exe, b"exe").unwrap();
        assert!(write_tar_gz(&exe, "simple-0.1", &tmp.path().join("x.tar.gz")).is_err());
    }
}
