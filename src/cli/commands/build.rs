//! `build` command: install, freeze and package.

use super::load_settings;
use crate::bundler::Bundler;
use crate::cli::args::BuildArgs;
use crate::error::{CliError, Result};

/// Runs the full build and prints every artifact path, one per line.
pub async fn execute_build(args: &BuildArgs) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let settings = load_settings(&args.project, |builder, manifest| {
        builder
            .bundle_settings(args.merge_into(manifest.bundle_settings.clone()))
            .python(&args.python)
            .skip_install(args.skip_install)
    })?;

    if let Some(arguments) = BuildArgs::conflicts(settings.bundle_settings()) {
        return Err(CliError::ConflictingArguments { arguments }.into());
    }

    let bundler = Bundler::new(settings)?;
    let artifacts = bundler.bundle().await?;

    for artifact in &artifacts {
        log::info!(
            "{} {} ({} bytes, sha256 {})",
            artifact.kind,
            artifact.path.display(),
            artifact.size,
            artifact.checksum
        );
        println!("{}", artifact.path.display());
    }
    log::info!("Created {} artifacts", artifacts.len());
    Ok(0)
}
