//! Command execution functions for bundler operations.

mod build;
mod dispatcher;

pub use build::execute_build;
pub use dispatcher::execute_dispatcher;

use crate::bundler::{Settings, SettingsBuilder};
use crate::error::Result;
use crate::metadata::{ProjectManifest, load_project};
use std::path::Path;

/// Loads `pyproject.toml` and resolves the bundler settings.
///
/// `configure` adjusts the builder before it is built, e.g. to apply command
/// line overrides.
fn load_settings(
    project: &Path,
    configure: impl FnOnce(SettingsBuilder, &ProjectManifest) -> SettingsBuilder,
) -> Result<Settings> {
    let manifest = load_project(project)?;
    log::debug!(
        "Loaded {} {} with {} entry points",
        manifest.package.name,
        manifest.package.version,
        manifest.entry_points.len()
    );

    let builder = SettingsBuilder::new()
        .project_directory(project)
        .packages(manifest.packages.clone())
        .entry_points(manifest.entry_points.clone())
        .package_settings(manifest.package.clone());
    let builder = configure(builder, &manifest);
    Ok(builder.build()?)
}
