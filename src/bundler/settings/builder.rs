//! Builder for constructing Settings.

use super::{BundleSettings, PackageSettings, Settings};
use crate::bundler::{
    entry_point::EntryPoint,
    error::{Context, ErrorExt},
};
use std::path::{Path, PathBuf};

/// Default scratch directory, relative to the project.
pub const DEFAULT_BDIST_DIR: &str = "build/bdist_pyinstaller";

/// Default output directory, relative to the project.
pub const DEFAULT_DIST_DIR: &str = "pyinstaller_dist";

/// Default interpreter.
pub const DEFAULT_PYTHON: &str = "python3";

/// Builder for constructing [`Settings`].
///
/// Relative directories are resolved against the project directory, which is
/// itself made absolute, because every external tool runs inside it.
///
/// # See Also
///
/// - [`Settings`] - The built settings struct
#[derive(Default)]
pub struct SettingsBuilder {
    project_directory: Option<PathBuf>,
    package_settings: Option<PackageSettings>,
    bundle_settings: BundleSettings,
    packages: Vec<String>,
    entry_points: Vec<EntryPoint>,
    python: Option<PathBuf>,
    skip_install: bool,
    target: Option<String>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project directory (the one holding `pyproject.toml`).
    ///
    /// Default: current directory
    pub fn project_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets package metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets bundle configuration.
    ///
    /// Default: [`BundleSettings::default`]
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle_settings = settings;
        self
    }

    /// Sets the project's importable packages.
    pub fn packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    /// Sets the console entry points.
    pub fn entry_points(mut self, entry_points: Vec<EntryPoint>) -> Self {
        self.entry_points = entry_points;
        self
    }

    /// Sets the Python interpreter.
    ///
    /// Default: `python3`
    pub fn python<P: AsRef<Path>>(mut self, python: P) -> Self {
        self.python = Some(python.as_ref().to_path_buf());
        self
    }

    /// Skips `pip install` of the build requirements and the project.
    ///
    /// Default: false
    pub fn skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    /// Sets target triple.
    ///
    /// Default: `TARGET` environment variable or the current architecture
    pub fn target(mut self, target: String) -> Self {
        self.target = Some(target);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `package_settings` is missing or the project
    /// directory cannot be made absolute.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        let target = self.target.unwrap_or_else(|| {
            std::env::var("TARGET").unwrap_or_else(|_| std::env::consts::ARCH.to_string())
        });

        let project = self.project_directory.unwrap_or_else(|| PathBuf::from("."));
        let project = std::path::absolute(&project).fs_context("resolving project directory", &project)?;

        let resolve = |configured: Option<&PathBuf>, default: &str| match configured {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project.join(path),
            None => project.join(default),
        };
        let bdist = resolve(self.bundle_settings.bdist_dir.as_ref(), DEFAULT_BDIST_DIR);
        let dist = resolve(self.bundle_settings.dist_dir.as_ref(), DEFAULT_DIST_DIR);

        Ok(Settings::new(
            self.package_settings
                .context("package_settings is required")?,
            self.bundle_settings,
            project,
            bdist,
            dist,
            self.packages,
            self.entry_points,
            self.python.unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON)),
            self.skip_install,
            target,
        ))
    }
}
