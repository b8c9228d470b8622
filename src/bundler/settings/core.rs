//! Core Settings struct and implementations.

use super::{Arch, BundleSettings, PackageSettings};
use crate::bundler::{entry_point::EntryPoint, platform::PackageType};
use std::path::{Path, PathBuf};

/// Main settings for bundler operations.
///
/// Central configuration for the bundler, constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use pyinstaller_bundle::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> pyinstaller_bundle::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_directory("tests/fixtures/simple")
///     .package_settings(PackageSettings {
///         name: "simple".into(),
///         version: "0.1".into(),
///         ..Default::default()
///     })
///     .packages(vec!["simple".into()])
///     .entry_points(vec!["hello=simple.cli:main".parse()?])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Package metadata.
    package: PackageSettings,

    /// Bundle configuration.
    bundle_settings: BundleSettings,

    /// Directory holding `pyproject.toml`.
    project_directory: PathBuf,

    /// Scratch directory.
    bdist_directory: PathBuf,

    /// Output directory.
    dist_directory: PathBuf,

    /// Importable packages of the project, top-level first.
    packages: Vec<String>,

    /// Declared console entry points.
    entry_points: Vec<EntryPoint>,

    /// Python interpreter used for every build step.
    python: PathBuf,

    /// Skip installing the build requirements and the project.
    skip_install: bool,

    /// Target triple or architecture name, used for package architectures.
    target: String,
}

impl Settings {
    /// Returns the distribution name.
    pub fn product_name(&self) -> &str {
        &self.package.name
    }

    /// Returns the version string.
    pub fn version_string(&self) -> &str {
        &self.package.version
    }

    /// Returns the package metadata.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// `<name>-<version>`.
    pub fn target_name(&self) -> String {
        self.package.target_name()
    }

    /// Returns the project directory.
    pub fn project_directory(&self) -> &Path {
        &self.project_directory
    }

    /// Returns the scratch directory.
    pub fn bdist_directory(&self) -> &Path {
        &self.bdist_directory
    }

    /// Returns the directory final artifacts are placed in.
    pub fn dist_directory(&self) -> &Path {
        &self.dist_directory
    }

    /// Path of the frozen executable (one-file) or directory (one-dir).
    pub fn frozen_path(&self) -> PathBuf {
        self.dist_directory.join(self.target_name())
    }

    /// Detects the package architecture from the target triple.
    pub fn binary_arch(&self) -> Arch {
        Arch::from_target(&self.target)
    }

    /// Returns the project packages.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Returns the declared entry points.
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Returns the Python interpreter.
    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Whether dependency installation is skipped.
    pub fn skip_install(&self) -> bool {
        self.skip_install
    }

    /// Returns the bundle settings.
    pub fn bundle_settings(&self) -> &BundleSettings {
        &self.bundle_settings
    }

    /// Package types derived from the bundle settings, in build order.
    ///
    /// One-dir bundles always get an archive.
    pub fn package_types(&self) -> Vec<PackageType> {
        let mut types = Vec::new();
        if self.bundle_settings.one_dir {
            types.push(PackageType::Archive);
        }
        if self.bundle_settings.rpm {
            types.push(PackageType::Rpm);
        }
        if self.bundle_settings.deb {
            types.push(PackageType::Deb);
        }
        types
    }

    /// Alias names installed for the bundle, interactive alias first.
    pub fn aliases(&self) -> Vec<String> {
        std::iter::once(format!("{}-python", self.package.name))
            .chain(self.entry_points.iter().map(|e| e.alias().to_string()))
            .collect()
    }

    /// Comma-separated extra modules, if any.
    pub fn extra_modules(&self) -> Option<String> {
        self.bundle_settings
            .extra_modules
            .as_ref()
            .map(|m| m.joined())
    }

    /// Path of the project's own freezer spec file; used verbatim when present.
    pub fn spec_file(&self) -> PathBuf {
        self.project_directory
            .join(format!("{}.spec", self.package.name))
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        package: PackageSettings,
        bundle_settings: BundleSettings,
        project_directory: PathBuf,
        bdist_directory: PathBuf,
        dist_directory: PathBuf,
        packages: Vec<String>,
        entry_points: Vec<EntryPoint>,
        python: PathBuf,
        skip_install: bool,
        target: String,
    ) -> Self {
        Self {
            package,
            bundle_settings,
            project_directory,
            bdist_directory,
            dist_directory,
            packages,
            entry_points,
            python,
            skip_install,
            target,
        }
    }
}
