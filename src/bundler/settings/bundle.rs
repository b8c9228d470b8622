//! Bundle configuration.

use super::{DebianSettings, RpmSettings};
use crate::bundler::{dispatcher::DispatcherOptions, freezer::FreezeMode};
use std::path::PathBuf;

/// Extra modules, as a comma-separated string or a list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum ExtraModules {
    /// `"yaml, requests"`
    Joined(String),
    /// `["yaml", "requests"]`
    List(Vec<String>),
}

impl ExtraModules {
    /// Comma-separated form.
    pub fn joined(&self) -> String {
        match self {
            Self::Joined(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

/// Bundle configuration.
///
/// # Configuration
///
/// Add to `pyproject.toml`:
///
/// ```toml
/// [tool.pyinstaller-bundle]
/// dist-dir = "pyinstaller_dist"
/// extra-args = "--log-level WARN"
/// extra-modules = ["yaml"]
/// one-dir = false
/// rpm = true
/// deb = true
/// ```
///
/// Command-line flags take precedence over these values.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BundleSettings {
    /// Scratch directory for the dispatcher, freezer work files and package
    /// trees.
    ///
    /// Default: None (`build/bdist_pyinstaller`)
    pub bdist_dir: Option<PathBuf>,

    /// Directory the final artifacts are placed in.
    ///
    /// Default: None (`pyinstaller_dist`)
    pub dist_dir: Option<PathBuf>,

    /// Extra arguments passed to the freezer, split on whitespace.
    ///
    /// Default: None
    pub extra_args: Option<String>,

    /// Modules harvested in addition to the project packages.
    ///
    /// Default: None
    pub extra_modules: Option<ExtraModules>,

    /// Freeze into a directory instead of a single file.
    ///
    /// Default: false
    pub one_dir: bool,

    /// Build an RPM.
    ///
    /// Default: false
    pub rpm: bool,

    /// Build a DEB.
    ///
    /// Default: false
    pub deb: bool,

    /// RPM-specific settings.
    pub rpm_options: RpmSettings,

    /// Debian-specific settings.
    pub deb_options: DebianSettings,

    /// Environment variable names read by the generated dispatcher.
    pub dispatcher: DispatcherOptions,
}

impl BundleSettings {
    /// Freezer layout.
    pub fn mode(&self) -> FreezeMode {
        if self.one_dir {
            FreezeMode::OneDir
        } else {
            FreezeMode::OneFile
        }
    }
}
