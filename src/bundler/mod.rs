//! Freezing and packaging of Python console entry points.
//!
//! The [`Bundler`] turns a project's declared entry points into one frozen
//! executable through a generated dispatcher program, then optionally wraps
//! it into an archive, an RPM and a DEB.
//!
//! # Module Organization
//!
//! - [`entry_point`] - `alias = module[:function]` declarations
//! - [`dispatcher`] - generated program that routes on its invocation name
//! - [`harvest`] - data files, native extensions and hidden imports
//! - [`freezer`] - PyInstaller command line
//! - [`python`] - interpreter child processes
//! - [`platform`] - archive and Linux package formats
//! - [`builder`] - the [`Bundler`] orchestrator

pub mod builder;
pub mod dispatcher;
pub mod entry_point;
pub mod error;
pub mod freezer;
pub mod harvest;
pub mod platform;
pub mod python;
pub mod settings;
pub mod utils;

use std::{fmt, path::PathBuf};

pub use builder::Bundler;
pub use dispatcher::{DispatchTable, DispatcherOptions};
pub use entry_point::{EntryPoint, EntryTarget};
pub use error::{Error, Result};
pub use platform::PackageType;
pub use settings::{
    Arch, Author, BundleSettings, DebianSettings, ExtraModules, PackageSettings, RpmSettings,
    Settings, SettingsBuilder,
};

/// What a produced artifact is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// One-file frozen executable.
    Executable,
    /// One-dir frozen bundle.
    Directory,
    /// `.tar.gz` of a one-dir bundle.
    Archive,
    /// `.rpm` package.
    Rpm,
    /// `.deb` package.
    Deb,
}

impl From<PackageType> for ArtifactKind {
    fn from(package_type: PackageType) -> Self {
        match package_type {
            PackageType::Archive => Self::Archive,
            PackageType::Rpm => Self::Rpm,
            PackageType::Deb => Self::Deb,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Executable => "executable",
            Self::Directory => "directory",
            Self::Archive => "archive",
            Self::Rpm => "rpm",
            Self::Deb => "deb",
        })
    }
}

/// A file or directory produced by a build.
#[derive(Clone, Debug)]
pub struct BundledArtifact {
    /// Kind of artifact.
    pub kind: ArtifactKind,
    /// Location in the output directory.
    pub path: PathBuf,
    /// Size in bytes (sum of all files for directories).
    pub size: u64,
    /// Hex-encoded SHA-256.
    pub checksum: String,
}
