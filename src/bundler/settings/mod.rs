//! Configuration structures for bundling operations.
//!
//! This module provides the configuration types for a bundle run: project
//! metadata, freezer and package options, and the builder that resolves them
//! into [`Settings`].

mod arch;
mod builder;
mod bundle;
mod core;
mod linux;
mod package;

// Re-export all public types
pub use arch::Arch;
pub use builder::{DEFAULT_BDIST_DIR, DEFAULT_DIST_DIR, DEFAULT_PYTHON, SettingsBuilder};
pub use bundle::{BundleSettings, ExtraModules};
pub use self::core::Settings;
pub use linux::{DebianSettings, RpmSettings};
pub use package::{Author, PackageSettings};
