//! Freezes a Python project's console entry points into one executable.
//!
//! This library provides:
//! - generation of a dispatcher program that routes on its invocation name
//! - dependency harvesting and PyInstaller invocation
//! - tar.gz, RPM and DEB packaging of the frozen bundle
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
