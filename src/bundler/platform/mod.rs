//! Package formats wrapped around the frozen bundle.
//!
//! - [`archive`] - gzip tarball of a one-dir bundle
//! - [`linux`] - RPM and DEB packages built with the system tools

pub mod archive;
pub mod linux;

use std::fmt;

/// A package format that can be derived from the frozen bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackageType {
    /// `<name>-<version>.tar.gz` of the one-dir bundle.
    Archive,
    /// RPM built with `rpmbuild`.
    Rpm,
    /// DEB built with `dpkg-deb`.
    Deb,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Archive => "archive",
            Self::Rpm => "rpm",
            Self::Deb => "deb",
        })
    }
}
