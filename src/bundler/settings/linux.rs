//! Linux package settings.

/// Debian package (.deb) configuration.
///
/// # Configuration
///
/// Add to `pyproject.toml`:
///
/// ```toml
/// [tool.pyinstaller-bundle.deb-options]
/// release = "2"
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DebianSettings {
    /// Release number appended to the package file name.
    ///
    /// Default: "1"
    pub release: String,

    /// Maintainer override.
    ///
    /// Default: None (first author)
    pub maintainer: Option<String>,
}

impl Default for DebianSettings {
    fn default() -> Self {
        Self {
            release: "1".to_string(),
            maintainer: None,
        }
    }
}

/// RPM package (.rpm) configuration.
///
/// # Configuration
///
/// Add to `pyproject.toml`:
///
/// ```toml
/// [tool.pyinstaller-bundle.rpm-options]
/// release = "3"
/// group = "Applications/System"
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RpmSettings {
    /// Release number appended to version.
    ///
    /// Default: "1"
    pub release: String,

    /// RPM group.
    ///
    /// Default: "Development/Libraries"
    pub group: String,
}

impl Default for RpmSettings {
    fn default() -> Self {
        Self {
            release: "1".to_string(),
            group: "Development/Libraries".to_string(),
        }
    }
}
