//! Package metadata and configuration.

/// A package author.
///
/// Maps from an entry of `[project] authors` in `pyproject.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    /// Display name.
    pub name: Option<String>,
    /// Contact address.
    pub email: Option<String>,
}

impl Author {
    /// `Name <email>` form used by Debian maintainer fields.
    pub fn maintainer(&self) -> String {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => format!("{name} <{email}>"),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => format!("<{email}>"),
            (None, None) => "UNKNOWN".to_string(),
        }
    }
}

/// Package metadata and configuration.
///
/// Contains the project information shared by the freezer and every package
/// format. This typically maps from the `pyproject.toml` `[project]` table.
///
/// # Examples
///
/// ```no_run
/// use pyinstaller_bundle::bundler::PackageSettings;
///
/// let settings = PackageSettings {
///     name: "simple".into(),
///     version: "0.1".into(),
///     description: "A simple package".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageSettings {
    /// Distribution name.
    ///
    /// Used for the bundle name (`<name>-<version>`), the interactive alias
    /// (`<name>-python`) and package names.
    pub name: String,

    /// Version string, e.g. "0.1" or "1.2.0-rc1".
    pub version: String,

    /// One-line summary.
    pub description: String,

    /// Long description (README content).
    ///
    /// Default: None (falls back to `description`)
    pub long_description: Option<String>,

    /// License name or text.
    ///
    /// Default: None
    pub license: Option<String>,

    /// Homepage URL.
    ///
    /// Default: None
    pub homepage: Option<String>,

    /// Package authors, first one is the maintainer.
    ///
    /// Default: Empty
    pub authors: Vec<Author>,
}

impl PackageSettings {
    /// `<name>-<version>`, the name of the frozen artifact.
    pub fn target_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Version with `-` replaced, as RPM and DEB versions require.
    pub fn package_version(&self) -> String {
        self.version.replace('-', "_")
    }

    /// Long description, or the summary when there is none.
    pub fn long_description(&self) -> &str {
        self.long_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.description)
    }
}
