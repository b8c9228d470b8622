//! Project metadata and package discovery from `pyproject.toml`.

use crate::bundler::{Author, BundleSettings, EntryPoint, PackageSettings};
use crate::error::{BundlerError, CliError, Result};
use std::path::Path;

/// Directory names never treated as project packages.
const EXCLUDED_DIRS: &[&str] = &["tests", "test", "docs", "build", "dist"];

/// Table holding this tool's settings.
const TOOL_TABLE: &str = "pyinstaller-bundle";

/// Everything the bundler needs from `pyproject.toml`.
#[derive(Debug)]
pub struct ProjectManifest {
    /// `[project]` metadata.
    pub package: PackageSettings,

    /// Importable packages, from `[tool.setuptools] packages` or discovered.
    pub packages: Vec<String>,

    /// `[project.scripts]` declarations, in file order.
    pub entry_points: Vec<EntryPoint>,

    /// `[tool.pyinstaller-bundle]` table.
    pub bundle_settings: BundleSettings,
}

/// Load the project manifest from `<project_dir>/pyproject.toml`.
///
/// The file is read and parsed once; every section is extracted from the
/// parsed value.
pub fn load_project(project_dir: &Path) -> Result<ProjectManifest> {
    let path = project_dir.join("pyproject.toml");
    let content = std::fs::read_to_string(&path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_pyproject".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;

    let toml_value: toml::Value = toml::from_str(&content)?;

    let project = toml_value.get("project").ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "No [project] section in pyproject.toml".to_string(),
        })
    })?;

    let package = parse_package(project, project_dir)?;
    let entry_points = parse_entry_points(project)?;
    let packages = match configured_packages(&toml_value) {
        Some(packages) => packages,
        None => {
            let discovered = discover_packages(project_dir)?;
            log::debug!("Discovered packages: {}", discovered.join(", "));
            discovered
        }
    };
    let bundle_settings = parse_bundle_settings(&toml_value)?;

    Ok(ProjectManifest {
        package,
        packages,
        entry_points,
        bundle_settings,
    })
}

fn parse_package(project: &toml::Value, project_dir: &Path) -> Result<PackageSettings> {
    let str_field = |key: &str| project.get(key).and_then(|v| v.as_str()).map(String::from);

    let name = str_field("name").ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "Missing 'name' in [project]".to_string(),
        })
    })?;

    let version = str_field("version").ok_or_else(|| {
        let dynamic = project
            .get("dynamic")
            .and_then(|v| v.as_array())
            .is_some_and(|d| d.iter().any(|v| v.as_str() == Some("version")));
        BundlerError::Cli(CliError::InvalidArguments {
            reason: if dynamic {
                "Dynamic versions are not supported, set a static 'version' in [project]"
                    .to_string()
            } else {
                "Missing 'version' in [project]".to_string()
            },
        })
    })?;

    Ok(PackageSettings {
        name,
        version,
        description: str_field("description").unwrap_or_default(),
        long_description: read_text_field(project.get("readme"), project_dir)?,
        license: parse_license(project.get("license"), project_dir),
        homepage: project
            .get("urls")
            .and_then(|u| u.get("Homepage").or_else(|| u.get("homepage")))
            .and_then(|v| v.as_str())
            .map(String::from),
        authors: project
            .get("authors")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .map(|a| Author {
                        name: a.get("name").and_then(|v| v.as_str()).map(String::from),
                        email: a.get("email").and_then(|v| v.as_str()).map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Resolves fields that are either inline text or a file reference.
///
/// `readme = "README.md"` is a path, `license = "MIT"` is text; tables carry
/// `text` or `file`.
fn read_text_field(value: Option<&toml::Value>, project_dir: &Path) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let read = |file: &str| {
        let path = project_dir.join(file);
        std::fs::read_to_string(&path).map_err(|e| {
            BundlerError::Cli(CliError::ExecutionFailed {
                command: "read_project_file".to_string(),
                reason: format!("Failed to read {}: {}", path.display(), e),
            })
        })
    };

    match value {
        toml::Value::String(s) if project_dir.join(s).is_file() => read(s).map(Some),
        toml::Value::String(s) => Ok(Some(s.clone())),
        toml::Value::Table(table) => {
            if let Some(text) = table.get("text").and_then(|v| v.as_str()) {
                Ok(Some(text.to_string()))
            } else if let Some(file) = table.get("file").and_then(|v| v.as_str()) {
                read(file).map(Some)
            } else {
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}

/// License as a one-line identifier.
///
/// Inline text is cut to its first line. A reference to a license file yields
/// nothing, since its contents do not fit package header fields.
fn parse_license(value: Option<&toml::Value>, project_dir: &Path) -> Option<String> {
    let text = match value? {
        toml::Value::String(s) if project_dir.join(s).is_file() => return None,
        toml::Value::String(s) => s.as_str(),
        toml::Value::Table(table) => table.get("text").and_then(|v| v.as_str())?,
        _ => return None,
    };
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}

fn parse_entry_points(project: &toml::Value) -> Result<Vec<EntryPoint>> {
    let Some(scripts) = project.get("scripts").and_then(|v| v.as_table()) else {
        return Ok(Vec::new());
    };

    scripts
        .iter()
        .map(|(alias, target)| {
            let target = target.as_str().ok_or_else(|| {
                BundlerError::Cli(CliError::InvalidArguments {
                    reason: format!("[project.scripts] {alias} must be a string"),
                })
            })?;
            Ok(EntryPoint::new(alias, target)?)
        })
        .collect()
}

fn configured_packages(toml_value: &toml::Value) -> Option<Vec<String>> {
    toml_value
        .get("tool")
        .and_then(|t| t.get("setuptools"))
        .and_then(|s| s.get("packages"))
        .and_then(|p| p.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
}

fn parse_bundle_settings(toml_value: &toml::Value) -> Result<BundleSettings> {
    match toml_value.get("tool").and_then(|t| t.get(TOOL_TABLE)) {
        Some(table) => Ok(table.clone().try_into()?),
        None => Ok(BundleSettings::default()),
    }
}

/// Finds packages (directories with `__init__.py`) under `src/` when it
/// exists, else under the project root. Parents come before subpackages.
fn discover_packages(project_dir: &Path) -> Result<Vec<String>> {
    let src = project_dir.join("src");
    let root = if src.is_dir() { src } else { project_dir.to_path_buf() };

    let mut packages = Vec::new();
    collect_packages(&root, None, &mut packages)?;
    Ok(packages)
}

fn collect_packages(dir: &Path, prefix: Option<&str>, packages: &mut Vec<String>) -> Result<()> {
    let mut children: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .collect();
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let file_name = child.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with('.') || EXCLUDED_DIRS.contains(&name) {
            continue;
        }
        if !child.path().join("__init__.py").is_file() {
            continue;
        }

        let qualified = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        };
        packages.push(qualified.clone());
        collect_packages(&child.path(), Some(&qualified), packages)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::ExtraModules;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_project_table() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "pyproject.toml",
            r#"
[project]
name = "simple"
version = "0.1"
description = "A simple package"
readme = "README.md"
license = { text = "Apache-2.0" }
authors = [{ name = "Jane Doe", email = "jane@example.org" }]

[project.urls]
Homepage = "https://example.org"

[project.scripts]
hello = "simple.cli:main"
runner = "simple.run"

[tool.setuptools]
packages = ["simple"]

[tool.pyinstaller-bundle]
extra-modules = ["yaml", "requests"]
rpm = true

[tool.pyinstaller-bundle.rpm-options]
release = "3"
"#,
        );
        write(tmp.path(), "README.md", "Long text\n");

        let manifest = load_project(tmp.path()).unwrap();
        assert_eq!(manifest.package.name, "simple");
        assert_eq!(manifest.package.version, "0.1");
        assert_eq!(manifest.package.long_description.as_deref(), Some("Long text\n"));
        assert_eq!(manifest.package.license.as_deref(), Some("Apache-2.0"));
        assert_eq!(manifest.package.homepage.as_deref(), Some("https://example.org"));
        assert_eq!(manifest.package.authors[0].maintainer(), "Jane Doe <jane@example.org>");
        assert_eq!(manifest.packages, vec!["simple"]);

        let aliases: Vec<_> = manifest.entry_points.iter().map(|e| e.alias()).collect();
        assert_eq!(aliases, vec!["hello", "runner"]);

        let bundle = &manifest.bundle_settings;
        assert!(bundle.rpm);
        assert!(!bundle.one_dir);
        assert_eq!(bundle.rpm_options.release, "3");
        assert_eq!(
            bundle.extra_modules,
            Some(ExtraModules::List(vec!["yaml".into(), "requests".into()]))
        );
    }

    #[test]
    fn license_files_are_not_inlined() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "LICENSE",
            "Apache License\nVersion 2.0, January 2004\n%define evil 1\n",
        );
        for license in [r#"{ file = "LICENSE" }"#, r#""LICENSE""#] {
            write(
                tmp.path(),
                "pyproject.toml",
                &format!("[project]\nname = \"demo\"\nversion = \"1\"\nlicense = {license}\n"),
            );
            let manifest = load_project(tmp.path()).unwrap();
            assert_eq!(manifest.package.license, None, "{license}");
        }

        write(
            tmp.path(),
            "pyproject.toml",
            "[project]\nname = \"demo\"\nversion = \"1\"\nlicense = { text = \"\"\"\nMIT\nsecond line\"\"\" }\n",
        );
        let manifest = load_project(tmp.path()).unwrap();
        assert_eq!(manifest.package.license.as_deref(), Some("MIT"));
    }

    #[test]
    fn discovers_packages_in_src_layout() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "pyproject.toml",
            "[project]\nname = \"demo\"\nversion = \"1.0\"\n",
        );
        write(tmp.path(), "src/demo/__init__.py", "");
        write(tmp.path(), "src/demo/sub/__init__.py", "");
        write(tmp.path(), "src/demo/data/file.txt", "");
        write(tmp.path(), "src/tests/__init__.py", "");
        write(tmp.path(), "src/.hidden/__init__.py", "");

        let manifest = load_project(tmp.path()).unwrap();
        assert_eq!(manifest.packages, vec!["demo", "demo.sub"]);
        assert!(manifest.entry_points.is_empty());
    }

    #[test]
    fn dynamic_version_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "pyproject.toml",
            "[project]\nname = \"demo\"\ndynamic = [\"version\"]\n",
        );
        let err = load_project(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("static"));
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_project(tmp.path()).is_err());
    }

    #[test]
    fn invalid_script_declaration_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "pyproject.toml",
            "[project]\nname = \"demo\"\nversion = \"1\"\n[project.scripts]\nbad = \"not a module\"\n",
        );
        assert!(load_project(tmp.path()).is_err());
    }
}
