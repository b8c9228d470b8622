//! Dependency harvesting.
//!
//! Walks the installed file tree of each harvested package and produces the
//! modules the freezer must import even though its analysis cannot see them,
//! plus the files that must be copied into the bundle next to them.

use crate::bundler::{
    entry_point::EntryPoint,
    error::Result,
    python::{LocatedModule, PythonInterpreter},
};
use std::{
    collections::{BTreeSet, HashSet},
    path::{Path, PathBuf},
};

/// Always harvested; IPython's completer needs its grammar files on disk.
const ALWAYS_HARVESTED: &[&str] = &["parso"];

/// Extensions of compiled bytecode, never copied.
const BYTECODE_EXTENSIONS: &[&str] = &["pyc", "pyo"];

/// Extensions of native extension modules, added as binaries.
const NATIVE_EXTENSIONS: &[&str] = &["so", "pyd", "dylib", "dll"];

/// A file to embed and the bundle-relative directory it lands in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mapping {
    /// File on disk.
    pub source: PathBuf,
    /// Destination directory inside the bundle.
    pub destination: PathBuf,
}

/// Everything harvested from the configured packages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Harvest {
    /// Dotted module names for `--hidden-import`.
    pub hidden_imports: BTreeSet<String>,
    /// Files for `--add-data`.
    pub datas: BTreeSet<Mapping>,
    /// Native extensions for `--add-binary`.
    pub binaries: BTreeSet<Mapping>,
}

impl Harvest {
    /// True when nothing was harvested.
    pub fn is_empty(&self) -> bool {
        self.hidden_imports.is_empty() && self.datas.is_empty() && self.binaries.is_empty()
    }

    /// Adds one located module to the harvest.
    pub fn add_located(&mut self, located: &LocatedModule) -> Result<()> {
        if located.is_package {
            let root = located.file.parent().unwrap_or_else(|| Path::new("."));
            self.add_package_tree(&located.name, root)
        } else {
            self.add_module_file(&located.name, &located.file);
            Ok(())
        }
    }

    /// Walks `root`, the directory of package `name`.
    pub fn add_package_tree(&mut self, name: &str, root: &Path) -> Result<()> {
        let package_dir: PathBuf = name.split('.').collect();
        let bundle_dir = Path::new(".").join(&package_dir);

        for entry in walkdir::WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if BYTECODE_EXTENSIONS.contains(&extension) {
                continue;
            }

            let relative = path.strip_prefix(root)?;
            let destination = match relative.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => bundle_dir.join(parent),
                _ => bundle_dir.clone(),
            };

            if extension == "py" {
                self.hidden_imports.insert(module_path(name, relative));
            }

            let mapping = Mapping {
                source: path.to_path_buf(),
                destination,
            };
            if NATIVE_EXTENSIONS.contains(&extension) {
                self.binaries.insert(mapping);
            } else {
                self.datas.insert(mapping);
            }
        }

        Ok(())
    }

    /// Adds a single-file module, which lands at the bundle root.
    pub fn add_module_file(&mut self, name: &str, file: &Path) {
        let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");
        let mapping = Mapping {
            source: file.to_path_buf(),
            destination: PathBuf::from("."),
        };
        if NATIVE_EXTENSIONS.contains(&extension) {
            self.binaries.insert(mapping);
        } else if !BYTECODE_EXTENSIONS.contains(&extension) {
            self.hidden_imports.insert(name.to_string());
            self.datas.insert(mapping);
        }
    }
}

/// Dotted module path of `relative` (a file under package `package`).
///
/// The file name is cut at its first `.`; `__init__` names the package itself.
fn module_path(package: &str, relative: &Path) -> String {
    let mut segments: Vec<String> = vec![package.to_string()];
    if let Some(parent) = relative.parent() {
        segments.extend(
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        );
    }
    let file_name = relative
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let module = file_name.split('.').next().unwrap_or_default().to_string();
    if module != "__init__" {
        segments.push(module);
    }
    segments.join(".")
}

/// Names to harvest, in order and deduplicated, reduced to top-level packages:
/// entry point modules, project packages, always-harvested packages, then the
/// comma-separated `extra_modules`.
pub fn harvest_names(
    entries: &[EntryPoint],
    packages: &[String],
    extra_modules: Option<&str>,
) -> Vec<String> {
    let extras = extra_modules
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|e| e.target().top_level_package())
        .chain(packages.iter().map(String::as_str))
        .chain(ALWAYS_HARVESTED.iter().copied())
        .chain(extras)
        .map(|name| name.split('.').next().unwrap_or(name).to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Locates every name through the interpreter and harvests it.
///
/// Names that cannot be imported are logged and skipped.
pub async fn harvest(interpreter: &PythonInterpreter, names: &[String]) -> Result<Harvest> {
    let mut located = Vec::new();
    for name in names {
        match interpreter.locate_module(name).await? {
            Some(module) => {
                log::debug!("Harvesting {} from {}", module.name, module.file.display());
                located.push(module);
            }
            None => log::error!("It was not possible to import: {}", name),
        }
    }

    let harvest = tokio::task::spawn_blocking(move || {
        let mut harvest = Harvest::default();
        for module in &located {
            harvest.add_located(module)?;
        }
        Ok::<Harvest, crate::bundler::Error>(harvest)
    })
    .await
    .map_err(|e| crate::bundler::Error::GenericError(format!("Harvest task panicked: {e}")))??;

    log::info!(
        "Harvested {} hidden imports, {} data files, {} binaries",
        harvest.hidden_imports.len(),
        harvest.datas.len(),
        harvest.binaries.len()
    );

    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn package_tree_yields_imports_and_data() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("simple");
        touch(&root, "__init__.py");
        touch(&root, "cli.py");
        touch(&root, "sub/__init__.py");
        touch(&root, "sub/tool.py");
        touch(&root, "sub/__pycache__/tool.cpython-312.pyc");
        touch(&root, "templates/page.html");
        touch(&root, "_speedups.cpython-312-x86_64-linux-gnu.so");

        let mut harvest = Harvest::default();
        harvest.add_package_tree("simple", &root).unwrap();

        let imports: Vec<&str> = harvest.hidden_imports.iter().map(String::as_str).collect();
        assert_eq!(imports, ["simple", "simple.cli", "simple.sub", "simple.sub.tool"]);

        assert!(harvest.datas.contains(&Mapping {
            source: root.join("sub/tool.py"),
            destination: PathBuf::from("./simple/sub"),
        }));
        assert!(harvest.datas.contains(&Mapping {
            source: root.join("templates/page.html"),
            destination: PathBuf::from("./simple/templates"),
        }));
        assert!(harvest.datas.contains(&Mapping {
            source: root.join("__init__.py"),
            destination: PathBuf::from("./simple"),
        }));
        assert!(harvest.datas.iter().all(|m| m.source.extension().unwrap() != "pyc"));

        let binaries: Vec<_> = harvest.binaries.iter().collect();
        assert_eq!(binaries.len(), 1);
        assert_eq!(binaries[0].destination, PathBuf::from("./simple"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loops_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("looped");
        touch(&root, "__init__.py");
        touch(&root, "core.py");
        std::os::unix::fs::symlink(&root, root.join("again")).unwrap();
        std::os::unix::fs::symlink(root.join("missing"), root.join("dangling")).unwrap();

        let mut harvest = Harvest::default();
        harvest.add_package_tree("looped", &root).unwrap();

        let imports: Vec<&str> = harvest.hidden_imports.iter().map(String::as_str).collect();
        assert_eq!(imports, ["looped", "looped.core"]);
    }

    #[test]
    fn bytecode_only_package_yields_no_hidden_imports() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("compiled");
        touch(&root, "__init__.pyc");
        touch(&root, "core.pyc");
        touch(&root, "__pycache__/core.cpython-312.pyc");

        let mut harvest = Harvest::default();
        harvest.add_package_tree("compiled", &root).unwrap();
        assert!(harvest.hidden_imports.is_empty());
        assert!(harvest.is_empty());
    }

    #[test]
    fn single_module_lands_at_bundle_root() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "six.py");

        let located = LocatedModule {
            name: "six".into(),
            file: tmp.path().join("six.py"),
            is_package: false,
        };
        let mut harvest = Harvest::default();
        harvest.add_located(&located).unwrap();

        assert_eq!(harvest.hidden_imports.iter().next().unwrap(), "six");
        let mapping = harvest.datas.iter().next().unwrap();
        assert_eq!(mapping.destination, PathBuf::from("."));
    }

    #[test]
    fn module_path_cuts_at_first_dot() {
        assert_eq!(module_path("pkg", Path::new("a/b.py")), "pkg.a.b");
        assert_eq!(module_path("pkg", Path::new("a/__init__.py")), "pkg.a");
        assert_eq!(module_path("pkg", Path::new("__init__.py")), "pkg");
        assert_eq!(module_path("pkg", Path::new("mod.tar.py")), "pkg.mod");
    }

    #[test]
    fn harvest_names_are_top_level_and_unique() {
        let entries = vec![
            "hello=simple.cli:main".parse().unwrap(),
            "other=tools.run".parse().unwrap(),
        ];
        let packages = vec!["simple".to_string(), "simple.sub".to_string()];
        let names = harvest_names(&entries, &packages, Some(" yaml , ,parso, requests.adapters"));
        assert_eq!(names, ["simple", "tools", "parso", "yaml", "requests"]);

        let names = harvest_names(&entries, &packages, None);
        assert_eq!(names, ["simple", "tools", "parso"]);
    }
}
