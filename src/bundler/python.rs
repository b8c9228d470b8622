//! Python interpreter invocations.
//!
//! Every interaction with the target environment (pip, module lookup, the
//! freezer itself) goes through a child process of the configured
//! interpreter, one at a time.

use crate::bundler::error::{Error, Result};
use serde::Deserialize;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Stdio,
};

/// Packages the freezer and the generated dispatcher need in the environment.
pub const BUILD_REQUIREMENTS: &[&str] = &["pyinstaller", "ipython", "tomli"];

/// Prints where an importable name lives, as JSON.
const LOCATE_SNIPPET: &str = r#"
import importlib, json, sys
m = importlib.import_module(sys.argv[1])
print(json.dumps({"name": m.__name__, "file": getattr(m, "__file__", None), "is_package": hasattr(m, "__path__")}))
"#;

/// Location of an importable module as reported by the interpreter.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LocatedModule {
    /// Import name.
    pub name: String,
    /// `__file__` of the module (`__init__.py` for packages).
    pub file: PathBuf,
    /// Whether the module is a package with a directory of its own.
    pub is_package: bool,
}

#[derive(Deserialize)]
struct LocateReport {
    name: String,
    file: Option<PathBuf>,
    is_package: bool,
}

/// A Python interpreter used to prepare and run the build.
#[derive(Clone, Debug)]
pub struct PythonInterpreter {
    program: PathBuf,
}

impl PythonInterpreter {
    /// Wraps the interpreter at `program` (a path or a name on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Interpreter program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Reads pip's configured global index URL, if any.
    ///
    /// A failing `pip config` call means no index is configured.
    pub async fn pip_index_url(&self) -> Option<String> {
        let output = tokio::process::Command::new(&self.program)
            .args(["-m", "pip", "config", "get", "global.index-url"])
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!url.is_empty()).then_some(url)
    }

    /// Runs `pip install <requirements>` in `working_dir`.
    pub async fn pip_install<S: AsRef<str>>(
        &self,
        requirements: &[S],
        index_url: Option<&str>,
        working_dir: &Path,
    ) -> Result<()> {
        let mut args: Vec<String> = vec!["-m".into(), "pip".into(), "install".into()];
        args.extend(requirements.iter().map(|r| r.as_ref().to_string()));
        if let Some(url) = index_url {
            args.push("--index-url".into());
            args.push(url.to_string());
        }
        self.run(&args, working_dir).await
    }

    /// Runs `python -m <module> <args>` in `working_dir`.
    pub async fn run_module<S: AsRef<OsStr>>(
        &self,
        module: &str,
        args: &[S],
        working_dir: &Path,
    ) -> Result<()> {
        let mut full: Vec<&OsStr> = vec![OsStr::new("-m"), OsStr::new(module)];
        full.extend(args.iter().map(|a| a.as_ref()));
        self.run(&full, working_dir).await
    }

    /// Asks the interpreter where `name` is installed.
    ///
    /// Returns `None` when the name cannot be imported or has no file on disk
    /// (namespace packages).
    pub async fn locate_module(&self, name: &str) -> Result<Option<LocatedModule>> {
        let output = tokio::process::Command::new(&self.program)
            .args([OsStr::new("-c"), OsStr::new(LOCATE_SNIPPET), OsStr::new(name)])
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: self.program.display().to_string(),
                error,
            })?;

        if !output.status.success() {
            log::debug!(
                "import {} failed: {}",
                name,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let report: LocateReport = serde_json::from_slice(&output.stdout)?;
        Ok(report.file.map(|file| LocatedModule {
            name: report.name,
            file,
            is_package: report.is_package,
        }))
    }

    async fn run<S: AsRef<OsStr>>(&self, args: &[S], working_dir: &Path) -> Result<()> {
        let command_line = self.command_line(args);
        log::info!("Running {}", command_line);

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .status()
            .await
            .map_err(|error| Error::CommandFailed {
                command: self.program.display().to_string(),
                error,
            })?;

        if !status.success() {
            return Err(Error::ExternalToolFailed {
                command: command_line,
                code: status.code(),
            });
        }
        Ok(())
    }

    fn command_line<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(args.iter().map(|a| a.as_ref()))
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> Option<PathBuf> {
        which::which("python3").or_else(|_| which::which("python")).ok()
    }

    #[tokio::test]
    async fn locates_stdlib_package_and_module() {
        let Some(python) = python() else { return };
        let interpreter = PythonInterpreter::new(python);

        let json = interpreter.locate_module("json").await.unwrap().unwrap();
        assert_eq!(json.name, "json");
        assert!(json.is_package);
        assert!(json.file.ends_with("__init__.py"));

        let string = interpreter.locate_module("string").await.unwrap().unwrap();
        assert!(!string.is_package);
    }

    #[tokio::test]
    async fn missing_module_is_not_an_error() {
        let Some(python) = python() else { return };
        let interpreter = PythonInterpreter::new(python);
        let located = interpreter
            .locate_module("definitely_not_installed_anywhere_42")
            .await
            .unwrap();
        assert!(located.is_none());
    }

    #[tokio::test]
    async fn failing_command_reports_exit_code() {
        let Some(python) = python() else { return };
        let interpreter = PythonInterpreter::new(python);
        let tmp = tempfile::tempdir().unwrap();
        let err = interpreter
            .run(&["-c", "import sys; sys.exit(3)"], tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalToolFailed { code: Some(3), .. }));
    }
}
