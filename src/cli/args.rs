//! Command line argument parsing and validation.
//!
//! Command line values take precedence over the `[tool.pyinstaller-bundle]`
//! table of `pyproject.toml`.

use crate::bundler::{BundleSettings, ExtraModules, settings::DEFAULT_PYTHON};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Freezes a Python project's console entry points into one executable
#[derive(Parser, Debug)]
#[command(
    name = "pyinstaller_bundle",
    version,
    about = "Freezes a Python project's console entry points into one executable",
    long_about = "Generates a dispatcher program that routes on its invocation name to every \
[project.scripts] entry point, freezes it with PyInstaller and optionally wraps the result into \
a tar.gz, an RPM and a DEB.

Usage:
  pyinstaller_bundle build
  pyinstaller_bundle build --project path/to/project --rpm --deb
  pyinstaller_bundle build --one-dir --extra-modules yaml,requests
  pyinstaller_bundle dispatcher --output dispatcher.py

Exit code 0 = every printed artifact path exists."
)]
pub struct Args {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install, freeze and package the project
    Build(BuildArgs),

    /// Render the dispatcher program without building
    Dispatcher(DispatcherArgs),
}

/// Arguments of `build`.
#[derive(clap::Args, Debug, Default)]
pub struct BuildArgs {
    /// Project directory holding pyproject.toml
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Scratch directory for the dispatcher, work files and package trees
    /// [default: build/bdist_pyinstaller]
    #[arg(short = 'b', long, value_name = "DIR")]
    pub bdist_dir: Option<PathBuf>,

    /// Directory to put the final artifacts in [default: pyinstaller_dist]
    #[arg(short = 'd', long, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Extra arguments passed to PyInstaller, split on whitespace
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub extra_args: Option<String>,

    /// Comma-separated modules to harvest in addition to the project packages
    #[arg(long, value_name = "MODULES")]
    pub extra_modules: Option<String>,

    /// Freeze into a directory and archive it, instead of a single file
    #[arg(long)]
    pub one_dir: bool,

    /// Build an RPM
    #[arg(long)]
    pub rpm: bool,

    /// Build a DEB
    #[arg(long)]
    pub deb: bool,

    /// Python interpreter used for pip and PyInstaller
    #[arg(long, value_name = "PATH", env = "PYTHON", default_value = DEFAULT_PYTHON)]
    pub python: PathBuf,

    /// Do not pip install the build requirements and the project
    #[arg(long)]
    pub skip_install: bool,
}

/// Arguments of `dispatcher`.
#[derive(clap::Args, Debug)]
pub struct DispatcherArgs {
    /// Project directory holding pyproject.toml
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Write the program here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl BuildArgs {
    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.python.as_os_str().is_empty() {
            return Err("Python interpreter cannot be empty".to_string());
        }
        let blank = |modules: &String| modules.split(',').all(|m| m.trim().is_empty());
        if self.extra_modules.as_ref().is_some_and(blank) {
            return Err("--extra-modules lists no module".to_string());
        }
        Ok(())
    }

    /// Overlays command line values on the project's configuration.
    pub fn merge_into(&self, mut settings: BundleSettings) -> BundleSettings {
        if self.bdist_dir.is_some() {
            settings.bdist_dir = self.bdist_dir.clone();
        }
        if self.dist_dir.is_some() {
            settings.dist_dir = self.dist_dir.clone();
        }
        if self.extra_args.is_some() {
            settings.extra_args = self.extra_args.clone();
        }
        if let Some(modules) = &self.extra_modules {
            settings.extra_modules = Some(ExtraModules::Joined(modules.clone()));
        }
        settings.one_dir |= self.one_dir;
        settings.rpm |= self.rpm;
        settings.deb |= self.deb;
        settings
    }

    /// Flags that cannot be combined, if any.
    pub fn conflicts(settings: &BundleSettings) -> Option<Vec<String>> {
        if !settings.one_dir || !(settings.rpm || settings.deb) {
            return None;
        }
        let mut arguments = vec!["--one-dir".to_string()];
        if settings.rpm {
            arguments.push("--rpm".to_string());
        }
        if settings.deb {
            arguments.push("--deb".to_string());
        }
        Some(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_flags() {
        let args = Args::try_parse_from([
            "pyinstaller_bundle",
            "build",
            "-p",
            "proj",
            "--rpm",
            "--extra-args",
            "--log-level WARN",
            "--python",
            "/usr/bin/python3.12",
        ])
        .unwrap();

        let Command::Build(build) = args.command else {
            panic!("expected build");
        };
        assert_eq!(build.project, PathBuf::from("proj"));
        assert!(build.rpm && !build.deb && !build.one_dir);
        assert_eq!(build.extra_args.as_deref(), Some("--log-level WARN"));
        assert_eq!(build.python, PathBuf::from("/usr/bin/python3.12"));
        assert!(build.validate().is_ok());
    }

    #[test]
    fn command_line_overrides_project_table() {
        let project = BundleSettings {
            dist_dir: Some("from-toml".into()),
            extra_modules: Some(ExtraModules::List(vec!["yaml".into()])),
            deb: true,
            ..Default::default()
        };
        let cli = BuildArgs {
            extra_modules: Some("requests".into()),
            one_dir: true,
            ..Default::default()
        };

        let merged = cli.merge_into(project);
        assert_eq!(merged.dist_dir, Some(PathBuf::from("from-toml")));
        assert_eq!(merged.extra_modules, Some(ExtraModules::Joined("requests".into())));
        assert!(merged.deb && merged.one_dir);
        assert_eq!(
            BuildArgs::conflicts(&merged),
            Some(vec!["--one-dir".to_string(), "--deb".to_string()])
        );
    }

    #[test]
    fn blank_extra_modules_are_rejected() {
        let args = BuildArgs {
            extra_modules: Some(" , ".into()),
            python: DEFAULT_PYTHON.into(),
            ..Default::default()
        };
        assert!(args.validate().is_err());
    }
}
