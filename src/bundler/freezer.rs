//! PyInstaller command line assembly.

use crate::bundler::harvest::{Harvest, Mapping};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Module run with `python -m` to freeze the dispatcher.
pub const FREEZER_MODULE: &str = "PyInstaller";

/// Name the generated dispatcher is written under.
pub const DISPATCHER_FILE: &str = ".pyinstaller_dispatcher.py";

/// Separator PyInstaller expects between source and destination.
#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

/// Layout of the frozen bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreezeMode {
    /// One self-extracting executable.
    #[default]
    OneFile,
    /// A directory holding the executable and its libraries.
    OneDir,
}

impl FreezeMode {
    fn flag(self) -> &'static str {
        match self {
            Self::OneFile => "--onefile",
            Self::OneDir => "--onedir",
        }
    }
}

/// Arguments for one freezer run.
#[derive(Clone, Debug)]
pub struct FreezerCommand<'a> {
    /// Dispatcher script to freeze.
    pub script: &'a Path,
    /// Bundle name, `<name>-<version>`.
    pub target_name: &'a str,
    /// Output directory (`--distpath`).
    pub dist_dir: &'a Path,
    /// Scratch directory for PyInstaller's work and spec files.
    pub work_dir: &'a Path,
    /// Bundle layout.
    pub mode: FreezeMode,
    /// Harvested extras.
    pub harvest: &'a Harvest,
    /// User supplied arguments, split on whitespace.
    pub extra_args: Option<&'a str>,
}

impl FreezerCommand<'_> {
    /// Full argument list, excluding the interpreter and `-m PyInstaller`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["--clean", "--noconfirm", "--strip", self.mode.flag()]
            .into_iter()
            .map(OsString::from)
            .collect();

        args.push("--distpath".into());
        args.push(self.dist_dir.into());
        args.push("--workpath".into());
        args.push(self.work_dir.join("work").into());
        args.push("--specpath".into());
        args.push(self.work_dir.into());
        args.push("--name".into());
        args.push(self.target_name.into());
        args.push(self.script.into());

        for mapping in &self.harvest.binaries {
            args.push("--add-binary".into());
            args.push(mapping_arg(mapping));
        }
        for mapping in &self.harvest.datas {
            args.push("--add-data".into());
            args.push(mapping_arg(mapping));
        }
        for module in &self.harvest.hidden_imports {
            args.push("--hidden-import".into());
            args.push(module.into());
        }

        // Naive split: quoted arguments containing spaces are not supported.
        if let Some(extra) = self.extra_args {
            args.extend(extra.split_whitespace().map(OsString::from));
        }

        args
    }

    /// Path of the frozen artifact inside the output directory.
    pub fn output_path(&self) -> PathBuf {
        self.dist_dir.join(self.target_name)
    }
}

fn mapping_arg(mapping: &Mapping) -> OsString {
    let mut arg = OsString::from(mapping.source.as_os_str());
    arg.push(PATH_SEPARATOR);
    arg.push(mapping.destination.as_os_str());
    arg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn assembles_flags_in_order() {
        let mut harvest = Harvest::default();
        harvest.hidden_imports.insert("simple.cli".into());
        harvest.datas.insert(Mapping {
            source: PathBuf::from("/site/simple/cli.py"),
            destination: PathBuf::from("./simple"),
        });
        harvest.binaries.insert(Mapping {
            source: PathBuf::from("/site/simple/_fast.so"),
            destination: PathBuf::from("./simple"),
        });

        let command = FreezerCommand {
            script: Path::new("/build/.pyinstaller_dispatcher.py"),
            target_name: "simple-0.1",
            dist_dir: Path::new("/dist"),
            work_dir: Path::new("/build"),
            mode: FreezeMode::OneFile,
            harvest: &harvest,
            extra_args: Some("  --log-level  WARN "),
        };

        let sep = PATH_SEPARATOR;
        assert_eq!(
            strings(command.args()),
            vec![
                "--clean".to_string(),
                "--noconfirm".into(),
                "--strip".into(),
                "--onefile".into(),
                "--distpath".into(),
                "/dist".into(),
                "--workpath".into(),
                "/build/work".into(),
                "--specpath".into(),
                "/build".into(),
                "--name".into(),
                "simple-0.1".into(),
                "/build/.pyinstaller_dispatcher.py".into(),
                "--add-binary".into(),
                format!("/site/simple/_fast.so{sep}./simple"),
                "--add-data".into(),
                format!("/site/simple/cli.py{sep}./simple"),
                "--hidden-import".into(),
                "simple.cli".into(),
                "--log-level".into(),
                "WARN".into(),
            ]
        );
        assert_eq!(command.output_path(), PathBuf::from("/dist/simple-0.1"));
    }

    #[test]
    fn one_dir_mode_without_extras() {
        let harvest = Harvest::default();
        let command = FreezerCommand {
            script: Path::new("d.py"),
            target_name: "tool-2.0",
            dist_dir: Path::new("out"),
            work_dir: Path::new("work"),
            mode: FreezeMode::OneDir,
            harvest: &harvest,
            extra_args: None,
        };
        let args = strings(command.args());
        assert_eq!(args[3], "--onedir");
        assert_eq!(args.len(), 13);
        assert_eq!(args.last().unwrap(), "d.py");
    }
}
