//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that installs the
//! project, generates and freezes the dispatcher, then wraps the frozen bundle
//! into the requested package formats.

use crate::bundler::{
    ArtifactKind, BundledArtifact, PackageType, Result, Settings,
    dispatcher::DispatchTable,
    error::{Error, ErrorExt},
    freezer::{DISPATCHER_FILE, FREEZER_MODULE, FreezeMode, FreezerCommand},
    harvest::{harvest, harvest_names},
    platform,
    python::{BUILD_REQUIREMENTS, PythonInterpreter},
    utils::fs,
};
use std::path::{Path, PathBuf};

use super::{
    checksum::{artifact_size, calculate_sha256},
    tool_detection::ensure_tools,
};

/// Main bundler orchestrator.
///
/// Runs every step sequentially, one external process at a time. Any failing
/// step aborts the build.
///
/// # Examples
///
/// ```no_run
/// use pyinstaller_bundle::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> pyinstaller_bundle::bundler::Result<()> {
/// let bundler = Bundler::new(settings)?;
/// for artifact in bundler.bundle().await? {
///     println!("{}", artifact.path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
    interpreter: PythonInterpreter,
}

impl Bundler {
    /// Creates a new bundler with the given settings.
    ///
    /// # Errors
    ///
    /// - no entry points or no packages
    /// - RPM or DEB requested together with a one-dir bundle
    /// - a packaging tool for a requested format is missing
    pub fn new(settings: Settings) -> Result<Self> {
        if settings.entry_points().is_empty() {
            return Err(Error::Config(format!(
                "no console entry points declared for {}",
                settings.product_name()
            )));
        }
        if settings.packages().is_empty() {
            return Err(Error::Config(
                "the list of packages seems to be empty (no packages detected), verify the project layout"
                    .to_string(),
            ));
        }

        let bundle = settings.bundle_settings();
        if bundle.one_dir && (bundle.rpm || bundle.deb) {
            return Err(Error::Config(
                "RPM and DEB packages need a one-file bundle, drop --one-dir".to_string(),
            ));
        }

        ensure_tools(&settings.package_types())?;

        let interpreter = PythonInterpreter::new(settings.python());
        Ok(Self {
            settings,
            interpreter,
        })
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the dispatch table from the settings.
    pub fn dispatch_table(&self) -> Result<DispatchTable> {
        DispatchTable::from_settings(&self.settings)
    }

    /// Runs the full build.
    ///
    /// # Returns
    ///
    /// One [`BundledArtifact`] per produced file or directory: the frozen
    /// bundle first, then the packages. Empty when the project's own spec
    /// file was used, since its outputs are defined by that file.
    pub async fn bundle(&self) -> Result<Vec<BundledArtifact>> {
        if self.settings.skip_install() {
            log::info!("Skipping dependency installation");
        } else {
            self.install_dependencies().await?;
        }

        let spec_file = self.settings.spec_file();
        if spec_file.is_file() {
            self.freeze_spec_file(&spec_file).await?;
            return Ok(Vec::new());
        }

        let frozen = self.freeze().await?;
        let kind = match self.settings.bundle_settings().mode() {
            FreezeMode::OneFile => ArtifactKind::Executable,
            FreezeMode::OneDir => ArtifactKind::Directory,
        };
        let mut artifacts = vec![artifact(kind, frozen).await?];

        for package_type in self.settings.package_types() {
            let paths = match package_type {
                PackageType::Archive => platform::archive::bundle_project(&self.settings).await?,
                PackageType::Rpm => platform::linux::rpm::bundle_project(&self.settings).await?,
                PackageType::Deb => platform::linux::debian::bundle_project(&self.settings).await?,
            };
            for path in paths {
                artifacts.push(artifact(package_type.into(), path).await?);
            }
        }

        Ok(artifacts)
    }

    /// Installs the build requirements, then the project itself.
    async fn install_dependencies(&self) -> Result<()> {
        let project = self.settings.project_directory();
        let index_url = self.interpreter.pip_index_url().await;
        if let Some(url) = &index_url {
            log::info!("Using package index {url}");
        }

        log::info!("Installing build requirements: {}", BUILD_REQUIREMENTS.join(", "));
        self.interpreter
            .pip_install(BUILD_REQUIREMENTS, index_url.as_deref(), project)
            .await?;

        log::info!("Installing {}", self.settings.product_name());
        self.interpreter
            .pip_install(&["."], index_url.as_deref(), project)
            .await
    }

    /// Runs the freezer on the project's own spec file, unmodified.
    async fn freeze_spec_file(&self, spec_file: &Path) -> Result<()> {
        log::info!(
            "Found {}, freezing with it as is",
            spec_file.display()
        );
        self.interpreter
            .run_module(
                FREEZER_MODULE,
                &[spec_file.as_os_str()],
                self.settings.project_directory(),
            )
            .await
    }

    /// Generates the dispatcher, harvests dependencies and freezes.
    ///
    /// Returns the path of the frozen executable or directory.
    async fn freeze(&self) -> Result<PathBuf> {
        let table = self.dispatch_table()?;
        let bdist = self.settings.bdist_directory();
        fs::create_dir_all(bdist, false).await?;

        let script = bdist.join(DISPATCHER_FILE);
        tokio::fs::write(&script, table.render()?)
            .await
            .fs_context("writing dispatcher", &script)?;
        log::info!(
            "Generated dispatcher for {} at {}",
            table.alias_names().join(", "),
            script.display()
        );

        let extra_modules = self.settings.extra_modules();
        let names = harvest_names(
            self.settings.entry_points(),
            self.settings.packages(),
            extra_modules.as_deref(),
        );
        let harvest = harvest(&self.interpreter, &names).await?;

        let target_name = self.settings.target_name();
        let bundle = self.settings.bundle_settings();
        let command = FreezerCommand {
            script: &script,
            target_name: &target_name,
            dist_dir: self.settings.dist_directory(),
            work_dir: bdist,
            mode: bundle.mode(),
            harvest: &harvest,
            extra_args: bundle.extra_args.as_deref(),
        };

        log::info!("Freezing {target_name}");
        self.interpreter
            .run_module(
                FREEZER_MODULE,
                &command.args(),
                self.settings.project_directory(),
            )
            .await?;

        let output = command.output_path();
        if !output.exists() {
            return Err(Error::GenericError(format!(
                "freezer finished but {} does not exist",
                output.display()
            )));
        }
        log::info!("✓ Frozen bundle: {}", output.display());
        Ok(output)
    }
}

async fn artifact(kind: ArtifactKind, path: PathBuf) -> Result<BundledArtifact> {
    let size = artifact_size(&path).await?;
    let checksum = calculate_sha256(&path).await?;
    Ok(BundledArtifact {
        kind,
        path,
        size,
        checksum,
    })
}
