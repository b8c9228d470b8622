//! Debian package creation with `dpkg-deb`.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::Settings,
    utils::fs,
};
use std::path::PathBuf;

/// Bundle the frozen executable as a Debian package.
///
/// # Process
///
/// 1. Create the package root under the scratch directory
/// 2. Hard-link every alias into `usr/bin`
/// 3. Write `DEBIAN/control`
/// 4. Run `dpkg-deb --build`
/// 5. Move the package into the output directory
///
/// # Returns
///
/// Vector containing the path to the generated .deb file.
pub async fn bundle_project(settings: &Settings) -> Result<Vec<PathBuf>> {
    log::info!("Building Debian package for {}", settings.product_name());

    let arch = debian_arch(settings).await?;
    log::debug!("Using architecture: {arch}");

    let deb_base = settings.bdist_directory().join("deb");
    let root = deb_base.join("root");
    fs::create_dir_all(&root, true).await?;

    let bin_dir = root.join("usr/bin");
    let debian_dir = root.join("DEBIAN");
    for dir in [&bin_dir, &debian_dir] {
        fs::create_dir_all(dir, false).await?;
    }

    let binary = settings.frozen_path();
    for alias in settings.aliases() {
        fs::hard_link_or_copy(&binary, &bin_dir.join(&alias)).await?;
    }

    let control_path = debian_dir.join("control");
    tokio::fs::write(&control_path, generate_control(settings, &arch))
        .await
        .fs_context("writing control file", &control_path)?;

    for dir in [&root, &root.join("usr"), &bin_dir, &debian_dir] {
        fs::set_mode(dir, 0o755).await?;
    }

    let package_name = package_file_name(settings, &arch);
    let package_path = deb_base.join(&package_name);
    fs::remove_file(&package_path).await?;

    let status = tokio::process::Command::new("dpkg-deb")
        .args(["--build", "--root-owner-group"])
        .arg(&root)
        .arg(&package_path)
        .status()
        .await
        .map_err(|error| Error::CommandFailed {
            command: "dpkg-deb".to_string(),
            error,
        })?;
    if !status.success() {
        return Err(Error::ExternalToolFailed {
            command: format!(
                "dpkg-deb --build --root-owner-group {} {}",
                root.display(),
                package_path.display()
            ),
            code: status.code(),
        });
    }

    let moved = fs::move_into(&package_path, settings.dist_directory()).await?;
    log::info!("✓ Created Debian package: {}", moved.display());
    Ok(vec![moved])
}

/// `<name>_<version>_<release>_<arch>.deb`
fn package_file_name(settings: &Settings, arch: &str) -> String {
    format!(
        "{}_{}_{}_{}.deb",
        settings.product_name(),
        settings.package().package_version(),
        settings.bundle_settings().deb_options.release,
        arch
    )
}

/// Renders `DEBIAN/control`.
pub fn generate_control(settings: &Settings, arch: &str) -> String {
    let package = settings.package();
    let maintainer = settings
        .bundle_settings()
        .deb_options
        .maintainer
        .clone()
        .or_else(|| package.authors.first().map(|a| a.maintainer()))
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let summary = if package.description.is_empty() {
        "UNKNOWN"
    } else {
        package.description.as_str()
    };

    let mut control = format!(
        "Package: {}\nVersion: {}\nArchitecture: {}\nMaintainer: {}\nDescription: {}\n",
        package.name,
        package.package_version(),
        arch,
        maintainer,
        summary,
    );

    // Extended description lines are indented; blank ones become " ."
    let long = package.long_description();
    if long != package.description {
        for line in long.lines() {
            if line.trim().is_empty() {
                control.push_str(" .\n");
            } else {
                control.push(' ');
                control.push_str(line);
                control.push('\n');
            }
        }
    }
    control
}

/// Asks `dpkg-architecture` for the build architecture.
///
/// Empty output falls back to the host architecture; a failing command aborts.
async fn debian_arch(settings: &Settings) -> Result<String> {
    let output = tokio::process::Command::new("dpkg-architecture")
        .args(["-q", "DEB_BUILD_ARCH"])
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: "dpkg-architecture".to_string(),
            error,
        })?;

    if !output.status.success() {
        return Err(Error::ExternalToolFailed {
            command: "dpkg-architecture -q DEB_BUILD_ARCH".to_string(),
            code: output.status.code(),
        });
    }

    Ok(resolve_arch(
        &String::from_utf8_lossy(&output.stdout),
        settings.binary_arch().deb_arch(),
    ))
}

fn resolve_arch(reported: &str, fallback: &str) -> String {
    match reported.trim() {
        "" => fallback.to_string(),
        arch => arch.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Author, PackageSettings, SettingsBuilder};

    fn settings(long_description: Option<&str>) -> Settings {
        SettingsBuilder::new()
            .project_directory("/work/simple")
            .package_settings(PackageSettings {
                name: "simple".into(),
                version: "0.1-rc1".into(),
                description: "A simple package".into(),
                long_description: long_description.map(String::from),
                authors: vec![Author {
                    name: Some("Jane Doe".into()),
                    email: Some("jane@example.org".into()),
                }],
                ..Default::default()
            })
            .entry_points(vec!["hello=simple.cli:main".parse().unwrap()])
            .build()
            .unwrap()
    }

    #[test]
    fn control_file_fields() {
        let control = generate_control(&settings(None), "amd64");
        assert_eq!(
            control,
            "Package: simple\n\
             Version: 0.1_rc1\n\
             Architecture: amd64\n\
             Maintainer: Jane Doe <jane@example.org>\n\
             Description: A simple package\n"
        );
    }

    #[test]
    fn control_file_folds_long_description() {
        let control = generate_control(&settings(Some("First line\n\nSecond")), "arm64");
        assert!(control.ends_with("Description: A simple package\n First line\n .\n Second\n"));
    }

    #[test]
    fn package_file_name_includes_release_and_arch() {
        assert_eq!(
            package_file_name(&settings(None), "amd64"),
            "simple_0.1_rc1_1_amd64.deb"
        );
    }

    #[test]
    fn empty_architecture_report_falls_back() {
        assert_eq!(resolve_arch("\n", "amd64"), "amd64");
        assert_eq!(resolve_arch("arm64\n", "amd64"), "arm64");
    }
}
