//! External tool detection and availability checking.
//!
//! Package formats delegate to system tools; their absence is reported before
//! any build step runs.

use crate::bundler::{error::Error, platform::PackageType, Result};
use std::sync::LazyLock;

/// Tools needed to build an RPM.
const RPM_TOOLS: &[&str] = &["rpmbuild", "rpm"];

/// Tools needed to build a DEB.
const DEB_TOOLS: &[&str] = &["dpkg-deb", "dpkg-architecture"];

/// Check if `rpmbuild` and `rpm` are available.
///
/// Cached result to avoid repeated PATH lookups during bundling.
pub static HAS_RPMBUILD: LazyLock<bool> = LazyLock::new(|| all_on_path(RPM_TOOLS));

/// Check if `dpkg-deb` and `dpkg-architecture` are available.
pub static HAS_DPKG_DEB: LazyLock<bool> = LazyLock::new(|| all_on_path(DEB_TOOLS));

fn all_on_path(tools: &[&str]) -> bool {
    tools.iter().all(|tool| match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            true
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", tool, e);
            false
        }
    })
}

/// Fails with [`Error::MissingTool`] when a requested package type cannot be
/// built on this machine.
pub fn ensure_tools(types: &[PackageType]) -> Result<()> {
    for package_type in types {
        let (available, tools) = match package_type {
            PackageType::Archive => continue,
            PackageType::Rpm => (*HAS_RPMBUILD, RPM_TOOLS),
            PackageType::Deb => (*HAS_DPKG_DEB, DEB_TOOLS),
        };
        if !available {
            let missing = tools
                .iter()
                .find(|tool| which::which(tool).is_err())
                .unwrap_or(&tools[0]);
            log::error!("{package_type} packages need {}", tools.join(" and "));
            return Err(Error::MissingTool((*missing).to_string()));
        }
    }
    Ok(())
}
