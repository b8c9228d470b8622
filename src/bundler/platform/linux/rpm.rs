//! RPM package creation with `rpmbuild`.
//!
//! The package holds one hard link per alias in `/usr/bin`, all pointing at
//! the frozen executable.

use crate::{
    bail,
    bundler::{
        error::{Error, ErrorExt, Result},
        settings::Settings,
        utils::fs,
    },
};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

const RPM_SPEC_TEMPLATE: &str = r#"%define name {{name}}
%define version {{version}}
%define unmangled_version {{unmangled_version}}
%define release {{release}}

Summary: {{summary}}
Name: %{name}
Version: %{version}
Release: %{release}
Source0: %{name}-%{unmangled_version}.tar.gz
License: {{license}}
Group: {{group}}
BuildRoot: %{_tmppath}/%{name}-%{version}-%{release}-buildroot
Prefix: %{_prefix}
BuildArch: {{arch}}
{{#if url}}
Url: {{url}}
{{/if}}
AutoReq: 0

%description
{{description}}

%install
mkdir -p usr/bin
{{#each aliases}}
ln -f {{../binary}} usr/bin/{{this}}
{{/each}}
mkdir -p $RPM_BUILD_ROOT
cp -ar ./usr $RPM_BUILD_ROOT/

%clean
rm -rf $RPM_BUILD_ROOT

%files
{{#each aliases}}
/usr/bin/{{this}}
{{/each}}
%defattr(-,root,root)
"#;

/// Query format listing the source and binary package names of a spec.
const QUERY_FORMAT: &str =
    "%{name}-%{version}-%{release}.src.rpm %{arch}/%{name}-%{version}-%{release}.%{arch}.rpm\n";

/// Private `_topdir` layout.
const TOPDIR_LAYOUT: &[&str] = &["SOURCES", "SPECS", "BUILD", "RPMS", "SRPMS"];

#[derive(Serialize)]
struct SpecContext<'a> {
    name: &'a str,
    version: String,
    unmangled_version: &'a str,
    release: &'a str,
    summary: &'a str,
    license: &'a str,
    group: &'a str,
    arch: &'a str,
    url: Option<&'a str>,
    description: &'a str,
    binary: String,
    aliases: Vec<String>,
}

/// Bundle the frozen executable as an RPM.
///
/// # Process
///
/// 1. Create a private `_topdir` under the scratch directory
/// 2. Write `SPECS/<name>.spec`
/// 3. Query the expected binary package names with `rpm --specfile`
/// 4. Run `rpmbuild -bb`
/// 5. Move every produced package into the output directory
///
/// # Returns
///
/// Paths of the relocated `.rpm` files.
pub async fn bundle_project(settings: &Settings) -> Result<Vec<PathBuf>> {
    log::info!("Building RPM for {}", settings.product_name());

    let rpm_base = settings.bdist_directory().join("rpm");
    fs::create_dir_all(&rpm_base, true).await?;
    for dir in TOPDIR_LAYOUT {
        fs::create_dir_all(&rpm_base.join(dir), false).await?;
    }

    let spec_path = rpm_base
        .join("SPECS")
        .join(format!("{}.spec", settings.product_name()));
    let spec = generate_spec(settings, &settings.frozen_path())?;
    tokio::fs::write(&spec_path, spec)
        .await
        .fs_context("writing RPM spec", &spec_path)?;
    log::debug!("Wrote {}", spec_path.display());

    let expected = query_binary_rpms(&spec_path).await?;

    let topdir = format!("_topdir {}", rpm_base.display());
    let status = tokio::process::Command::new("rpmbuild")
        .arg("-bb")
        .args(["--define", &topdir])
        .arg("--clean")
        .arg(&spec_path)
        .status()
        .await
        .map_err(|error| Error::CommandFailed {
            command: "rpmbuild".to_string(),
            error,
        })?;
    if !status.success() {
        return Err(Error::ExternalToolFailed {
            command: format!("rpmbuild -bb --define '{topdir}' --clean {}", spec_path.display()),
            code: status.code(),
        });
    }

    let mut packages = Vec::new();
    for relative in expected {
        let built = rpm_base.join("RPMS").join(&relative);
        if built.exists() {
            let moved = fs::move_into(&built, settings.dist_directory()).await?;
            log::info!("✓ Created RPM: {}", moved.display());
            packages.push(moved);
        } else {
            log::warn!("Expected RPM {} was not produced", built.display());
        }
    }

    if packages.is_empty() {
        bail!("rpmbuild finished but produced none of the expected packages");
    }
    Ok(packages)
}

/// Renders the RPM spec for the frozen executable at `binary`.
pub fn generate_spec(settings: &Settings, binary: &Path) -> Result<String> {
    let package = settings.package();
    let rpm = &settings.bundle_settings().rpm_options;

    let context = SpecContext {
        name: &package.name,
        version: package.package_version(),
        unmangled_version: &package.version,
        release: &rpm.release,
        summary: if package.description.is_empty() {
            "UNKNOWN"
        } else {
            package.description.as_str()
        },
        license: package
            .license
            .as_deref()
            .and_then(|license| license.lines().map(str::trim).find(|line| !line.is_empty()))
            .unwrap_or("UNKNOWN"),
        group: &rpm.group,
        arch: settings.binary_arch().rpm_arch(),
        url: package.homepage.as_deref(),
        description: match package.long_description() {
            "" => "UNKNOWN",
            text => text,
        },
        binary: binary.display().to_string(),
        aliases: settings.aliases(),
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string("rpm.spec", RPM_SPEC_TEMPLATE)?;
    Ok(handlebars.render("rpm.spec", &context)?)
}

/// Asks `rpm` which binary packages the spec produces, relative to `RPMS/`.
async fn query_binary_rpms(spec_path: &Path) -> Result<Vec<String>> {
    let output = tokio::process::Command::new("rpm")
        .args(["-q", "--qf", QUERY_FORMAT, "--specfile"])
        .arg(spec_path)
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: "rpm".to_string(),
            error,
        })?;

    if !output.status.success() {
        return Err(Error::ExternalToolFailed {
            command: format!("rpm -q --specfile {}", spec_path.display()),
            code: output.status.code(),
        });
    }

    parse_query_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parses `<src.rpm> <arch>/<binary.rpm>` lines into binary package paths.
fn parse_query_output(output: &str) -> Result<Vec<String>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_source, binary] => Ok((*binary).to_string()),
                _ => Err(Error::GenericError(format!(
                    "unexpected rpm query output: {line}"
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Author, PackageSettings, SettingsBuilder};

    fn settings(homepage: Option<&str>) -> Settings {
        licensed(homepage, Some("MIT"))
    }

    fn licensed(homepage: Option<&str>, license: Option<&str>) -> Settings {
        SettingsBuilder::new()
            .project_directory("/work/simple")
            .package_settings(PackageSettings {
                name: "simple".into(),
                version: "0.1-rc1".into(),
                description: "A simple package".into(),
                long_description: None,
                license: license.map(String::from),
                homepage: homepage.map(String::from),
                authors: vec![Author::default()],
            })
            .entry_points(vec!["hello=simple.cli:main".parse().unwrap()])
            .target("x86_64-unknown-linux-gnu".into())
            .build()
            .unwrap()
    }

    #[test]
    fn spec_links_every_alias() {
        let spec = generate_spec(
            &settings(Some("https://example.org")),
            Path::new("/dist/simple-0.1-rc1"),
        )
        .unwrap();

        assert!(spec.starts_with("%define name simple\n%define version 0.1_rc1\n"));
        assert!(spec.contains("%define unmangled_version 0.1-rc1"));
        assert!(spec.contains("Summary: A simple package"));
        assert!(spec.contains("License: MIT"));
        assert!(spec.contains("Group: Development/Libraries"));
        assert!(spec.contains("BuildArch: x86_64"));
        assert!(spec.contains("Url: https://example.org"));
        assert!(spec.contains("AutoReq: 0"));
        assert!(spec.contains("ln -f /dist/simple-0.1-rc1 usr/bin/simple-python"));
        assert!(spec.contains("ln -f /dist/simple-0.1-rc1 usr/bin/hello"));
        assert!(spec.contains("/usr/bin/simple-python\n"));
        assert!(spec.contains("/usr/bin/hello\n"));
        assert!(spec.trim_end().ends_with("%defattr(-,root,root)"));
    }

    #[test]
    fn spec_omits_missing_url() {
        let spec = generate_spec(&settings(None), Path::new("/dist/x")).unwrap();
        assert!(!spec.contains("Url:"));
        assert!(spec.contains("%description\nA simple package"));
    }

    #[test]
    fn license_header_stays_on_one_line() {
        let multi = "Apache License\nVersion 2.0, January 2004\n%define evil 1";
        let spec = generate_spec(&licensed(None, Some(multi)), Path::new("/dist/x")).unwrap();
        assert!(spec.contains("License: Apache License\nGroup:"));
        assert!(!spec.contains("%define evil"));

        let spec = generate_spec(&licensed(None, None), Path::new("/dist/x")).unwrap();
        assert!(spec.contains("License: UNKNOWN\n"));
    }

    #[test]
    fn parses_rpm_query_output() {
        let out = "simple-0.1-1.src.rpm x86_64/simple-0.1-1.x86_64.rpm\n\n";
        assert_eq!(parse_query_output(out).unwrap(), vec!["x86_64/simple-0.1-1.x86_64.rpm"]);
        assert!(parse_query_output("garbage\n").is_err());
    }
}
