//! Console entry point declarations.
//!
//! An entry point is declared as `alias = module[:function]`, the same form
//! used by `[project.scripts]` and setuptools `console_scripts`. Without a
//! function the module is run as a script.

use crate::bundler::error::{Error, Result};
use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<alias>[\w\-.]+)\s*=\s*(?P<module>[\w.]+)(?:\s*:\s*(?P<function>\w+))?\s*(?:\[[^\]]*\])?\s*$",
    )
    .expect("entry point pattern is valid")
});

/// What an alias resolves to at run time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryTarget {
    /// Run the module as `__main__`.
    Module {
        /// Dotted module path.
        module: String,
    },
    /// Call a function defined in a module.
    Function {
        /// Dotted module path.
        module: String,
        /// Function name.
        function: String,
    },
}

impl EntryTarget {
    /// Dotted path of the module this target lives in.
    pub fn module(&self) -> &str {
        match self {
            Self::Module { module } | Self::Function { module, .. } => module,
        }
    }

    /// Top-level package of the target module.
    pub fn top_level_package(&self) -> &str {
        let module = self.module();
        module.split('.').next().unwrap_or(module)
    }
}

impl fmt::Display for EntryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module { module } => write!(f, "{module}"),
            Self::Function { module, function } => write!(f, "{module}:{function}"),
        }
    }
}

/// A single declared console entry point.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    alias: String,
    target: EntryTarget,
}

impl EntryPoint {
    /// Builds an entry point from an alias and a `module[:function]` value,
    /// as found in a `[project.scripts]` table.
    pub fn new(alias: &str, value: &str) -> Result<Self> {
        format!("{alias} = {value}").parse()
    }

    /// Invocation name that selects this entry point.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The action behind the alias.
    pub fn target(&self) -> &EntryTarget {
        &self.target
    }
}

impl FromStr for EntryPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = DECLARATION
            .captures(s)
            .ok_or_else(|| Error::EntryPoint(format!("cannot parse `{}`", s.trim())))?;

        let alias = caps["alias"].to_string();
        let module = caps["module"].to_string();
        if module.starts_with('.') || module.ends_with('.') || module.contains("..") {
            return Err(Error::EntryPoint(format!(
                "`{module}` is not a valid module path (alias `{alias}`)"
            )));
        }

        let target = match caps.name("function") {
            Some(function) => EntryTarget::Function {
                module,
                function: function.as_str().to_string(),
            },
            None => EntryTarget::Module { module },
        };

        Ok(Self { alias, target })
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.alias, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_target() {
        let ep: EntryPoint = "hello=simple.cli:main".parse().unwrap();
        assert_eq!(ep.alias(), "hello");
        assert_eq!(
            ep.target(),
            &EntryTarget::Function {
                module: "simple.cli".into(),
                function: "main".into()
            }
        );
        assert_eq!(ep.target().top_level_package(), "simple");
    }

    #[test]
    fn missing_function_means_module_script() {
        let ep = EntryPoint::new("serve-it", "tools.server").unwrap();
        assert_eq!(
            ep.target(),
            &EntryTarget::Module {
                module: "tools.server".into()
            }
        );
    }

    #[test]
    fn tolerates_whitespace_and_extras() {
        let ep: EntryPoint = "  my.tool  =  pkg.main :  run [cli] ".parse().unwrap();
        assert_eq!(ep.alias(), "my.tool");
        assert_eq!(ep.to_string(), "my.tool = pkg.main:run");
    }

    #[test]
    fn rejects_garbage() {
        assert!("no equals sign".parse::<EntryPoint>().is_err());
        assert!("a = pkg..mod:main".parse::<EntryPoint>().is_err());
        assert!("a = pkg.mod:main extra".parse::<EntryPoint>().is_err());
    }
}
