//! Dispatcher program generation.
//!
//! The frozen bundle has a single entry program. At run time it looks at the
//! name it was invoked under (the file name of `argv[0]`, or an override from
//! the environment) and routes to the matching registered entry point. Two
//! reserved arguments, `setup_aliases` and `extract`, manage alias links and
//! unpack the embedded resource tree.
//!
//! The table of aliases is fixed when the program is rendered: every target
//! is imported statically so the freezer can see it, and runtime toggles are
//! read once into an options value that is passed to the dispatch step.

mod template;

use crate::bundler::{
    entry_point::{EntryPoint, EntryTarget},
    error::{Error, Result},
    settings::Settings,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use template::DISPATCHER_TEMPLATE;

/// Reserved argument that links every alias next to the primary executable.
pub const SETUP_ALIASES: &str = "setup_aliases";

/// Reserved argument that copies the embedded resource tree out of the bundle.
pub const EXTRACT: &str = "extract";

/// Directory `extract` writes to, relative to the working directory.
pub const EXTRACT_DIR: &str = "./extracted_bundle/";

/// Environment variables the generated program reads at start-up.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DispatcherOptions {
    /// Non-empty value runs the dispatch under `cProfile`.
    pub profile_var: String,
    /// Non-empty value enters `pdb.post_mortem()` after an unhandled error.
    pub debug_var: String,
    /// Invocation name used when the real one is not a registered alias.
    pub process_var: String,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            profile_var: "PROFILE".to_string(),
            debug_var: "DEBUG".to_string(),
            process_var: "__process__".to_string(),
        }
    }
}

/// A command the dispatcher recognizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchCommand<'a> {
    /// A declared entry point, selected by invocation name.
    Alias(&'a EntryPoint),
    /// `setup_aliases` argument.
    SetupAliases,
    /// `extract` argument.
    Extract,
}

impl DispatchCommand<'_> {
    /// Name that selects the command.
    pub fn name(&self) -> &str {
        match self {
            Self::Alias(entry) => entry.alias(),
            Self::SetupAliases => SETUP_ALIASES,
            Self::Extract => EXTRACT,
        }
    }
}

/// Entry points of one project, ready to be rendered into a dispatcher.
#[derive(Clone, Debug)]
pub struct DispatchTable {
    package_name: String,
    sample_module: String,
    packages: Vec<String>,
    entries: Vec<EntryPoint>,
    options: DispatcherOptions,
}

#[derive(Serialize)]
struct FunctionImport {
    module: String,
    function: String,
    symbol: String,
}

#[derive(Serialize)]
struct CommandContext {
    alias: String,
    module: String,
    symbol: Option<String>,
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    package_name: &'a str,
    sample_module: &'a str,
    interactive_alias: String,
    profile_var: &'a str,
    debug_var: &'a str,
    process_var: &'a str,
    function_imports: Vec<FunctionImport>,
    module_imports: Vec<String>,
    commands: Vec<CommandContext>,
}

impl DispatchTable {
    /// Validates the entry points and builds the table.
    ///
    /// `packages` are the project's importable packages; the first one is the
    /// representative module whose location anchors `extract`.
    ///
    /// # Errors
    ///
    /// - no entry points or no packages
    /// - an alias declared twice
    /// - an alias equal to `setup_aliases`, `extract` or `<name>-python`
    pub fn new(
        package_name: &str,
        packages: &[String],
        entries: Vec<EntryPoint>,
        options: DispatcherOptions,
    ) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config(format!(
                "no console entry points declared for {package_name}"
            )));
        }
        let sample_module = packages.first().cloned().ok_or_else(|| {
            Error::Config(format!(
                "the list of packages for {package_name} is empty, verify the project layout"
            ))
        })?;

        let interactive = interactive_alias(package_name);
        let mut seen = HashSet::new();
        for entry in &entries {
            let alias = entry.alias();
            if alias == SETUP_ALIASES || alias == EXTRACT || alias == interactive {
                return Err(Error::EntryPoint(format!(
                    "alias `{alias}` is reserved by the dispatcher"
                )));
            }
            if !seen.insert(alias) {
                return Err(Error::EntryPoint(format!(
                    "alias `{alias}` is declared more than once"
                )));
            }
        }

        Ok(Self {
            package_name: package_name.to_string(),
            sample_module,
            packages: packages.to_vec(),
            entries,
            options,
        })
    }

    /// Builds the table for the project described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.product_name(),
            settings.packages(),
            settings.entry_points().to_vec(),
            settings.bundle_settings().dispatcher.clone(),
        )
    }

    /// Declared entry points in declaration order.
    pub fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }

    /// Representative importable module.
    pub fn sample_module(&self) -> &str {
        &self.sample_module
    }

    /// Every command the dispatcher recognizes: one per alias plus
    /// `setup_aliases` and `extract`.
    pub fn commands(&self) -> Vec<DispatchCommand<'_>> {
        self.entries
            .iter()
            .map(DispatchCommand::Alias)
            .chain([DispatchCommand::SetupAliases, DispatchCommand::Extract])
            .collect()
    }

    /// Alias of the interactive fallback session.
    pub fn fallback_alias(&self) -> String {
        interactive_alias(&self.package_name)
    }

    /// Names `setup_aliases` creates links for, interactive alias first.
    pub fn alias_names(&self) -> Vec<String> {
        std::iter::once(self.fallback_alias())
            .chain(self.entries.iter().map(|e| e.alias().to_string()))
            .collect()
    }

    /// Renders the dispatcher program source.
    pub fn render(&self) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string("dispatcher.py", DISPATCHER_TEMPLATE)?;

        let mut function_imports: Vec<FunctionImport> = Vec::new();
        let mut symbols = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let symbol = match entry.target() {
                EntryTarget::Function { module, function } => {
                    let imported = function_imports
                        .iter()
                        .find(|import| &import.module == module && &import.function == function);
                    Some(match imported {
                        Some(import) => import.symbol.clone(),
                        None => {
                            let symbol = import_symbol(function_imports.len(), function);
                            function_imports.push(FunctionImport {
                                module: module.clone(),
                                function: function.clone(),
                                symbol: symbol.clone(),
                            });
                            symbol
                        }
                    })
                }
                EntryTarget::Module { .. } => None,
            };
            symbols.push(symbol);
        }

        let module_imports: BTreeSet<String> = self
            .entries
            .iter()
            .filter_map(|entry| match entry.target() {
                EntryTarget::Module { module } => Some(module.clone()),
                EntryTarget::Function { .. } => None,
            })
            .chain(self.packages.iter().cloned())
            .collect();

        let context = TemplateContext {
            package_name: &self.package_name,
            sample_module: &self.sample_module,
            interactive_alias: self.fallback_alias(),
            profile_var: &self.options.profile_var,
            debug_var: &self.options.debug_var,
            process_var: &self.options.process_var,
            function_imports,
            module_imports: module_imports.into_iter().collect(),
            commands: self
                .entries
                .iter()
                .zip(symbols)
                .map(|(entry, symbol)| CommandContext {
                    alias: entry.alias().to_string(),
                    module: entry.target().module().to_string(),
                    symbol,
                })
                .collect(),
        };

        Ok(handlebars.render("dispatcher.py", &context)?)
    }
}

/// Name an imported entry function is bound to in the dispatcher.
///
/// The import position keeps names unique whatever the dotted paths look like.
fn import_symbol(index: usize, function: &str) -> String {
    format!("_entry_{index}_{function}")
}

fn interactive_alias(package_name: &str) -> String {
    format!("{package_name}-python")
}
