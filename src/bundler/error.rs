//! Error types for bundling operations.
//!
//! Provides the bundler [`Error`] enum, a [`Context`] extension for attaching
//! human readable context to results and options, [`ErrorExt`] for attaching
//! the failing path to filesystem errors, and the [`bail!`](crate::bail) macro.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

/// Errors produced while generating, freezing or packaging a bundle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error with additional context.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// Filesystem error with the path that caused it.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        error: std::io::Error,
    },

    /// An external command could not be started.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Program that failed to start.
        command: String,
        /// Underlying error.
        error: std::io::Error,
    },

    /// An external command ran but reported failure.
    #[error("`{command}` failed with exit code {code:?}")]
    ExternalToolFailed {
        /// Command line that was executed.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// An external tool required by the requested package types is missing.
    #[error("required tool `{0}` was not found in PATH")]
    MissingTool(String),

    /// Invalid entry point declaration or alias set.
    #[error("invalid entry point: {0}")]
    EntryPoint(String),

    /// Invalid bundle configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Path prefix stripping error.
    #[error(transparent)]
    StripError(#[from] std::path::StripPrefixError),

    /// Directory walk error.
    #[error(transparent)]
    WalkdirError(#[from] walkdir::Error),

    /// Template registration error.
    #[error("template error: {0}")]
    TemplateError(#[from] Box<handlebars::TemplateError>),

    /// Template rendering error.
    #[error("template render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// JSON decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    GenericError(String),
}

/// Result alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Attach context to a failing [`Result`] or an empty [`Option`].
pub trait Context<T> {
    /// Wraps the error (or `None`) with a context message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Like [`Context::context`] but the message is computed lazily.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e.into())))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e.into())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attach the failing path to filesystem errors.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(error: handlebars::TemplateError) -> Self {
        Self::TemplateError(Box::new(error))
    }
}

/// Return early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:literal, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
