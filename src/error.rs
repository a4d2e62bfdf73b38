//! Crate-level error type and `Result` alias.
//!
//! Every failure class maps to its own process exit code so scripts that
//! drove the legacy tool can tell a bad flag from a broken page.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Input error: {path}: {reason}")]
    Input { path: String, reason: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

/// Malformed or missing command-line tokens.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(#[from] clap::Error),

    #[error("Input file or URL is required")]
    MissingInput,

    #[error("Output PDF file is required (use \"-\" for standard output)")]
    MissingOutput,
}

/// A flag value that failed type, range or enum validation.
#[derive(Debug, Error, PartialEq)]
#[error("Invalid value for --{flag}: {value:?} ({reason})")]
pub struct ConversionError {
    pub flag: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(flag: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            flag,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl Error {
    pub fn render<E: std::fmt::Display>(e: E) -> Self {
        Error::Render(e.to_string())
    }

    pub fn input(path: &str, reason: impl Into<String>) -> Self {
        Error::Input {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config { .. } => 1,
            Error::Parse(_) => 2,
            Error::Conversion(_) => 3,
            Error::Input { .. } => 4,
            Error::Render(_) => 5,
            Error::Output { .. } => 6,
        }
    }
}
