use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{0}")]
    Usage(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("failed to read input file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("font {}: {reason}", path.display())]
    Font { path: PathBuf, reason: String },

    #[error(
        "no PDF renderer found (tried: {tried}). Please install wkhtmltopdf or Chrome:\n  \
         brew install wkhtmltopdf (macOS) or apt install wkhtmltopdf (Linux)"
    )]
    RendererNotFound { tried: String },

    #[error("failed to run {program}: {source}")]
    RendererSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    RendererFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl ConvertError {
    /// Whether this error comes from bad command-line or config input
    /// rather than from the conversion itself.
    pub fn is_usage(&self) -> bool {
        matches!(self, ConvertError::Usage(_) | ConvertError::InvalidOption(_))
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
