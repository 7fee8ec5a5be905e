//! Error types for folio operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The renderer for this format was compiled out of the build.
    #[error("{format} renderer is not available (built without the `{feature}` feature)")]
    MissingDependency {
        format: &'static str,
        feature: &'static str,
    },

    /// The output file exists but cannot be opened for writing.
    #[error("cannot write output file {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("font error: {0}")]
    Font(String),
}

impl Error {
    /// Actionable advice for the recognised failure kinds.
    ///
    /// Returns `None` for errors that have no canned remedy; callers should
    /// report those with their full source chain instead.
    pub fn remediation(&self) -> Option<Vec<String>> {
        match self {
            Error::MissingDependency { feature, .. } => Some(vec![format!(
                "rebuild with the renderer enabled: cargo build --features {feature}"
            )]),
            Error::OutputUnwritable { path, .. } => Some(vec![
                format!("file: {}", path.display()),
                "close the file in any viewer or editor that has it open".to_string(),
                "check that the file is not marked read-only".to_string(),
                "check that you have permission to write to the output directory".to_string(),
            ]),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
