// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the harvesting pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Page unreachable, or an element the flow depends on is absent.
    #[error("navigation failed: {0}")]
    Navigation(String),
    /// A wait condition was never satisfied within its budget.
    #[error("timed out: {0}")]
    Timeout(String),
    /// An expected field is absent or unparsable.
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("couldn't write to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Browser binary missing or failed to start.
    #[error("browser unavailable: {0}")]
    Launch(String),
    /// A detail unit failed under the fail-fast policy.
    #[error("({index}) {name}: {source}")]
    Unit {
        index: usize,
        name: String,
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    /// Whether retrying the same unit may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Navigation(_) | ScrapeError::Timeout(_) | ScrapeError::Launch(_) => true,
            ScrapeError::Unit { source, .. } => source.is_transient(),
            ScrapeError::Extraction(_) | ScrapeError::Io { .. } => false,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScrapeError::Io { path: path.into(), source }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
