use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for rundata operations.
#[derive(Debug, Error)]
pub enum RundataError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error traversing feature directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{}:{line}: {message}", path.display())]
    Metadata {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("No '# <PlanID>: <Description>' heading in {}", path.display())]
    MissingHeading { path: PathBuf },

    #[error("test file {} has package name {package:?}, it should end with _test", file.display())]
    Package { file: PathBuf, package: String },

    #[error("Rundata has not been fixed")]
    NotFixed,
}

impl RundataError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias using [`RundataError`].
pub type Result<T> = std::result::Result<T, RundataError>;
