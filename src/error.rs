//! Fatal errors for a sorting run.
//!
//! Anything in here aborts the run before the destination tree is touched.
//! Per-item problems (a blocked path segment, an occupied destination, a
//! failed `rename`) are never raised as errors; they are recorded in the
//! [`RunReport`](crate::report::RunReport) instead.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source path is missing or is not a directory.
    #[error("Source directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The classification rule could not be built or evaluated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listing the source directory failed.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination root does not exist and could not be created.
    #[error("Destination {} is unavailable: {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrganizeError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound { .. } => 2,
            Self::Config(_) => 3,
            _ => 1,
        }
    }
}

/// Result type for sorting operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
