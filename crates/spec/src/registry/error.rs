//! Error types and load result structures for the registry.

use std::path::PathBuf;

use crate::schema::FragmentKind;

/// Errors that abort building a registry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A required (public) source does not exist or cannot be read.
    #[error("config source unreachable: {}: {source}", .path.display())]
    Unreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem I/O error while walking a source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two sources define the same field of the same fragment differently.
    #[error("conflicting {kind} fragments for '{key}': {field} differs ({})", .paths.join(", "))]
    Conflict {
        kind: FragmentKind,
        key: String,
        field: String,
        paths: Vec<String>,
    },
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors reading one fragment file. Contained per file during a scan.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid file name: {}", .0.display())]
    InvalidName(PathBuf),
}

/// Outcome of loading a single fragment file.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// Fragment was parsed and registered.
    Loaded { slug: String, kind: FragmentKind },
    /// File or source was skipped (dotfile, non-TOML, example, missing private source).
    Skipped { reason: String },
    /// Parse error occurred; the file was ignored.
    Failed { error: String },
}
