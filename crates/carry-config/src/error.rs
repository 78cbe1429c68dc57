//! Config file errors.

use std::path::{Path, PathBuf};

/// Loading or saving `config.ron` failed. I/O and parse failures name the
/// file involved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but couldn't be read.
    #[error("can't read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file couldn't be written.
    #[error("can't write {}: {source}", path.display())]
    Write {
        /// Directory or file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file isn't valid RON for [`crate::Config`].
    #[error("{}:{source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parse error with line and column.
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config couldn't be turned into RON.
    #[error("can't serialize config: {0}")]
    Serialize(#[source] ron::Error),
}

impl ConfigError {
    /// The file or directory the error concerns, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Parse { path, .. } => Some(path),
            Self::Serialize(_) => None,
        }
    }
}
