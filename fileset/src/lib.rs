//! Addressing of per-case, per-identifier files on disk.
//!
//! A [`FileSet`] names every file of one pipeline stage by a composite key of
//! case and identifier, under one of two directory layouts:
//!
//! ```text
//! nested:  <root>/<case>/<filename>    one filename per identifier
//! flat:    <root>/<filename>           one filename per case OR per identifier
//! ```

use std::path::PathBuf;

/// The `FileSet` type, its construction and addressing operations.
mod fileset;
pub use fileset::{Axis, FileSet, Topology};

/// Reading file sets back from an existing directory tree.
mod scan;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Directory \"{0}\" does not exist")]
    DirectoryNotFound(PathBuf),
    #[error("Non-consistent files in case folder \"{dir}\": expected {expected:?}, got {found:?}")]
    Inconsistent {
        dir: PathBuf,
        case: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Expected file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Unsupported combination ({supplied}) for {topology} file set: {reason}")]
    UnsupportedCombination {
        topology: Topology,
        supplied: &'static str,
        reason: &'static str,
    },
    #[error("Unknown case \"{0}\"")]
    UnknownCase(String),
    #[error("Unknown identifier \"{0}\"")]
    UnknownIdentifier(String),

    #[error("Invalid file set configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    PathEncoding(#[from] util::PathEncodingError),
    #[error("I/O error at \"{path}\"")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The on-disk layout violates the file set's structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_) | Self::Inconsistent { .. } | Self::MissingFile(_)
        )
    }

    /// A case/identifier combination the file set cannot resolve.
    pub fn is_addressing(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCombination { .. } | Self::UnknownCase(_) | Self::UnknownIdentifier(_)
        )
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
