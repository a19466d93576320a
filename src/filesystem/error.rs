use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use snafu::Snafu;

use crate::ext::BestEffortPathExt;

/// Typed failure of a provider operation.
///
/// Raw OS errors are translated into this taxonomy exactly once, in
/// [`crate::filesystem::io`]; every layer above propagates it unchanged.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FsError {
    #[snafu(display("File not found: {}", path.best_effort_path_display()))]
    FileNotFound { path: PathBuf },
    #[snafu(display("File is a directory: {}", path.best_effort_path_display()))]
    FileIsADirectory { path: PathBuf },
    #[snafu(display("File exists: {}", path.best_effort_path_display()))]
    FileExists { path: PathBuf },
    #[snafu(display("No permissions: {}", path.best_effort_path_display()))]
    NoPermissions { path: PathBuf },
    #[snafu(display("Operation cancelled"))]
    Cancelled,
    #[snafu(display("Filesystem operation on {} failed: {source}", path.best_effort_path_display()))]
    Unknown { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FsErrorKind {
    FileNotFound,
    FileIsADirectory,
    FileExists,
    NoPermissions,
    Cancelled,
    Unknown,
}

impl FsError {
    pub fn kind(&self) -> FsErrorKind {
        match self {
            FsError::FileNotFound { .. } => FsErrorKind::FileNotFound,
            FsError::FileIsADirectory { .. } => FsErrorKind::FileIsADirectory,
            FsError::FileExists { .. } => FsErrorKind::FileExists,
            FsError::NoPermissions { .. } => FsErrorKind::NoPermissions,
            FsError::Cancelled => FsErrorKind::Cancelled,
            FsError::Unknown { .. } => FsErrorKind::Unknown,
        }
    }

    /// Underlying cause of an opaque failure, for diagnostics.
    pub fn cause(&self) -> Option<String> {
        match self {
            FsError::Unknown { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }

    /// Translates a raw OS error into the taxonomy.
    pub fn massage(path: &Path, error: io::Error) -> Self {
        let path = path.to_path_buf();
        match error.kind() {
            ErrorKind::NotFound => FsError::FileNotFound { path },
            ErrorKind::IsADirectory => FsError::FileIsADirectory { path },
            ErrorKind::AlreadyExists => FsError::FileExists { path },
            ErrorKind::PermissionDenied => FsError::NoPermissions { path },
            _ => FsError::Unknown {
                path,
                source: error,
            },
        }
    }
}

pub(crate) trait MassageExt<T> {
    fn massage(self, path: &Path) -> Result<T, FsError>;
}

impl<T> MassageExt<T> for io::Result<T> {
    fn massage(self, path: &Path) -> Result<T, FsError> {
        self.map_err(|error| FsError::massage(path, error))
    }
}
