use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Bad command line: argument count, target path, or seconds value.
    #[error("{0}")]
    InvalidArgument(String),

    /// Enumerating the tree or reading a file's metadata failed.
    #[error("{}: {source}", path.display())]
    TraversalFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Usage text only accompanies argument errors.
    pub fn shows_usage(&self) -> bool {
        matches!(self, ScanError::InvalidArgument(_))
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        ScanError::TraversalFailure {
            path,
            source: io::Error::from(err),
        }
    }
}
