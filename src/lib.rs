use chrono::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

pub mod cli;
pub mod error;
pub mod report;

pub use error::ScanError;

pub type Result<T> = std::result::Result<T, ScanError>;

/// What to scan and how far back an access still counts as recent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    root: PathBuf,
    cutoff: SystemTime,
}

impl ScanRequest {
    /// Validates the command-line values against the current time.
    pub fn new(root: impl Into<PathBuf>, seconds: &str) -> Result<Self> {
        Self::at(root, seconds, Local::now())
    }

    /// Like [`ScanRequest::new`], with an explicit "now". The cutoff is `now - seconds`, so a
    /// negative value puts it in the future.
    pub fn at(root: impl Into<PathBuf>, seconds: &str, now: DateTime<Local>) -> Result<Self> {
        let root = root.into();

        let metadata = fs::metadata(&root).map_err(|err| {
            ScanError::InvalidArgument(format!("`{}` does not exist: {}", root.display(), err))
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::InvalidArgument(format!(
                "`{}` is not a directory",
                root.display()
            )));
        }

        let seconds: i32 = seconds.parse().map_err(|err| {
            ScanError::InvalidArgument(format!("parsing '{}' as seconds: {}", seconds, err))
        })?;
        let cutoff = now
            .checked_sub_signed(chrono::Duration::seconds(i64::from(seconds)))
            .ok_or_else(|| {
                ScanError::InvalidArgument(format!("'{}' seconds is out of range", seconds))
            })?;

        Ok(Self::with_cutoff(root, cutoff))
    }

    /// Skips validation. [`scan`] still reports a missing root as a traversal failure.
    pub fn with_cutoff(root: impl Into<PathBuf>, cutoff: impl Into<SystemTime>) -> Self {
        Self {
            root: root.into(),
            cutoff: cutoff.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cutoff(&self) -> SystemTime {
        self.cutoff
    }

    /// Strictly after the cutoff. Access times may lie outside chrono's calendar range, so this
    /// stays on `SystemTime`.
    pub fn is_recent(&self, accessed: SystemTime) -> bool {
        accessed > self.cutoff
    }
}

/// A regular file that was accessed after the cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
}

fn accessed_at(path: &Path, metadata: &fs::Metadata) -> Result<SystemTime> {
    metadata
        .accessed()
        .map_err(|source| ScanError::TraversalFailure {
            path: path.to_path_buf(),
            source,
        })
}

fn traversal_error(err: walkdir::Error) -> ScanError {
    warn!(error = %err, "directory walk failed");
    ScanError::from(err)
}

/// Walks `request.root()` depth first, siblings in file-name order, and returns every regular file
/// accessed after the cutoff. Symlinks below the root are not followed. The first error aborts the
/// walk and no records are returned.
pub fn scan(request: &ScanRequest) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();

    let walker = WalkDir::new(request.root())
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(traversal_error)?;
        if !entry.file_type().is_file() {
            trace!(path = %entry.path().display(), "skipping non-regular entry");
            continue;
        }

        let metadata = entry.metadata().map_err(traversal_error)?;
        let accessed = accessed_at(entry.path(), &metadata)?;
        if !request.is_recent(accessed) {
            trace!(path = %entry.path().display(), ?accessed, "not recently accessed");
            continue;
        }

        debug!(path = %entry.path().display(), size = metadata.len(), ?accessed, "match");
        records.push(FileRecord {
            path: entry.into_path(),
            size_bytes: metadata.len(),
        });
    }

    info!(
        root = %request.root().display(),
        matches = records.len(),
        "scan finished"
    );
    Ok(records)
}
