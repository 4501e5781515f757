use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run before a report can be produced.
///
/// Per-pair problems (unreadable or unparseable files) never show up here;
/// the comparison driver absorbs them and counts the omitted pairs instead.
#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("need at least two files to compare, found {found} in {}", dir.display())]
    InsufficientInput { dir: PathBuf, found: usize },

    #[error("failed to write report to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimilarityError {
    /// Process exit code the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SimilarityError::DirectoryNotFound(_) => 2,
            SimilarityError::InsufficientInput { .. } => 3,
            SimilarityError::OutputWrite { .. } => 4,
            SimilarityError::Io(_) => 1,
        }
    }
}
