use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a batch before any report is written.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Submissions directory does not exist or is not a directory: {}", .0.display())]
    SubmissionsDirMissing(PathBuf),

    #[error("Could not list submissions directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid student id pattern: {0}")]
    InvalidIdPattern(#[from] regex::Error),
}
