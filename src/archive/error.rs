use std::path::PathBuf;

/// Errors that can occur while reading or writing a curation archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Archive path does not exist
    #[error("Archive not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// JSON parsing error in the record entry
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A mandatory record key is absent
    #[error("Missing required key: {0}")]
    MissingKey(&'static str),

    /// Record is present but does not have the expected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl ArchiveError {
    /// True when the archive itself was missing, as opposed to undecodable
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArchiveError::NotFound(_))
    }
}
