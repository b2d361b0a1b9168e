//! Error types for archive generation and length prediction.
//!
//! Every failure tied to a particular entry carries the entry's position in
//! the input sequence and a printable form of its name, so callers can tell
//! which input broke the archive.

use thiserror::Error;

/// Errors raised while generating or sizing an archive.
///
/// None of them is recovered internally: once a [`ZipStream`](crate::ZipStream)
/// has yielded an error, the bytes produced so far do not form a valid archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Writing to the output sink failed.
    #[error("Archive error {0}")]
    IoError(#[from] std::io::Error),

    /// The content source of an entry failed while being read.
    #[error("failed to read the content of entry #{index} '{name}': {source}")]
    SourceRead {
        index: usize,
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The length of an archive was requested for an entry without a known size.
    #[error("missing size for entry #{index} '{name}', the archive length cannot be predicted")]
    MissingSizeForPrediction { index: usize, name: String },

    /// The entry's modification time cannot be represented as an MS-DOS date (1980 to 2107).
    #[error("the modification date of entry #{index} '{name}' is out of the MS-DOS date range")]
    DateOutOfRange { index: usize, name: String },

    /// The entry's name cannot be stored.
    #[error("invalid name for entry #{index}: {reason}")]
    InvalidName { index: usize, reason: String },

    /// The content read does not match the size or crc declared for the entry.
    #[error("content of entry #{index} '{name}' does not match its declaration: {detail}")]
    ContentMismatch {
        index: usize,
        name: String,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

impl From<ArchiveError> for std::io::Error {
    fn from(value: ArchiveError) -> Self {
        match value {
            ArchiveError::IoError(e) => e,
            e => std::io::Error::new(std::io::ErrorKind::Other, e),
        }
    }
}
