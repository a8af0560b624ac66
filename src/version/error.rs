use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ValidationError;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History file error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a version-check endpoint produced no version
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Response is not JSON: {0}")]
    NotDecodable(#[from] serde_json::Error),

    #[error("Response does not match schema: {0}")]
    NotValid(#[from] ValidationError),

    #[error("Field {field:?} holds {value}, which is not a dotted version")]
    NotAVersion { field: String, value: String },
}

/// Why a package endpoint failed to deliver the artifact
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Response has no content-disposition filename")]
    MissingFilename,

    #[error("Refusing to write to {0:?}: not a plain file name")]
    InvalidFilename(String),

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
