//! Error handling for ytgrab

use thiserror::Error;

/// Main error type for ytgrab
#[derive(Debug, Error)]
pub enum YtgrabError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Update failed: {0}")]
    UpdateError(String),

    #[error("Input stream closed")]
    InputClosed,

    #[error("No formats with a known file size are available")]
    NoFormats,
}
