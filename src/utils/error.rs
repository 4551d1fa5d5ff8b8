//! Error handling for mediaqueue

use thiserror::Error;

/// Main error type for mediaqueue
#[derive(Debug, Error)]
pub enum MediaQueueError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Could not fetch options: {0}")]
    ExtractionFailure(String),

    #[error("Download failed: {0}")]
    DownloadFailure(String),

    #[error("Canceled by user")]
    CancellationRequested,

    #[error("This URL is already in the queue: {0}")]
    DuplicateUrl(String),

    #[error("No quality option selected")]
    MissingSelection,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item is still in progress, cancel it first: {0}")]
    ItemBusy(String),

    #[error("Background worker is no longer running")]
    WorkerGone,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MediaQueueError {
    /// True when the error only reflects a user cancel
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::CancellationRequested)
    }
}

pub type Result<T, E = MediaQueueError> = std::result::Result<T, E>;
