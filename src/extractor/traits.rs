use crate::downloader::DownloadProgressEvent;
use crate::extractor::merge_tools::MergeTools;
use crate::extractor::models::{DownloadOutcome, MediaInfo};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Progress callback handed to [`MediaProvider::download`]
///
/// Called synchronously for every progress report. Returning
/// `ControlFlow::Break` asks the provider to abort the transfer.
pub type ProgressCallback<'a> = dyn FnMut(&DownloadProgressEvent) -> ControlFlow<()> + Send + 'a;

/// Everything a provider needs to fetch one item
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    /// Provider format selector, e.g. `bestvideo+bestaudio/best`
    pub format_selector: String,
    pub destination_dir: PathBuf,
    /// File name template inside `destination_dir`
    pub name_template: String,
    pub merge_tools: Option<MergeTools>,
    /// Tripped when the user cancels. Providers should stop promptly.
    pub cancel: CancellationToken,
}

/// Extraction/download collaborator
///
/// This trait isolates the orchestrator from the specific extraction tool
/// (yt-dlp CLI, a library binding, a test double...).
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Returns a unique identifier for this provider (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Fetch title, duration and stream descriptors without downloading.
    /// Fails with `ExtractionFailure`.
    async fn fetch_catalog(&self, url: &str) -> Result<MediaInfo>;

    /// Download one item. Fails with `DownloadFailure` carrying the raw
    /// message, or `CancellationRequested` when aborted.
    async fn download(
        &self,
        request: DownloadRequest,
        progress: &mut ProgressCallback<'_>,
    ) -> Result<DownloadOutcome>;
}
