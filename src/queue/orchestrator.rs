//! Sequential download orchestration
//!
//! The orchestrator owns the queue. Items are processed strictly in
//! insertion order, one at a time, through a [`MediaProvider`]. Status and
//! progress flow out through a [`UiSink`]; cancellation is cooperative and
//! checked before each item and on every progress report.

use crate::catalog::{build_catalog, Catalog, QualityOption};
use crate::classifier::{ErrorClassifier, RuleClassifier};
use crate::downloader::{DownloadProgressEvent, ProgressPhase};
use crate::extractor::{DownloadRequest, MediaProvider, MergeTools};
use crate::queue::cancel::{CancelSwitch, QueueSnapshot};
use crate::queue::events::{FailureNotice, UiSink};
use crate::queue::item::{ItemStatus, QueueItem};
use crate::utils::error::{MediaQueueError, Result};
use crate::utils::filename::guess_target_path;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Output template handed to the provider
pub const NAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Extension assumed before the provider reports the real one
const GUESS_EXTENSION: &str = "mp4";

/// What a queue run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    /// Already on disk, no download needed
    pub skipped: usize,
    pub failed: usize,
    /// The run stopped on a user cancel
    pub canceled: bool,
}

enum ItemOutcome {
    Completed,
    Skipped,
    Failed,
    Canceled,
}

/// Owns the queue and drives downloads
pub struct DownloadOrchestrator {
    items: Vec<QueueItem>,
    download_dir: PathBuf,
    merge_tools: Option<MergeTools>,
    classifier: Arc<dyn ErrorClassifier>,
    cancel: CancelSwitch,
    snapshot: QueueSnapshot,
}

impl DownloadOrchestrator {
    pub fn new(download_dir: impl Into<PathBuf>, merge_tools: Option<MergeTools>) -> Self {
        if merge_tools.is_none() {
            warn!("No merge tools available; merged downloads may fail");
        }
        Self {
            items: Vec::new(),
            download_dir: download_dir.into(),
            merge_tools,
            classifier: Arc::new(RuleClassifier::default()),
            cancel: CancelSwitch::new(),
            snapshot: QueueSnapshot::default(),
        }
    }

    /// Swap the failure classification table
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Handle for requesting cancellation from another thread
    pub fn cancel_switch(&self) -> CancelSwitch {
        self.cancel.clone()
    }

    /// Read-only view of the queue for rendering
    pub fn snapshot(&self) -> QueueSnapshot {
        self.snapshot.clone()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn set_download_dir(&mut self, dir: impl Into<PathBuf>) {
        self.download_dir = dir.into();
    }

    /// Request cancellation of the current run
    pub fn cancel(&self) {
        info!("Cancellation requested");
        self.cancel.trigger();
    }

    /// Fetch descriptors for a URL and resolve them into a catalog
    ///
    /// An empty option list means "no options available", not a failure.
    pub async fn fetch_catalog(
        &self,
        provider: &dyn MediaProvider,
        url: &str,
        sink: &dyn UiSink,
    ) -> Result<Catalog> {
        let url = url.trim();
        if url.is_empty() {
            let err = MediaQueueError::InvalidUrl("empty URL".to_string());
            sink.on_catalog_failed(url, &err.to_string());
            return Err(err);
        }

        match provider.fetch_catalog(url).await {
            Ok(info) => {
                let options = build_catalog(&info.formats, info.duration);
                info!("Resolved {} options for {}", options.len(), info.title);
                sink.on_catalog_ready(url, &info.title, &options);
                Ok(Catalog {
                    url: url.to_string(),
                    title: info.title,
                    options,
                })
            }
            Err(e) => {
                warn!("Catalog fetch failed for {}: {}", url, e);
                let reason = e.to_string();
                sink.on_catalog_failed(url, &reason);
                Err(match e {
                    MediaQueueError::ExtractionFailure(_) => e,
                    other => MediaQueueError::ExtractionFailure(other.to_string()),
                })
            }
        }
    }

    /// Add an item to the end of the queue
    pub fn accept(
        &mut self,
        url: &str,
        title: &str,
        option: Option<QualityOption>,
    ) -> Result<&QueueItem> {
        let url = url.trim();
        if url.is_empty() {
            return Err(MediaQueueError::InvalidUrl("empty URL".to_string()));
        }
        if self.items.iter().any(|item| item.url == url) {
            return Err(MediaQueueError::DuplicateUrl(url.to_string()));
        }
        let option = option.ok_or(MediaQueueError::MissingSelection)?;

        let item = QueueItem::new(url, title, option);
        info!("Added {} ({}) to queue", item.title, item.chosen_option.resolution_tag);
        self.items.push(item);
        self.snapshot.publish(&self.items);

        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Remove one item; refused while it is downloading
    pub fn remove(&mut self, url: &str) -> Result<QueueItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.url == url)
            .ok_or_else(|| MediaQueueError::ItemNotFound(url.to_string()))?;

        if self.items[index].status.is_active() {
            return Err(MediaQueueError::ItemBusy(url.to_string()));
        }

        let removed = self.items.remove(index);
        self.snapshot.publish(&self.items);
        info!("Removed {} from queue", removed.title);
        Ok(removed)
    }

    /// Remove every item; refused while any is downloading
    pub fn clear(&mut self) -> Result<usize> {
        if let Some(active) = self.items.iter().find(|item| item.status.is_active()) {
            return Err(MediaQueueError::ItemBusy(active.url.clone()));
        }

        let count = self.items.len();
        self.items.clear();
        self.snapshot.publish(&self.items);
        info!("Cleared {} items from queue", count);
        Ok(count)
    }

    /// Process the whole queue in order
    ///
    /// Clears any earlier cancel first. A failed item does not stop the run;
    /// a cancel does, leaving later items untouched.
    pub async fn run_queue(&mut self, provider: &dyn MediaProvider, sink: &dyn UiSink) -> RunSummary {
        let token = self.cancel.arm();
        let mut summary = RunSummary::default();
        info!("Queue run started with {} items", self.items.len());

        for index in 0..self.items.len() {
            if token.is_cancelled() {
                info!("Cancellation observed, stopping before item {}", index + 1);
                summary.canceled = true;
                break;
            }

            match self.process_item(index, provider, sink, &token).await {
                ItemOutcome::Completed => summary.completed += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
                ItemOutcome::Failed => summary.failed += 1,
                ItemOutcome::Canceled => {
                    summary.canceled = true;
                    break;
                }
            }
        }

        info!(
            "Queue run finished: {} completed, {} skipped, {} failed, canceled={}",
            summary.completed, summary.skipped, summary.failed, summary.canceled
        );
        summary
    }

    /// Existing file for an item: the recorded path, else the pre-download guess
    fn existing_target(&self, item: &QueueItem) -> Option<PathBuf> {
        let guess = guess_target_path(&self.download_dir, &item.title, GUESS_EXTENSION);
        item.target_file_path
            .iter()
            .chain(std::iter::once(&guess))
            .find(|path| path.is_file())
            .cloned()
    }

    async fn process_item(
        &mut self,
        index: usize,
        provider: &dyn MediaProvider,
        sink: &dyn UiSink,
        token: &CancellationToken,
    ) -> ItemOutcome {
        if let Some(existing) = self.existing_target(&self.items[index]) {
            let item = &mut self.items[index];
            debug!("{} already at {}, skipping download", item.title, existing.display());
            item.target_file_path = Some(existing);
            item.progress_text = None;
            set_status(item, ItemStatus::Play, sink, &self.snapshot);
            return ItemOutcome::Skipped;
        }

        let request = {
            let item = &mut self.items[index];
            let tag = item.chosen_option.resolution_tag;
            item.progress_text = Some(format!("Starting download ({})...", tag.describe()));
            set_status(item, ItemStatus::Starting, sink, &self.snapshot);

            DownloadRequest {
                url: item.url.clone(),
                format_selector: tag.format_selector(),
                destination_dir: self.download_dir.clone(),
                name_template: NAME_TEMPLATE.to_string(),
                merge_tools: self.merge_tools.clone(),
                cancel: token.clone(),
            }
        };

        let snapshot = &self.snapshot;
        let item = &mut self.items[index];

        let result = {
            let mut last_bytes = 0u64;
            let mut on_progress = |event: &DownloadProgressEvent| -> ControlFlow<()> {
                if token.is_cancelled() {
                    return ControlFlow::Break(());
                }
                apply_progress(item, event, &mut last_bytes, sink, snapshot);
                ControlFlow::Continue(())
            };
            provider.download(request, &mut on_progress).await
        };

        item.progress_text = None;
        match result {
            Ok(outcome) => {
                if !outcome.final_path.as_os_str().is_empty() {
                    item.target_file_path = Some(outcome.final_path);
                } else {
                    let ext = if outcome.extension.is_empty() {
                        GUESS_EXTENSION
                    } else {
                        outcome.extension.as_str()
                    };
                    let title = if outcome.title.is_empty() { &item.title } else { &outcome.title };
                    item.target_file_path = Some(guess_target_path(&self.download_dir, title, ext));
                }

                if token.is_cancelled() {
                    set_status(item, ItemStatus::Canceled, sink, snapshot);
                    return ItemOutcome::Canceled;
                }
                set_status(item, ItemStatus::Play, sink, snapshot);
                ItemOutcome::Completed
            }
            Err(e) if e.is_cancellation() || token.is_cancelled() => {
                info!("{} canceled", item.title);
                set_status(item, ItemStatus::Canceled, sink, snapshot);
                ItemOutcome::Canceled
            }
            Err(e) => {
                let raw = match e {
                    MediaQueueError::DownloadFailure(message) => message,
                    other => other.to_string(),
                };
                warn!("{} failed: {}", item.title, raw);
                set_status(item, ItemStatus::Error, sink, snapshot);

                let classification = self.classifier.classify(&raw);
                sink.on_failure_notice(&FailureNotice {
                    category: classification.category,
                    message: classification.message,
                    title: item.title.clone(),
                    url: item.url.clone(),
                });
                ItemOutcome::Failed
            }
        }
    }
}

fn set_status(item: &mut QueueItem, next: ItemStatus, sink: &dyn UiSink, snapshot: &QueueSnapshot) {
    if item.status == next {
        return;
    }
    if !item.status.can_transition_to(next) {
        warn!("Unexpected transition {} -> {} for {}", item.status, next, item.url);
    }
    debug!("{}: {} -> {}", item.title, item.status, next);
    item.status = next;
    snapshot.upsert(item);
    sink.on_item_status_changed(item);
}

/// Fold one progress report into the item
fn apply_progress(
    item: &mut QueueItem,
    event: &DownloadProgressEvent,
    last_bytes: &mut u64,
    sink: &dyn UiSink,
    snapshot: &QueueSnapshot,
) {
    match event.phase {
        ProgressPhase::Downloading => {
            if event.bytes_downloaded < *last_bytes {
                debug!("Dropping out-of-order progress for {}", item.url);
                return;
            }
            *last_bytes = event.bytes_downloaded;

            let text = event.render();
            item.progress_text = Some(text.clone());
            if item.status != ItemStatus::Downloading {
                set_status(item, ItemStatus::Downloading, sink, snapshot);
            } else {
                snapshot.upsert(item);
            }
            sink.on_item_progress(item, &text);
        }
        ProgressPhase::Finished => {
            *last_bytes = 0;
            item.progress_text = Some("Processing...".to_string());
            set_status(item, ItemStatus::Processing, sink, snapshot);
        }
    }
}
