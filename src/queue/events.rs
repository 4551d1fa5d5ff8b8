//! Notifications from the worker to the UI collaborator

use crate::catalog::QualityOption;
use crate::classifier::ErrorCategory;
use crate::queue::QueueItem;
use std::fmt;

/// A classified download failure, one per failed item
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub category: ErrorCategory,
    pub message: String,
    pub title: String,
    pub url: String,
}

impl fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Video: {}\nURL: {}\n\n{}", self.title, self.url, self.message)
    }
}

/// Receiver of worker notifications
///
/// Called from the worker; implementations must return quickly and never
/// block (forward to a channel, repaint later).
pub trait UiSink: Send + Sync {
    fn on_catalog_ready(&self, url: &str, title: &str, options: &[QualityOption]);

    fn on_catalog_failed(&self, url: &str, reason: &str);

    fn on_item_status_changed(&self, item: &QueueItem);

    fn on_item_progress(&self, item: &QueueItem, text: &str);

    fn on_failure_notice(&self, notice: &FailureNotice);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl UiSink for NullSink {
    fn on_catalog_ready(&self, _url: &str, _title: &str, _options: &[QualityOption]) {}
    fn on_catalog_failed(&self, _url: &str, _reason: &str) {}
    fn on_item_status_changed(&self, _item: &QueueItem) {}
    fn on_item_progress(&self, _item: &QueueItem, _text: &str) {}
    fn on_failure_notice(&self, _notice: &FailureNotice) {}
}
