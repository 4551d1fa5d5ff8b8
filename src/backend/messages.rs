use crate::catalog::QualityOption;
use crate::queue::{FailureNotice, QueueItem, RunSummary, UiSink};
use tokio::sync::mpsc;

/// Commands sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    FetchCatalog {
        url: String,
    },
    AddItem {
        url: String,
        /// Option label or resolution tag, e.g. `720p`
        selection: Option<String>,
    },
    RunQueue,
    RemoveItem(String),
    ClearAll,
    // System
    Shutdown,
}

/// Events sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendEvent {
    // Catalog
    CatalogReady {
        url: String,
        title: String,
        options: Vec<QualityOption>,
    },
    CatalogFailed {
        url: String,
        reason: String,
    },

    // Queue membership
    ItemAdded(QueueItem),
    ItemRemoved {
        url: String,
    },
    QueueCleared {
        count: usize,
    },
    /// A command was refused (duplicate, busy, missing selection ...)
    Rejected {
        url: Option<String>,
        reason: String,
    },

    // Download life-cycle
    StatusChanged(QueueItem),
    Progress {
        url: String,
        text: String,
    },
    Failure(FailureNotice),
    RunFinished(RunSummary),
}

/// [`UiSink`] that forwards every notification as a [`BackendEvent`]
///
/// Sending never blocks; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::UnboundedSender<BackendEvent>,
}

impl EventSink {
    pub fn new(sender: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self { sender }
    }

    pub fn emit(&self, event: BackendEvent) {
        let _ = self.sender.send(event);
    }
}

impl UiSink for EventSink {
    fn on_catalog_ready(&self, url: &str, title: &str, options: &[QualityOption]) {
        self.emit(BackendEvent::CatalogReady {
            url: url.to_string(),
            title: title.to_string(),
            options: options.to_vec(),
        });
    }

    fn on_catalog_failed(&self, url: &str, reason: &str) {
        self.emit(BackendEvent::CatalogFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        });
    }

    fn on_item_status_changed(&self, item: &QueueItem) {
        self.emit(BackendEvent::StatusChanged(item.clone()));
    }

    fn on_item_progress(&self, item: &QueueItem, text: &str) {
        self.emit(BackendEvent::Progress {
            url: item.url.clone(),
            text: text.to_string(),
        });
    }

    fn on_failure_notice(&self, notice: &FailureNotice) {
        self.emit(BackendEvent::Failure(notice.clone()));
    }
}
