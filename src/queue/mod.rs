//! Download queue: items, cancellation and the orchestrator

pub mod cancel;
pub mod events;
pub mod item;
pub mod orchestrator;

pub use cancel::{CancelSwitch, QueueSnapshot};
pub use events::{FailureNotice, NullSink, UiSink};
pub use item::{ItemStatus, QueueItem, StatusTag};
pub use orchestrator::{DownloadOrchestrator, RunSummary, NAME_TEMPLATE};
