//! Mediaqueue library
//!
//! Resolves a media URL into a short list of quality options with size
//! estimates, queues chosen downloads and runs them one at a time through
//! yt-dlp, turning raw failures into readable notices.

pub mod backend;
pub mod catalog;
pub mod classifier;
pub mod downloader;
pub mod extractor;
pub mod queue;
pub mod utils;

// Re-export main types for easier use
pub use backend::{BackendCommand, BackendEvent, BackendHandle};
pub use catalog::{build_catalog, Catalog, QualityOption, ResolutionTag};
pub use classifier::{classify, Classification, ErrorCategory, ErrorClassifier, RuleClassifier};
pub use downloader::{DownloadProgressEvent, ProgressPhase};
pub use extractor::{MediaInfo, MediaProvider, StreamDescriptor, YtDlpProvider};
pub use queue::{DownloadOrchestrator, ItemStatus, QueueItem, RunSummary, UiSink};
pub use utils::error::Result;
pub use utils::{AppSettings, MediaQueueError};
