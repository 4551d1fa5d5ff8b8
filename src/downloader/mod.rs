//! Progress reporting and human-readable formatting for downloads

pub mod format;
pub mod progress;

pub use format::{human_size, human_size_opt, human_speed};
pub use progress::{DownloadProgressEvent, ProgressPhase};
