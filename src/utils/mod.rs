//! Error handling, configuration and platform helpers

pub mod config;
pub mod error;
pub mod filename;
pub mod platform;

// Re-export for convenience
pub use config::AppSettings;
pub use error::MediaQueueError;
pub use filename::{guess_target_path, sanitize_filename};
