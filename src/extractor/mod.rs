pub mod merge_tools;
pub mod models;
pub mod traits;
pub mod ytdlp;

pub use merge_tools::MergeTools;
pub use models::{DownloadOutcome, MediaInfo, StreamDescriptor};
pub use traits::{DownloadRequest, MediaProvider, ProgressCallback};
pub use ytdlp::YtDlpProvider;
