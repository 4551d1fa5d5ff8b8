//! Application configuration

use crate::utils::error::Result;
use crate::utils::platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Download location
    pub download_location: PathBuf,

    /// Explicit yt-dlp binary, skips discovery when set
    pub ytdlp_path: Option<PathBuf>,

    /// Directory holding ffmpeg and ffprobe
    pub ffmpeg_dir: Option<PathBuf>,

    /// Container used when separate streams are merged
    pub merge_output_format: String,

    /// Network timeout handed to yt-dlp (seconds)
    pub socket_timeout_secs: u64,

    /// Let the server pick chunking (`--http-chunk-size 0`)
    pub disable_http_chunking: bool,

    /// Continue partially downloaded files
    pub resume_partial: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_location: platform::default_download_dir(),
            ytdlp_path: None,
            ffmpeg_dir: None,
            merge_output_format: "mp4".to_string(),
            socket_timeout_secs: 15,
            disable_http_chunking: true,
            resume_partial: false,
        }
    }
}

impl AppSettings {
    /// Default settings file location
    pub fn default_path() -> PathBuf {
        platform::config_dir().join("settings.json")
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
