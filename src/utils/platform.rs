//! Platform-specific utilities for mediaqueue
//!
//! This module provides cross-platform abstractions for:
//! - Application directories (config, data)
//! - The default download folder
//! - Executable naming

use std::path::PathBuf;

/// Returns the application data directory
/// - macOS: ~/Library/Application Support/MediaQueue
/// - Windows: %APPDATA%\MediaQueue
/// - Linux: ~/.local/share/mediaqueue
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_dir_name())
}

/// Returns the default download directory
///
/// The user's Downloads folder, else the home directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the configuration directory
/// - macOS/Windows: same as [`app_data_dir`]
/// - Linux: ~/.config/mediaqueue
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app_dir_name())
    }

    #[cfg(not(target_os = "linux"))]
    {
        app_data_dir()
    }
}

/// Directory containing the running executable
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()))
}

/// Platform-specific executable extension
pub fn exe_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ".exe"
    }
    #[cfg(not(target_os = "windows"))]
    {
        ""
    }
}

/// Executable file name for a tool, e.g. `ffmpeg` or `ffmpeg.exe`
pub fn exe_name(tool: &str) -> String {
    format!("{}{}", tool, exe_extension())
}

fn app_dir_name() -> &'static str {
    if cfg!(target_os = "linux") {
        "mediaqueue"
    } else {
        "MediaQueue"
    }
}
