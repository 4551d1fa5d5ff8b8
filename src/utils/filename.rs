//! Filename helpers for target path guesses

use std::path::{Path, PathBuf};

/// Sanitize a media title for use as a filename
///
/// # Examples
/// ```
/// use mediaqueue::utils::filename::sanitize_filename;
/// assert_eq!(sanitize_filename("../../etc/passwd"), "_etc_passwd");
/// assert_eq!(sanitize_filename(".hidden"), "hidden");
/// assert_eq!(sanitize_filename("AC/DC: Live"), "AC_DC_ Live");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    // Characters invalid on Windows/macOS/Linux filesystems
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

    let mut sanitized = name.replace("..", "");

    sanitized = sanitized
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect();

    // Leading dots (hidden files), trailing dots (Windows)
    sanitized = sanitized.trim().trim_start_matches('.').to_string();
    sanitized = sanitized.trim_end_matches('.').trim_end().to_string();

    while sanitized.contains("__") {
        sanitized = sanitized.replace("__", "_");
    }

    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    if sanitized.chars().count() > 200 {
        sanitized = sanitized.chars().take(200).collect();
    }

    sanitized
}

/// Pre-download guess of where a title will land
pub fn guess_target_path(dir: &Path, title: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", sanitize_filename(title), extension))
}
