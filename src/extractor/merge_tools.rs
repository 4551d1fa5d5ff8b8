//! Locates ffmpeg and ffprobe, needed to merge separate audio/video streams

use crate::utils::platform::{exe_dir, exe_name};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Paths of both merge executables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Find ffmpeg and ffprobe with priority:
/// 1. `preferred_dir` (user setting), else `<exe dir>/ffmpeg/bin`
/// 2. System PATH
///
/// Returns `None` when either is missing; callers carry on without them.
pub fn locate(preferred_dir: Option<&Path>) -> Option<MergeTools> {
    let bundled = exe_dir().map(|dir| dir.join("ffmpeg").join("bin"));
    let bin_dir = preferred_dir.map(Path::to_path_buf).or(bundled);

    if let Some(tools) = bin_dir.as_deref().and_then(find_in_dir) {
        info!("✓ Using ffmpeg from {}", tools.ffmpeg.display());
        return Some(tools);
    }

    if let Some(tools) = find_in_path() {
        info!("✓ Using system ffmpeg: {}", tools.ffmpeg.display());
        return Some(tools);
    }

    warn!("✗ ffmpeg/ffprobe not found; downloads needing a merge may fail");
    None
}

/// Both executables present as files in `dir`
pub fn find_in_dir(dir: &Path) -> Option<MergeTools> {
    let ffmpeg = dir.join(exe_name("ffmpeg"));
    let ffprobe = dir.join(exe_name("ffprobe"));
    debug!("Checking merge tools in {}", dir.display());

    (ffmpeg.is_file() && ffprobe.is_file()).then_some(MergeTools { ffmpeg, ffprobe })
}

fn find_in_path() -> Option<MergeTools> {
    let ffmpeg = which::which("ffmpeg").ok().filter(|p| p.is_file())?;
    let ffprobe = which::which("ffprobe").ok().filter(|p| p.is_file())?;
    Some(MergeTools { ffmpeg, ffprobe })
}
