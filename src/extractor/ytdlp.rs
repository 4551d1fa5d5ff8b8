//! yt-dlp wrapper for catalog extraction and downloads
//!
//! Catalogs come from `yt-dlp --dump-json`. Downloads run yt-dlp with a
//! machine-readable progress template and an `after_move` print so the
//! final title, extension and path can be read back from stdout.

use crate::downloader::{DownloadProgressEvent, ProgressPhase};
use crate::extractor::models::{DownloadOutcome, MediaInfo};
use crate::extractor::traits::{DownloadRequest, MediaProvider, ProgressCallback};
use crate::utils::config::AppSettings;
use crate::utils::error::{MediaQueueError, Result};
use crate::utils::platform::{exe_dir, exe_name};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

const PROGRESS_MARK: &str = "[mq-progress] ";
const DONE_MARK: &str = "[mq-done] ";

/// Catalog and download provider backed by the yt-dlp CLI
#[derive(Debug, Clone)]
pub struct YtDlpProvider {
    ytdlp_path: PathBuf,
    merge_output_format: String,
    socket_timeout_secs: u64,
    disable_http_chunking: bool,
    resume_partial: bool,
}

impl YtDlpProvider {
    /// Initialize provider and verify yt-dlp availability
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let ytdlp_path = match settings.ytdlp_path.clone().filter(|p| p.exists()) {
            Some(path) => path,
            None => find_ytdlp().ok_or_else(|| {
                error!("yt-dlp not found anywhere!");
                MediaQueueError::YtDlpNotFound
            })?,
        };
        info!("Found yt-dlp at: {}", ytdlp_path.display());

        Ok(Self::with_path(ytdlp_path, settings))
    }

    /// Use a known yt-dlp binary
    pub fn with_path(ytdlp_path: PathBuf, settings: &AppSettings) -> Self {
        Self {
            ytdlp_path,
            merge_output_format: settings.merge_output_format.clone(),
            socket_timeout_secs: settings.socket_timeout_secs,
            disable_http_chunking: settings.disable_http_chunking,
            resume_partial: settings.resume_partial,
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    /// Command line for one download
    pub fn download_args(&self, request: &DownloadRequest) -> Vec<String> {
        let output = request
            .destination_dir
            .join(&request.name_template)
            .to_string_lossy()
            .to_string();

        let mut args = vec![
            "-f".to_string(),
            request.format_selector.clone(),
            "-o".to_string(),
            output,
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-colors".to_string(),
            "--encoding".to_string(),
            "utf-8".to_string(),
            "--newline".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{}%(progress.status)s|%(progress.downloaded_bytes)s|\
                 %(progress.total_bytes)s|%(progress.total_bytes_estimate)s|\
                 %(progress.speed)s|%(progress._percent_str)s",
                PROGRESS_MARK
            ),
            "--no-simulate".to_string(),
            "--print".to_string(),
            format!("after_move:{}%(ext)s\t%(filepath)s\t%(title)s", DONE_MARK),
            "--merge-output-format".to_string(),
            self.merge_output_format.clone(),
            "--socket-timeout".to_string(),
            self.socket_timeout_secs.to_string(),
        ];

        if self.disable_http_chunking {
            args.push("--http-chunk-size".to_string());
            args.push("0".to_string());
        }
        if !self.resume_partial {
            args.push("--no-continue".to_string());
        }
        if let Some(tools) = &request.merge_tools {
            args.push("--ffmpeg-location".to_string());
            args.push(tools.ffmpeg.to_string_lossy().to_string());
        }

        args.push(request.url.clone());
        args
    }
}

#[async_trait]
impl MediaProvider for YtDlpProvider {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    /// Uses: yt-dlp --dump-json --no-download
    async fn fetch_catalog(&self, url: &str) -> Result<MediaInfo> {
        debug!("Extracting media info for URL: {}", url);

        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-warnings")
            .arg("--no-playlist")
            .arg("--encoding")
            .arg("utf-8")
            .arg(url)
            .output()
            .await
            .map_err(|e| MediaQueueError::ExtractionFailure(e.to_string()))?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp extraction failed: {}", error_msg);
            return Err(MediaQueueError::ExtractionFailure(error_msg.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut info: MediaInfo = serde_json::from_str(&stdout)
            .map_err(|e| MediaQueueError::ExtractionFailure(e.to_string()))?;
        if info.url.is_empty() {
            info.url = url.to_string();
        }

        debug!("Got {} formats for {}", info.formats.len(), info.title);
        Ok(info)
    }

    async fn download(
        &self,
        request: DownloadRequest,
        progress: &mut ProgressCallback<'_>,
    ) -> Result<DownloadOutcome> {
        let args = self.download_args(&request);
        debug!("Running yt-dlp {:?}", args);

        tokio::fs::create_dir_all(&request.destination_dir).await?;

        let mut child = AsyncCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaQueueError::DownloadFailure(format!("Failed to start yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaQueueError::DownloadFailure("yt-dlp stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaQueueError::DownloadFailure("yt-dlp stderr unavailable".into()))?;

        // Drained to EOF so yt-dlp never blocks or dies on a closed pipe
        let stderr_reader = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            let mut collected = Vec::new();
            loop {
                match read_lossy_line(&mut reader, &mut buf).await {
                    Ok(Some(line)) => collected.push(line),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Reading yt-dlp stderr failed: {}", e);
                        break;
                    }
                }
            }
            collected
        });

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut outcome = None;
        let mut aborted = false;

        loop {
            let line = tokio::select! {
                _ = request.cancel.cancelled() => {
                    aborted = true;
                    break;
                }
                line = read_lossy_line(&mut reader, &mut buf) => line?,
            };
            let Some(line) = line else { break };

            match parse_output_line(&line) {
                Some(OutputLine::Progress(event)) => {
                    if progress(&event).is_break() {
                        aborted = true;
                        break;
                    }
                }
                Some(OutputLine::Done(done)) => outcome = Some(done),
                None => debug!("yt-dlp: {}", line),
            }
        }

        if aborted {
            info!("Aborting yt-dlp for {}", request.url);
            if let Err(e) = child.kill().await {
                warn!("Failed to kill yt-dlp: {}", e);
            }
            stderr_reader.abort();
            return Err(MediaQueueError::CancellationRequested);
        }

        let status = child.wait().await?;
        let stderr_lines = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            let message = failure_message(&stderr_lines)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
            warn!("yt-dlp failed for {}: {}", request.url, message);
            return Err(MediaQueueError::DownloadFailure(message));
        }

        outcome.ok_or_else(|| {
            MediaQueueError::DownloadFailure(
                failure_message(&stderr_lines)
                    .unwrap_or_else(|| "yt-dlp did not report an output file".to_string()),
            )
        })
    }
}

/// Read one line, replacing invalid UTF-8 instead of failing
///
/// `None` at end of stream. The trailing line break is removed.
async fn read_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Recognised stdout lines
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Progress(DownloadProgressEvent),
    Done(DownloadOutcome),
}

/// Parse one stdout line printed through our templates
pub fn parse_output_line(line: &str) -> Option<OutputLine> {
    let line = strip_ansi(line.trim());

    if let Some(rest) = line.strip_prefix(PROGRESS_MARK.trim_end()) {
        return parse_progress(rest.trim()).map(OutputLine::Progress);
    }

    if let Some(rest) = line.strip_prefix(DONE_MARK.trim_end()) {
        let mut parts = rest.trim_start().splitn(3, '\t');
        let extension = parts.next()?.trim().to_string();
        let final_path = PathBuf::from(parts.next()?.trim());
        let title = parts.next().unwrap_or_default().trim().to_string();
        return Some(OutputLine::Done(DownloadOutcome {
            title,
            extension,
            final_path,
        }));
    }

    None
}

fn parse_progress(rest: &str) -> Option<DownloadProgressEvent> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let [status, downloaded, total, estimate, speed, percent] = fields.as_slice() else {
        return None;
    };

    let phase = match *status {
        "downloading" => ProgressPhase::Downloading,
        "finished" => ProgressPhase::Finished,
        _ => return None,
    };

    let downloaded = parse_number(downloaded).map(|n| n as u64).unwrap_or(0);
    let total = parse_number(total)
        .or_else(|| parse_number(estimate))
        .filter(|n| *n > 0.0)
        .map(|n| n as u64);

    let mut event = DownloadProgressEvent {
        phase,
        bytes_downloaded: downloaded,
        bytes_total: total,
        bytes_per_second: None,
        percent_hint: None,
    };
    if let Some(speed) = parse_number(speed) {
        event = event.with_speed(speed);
    }
    if !percent.is_empty() && *percent != "NA" {
        event = event.with_percent_hint(*percent);
    }
    Some(event)
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}

/// Drop terminal colour sequences (`ESC [ ... m`)
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Last `ERROR:` line, else last non-empty stderr line
fn failure_message(stderr_lines: &[String]) -> Option<String> {
    stderr_lines
        .iter()
        .rev()
        .find(|l| l.contains("ERROR"))
        .or_else(|| stderr_lines.iter().rev().find(|l| !l.trim().is_empty()))
        .map(|l| l.trim().to_string())
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Bundled (next to the executable, or inside a macOS .app bundle)
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(bundled) = find_bundled_ytdlp() {
        info!("✓ Using bundled yt-dlp: {:?}", bundled);
        return Some(bundled);
    }

    if let Ok(system) = which::which("yt-dlp") {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

fn find_bundled_ytdlp() -> Option<PathBuf> {
    let dir = exe_dir()?;

    let adjacent = dir.join(exe_name("yt-dlp"));
    if is_executable(&adjacent) {
        return Some(adjacent);
    }

    // Structure: App.app/Contents/MacOS/mediaqueue
    //                          /Resources/bin/yt-dlp
    if dir.ends_with("MacOS") {
        let bundled = dir.parent()?.join("Resources").join("bin").join("yt-dlp");
        if is_executable(&bundled) {
            return Some(bundled);
        }
    }

    None
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates.into_iter().find(|p| is_executable(p))
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ============================================================
// Tests
// ============================================================
