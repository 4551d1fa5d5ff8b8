//! Progress events coming from the download provider

use crate::downloader::format::{human_size, human_speed};

/// Phase of the substream currently being transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Downloading,
    Finished,
}

/// One progress report. Ephemeral: consumed immediately by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgressEvent {
    pub phase: ProgressPhase,
    pub bytes_downloaded: u64,
    pub bytes_total: Option<u64>,
    pub bytes_per_second: Option<f64>,
    /// Provider's own percent string, used when the total is unknown
    pub percent_hint: Option<String>,
}

impl DownloadProgressEvent {
    pub fn downloading(bytes_downloaded: u64, bytes_total: Option<u64>) -> Self {
        Self {
            phase: ProgressPhase::Downloading,
            bytes_downloaded,
            bytes_total,
            bytes_per_second: None,
            percent_hint: None,
        }
    }

    pub fn finished() -> Self {
        Self {
            phase: ProgressPhase::Finished,
            bytes_downloaded: 0,
            bytes_total: None,
            bytes_per_second: None,
            percent_hint: None,
        }
    }

    pub fn with_speed(mut self, bytes_per_second: f64) -> Self {
        self.bytes_per_second = Some(bytes_per_second);
        self
    }

    pub fn with_percent_hint(mut self, hint: impl Into<String>) -> Self {
        self.percent_hint = Some(hint.into());
        self
    }

    /// Percent complete (0-100), only when the total is known
    pub fn percentage(&self) -> Option<f64> {
        match self.bytes_total {
            Some(total) if total > 0 => Some(self.bytes_downloaded as f64 / total as f64 * 100.0),
            _ => None,
        }
    }

    /// Status line shown while downloading, e.g.
    /// `98.9% (127.5 MiB/128.9 MiB)  --  5.2 MiB/s`
    pub fn render(&self) -> String {
        let (percent, total) = match (self.percentage(), self.bytes_total) {
            (Some(pct), Some(total)) => (format!("{:.1}%", pct), human_size(total as f64)),
            _ => {
                let hint = self
                    .percent_hint
                    .as_deref()
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .unwrap_or("0.0%");
                (hint.to_string(), "?".to_string())
            }
        };

        format!(
            "{} ({}/{})  --  {}",
            percent,
            human_size(self.bytes_downloaded as f64),
            total,
            human_speed(self.bytes_per_second)
        )
    }
}
