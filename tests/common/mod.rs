//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mediaqueue::catalog::QualityOption;
use mediaqueue::downloader::DownloadProgressEvent;
use mediaqueue::extractor::{
    DownloadOutcome, DownloadRequest, MediaInfo, MediaProvider, ProgressCallback, StreamDescriptor,
};
use mediaqueue::queue::{CancelSwitch, FailureNotice, ItemStatus, QueueItem, UiSink};
use mediaqueue::MediaQueueError;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Mutex;

/// What the fake provider does when asked to download a URL
#[derive(Clone)]
pub enum Behaviour {
    /// Two progress reports, a finished phase, then a file on disk
    Succeed,
    /// One progress report, then a failure with this raw text
    Fail(String),
    /// Trips the switch after the first report, as a user pressing cancel
    CancelMidway(CancelSwitch),
}

#[derive(Default)]
pub struct FakeProvider {
    catalogs: HashMap<String, MediaInfo>,
    behaviours: HashMap<String, Behaviour>,
    downloads: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, url: &str, title: &str, behaviour: Behaviour) -> Self {
        self.catalogs.insert(url.to_string(), sample_media(url, title));
        self.behaviours.insert(url.to_string(), behaviour);
        self
    }

    /// URLs the provider was asked to download, in order
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

/// 480p and 720p video-only streams plus one audio stream, with exact sizes
pub fn sample_media(url: &str, title: &str) -> MediaInfo {
    let video = |height: u32, size: u64| StreamDescriptor {
        format_id: format!("v{}", height),
        ext: "mp4".to_string(),
        height: Some(height),
        vcodec: Some("avc1".to_string()),
        acodec: Some("none".to_string()),
        filesize: Some(size),
        ..Default::default()
    };
    MediaInfo {
        title: title.to_string(),
        url: url.to_string(),
        duration: Some(60.0),
        formats: vec![
            video(480, 4_000_000),
            video(720, 8_000_000),
            StreamDescriptor {
                format_id: "a1".to_string(),
                ext: "m4a".to_string(),
                vcodec: Some("none".to_string()),
                acodec: Some("mp4a".to_string()),
                abr: Some(128.0),
                filesize: Some(1_000_000),
                ..Default::default()
            },
        ],
    }
}

#[async_trait]
impl MediaProvider for FakeProvider {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn fetch_catalog(&self, url: &str) -> mediaqueue::Result<MediaInfo> {
        self.catalogs
            .get(url)
            .cloned()
            .ok_or_else(|| MediaQueueError::ExtractionFailure(format!("ERROR: Unsupported URL: {}", url)))
    }

    async fn download(
        &self,
        request: DownloadRequest,
        progress: &mut ProgressCallback<'_>,
    ) -> mediaqueue::Result<DownloadOutcome> {
        self.downloads.lock().unwrap().push(request.url.clone());
        let behaviour = self
            .behaviours
            .get(&request.url)
            .cloned()
            .unwrap_or(Behaviour::Succeed);
        let title = self
            .catalogs
            .get(&request.url)
            .map(|m| m.title.clone())
            .unwrap_or_default();

        let mut report = |event: DownloadProgressEvent| -> mediaqueue::Result<()> {
            match progress(&event) {
                ControlFlow::Continue(()) => Ok(()),
                ControlFlow::Break(()) => Err(MediaQueueError::CancellationRequested),
            }
        };

        match behaviour {
            Behaviour::Succeed => {
                report(DownloadProgressEvent::downloading(50, Some(100)))?;
                report(DownloadProgressEvent::downloading(100, Some(100)))?;
                report(DownloadProgressEvent::finished())?;

                let final_path = request.destination_dir.join(format!("{}.mp4", title));
                tokio::fs::write(&final_path, b"media").await?;
                Ok(DownloadOutcome {
                    title,
                    extension: "mp4".to_string(),
                    final_path,
                })
            }
            Behaviour::Fail(raw) => {
                report(DownloadProgressEvent::downloading(10, None))?;
                Err(MediaQueueError::DownloadFailure(raw))
            }
            Behaviour::CancelMidway(switch) => {
                report(DownloadProgressEvent::downloading(10, Some(100)))?;
                switch.trigger();
                report(DownloadProgressEvent::downloading(20, Some(100)))?;
                Err(MediaQueueError::DownloadFailure(
                    "provider ignored cancellation".to_string(),
                ))
            }
        }
    }
}

/// Sink that records everything it is told
#[derive(Default)]
pub struct RecordingSink {
    pub catalogs: Mutex<Vec<(String, Vec<QualityOption>)>>,
    pub catalog_failures: Mutex<Vec<(String, String)>>,
    pub statuses: Mutex<Vec<(String, ItemStatus)>>,
    pub progress: Mutex<Vec<(String, String)>>,
    pub notices: Mutex<Vec<FailureNotice>>,
}

impl RecordingSink {
    pub fn statuses_for(&self, url: &str) -> Vec<ItemStatus> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn progress_for(&self, url: &str) -> Vec<String> {
        self.progress
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, t)| t.clone())
            .collect()
    }
}

impl UiSink for RecordingSink {
    fn on_catalog_ready(&self, url: &str, _title: &str, options: &[QualityOption]) {
        self.catalogs
            .lock()
            .unwrap()
            .push((url.to_string(), options.to_vec()));
    }

    fn on_catalog_failed(&self, url: &str, reason: &str) {
        self.catalog_failures
            .lock()
            .unwrap()
            .push((url.to_string(), reason.to_string()));
    }

    fn on_item_status_changed(&self, item: &QueueItem) {
        self.statuses
            .lock()
            .unwrap()
            .push((item.url.clone(), item.status));
    }

    fn on_item_progress(&self, item: &QueueItem, text: &str) {
        self.progress
            .lock()
            .unwrap()
            .push((item.url.clone(), text.to_string()));
    }

    fn on_failure_notice(&self, notice: &FailureNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
