use super::messages::{BackendCommand, BackendEvent, EventSink};
use crate::catalog::Catalog;
use crate::extractor::{merge_tools, MediaProvider, YtDlpProvider};
use crate::queue::{CancelSwitch, DownloadOrchestrator, QueueItem, QueueSnapshot};
use crate::utils::config::AppSettings;
use crate::utils::error::MediaQueueError;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the command channel
const COMMAND_BUFFER: usize = 32;

/// Catalogs kept for URLs fetched but not yet queued
const CATALOG_CACHE_LIMIT: usize = 32;

/// Fetched catalogs awaiting an AddItem, oldest evicted first
#[derive(Debug, Default)]
struct CatalogCache {
    entries: VecDeque<Catalog>,
}

impl CatalogCache {
    fn get(&self, url: &str) -> Option<&Catalog> {
        self.entries.iter().find(|c| c.url == url)
    }

    fn insert(&mut self, catalog: Catalog) {
        self.take(&catalog.url);
        if self.entries.len() >= CATALOG_CACHE_LIMIT {
            self.entries.pop_front();
        }
        self.entries.push_back(catalog);
    }

    fn take(&mut self, url: &str) -> Option<Catalog> {
        let index = self.entries.iter().position(|c| c.url == url)?;
        self.entries.remove(index)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Worker that owns the queue and processes commands one at a time
pub struct BackendActor {
    receiver: mpsc::Receiver<BackendCommand>,
    sink: EventSink,

    // Components
    provider: Arc<dyn MediaProvider>,
    orchestrator: DownloadOrchestrator,
    catalogs: CatalogCache,
}

impl BackendActor {
    /// Build an actor backed by yt-dlp, configured from `settings`
    pub fn new(
        settings: &AppSettings,
        receiver: mpsc::Receiver<BackendCommand>,
        sender: mpsc::UnboundedSender<BackendEvent>,
    ) -> Result<Self> {
        let provider = YtDlpProvider::new(settings)?;
        let tools = merge_tools::locate(settings.ffmpeg_dir.as_deref());
        let orchestrator = DownloadOrchestrator::new(&settings.download_location, tools);

        Ok(Self::with_components(
            Arc::new(provider),
            orchestrator,
            receiver,
            sender,
        ))
    }

    pub fn with_components(
        provider: Arc<dyn MediaProvider>,
        orchestrator: DownloadOrchestrator,
        receiver: mpsc::Receiver<BackendCommand>,
        sender: mpsc::UnboundedSender<BackendEvent>,
    ) -> Self {
        Self {
            receiver,
            sink: EventSink::new(sender),
            provider,
            orchestrator,
            catalogs: CatalogCache::default(),
        }
    }

    pub async fn run(mut self) {
        info!("BackendActor started with provider {}", self.provider.id());

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                BackendCommand::FetchCatalog { url } => {
                    self.handle_fetch_catalog(url).await;
                }
                BackendCommand::AddItem { url, selection } => {
                    self.handle_add_item(url, selection).await;
                }
                BackendCommand::RunQueue => {
                    let summary = self
                        .orchestrator
                        .run_queue(self.provider.as_ref(), &self.sink)
                        .await;
                    self.sink.emit(BackendEvent::RunFinished(summary));
                }
                BackendCommand::RemoveItem(url) => match self.orchestrator.remove(&url) {
                    Ok(_) => {
                        self.catalogs.take(&url);
                        self.sink.emit(BackendEvent::ItemRemoved { url });
                    }
                    Err(e) => self.reject(Some(url), e),
                },
                BackendCommand::ClearAll => match self.orchestrator.clear() {
                    Ok(count) => {
                        self.catalogs.clear();
                        self.sink.emit(BackendEvent::QueueCleared { count });
                    }
                    Err(e) => self.reject(None, e),
                },
                BackendCommand::Shutdown => {
                    info!("BackendActor shutting down");
                    break;
                }
            }
        }
    }

    async fn handle_fetch_catalog(&mut self, url: String) {
        let url = url.trim().to_string();
        if let Ok(catalog) = self
            .orchestrator
            .fetch_catalog(self.provider.as_ref(), &url, &self.sink)
            .await
        {
            self.catalogs.insert(catalog);
        }
    }

    async fn handle_add_item(&mut self, url: String, selection: Option<String>) {
        let url = url.trim().to_string();
        if self.orchestrator.items().iter().any(|item| item.url == url) {
            self.reject(Some(url.clone()), MediaQueueError::DuplicateUrl(url));
            return;
        }

        let catalog = match self.catalogs.get(&url) {
            Some(catalog) => catalog.clone(),
            None => {
                debug!("No cached catalog for {}, fetching", url);
                match self
                    .orchestrator
                    .fetch_catalog(self.provider.as_ref(), &url, &self.sink)
                    .await
                {
                    Ok(catalog) => {
                        self.catalogs.insert(catalog.clone());
                        catalog
                    }
                    // CatalogFailed already reported
                    Err(_) => return,
                }
            }
        };

        let option = selection
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| catalog.select(s))
            .cloned();

        match self.orchestrator.accept(&url, &catalog.title, option) {
            Ok(item) => {
                let item = item.clone();
                // Queued items no longer need their catalog
                self.catalogs.take(&url);
                self.sink.emit(BackendEvent::ItemAdded(item));
            }
            Err(e) => self.reject(Some(url), e),
        }
    }

    fn reject(&self, url: Option<String>, error: MediaQueueError) {
        warn!("Command refused: {}", error);
        self.sink.emit(BackendEvent::Rejected {
            url,
            reason: error.to_string(),
        });
    }
}

/// UI-side handle to a running [`BackendActor`]
pub struct BackendHandle {
    commands: mpsc::Sender<BackendCommand>,
    cancel: CancelSwitch,
    snapshot: QueueSnapshot,
    worker: JoinHandle<()>,
}

impl BackendHandle {
    /// Spawn a yt-dlp backed worker on the current runtime
    pub fn spawn(settings: &AppSettings) -> Result<(Self, mpsc::UnboundedReceiver<BackendEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let actor = BackendActor::new(settings, cmd_rx, event_tx)?;
        Ok((Self::start(actor, cmd_tx), event_rx))
    }

    /// Spawn a worker around an existing provider and orchestrator
    pub fn spawn_with(
        provider: Arc<dyn MediaProvider>,
        orchestrator: DownloadOrchestrator,
    ) -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let actor = BackendActor::with_components(provider, orchestrator, cmd_rx, event_tx);
        (Self::start(actor, cmd_tx), event_rx)
    }

    fn start(actor: BackendActor, commands: mpsc::Sender<BackendCommand>) -> Self {
        let cancel = actor.orchestrator.cancel_switch();
        let snapshot = actor.orchestrator.snapshot();
        let worker = tokio::spawn(actor.run());
        Self {
            commands,
            cancel,
            snapshot,
            worker,
        }
    }

    async fn send(&self, cmd: BackendCommand) -> crate::Result<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| MediaQueueError::WorkerGone)
    }

    pub async fn fetch_catalog(&self, url: impl Into<String>) -> crate::Result<()> {
        self.send(BackendCommand::FetchCatalog { url: url.into() })
            .await
    }

    pub async fn add(
        &self,
        url: impl Into<String>,
        selection: Option<String>,
    ) -> crate::Result<()> {
        self.send(BackendCommand::AddItem {
            url: url.into(),
            selection,
        })
        .await
    }

    pub async fn run_queue(&self) -> crate::Result<()> {
        self.send(BackendCommand::RunQueue).await
    }

    /// Request removal; refused right away while the item is downloading
    pub async fn remove(&self, url: impl Into<String>) -> crate::Result<()> {
        let url = url.into();
        if self
            .snapshot
            .find(&url)
            .is_some_and(|item| item.status.is_active())
        {
            return Err(MediaQueueError::ItemBusy(url));
        }
        self.send(BackendCommand::RemoveItem(url)).await
    }

    pub async fn clear(&self) -> crate::Result<()> {
        if let Some(active) = self
            .snapshot
            .read()
            .into_iter()
            .find(|item| item.status.is_active())
        {
            return Err(MediaQueueError::ItemBusy(active.url));
        }
        self.send(BackendCommand::ClearAll).await
    }

    /// Cancel the current run. Bypasses the command queue.
    pub fn cancel(&self) {
        self.cancel.trigger();
    }

    pub fn snapshot(&self) -> Vec<QueueItem> {
        self.snapshot.read()
    }

    /// Stop the worker once it has finished its current command
    pub async fn shutdown(self) -> crate::Result<()> {
        // A worker that already exited is fine here
        let _ = self.commands.send(BackendCommand::Shutdown).await;
        self.worker.await.map_err(|e| {
            warn!("Backend worker ended abnormally: {}", e);
            MediaQueueError::WorkerGone
        })
    }
}
