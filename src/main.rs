//! Mediaqueue - queue media downloads from the command line
//!
//! Fetches the quality options of each URL, queues them with the requested
//! quality and downloads them one after another through yt-dlp.

use anyhow::{bail, Result};
use clap::Parser;
use mediaqueue::backend::{BackendEvent, BackendHandle};
use mediaqueue::queue::{ItemStatus, RunSummary, StatusTag};
use mediaqueue::utils::AppSettings;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mediaqueue", version, about = "Queue and download media with yt-dlp")]
struct Args {
    /// Media page URLs
    urls: Vec<String>,

    /// Quality for every URL: an option label, a height such as 720p, or "highest"
    #[arg(short, long, default_value = "highest")]
    quality: String,

    /// Download directory (overrides the settings file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only list the available options
    #[arg(long)]
    list: bool,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = args.config.clone().unwrap_or_else(AppSettings::default_path);
    let mut settings = AppSettings::load(&config_path)?;
    if let Some(dir) = &args.output {
        settings.download_location = dir.clone();
    }

    if args.urls.is_empty() {
        println!("Nothing to do. Pass one or more URLs, see --help.");
        return Ok(());
    }

    std::fs::create_dir_all(&settings.download_location)?;
    info!("Downloading into {}", settings.download_location.display());

    let (handle, mut events) = BackendHandle::spawn(&settings)?;

    if args.list {
        for url in &args.urls {
            handle.fetch_catalog(url.as_str()).await?;
        }
        list_catalogs(&mut events, args.urls.len()).await;
        handle.shutdown().await?;
        return Ok(());
    }

    for url in &args.urls {
        handle.add(url.as_str(), Some(args.quality.clone())).await?;
    }
    handle.run_queue().await?;

    let summary = follow_run(&handle, &mut events).await;
    handle.shutdown().await?;

    match summary {
        Some(summary) => {
            println!(
                "Done: {} downloaded, {} already present, {} failed{}",
                summary.completed,
                summary.skipped,
                summary.failed,
                if summary.canceled { ", canceled" } else { "" }
            );
            if summary.failed > 0 {
                bail!("{} download(s) failed", summary.failed);
            }
            Ok(())
        }
        None => bail!("backend stopped before the queue finished"),
    }
}

/// Print catalog results until one has arrived for every URL
async fn list_catalogs(events: &mut mpsc::UnboundedReceiver<BackendEvent>, expected: usize) {
    let mut seen = 0;
    while seen < expected {
        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            BackendEvent::CatalogReady {
                url,
                title,
                options,
            } => {
                seen += 1;
                println!("{} ({})", title, url);
                if options.is_empty() {
                    println!("  no options available");
                }
                for option in options {
                    println!("  [{}] {}", option.resolution_tag, option.label);
                }
            }
            BackendEvent::CatalogFailed { url, reason } => {
                seen += 1;
                eprintln!("{}: {}", url, reason);
            }
            _ => {}
        }
    }
}

/// Print events of a queue run, canceling on Ctrl-C
async fn follow_run(
    handle: &BackendHandle,
    events: &mut mpsc::UnboundedReceiver<BackendEvent>,
) -> Option<RunSummary> {
    let mut cancel_sent = false;
    loop {
        tokio::select! {
            event = events.recv() => {
                match event? {
                    BackendEvent::RunFinished(summary) => return Some(summary),
                    event => print_event(&event),
                }
            }
            result = tokio::signal::ctrl_c(), if !cancel_sent => {
                if result.is_ok() {
                    eprintln!("Canceling...");
                    handle.cancel();
                }
                cancel_sent = true;
            }
        }
    }
}

fn print_event(event: &BackendEvent) {
    match event {
        BackendEvent::CatalogReady { title, options, .. } => {
            println!("Found {} option(s) for {}", options.len(), title);
        }
        BackendEvent::CatalogFailed { url, reason } => eprintln!("{}: {}", url, reason),
        BackendEvent::ItemAdded(item) => {
            println!("Queued {} [{}]", item.title, item.chosen_option.label);
        }
        BackendEvent::Rejected { url, reason } => match url {
            Some(url) => eprintln!("{}: {}", url, reason),
            None => eprintln!("{}", reason),
        },
        BackendEvent::StatusChanged(item) => match (item.status, &item.target_file_path) {
            (ItemStatus::Play, Some(path)) => println!("{}: done -> {}", item.title, path.display()),
            (status, _) => {
                let mark = match status.display_tag() {
                    StatusTag::Play => "+",
                    StatusTag::Busy => "~",
                    StatusTag::Error => "!",
                };
                println!("{} {}: {}", mark, item.title, status)
            }
        },
        BackendEvent::Progress { text, .. } => println!("  {}", text),
        BackendEvent::Failure(notice) => eprintln!("[{}]\n{}", notice.category, notice),
        BackendEvent::ItemRemoved { .. }
        | BackendEvent::QueueCleared { .. }
        | BackendEvent::RunFinished(_) => {}
    }
}
