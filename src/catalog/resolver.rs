//! Turns raw stream descriptors into a short list of quality options

use crate::catalog::models::{QualityOption, ResolutionTag};
use crate::catalog::size::resolve_stream_size;
use crate::downloader::format::{human_size, human_size_opt};
use crate::extractor::StreamDescriptor;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

const HIGHEST_LABEL: &str = "Highest (best available)";

/// Ranking key: any known size outranks all unknown sizes, then the value,
/// then the bitrate.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    has_size: bool,
    size: u64,
    bitrate: f64,
}

impl RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.has_size
            .cmp(&other.has_size)
            .then(self.size.cmp(&other.size))
            .then(self.bitrate.total_cmp(&other.bitrate))
    }
}

/// Keep the first candidate on ties
fn pick_best<'a, I>(candidates: I) -> Option<&'a StreamDescriptor>
where
    I: Iterator<Item = (RankKey, &'a StreamDescriptor)>,
{
    candidates
        .fold(None::<(RankKey, &StreamDescriptor)>, |best, (key, fmt)| match best {
            Some((best_key, _)) if key.cmp(&best_key) != Ordering::Greater => best,
            _ => Some((key, fmt)),
        })
        .map(|(_, fmt)| fmt)
}

/// Audio stream paired with every video resolution
pub fn choose_best_audio(formats: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    pick_best(formats.iter().filter(|f| f.has_audio()).map(|f| {
        let size = f.reported_size();
        let key = RankKey {
            has_size: size.is_some(),
            size: size.unwrap_or(0),
            bitrate: f.abr.unwrap_or(0.0),
        };
        (key, f)
    }))
}

/// Best video stream at an exact height: known size first, then bitrate
fn choose_best_video(formats: &[StreamDescriptor], height: u32) -> Option<&StreamDescriptor> {
    pick_best(
        formats
            .iter()
            .filter(|f| f.has_video() && f.height == Some(height))
            .map(|f| {
                let key = RankKey {
                    has_size: f.reported_size().is_some(),
                    size: 0,
                    bitrate: f.tbr.filter(|t| *t > 0.0).or(f.vbr).unwrap_or(0.0),
                };
                (key, f)
            }),
    )
}

/// Build the ordered catalog for one media item
///
/// The synthetic "Highest" option comes first, then one option per distinct
/// video height in ascending order. An empty result means no options are
/// available, not an error.
pub fn build_catalog(formats: &[StreamDescriptor], duration: Option<f64>) -> Vec<QualityOption> {
    let best_audio = choose_best_audio(formats);
    // Absent audio stream contributes nothing; a present one with unknown size makes the total unknown
    let audio_size = best_audio.map(|a| resolve_stream_size(a, duration));

    let heights: BTreeSet<u32> = formats
        .iter()
        .filter(|f| f.has_video())
        .filter_map(|f| f.height)
        .collect();

    let mut options = Vec::with_capacity(heights.len() + 1);
    for height in heights {
        let Some(video) = choose_best_video(formats, height) else {
            continue;
        };

        let video_size = resolve_stream_size(video, duration);
        let total = match (video_size, audio_size) {
            (Some(v), None) => Some(v),
            (Some(v), Some(Some(a))) => Some(v.saturating_add(a)),
            _ => None,
        }
        .filter(|&total| total > 0);

        let tag = ResolutionTag::Height(height);
        options.push(QualityOption {
            label: format!("{} — {}", tag, human_size_opt(total)),
            resolution_tag: tag,
            estimated_size_bytes: total,
        });
    }

    let Some(largest) = options.last() else {
        debug!("No video heights among {} formats", formats.len());
        return Vec::new();
    };

    let highest_size = largest.estimated_size_bytes;
    let highest = QualityOption {
        label: match highest_size {
            Some(size) => format!("{} — {}", HIGHEST_LABEL, human_size(size as f64)),
            None => HIGHEST_LABEL.to_string(),
        },
        resolution_tag: ResolutionTag::Highest,
        estimated_size_bytes: highest_size,
    };

    options.insert(0, highest);
    debug!("Built catalog with {} options", options.len());
    options
}
