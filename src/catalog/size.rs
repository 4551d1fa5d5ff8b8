//! Best-effort byte size of a single stream

use crate::extractor::StreamDescriptor;

/// Estimate size from bitrate and duration
///
/// Bitrate precedence: total bitrate, else audio bitrate for streams carrying
/// audio, else video bitrate for streams carrying video. Bitrates are kbit/s.
pub fn estimate_from_bitrate(fmt: &StreamDescriptor, duration: Option<f64>) -> Option<u64> {
    let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;

    let mut kbps = fmt.tbr;
    if kbps.is_none() && fmt.has_audio() {
        kbps = fmt.abr;
    }
    if kbps.is_none() && fmt.has_video() {
        kbps = fmt.vbr;
    }

    let kbps = kbps.filter(|k| k.is_finite() && *k > 0.0)?;
    let bytes = kbps * 1000.0 / 8.0 * duration;
    (bytes.is_finite() && bytes >= 0.0).then(|| bytes as u64)
}

/// Exact size, else approximate size, else bitrate estimate
pub fn resolve_stream_size(fmt: &StreamDescriptor, duration: Option<f64>) -> Option<u64> {
    fmt.reported_size()
        .or_else(|| estimate_from_bitrate(fmt, duration))
}
