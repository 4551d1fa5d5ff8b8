//! Data structures for media information

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Media information for one URL, as reported by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    #[serde(default = "unknown_title")]
    pub title: String,
    #[serde(default, alias = "webpage_url")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub formats: Vec<StreamDescriptor>,
}

/// One retrievable audio or video substream
///
/// Numeric fields are parsed leniently: integers, floats and numeric
/// strings are accepted, anything else becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    /// Total bitrate (kbit/s)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tbr: Option<f64>,
    /// Video bitrate (kbit/s)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vbr: Option<f64>,
    /// Audio bitrate (kbit/s)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub abr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize_approx: Option<u64>,
}

impl StreamDescriptor {
    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// Reported size, exact first then approximate. Zero counts as unreported.
    pub fn reported_size(&self) -> Option<u64> {
        self.filesize
            .filter(|&s| s > 0)
            .or(self.filesize_approx.filter(|&s| s > 0))
    }
}

/// What the provider reports once a download completed
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    pub title: String,
    pub extension: String,
    pub final_path: PathBuf,
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

fn unknown_title() -> String {
    "Unknown Title".to_string()
}

fn value_as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ytdlp_like_json() {
        let json = r#"{
            "title": "Sample",
            "webpage_url": "https://example.com/watch?v=1",
            "duration": 120.5,
            "formats": [
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
                 "abr": 129.5, "filesize": 3000000},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none",
                 "height": 1080, "tbr": "4400.1", "filesize": null, "filesize_approx": 12.7e6}
            ]
        }"#;

        let info: MediaInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.title, "Sample");
        assert_eq!(info.url, "https://example.com/watch?v=1");
        assert_eq!(info.duration, Some(120.5));
        assert_eq!(info.formats.len(), 2);

        let audio = &info.formats[0];
        assert!(audio.has_audio());
        assert!(!audio.has_video());
        assert_eq!(audio.filesize, Some(3_000_000));

        let video = &info.formats[1];
        assert_eq!(video.height, Some(1080));
        assert_eq!(video.tbr, Some(4400.1));
        assert_eq!(video.filesize, None);
        assert_eq!(video.filesize_approx, Some(12_700_000));
    }

    #[test]
    fn test_non_numeric_fields_become_unknown() {
        let json = r#"{"height": "tall", "tbr": {"x": 1}, "filesize": -5, "abr": "NaN"}"#;
        let fmt: StreamDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(fmt.height, None);
        assert_eq!(fmt.tbr, None);
        assert_eq!(fmt.filesize, None);
        assert_eq!(fmt.abr, None);
    }

    #[test]
    fn test_missing_title_defaults() {
        let info: MediaInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.title, "Unknown Title");
        assert!(info.formats.is_empty());
        assert_eq!(info.duration, None);
    }

    #[test]
    fn test_reported_size_precedence() {
        let fmt = StreamDescriptor {
            filesize: Some(0),
            filesize_approx: Some(42),
            ..Default::default()
        };
        assert_eq!(fmt.reported_size(), Some(42));

        let fmt = StreamDescriptor {
            filesize: Some(7),
            filesize_approx: Some(42),
            ..Default::default()
        };
        assert_eq!(fmt.reported_size(), Some(7));
    }

    #[test]
    fn test_empty_codec_is_absent() {
        let fmt = StreamDescriptor {
            vcodec: Some(String::new()),
            acodec: Some("none".to_string()),
            ..Default::default()
        };
        assert!(!fmt.has_video());
        assert!(!fmt.has_audio());
    }
}
