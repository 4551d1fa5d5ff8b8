//! Quality options presented to the user

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resolution a quality option stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionTag {
    /// Synthetic "best available" option
    Highest,
    /// Concrete video height in pixels
    Height(u32),
}

impl ResolutionTag {
    /// yt-dlp format selector for this option
    ///
    /// A concrete height asks for that exact height merged with the best
    /// audio, falling back to a combined stream at that height, then to the
    /// best combined stream.
    pub fn format_selector(&self) -> String {
        match self {
            Self::Highest => "bestvideo+bestaudio/best".to_string(),
            Self::Height(h) => format!("bestvideo[height={h}]+bestaudio/best[height={h}]/best"),
        }
    }

    /// Short description for status lines, e.g. `720p` or `best`
    pub fn describe(&self) -> String {
        match self {
            Self::Highest => "best".to_string(),
            Self::Height(h) => format!("{}p", h),
        }
    }
}

impl fmt::Display for ResolutionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highest => write!(f, "Highest"),
            Self::Height(h) => write!(f, "{}p", h),
        }
    }
}

impl FromStr for ResolutionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("highest") || s.eq_ignore_ascii_case("best") {
            return Ok(Self::Highest);
        }
        let digits = s.strip_suffix(['p', 'P']).unwrap_or(s);
        digits
            .parse::<u32>()
            .map(Self::Height)
            .map_err(|_| format!("not a resolution: {}", s))
    }
}

/// One user-selectable entry of a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOption {
    /// Human label, e.g. `1080p — 245.3 MiB`
    pub label: String,
    pub resolution_tag: ResolutionTag,
    pub estimated_size_bytes: Option<u64>,
}

impl QualityOption {
    /// Whether a user selection (label or tag) refers to this option
    pub fn matches_selection(&self, selection: &str) -> bool {
        let selection = selection.trim();
        self.label == selection
            || selection
                .parse::<ResolutionTag>()
                .map(|tag| tag == self.resolution_tag)
                .unwrap_or(false)
    }
}

/// Options resolved for one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub url: String,
    pub title: String,
    pub options: Vec<QualityOption>,
}

impl Catalog {
    /// Option for a user selection; an unmatched selection falls back to the first option
    pub fn select(&self, selection: &str) -> Option<&QualityOption> {
        self.options
            .iter()
            .find(|o| o.matches_selection(selection))
            .or_else(|| self.options.first())
    }
}
