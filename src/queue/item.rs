//! Queue items and their status machine

use crate::catalog::QualityOption;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One accepted download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    /// Unique within the queue
    pub url: String,
    pub title: String,
    pub chosen_option: QualityOption,
    pub status: ItemStatus,
    /// Set once the file exists or has been produced
    pub target_file_path: Option<PathBuf>,
    /// Transient text shown while downloading
    pub progress_text: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>, option: QualityOption) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            title: title.into(),
            chosen_option: option,
            status: ItemStatus::Ready,
            target_file_path: None,
            progress_text: None,
            added_at: Utc::now(),
        }
    }
}

/// Item status
///
/// Success path: `Ready → Starting → Downloading → Processing → Play`.
/// `Starting | Downloading | Processing` may end in `Canceled` or `Error`.
/// A download made of several substreams goes `Processing → Downloading`
/// for each further substream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    Ready,
    Starting,
    Downloading,
    Processing,
    Play,
    Canceled,
    Error,
}

/// Grouping used to colour rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTag {
    Play,
    Busy,
    Error,
}

impl ItemStatus {
    /// Currently owned by a running download
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Downloading | Self::Processing)
    }

    /// Terminal for the run that produced it
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Play | Self::Canceled | Self::Error)
    }

    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        match (self, next) {
            (Ready, Starting | Play) => true,
            (Starting, Downloading | Processing | Play | Canceled | Error) => true,
            (Downloading, Processing | Play | Canceled | Error) => true,
            (Processing, Downloading | Play | Canceled | Error) => true,
            (Play | Canceled | Error, Starting | Play) => true,
            _ => false,
        }
    }

    pub fn display_tag(&self) -> StatusTag {
        match self {
            Self::Play => StatusTag::Play,
            Self::Canceled | Self::Error => StatusTag::Error,
            Self::Ready | Self::Starting | Self::Downloading | Self::Processing => StatusTag::Busy,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "Ready",
            Self::Starting => "Starting",
            Self::Downloading => "Downloading",
            Self::Processing => "Processing",
            Self::Play => "Play",
            Self::Canceled => "Canceled",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResolutionTag;

    fn option() -> QualityOption {
        QualityOption {
            label: "Highest (best available)".to_string(),
            resolution_tag: ResolutionTag::Highest,
            estimated_size_bytes: None,
        }
    }

    #[test]
    fn test_new_item_is_ready() {
        let item = QueueItem::new("https://example.com/a", "A", option());
        assert_eq!(item.status, ItemStatus::Ready);
        assert!(item.target_file_path.is_none());
        assert!(item.progress_text.is_none());
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_success_path_edges() {
        use ItemStatus::*;
        let path = [Ready, Starting, Downloading, Processing, Play];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_short_circuit_and_forbidden_edges() {
        use ItemStatus::*;
        assert!(Ready.can_transition_to(Play));
        assert!(!Ready.can_transition_to(Downloading));
        assert!(!Ready.can_transition_to(Canceled));
        assert!(!Play.can_transition_to(Downloading));
        assert!(!Error.can_transition_to(Ready));
    }

    #[test]
    fn test_active_and_terminal() {
        use ItemStatus::*;
        for s in [Starting, Downloading, Processing] {
            assert!(s.is_active());
            assert!(s.can_transition_to(Canceled));
            assert!(s.can_transition_to(Error));
        }
        for s in [Play, Canceled, Error] {
            assert!(s.is_terminal());
            assert!(!s.is_active());
        }
        assert!(!Ready.is_active());
        assert!(!Ready.is_terminal());
    }

    #[test]
    fn test_display_tags() {
        assert_eq!(ItemStatus::Play.display_tag(), StatusTag::Play);
        assert_eq!(ItemStatus::Downloading.display_tag(), StatusTag::Busy);
        assert_eq!(ItemStatus::Canceled.display_tag(), StatusTag::Error);
    }
}
