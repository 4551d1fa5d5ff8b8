//! Maps raw download failure text to a user-facing category and remediation
//!
//! Matching is a case-insensitive substring search over a priority-ordered
//! rule table; the first matching rule wins. Vendor error wording drives the
//! table, so it lives behind [`ErrorClassifier`] and can be replaced without
//! touching the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    RangeNotSatisfiable,
    Forbidden,
    NotFound,
    TlsFailure,
    Timeout,
    UnsupportedSource,
    HumanVerificationRequired,
    MergeToolMissing,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RangeNotSatisfiable => "Range not satisfiable",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::TlsFailure => "TLS failure",
            Self::Timeout => "Timeout",
            Self::UnsupportedSource => "Unsupported source",
            Self::HumanVerificationRequired => "Human verification required",
            Self::MergeToolMissing => "Merge tool missing",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Result of classifying one failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub message: String,
}

/// Anything that can turn raw failure text into a classification. Never fails.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, raw: &str) -> Classification;
}

/// One row of the matching table. `needles` must be lowercase.
#[derive(Debug, Clone)]
pub struct Rule {
    pub needles: Vec<String>,
    pub category: ErrorCategory,
    pub message: String,
}

impl Rule {
    pub fn new(needles: &[&str], category: ErrorCategory, message: &str) -> Self {
        Self {
            needles: needles.iter().map(|n| n.to_lowercase()).collect(),
            category,
            message: message.to_string(),
        }
    }

    fn matches(&self, haystack_lower: &str) -> bool {
        self.needles.iter().any(|n| haystack_lower.contains(n.as_str()))
    }
}

/// Priority-ordered substring classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<Rule>,
}

impl RuleClassifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Put a rule ahead of every existing one
    pub fn with_rule_first(mut self, rule: Rule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(vec![
            Rule::new(
                &["requested range not satisfiable", "http error 416"],
                ErrorCategory::RangeNotSatisfiable,
                "The server refused the requested byte range (HTTP 416).\n\
                 Tips: delete any .part files and try again; disable resume; avoid proxies/VPN; \
                 let the server control chunking (http chunk size 0).",
            ),
            Rule::new(
                &["http error 403"],
                ErrorCategory::Forbidden,
                "Access forbidden (HTTP 403). The server blocked the request.\n\
                 Tips: try without VPN/proxy, update yt-dlp, or try again later.",
            ),
            Rule::new(
                &["http error 404"],
                ErrorCategory::NotFound,
                "Content not found (HTTP 404). The media may have been removed or moved.",
            ),
            Rule::new(
                &["ssl"],
                ErrorCategory::TlsFailure,
                "SSL/Certificate problem. Check your date/time, network, and try again.\n\
                 A corporate proxy can also cause this.",
            ),
            Rule::new(
                &["timed out", "timeout"],
                ErrorCategory::Timeout,
                "Network timeout. Check your internet connection and try again.",
            ),
            Rule::new(
                &["unsupported url"],
                ErrorCategory::UnsupportedSource,
                "This URL is not supported by yt-dlp. Verify the link.",
            ),
            Rule::new(
                &["captcha", "consent"],
                ErrorCategory::HumanVerificationRequired,
                "The site is asking for human verification. Open the URL in a browser first.",
            ),
            Rule::new(
                &["ffmpeg", "ffprobe"],
                ErrorCategory::MergeToolMissing,
                "FFmpeg/ffprobe problem. Make sure both executables are available.",
            ),
        ])
    }
}

impl ErrorClassifier for RuleClassifier {
    fn classify(&self, raw: &str) -> Classification {
        let lower = raw.to_lowercase();
        match self.rules.iter().find(|rule| rule.matches(&lower)) {
            Some(rule) => Classification {
                category: rule.category,
                message: rule.message.clone(),
            },
            None => Classification {
                category: ErrorCategory::Unknown,
                message: format!(
                    "An unexpected error occurred. Try again, and if it persists, update yt-dlp.\n\
                     Details:\n{}",
                    raw
                ),
            },
        }
    }
}

/// Classify with the default rule table
pub fn classify(raw: &str) -> Classification {
    RuleClassifier::default().classify(raw)
}
