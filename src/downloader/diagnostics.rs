// Failure diagnostics - classifies captured yt-dlp output
//
// The cascade only branches on success/failure; the kind is reported to the
// operator and recorded in the run report. Matching is isolated behind
// `Classifier` so the signature rules can change without touching control flow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a single fetch attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// HTTP 403 / access denied by the remote
    AccessDenied,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot check or client fingerprint rejected
    BotDetection,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Geographic restriction
    GeoBlocked,

    /// Asset deleted, private or otherwise gone
    Unavailable,

    /// The format expression matched nothing
    FormatUnavailable,

    /// Network timeout (soft IP block)
    NetworkTimeout,

    /// Tool exited non-zero with no recognized signature
    Unknown,
}

impl FailureKind {
    /// Whether this is the access-denied signature
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied)
    }

    /// Check if credentials might help
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::BotDetection | Self::AgeRestricted
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AccessDenied => "Access denied (HTTP 403)",
            Self::RateLimited => "Rate limited",
            Self::BotDetection => "Bot detection triggered",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Geographic restriction",
            Self::Unavailable => "Asset unavailable",
            Self::FormatUnavailable => "Requested format not available",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unrecognized failure",
        }
    }

    /// Operator hint printed when a track gives up
    pub fn hint(&self) -> &'static str {
        match self {
            Self::AccessDenied | Self::BotDetection => {
                "Try --use-cookies with a logged-in browser, or a different --player-client"
            }
            Self::RateLimited => "Wait 10-15 minutes or switch network",
            Self::AgeRestricted => "Use --use-cookies with an account that passed age verification",
            Self::GeoBlocked => "Use a network in a region where the asset is available",
            Self::Unavailable => "Check the asset reference; it may be private or deleted",
            Self::FormatUnavailable => "Pick another format code from the listing",
            Self::NetworkTimeout => "Check connectivity; --ipv4 helps on broken IPv6 routes",
            Self::Unknown => "Re-run with -vv to see the full yt-dlp output",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Turns captured tool output into a failure kind
pub trait Classifier: Send + Sync {
    fn classify(&self, log: &str) -> FailureKind;
}

/// Case-insensitive substring matching against known yt-dlp messages
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureClassifier;

impl Classifier for SignatureClassifier {
    fn classify(&self, log: &str) -> FailureKind {
        classify_log(log)
    }
}

/// Ordered by specificity; first match wins. Status codes are matched with
/// their "HTTP Error" prefix since asset ids appear on nearly every log line.
const SIGNATURES: &[(FailureKind, &[&str])] = &[
    (
        FailureKind::FormatUnavailable,
        &["requested format is not available", "no video formats found"],
    ),
    (
        FailureKind::AgeRestricted,
        &["sign in to confirm your age", "age-restricted", "age_verification"],
    ),
    (
        FailureKind::BotDetection,
        &["not a bot", "captcha", "unusual traffic", "po token"],
    ),
    (
        FailureKind::GeoBlocked,
        &["available in your country", "blocked in your country", "geo restrict"],
    ),
    (
        FailureKind::Unavailable,
        &[
            "video unavailable",
            "private video",
            "video is private",
            "has been removed",
            "no longer available",
        ],
    ),
    (
        FailureKind::RateLimited,
        &["http error 429", "too many requests", "rate limit", "rate-limit"],
    ),
    (
        FailureKind::AccessDenied,
        &["http error 403", "403: forbidden", "403 forbidden", "access denied"],
    ),
    (
        FailureKind::NetworkTimeout,
        &["timed out", "timeout", "connection refused", "network is unreachable"],
    ),
];

pub fn classify_log(log: &str) -> FailureKind {
    let lower = log.to_lowercase();
    SIGNATURES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(kind, _)| *kind)
        .unwrap_or(FailureKind::Unknown)
}

/// Last `max_lines` non-blank lines of a log
pub fn tail_lines(log: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = log.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
