// Error types for the acquisition pipeline

use std::path::PathBuf;

use super::diagnostics::FailureKind;
use super::models::TrackKind;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// yt-dlp or ffmpeg not found in system
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Child process could not be started or waited on
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Child process exceeded the configured attempt timeout
    #[error("{tool} timed out after {seconds}s")]
    TimedOut { tool: String, seconds: u64 },

    /// Every strategy failed for every format tried on a track
    #[error("{track} track could not be downloaded ({last_failure})")]
    TrackExhausted {
        track: TrackKind,
        last_failure: FailureKind,
    },

    /// The combined single-pass fallback failed too
    #[error("single-pass fallback failed after the separate-track download failed")]
    OnePassFailed,

    /// ffmpeg returned non-zero while joining the tracks
    #[error("merge failed: {0}")]
    MergeFailed(String),

    /// No usable video artifact at merge time
    #[error("nothing to merge: no non-empty video track at {}", .0.display())]
    NothingToMerge(PathBuf),

    /// Operator closed input or asked to quit at a prompt
    #[error("aborted by operator")]
    Aborted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    pub fn spawn(tool: impl Into<String>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::ToolNotFound(tool.into());
        }
        Self::Spawn {
            tool: tool.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
