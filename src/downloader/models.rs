// Common data models for the acquisition pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::diagnostics::FailureKind;

/// Prefix of mix/radio seeds (`RD<id>`) that wrap a plain asset id
pub const SEED_PREFIX: &str = "RD";

/// Sentinel the operator types to get the track's fallback expression
pub const AUTO_FORMAT: &str = "auto";

/// Strip the seed prefix from a reference, if it leaves something behind.
pub fn normalize(reference: &str) -> String {
    match reference.strip_prefix(SEED_PREFIX) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => reference.to_string(),
    }
}

/// One of the two streams making up the final file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Fallback expression used under automatic policy or for `auto`
    pub fn auto_format(&self) -> &'static str {
        match self {
            Self::Video => "bestvideo[ext=mp4]/bestvideo[ext=webm]/bestvideo",
            Self::Audio => "bestaudio[ext=m4a]/bestaudio",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Expression for the combined single-pass fallback
pub const ONE_PASS_FORMAT: &str = "bestvideo+bestaudio/best";

/// Format requested for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSpec {
    /// Resolve to the track's fallback expression
    Auto,
    Explicit(String),
}

impl FormatSpec {
    /// Parse operator input; blank or `auto` means automatic.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(AUTO_FORMAT) {
            Self::Auto
        } else {
            Self::Explicit(trimmed.to_string())
        }
    }

    pub fn resolve(&self, track: TrackKind) -> String {
        match self {
            Self::Auto => track.auto_format().to_string(),
            Self::Explicit(s) => s.clone(),
        }
    }
}

/// Fixed artifact locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub one_pass: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            video: dir.join("video_only.mp4"),
            audio: dir.join("audio_only.m4a"),
            output: dir.join("merged_output.mp4"),
            one_pass: dir.join("onepass_output.mp4"),
        }
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }
}

/// Outcome of a single yt-dlp invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Success,
    Failure {
        kind: FailureKind,
        /// Trailing lines of the captured output
        tail: String,
    },
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Per-track summary for the run report
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackReport {
    pub reference: String,
    pub attempts: usize,
    pub format: Option<String>,
    pub succeeded: bool,
    pub last_failure: Option<FailureKind>,
}

/// Summary written by `--report`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub mode: String,
    pub video: TrackReport,
    pub audio: Option<TrackReport>,
    pub one_pass_used: bool,
    pub output: Option<PathBuf>,
}

/// True when `path` exists and holds at least one byte.
pub fn is_non_empty(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Remove a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
