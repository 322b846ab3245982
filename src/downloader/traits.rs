// Seams to the external tools and the operator

use async_trait::async_trait;
use std::fs::File;
use std::path::Path;

use super::errors::Result;

/// The fetch tool (yt-dlp) as seen by the pipeline
#[async_trait]
pub trait FetchTool: Send + Sync {
    /// Name of the tool (for logging)
    fn name(&self) -> &str;

    /// Text the tool prints for `--help`, used for capability probing
    async fn help_text(&self) -> Result<String>;

    /// Run one fetch with the full argument vector. Combined stdout/stderr is
    /// written to `capture`. Returns whether the tool exited with status 0.
    async fn fetch(&self, args: &[String], capture: File) -> Result<bool>;

    /// Print the variant table for `reference` to the operator's terminal
    async fn list_formats(&self, reference: &str, baseline: &[String]) -> Result<()>;
}

/// The stream-copy muxer (ffmpeg)
#[async_trait]
pub trait Muxer: Send + Sync {
    fn name(&self) -> &str;

    /// Join `video` and `audio` into `output` without re-encoding.
    /// Returns whether the tool exited with status 0.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<bool>;
}

/// Source of operator answers for the interactive policy
#[async_trait]
pub trait PromptProvider: Send {
    /// Show `message` and return the answer, or `None` once input is closed
    async fn prompt(&mut self, message: &str) -> Result<Option<String>>;
}
