// External tool discovery and the concrete yt-dlp / ffmpeg adapters

use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::errors::{DownloadError, Result};
use super::traits::{FetchTool, Muxer};
use super::utils::{run_captured, run_inherited, run_stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }
}

/// Locate a tool: explicit path first, then common install locations, then PATH.
pub fn find_tool(tool: ToolType, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return which::which(path).map_err(|_| DownloadError::ToolNotFound(path.display().to_string()));
    }

    let binary_name = tool.as_str();
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name), // Homebrew on Apple Silicon
        format!("/usr/local/bin/{}", binary_name),    // Homebrew on Intel Mac
        format!("/usr/bin/{}", binary_name),          // System installation
    ];
    for path in common_paths {
        let candidate = PathBuf::from(&path);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    which::which(binary_name).map_err(|_| DownloadError::ToolNotFound(binary_name.to_string()))
}

/// yt-dlp driven as a child process
pub struct YtDlp {
    path: PathBuf,
    attempt_timeout: Option<Duration>,
}

impl YtDlp {
    pub fn new(path: PathBuf, attempt_timeout: Option<Duration>) -> Self {
        Self {
            path,
            attempt_timeout,
        }
    }
}

#[async_trait]
impl FetchTool for YtDlp {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn help_text(&self) -> Result<String> {
        let (status, text) = run_stdout(&self.path, &["--help".to_string()]).await?;
        if !status.success() {
            tracing::warn!("yt-dlp --help exited with {:?}; assuming no optional flags", status.code());
        }
        Ok(text)
    }

    async fn fetch(&self, args: &[String], capture: File) -> Result<bool> {
        let status = run_captured(&self.path, args, capture, self.attempt_timeout).await?;
        Ok(status.success())
    }

    async fn list_formats(&self, reference: &str, baseline: &[String]) -> Result<()> {
        let mut args = baseline.to_vec();
        args.push("-F".to_string());
        args.push(reference.to_string());

        let status = run_inherited(&self.path, &args).await?;
        if !status.success() {
            // Listing is advisory; the operator can still type a code.
            tracing::warn!("Listing formats for {} failed ({:?})", reference, status.code());
        }
        Ok(())
    }
}

/// ffmpeg stream-copy muxer
pub struct Ffmpeg {
    path: PathBuf,
}

impl Ffmpeg {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn mux_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-i".to_string(),
            audio.to_string_lossy().into_owned(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl Muxer for Ffmpeg {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<bool> {
        let args = Self::mux_args(video, audio, output);
        tracing::debug!("[ffmpeg] {}", args.join(" "));
        let status = run_inherited(&self.path, &args).await?;
        Ok(status.success())
    }
}
