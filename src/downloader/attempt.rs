// Single fetch attempt with output capture and failure classification

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::diagnostics::{tail_lines, Classifier, FailureKind, SignatureClassifier};
use super::errors::{DownloadError, Result};
use super::models::{remove_if_exists, AttemptResult};
use super::traits::FetchTool;

/// Lines of captured output kept for diagnostics
pub const TAIL_LINES: usize = 15;

/// Runs exactly one yt-dlp invocation per call; retries belong to the cascade.
pub struct AttemptRunner {
    tool: Arc<dyn FetchTool>,
    classifier: Box<dyn Classifier>,
    /// Where capture logs live while an attempt runs; system temp dir if unset
    capture_dir: Option<PathBuf>,
}

impl AttemptRunner {
    pub fn new(tool: Arc<dyn FetchTool>) -> Self {
        Self::with_classifier(tool, Box::new(SignatureClassifier))
    }

    pub fn with_classifier(tool: Arc<dyn FetchTool>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            tool,
            classifier,
            capture_dir: None,
        }
    }

    pub fn capture_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = Some(dir.into());
        self
    }

    pub fn tool(&self) -> &Arc<dyn FetchTool> {
        &self.tool
    }

    /// Argument vector for one attempt
    pub fn build_args(
        reference: &str,
        format: &str,
        output: &Path,
        baseline: &[String],
        extra: &[String],
    ) -> Vec<String> {
        let mut args: Vec<String> = baseline.iter().chain(extra).cloned().collect();
        args.push("-f".to_string());
        args.push(format.to_string());
        args.push("-o".to_string());
        args.push(output.to_string_lossy().into_owned());
        args.push(reference.to_string());
        args
    }

    pub async fn run(
        &self,
        reference: &str,
        format: &str,
        output: &Path,
        baseline: &[String],
        extra: &[String],
    ) -> Result<AttemptResult> {
        remove_if_exists(output)?;

        let args = Self::build_args(reference, format, output, baseline, extra);
        tracing::debug!("[{}] {}", self.tool.name(), args.join(" "));

        // Deleted on drop, whichever way this function returns.
        let mut builder = tempfile::Builder::new();
        builder.prefix("fetch-log-").suffix(".txt");
        let mut capture = match &self.capture_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let handle = capture.reopen()?;

        let succeeded = match self.tool.fetch(&args, handle).await {
            Ok(ok) => ok,
            Err(DownloadError::TimedOut { tool, seconds }) => {
                return Ok(AttemptResult::Failure {
                    kind: FailureKind::NetworkTimeout,
                    tail: format!("{} killed after {}s", tool, seconds),
                });
            }
            // A missing binary fails every strategy the same way; anything
            // else at spawn time only costs this attempt.
            Err(e @ DownloadError::Spawn { .. }) => {
                tracing::warn!("[{}] {}", self.tool.name(), e);
                return Ok(AttemptResult::Failure {
                    kind: FailureKind::Unknown,
                    tail: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if succeeded {
            return Ok(AttemptResult::Success);
        }

        let file = capture.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let log = String::from_utf8_lossy(&bytes);

        Ok(AttemptResult::Failure {
            kind: self.classifier.classify(&log),
            tail: tail_lines(&log, TAIL_LINES),
        })
    }
}
