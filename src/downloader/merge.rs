// Merge stage - joins the two track artifacts into the final file
//
// The muxer writes to a temporary sibling of the output which is renamed into
// place only after a clean exit, so a failed merge never leaves a partial file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::{DownloadError, Result};
use super::models::is_non_empty;
use super::traits::Muxer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Both tracks stream-copied into the output
    Merged,
    /// Only video was usable; it was moved to the output
    VideoOnly,
}

pub struct MergeStage {
    muxer: Arc<dyn Muxer>,
}

impl MergeStage {
    pub fn new(muxer: Arc<dyn Muxer>) -> Self {
        Self { muxer }
    }

    pub async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<MergeOutcome> {
        if !is_non_empty(video) {
            return Err(DownloadError::NothingToMerge(video.to_path_buf()));
        }

        if !is_non_empty(audio) {
            tracing::warn!(
                "[Merge] No usable audio track at {}, keeping video only",
                audio.display()
            );
            move_into_place(video, output).await?;
            return Ok(MergeOutcome::VideoOnly);
        }

        let staging = staging_path(output)?;
        tracing::info!(
            "[Merge] {} + {} -> {}",
            video.display(),
            audio.display(),
            output.display()
        );

        if !self.muxer.mux(video, audio, &staging).await? {
            return Err(DownloadError::MergeFailed(format!(
                "{} exited with an error",
                self.muxer.name()
            )));
        }
        if !is_non_empty(&staging) {
            return Err(DownloadError::MergeFailed(format!(
                "{} produced an empty file",
                self.muxer.name()
            )));
        }

        staging
            .persist(output)
            .map_err(|e| DownloadError::Io(e.error))?;
        Ok(MergeOutcome::Merged)
    }
}

/// Move `from` to `to`, falling back to copy-then-persist when the two paths
/// sit on different filesystems. `to` never holds a partial file.
pub async fn move_into_place(from: &Path, to: &Path) -> Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                "{} and {} are on different filesystems, copying",
                from.display(),
                to.display()
            );
            copy_into_place(from, to).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn copy_into_place(from: &Path, to: &Path) -> Result<()> {
    let staging = staging_path(to)?;
    tokio::fs::copy(from, &staging).await?;
    staging.persist(to).map_err(|e| DownloadError::Io(e.error))?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}

/// Empty temp file next to `output`, keeping its extension so the muxer
/// picks the same container. Removed on drop unless persisted.
fn staging_path(output: &Path) -> Result<tempfile::TempPath> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix(".merge-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}
