// Orchestrator - automatic and interactive acquisition runs

use std::sync::Arc;

use super::attempt::AttemptRunner;
use super::cascade::StrategyCascade;
use super::diagnostics::FailureKind;
use super::errors::{DownloadError, Result};
use super::format_loop::{is_quit, FormatPolicy, FormatSelectionLoop};
use super::merge::{move_into_place, MergeOutcome, MergeStage};
use super::models::{
    is_non_empty, normalize, remove_if_exists, ArtifactPaths, RunReport, TrackKind, ONE_PASS_FORMAT,
};
use super::profiles::{Capabilities, ProfileSettings, Profiles};
use super::traits::{FetchTool, Muxer, PromptProvider};

pub struct Orchestrator {
    cascade: StrategyCascade,
    merge: MergeStage,
    paths: ArtifactPaths,
    keep_tracks: bool,
}

impl Orchestrator {
    pub fn new(cascade: StrategyCascade, merge: MergeStage, paths: ArtifactPaths) -> Self {
        Self {
            cascade,
            merge,
            paths,
            keep_tracks: false,
        }
    }

    /// Probe the fetch tool once and build the immutable profiles from it.
    pub async fn prepare(
        tool: Arc<dyn FetchTool>,
        muxer: Arc<dyn Muxer>,
        settings: &ProfileSettings,
        paths: ArtifactPaths,
    ) -> Result<Self> {
        let help = tool.help_text().await?;
        let caps = Capabilities::from_help(&help);
        tracing::debug!("{} advertises {} options", tool.name(), caps.len());

        let profiles = Profiles::build(&caps, settings);
        let mut runner = AttemptRunner::new(tool);
        if let Some(dir) = paths.video.parent().filter(|d| !d.as_os_str().is_empty()) {
            runner = runner.capture_in(dir);
        }
        let cascade = StrategyCascade::new(runner, profiles);
        Ok(Self::new(cascade, MergeStage::new(muxer), paths))
    }

    pub fn keep_tracks(mut self, keep: bool) -> Self {
        self.keep_tracks = keep;
        self
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// No operator: fixed fallback formats, then a single combined attempt.
    pub async fn run_automatic(&self, reference: &str) -> Result<RunReport> {
        let reference = normalize(reference);
        tracing::info!("[Auto] Acquiring {}", reference);

        let mut report = RunReport {
            mode: "automatic".to_string(),
            ..Default::default()
        };
        let tracks = FormatSelectionLoop::new(&self.cascade);

        report.video = tracks
            .run(TrackKind::Video, &reference, &self.paths.video, FormatPolicy::Automatic)
            .await?;
        if report.video.succeeded {
            let audio = tracks
                .run(TrackKind::Audio, &reference, &self.paths.audio, FormatPolicy::Automatic)
                .await?;
            let audio_ok = audio.succeeded;
            report.audio = Some(audio);

            if audio_ok {
                self.finish_merge().await?;
                report.output = Some(self.paths.output.clone());
                return Ok(report);
            }
        }

        let (track, failed) = match &report.audio {
            Some(audio) if report.video.succeeded => (TrackKind::Audio, audio),
            _ => (TrackKind::Video, &report.video),
        };
        let exhausted = DownloadError::TrackExhausted {
            track,
            last_failure: failed.last_failure.unwrap_or(FailureKind::Unknown),
        };
        tracing::warn!("[Auto] {}; falling back to a single combined download", exhausted);
        if let Some(kind) = failed.last_failure {
            tracing::info!("[Auto] Hint: {}", kind.hint());
        }

        report.one_pass_used = true;
        self.run_one_pass(&reference).await?;
        report.output = Some(self.paths.output.clone());
        Ok(report)
    }

    /// Operator picks formats; always finishes with the merge stage.
    pub async fn run_interactive(
        &self,
        reference: Option<&str>,
        prompt: &mut dyn PromptProvider,
    ) -> Result<RunReport> {
        let video_ref = match reference {
            Some(r) if !r.trim().is_empty() => r.trim().to_string(),
            _ => ask_reference(&mut *prompt).await?,
        };
        let audio_ref = match prompt
            .prompt("Audio URL or id (blank to use the video reference): ")
            .await?
        {
            None => return Err(DownloadError::Aborted),
            Some(a) if is_quit(&a) => return Err(DownloadError::Aborted),
            Some(a) if a.trim().is_empty() => video_ref.clone(),
            Some(a) => a.trim().to_string(),
        };

        let video_ref = normalize(&video_ref);
        let audio_ref = normalize(&audio_ref);
        tracing::info!("[Interactive] video={} audio={}", video_ref, audio_ref);

        let tracks = FormatSelectionLoop::new(&self.cascade);
        let video = tracks
            .run(
                TrackKind::Video,
                &video_ref,
                &self.paths.video,
                FormatPolicy::Interactive(&mut *prompt),
            )
            .await?;
        let audio = tracks
            .run(
                TrackKind::Audio,
                &audio_ref,
                &self.paths.audio,
                FormatPolicy::Interactive(&mut *prompt),
            )
            .await?;

        let mut report = RunReport {
            mode: "interactive".to_string(),
            video,
            audio: Some(audio),
            ..Default::default()
        };
        self.finish_merge().await?;
        report.output = Some(self.paths.output.clone());
        Ok(report)
    }

    async fn finish_merge(&self) -> Result<MergeOutcome> {
        let outcome = self
            .merge
            .merge(&self.paths.video, &self.paths.audio, &self.paths.output)
            .await?;
        tracing::info!("[Merge] {:?} -> {}", outcome, self.paths.output.display());

        if !self.keep_tracks {
            self.remove_tracks();
        }
        Ok(outcome)
    }

    async fn run_one_pass(&self, reference: &str) -> Result<()> {
        // Leftovers from the two-track attempt are never merged into the result.
        self.remove_tracks();

        let outcome = self
            .cascade
            .fetch(reference, ONE_PASS_FORMAT, &self.paths.one_pass)
            .await?;
        if !outcome.is_success() || !is_non_empty(&self.paths.one_pass) {
            return Err(DownloadError::OnePassFailed);
        }

        move_into_place(&self.paths.one_pass, &self.paths.output).await?;
        tracing::info!("[Auto] Single-pass download saved to {}", self.paths.output.display());
        Ok(())
    }

    fn remove_tracks(&self) {
        for path in [&self.paths.video, &self.paths.audio] {
            if let Err(e) = remove_if_exists(path) {
                tracing::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}

async fn ask_reference(prompt: &mut dyn PromptProvider) -> Result<String> {
    loop {
        match prompt.prompt("Video URL or id: ").await? {
            None => return Err(DownloadError::Aborted),
            Some(a) if is_quit(&a) => return Err(DownloadError::Aborted),
            Some(a) if a.trim().is_empty() => continue,
            Some(a) => return Ok(a.trim().to_string()),
        }
    }
}
