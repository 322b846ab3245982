// Per-track format selection loop
//
// RESOLVING_FORMAT -> DOWNLOADING -> SUCCEEDED, or back to RESOLVING_FORMAT on
// failure when an operator is present. Automatic runs give up after one pass.

use super::cascade::StrategyCascade;
use super::diagnostics::FailureKind;
use super::errors::{DownloadError, Result};
use super::models::{FormatSpec, TrackKind, TrackReport};
use super::traits::PromptProvider;

/// How formats get chosen for a track
pub enum FormatPolicy<'a> {
    /// Use the track's fallback expression once, no operator
    Automatic,
    /// List variants and ask the operator until a download succeeds
    Interactive(&'a mut dyn PromptProvider),
}

pub struct FormatSelectionLoop<'a> {
    cascade: &'a StrategyCascade,
}

impl<'a> FormatSelectionLoop<'a> {
    pub fn new(cascade: &'a StrategyCascade) -> Self {
        Self { cascade }
    }

    /// Drive `track` to a downloaded artifact at its fixed path.
    ///
    /// Under the automatic policy an exhausted cascade comes back as a report
    /// with `succeeded == false`; the caller decides what happens next.
    pub async fn run(
        &self,
        track: TrackKind,
        reference: &str,
        output: &std::path::Path,
        policy: FormatPolicy<'_>,
    ) -> Result<TrackReport> {
        let mut report = TrackReport {
            reference: reference.to_string(),
            ..Default::default()
        };

        match policy {
            FormatPolicy::Automatic => {
                let format = track.auto_format();
                report.format = Some(format.to_string());
                let outcome = self.cascade.fetch(reference, format, output).await?;
                report.attempts = outcome.attempts;
                report.last_failure = outcome.last_failure;

                report.succeeded = outcome.is_success();
                if report.succeeded {
                    tracing::info!("[{}] saved to {}", track, output.display());
                } else {
                    tracing::warn!("[{}] every strategy failed for {}", track, format);
                }
                Ok(report)
            }
            FormatPolicy::Interactive(prompt) => {
                self.list_variants(reference).await?;
                loop {
                    let spec = ask_format(&mut *prompt, track).await?;
                    let format = spec.resolve(track);
                    report.format = Some(format.clone());

                    let outcome = self.cascade.fetch(reference, &format, output).await?;
                    report.attempts += outcome.attempts;
                    report.last_failure = outcome.last_failure;

                    if outcome.is_success() {
                        report.succeeded = true;
                        println!("{} track saved to {}", track, output.display());
                        return Ok(report);
                    }

                    let kind = outcome.last_failure.unwrap_or(FailureKind::Unknown);
                    println!("Download of {} format '{}' failed: {}", track, format, kind);
                    println!("Hint: {}", kind.hint());
                    self.list_variants(reference).await?;
                }
            }
        }
    }

    async fn list_variants(&self, reference: &str) -> Result<()> {
        let runner = self.cascade.runner();
        runner
            .tool()
            .list_formats(reference, self.cascade.profiles().baseline())
            .await
    }
}

async fn ask_format(prompt: &mut dyn PromptProvider, track: TrackKind) -> Result<FormatSpec> {
    let message = format!(
        "Enter {} format code (blank or 'auto' for automatic, 'q' to quit): ",
        track
    );
    match prompt.prompt(&message).await? {
        None => Err(DownloadError::Aborted),
        Some(answer) if is_quit(&answer) => Err(DownloadError::Aborted),
        Some(answer) => Ok(FormatSpec::parse(&answer)),
    }
}

pub(crate) fn is_quit(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "q" | "quit" | "exit")
}
