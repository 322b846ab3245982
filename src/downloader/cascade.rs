// Strategy cascade - ordered fallback across option profiles
//
// Order: direct (native segments when available), alternate client identity,
// then credential-assisted alone and combined with each of the first two.
// Stops on the first success.

use std::path::Path;

use super::attempt::AttemptRunner;
use super::diagnostics::FailureKind;
use super::errors::Result;
use super::models::AttemptResult;
use super::profiles::{Profiles, Strategy};

/// What one pass through the cascade did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Strategy that succeeded, if any
    pub succeeded_with: Option<Strategy>,
    /// Invocations issued (skipped strategies are not counted)
    pub attempts: usize,
    pub last_failure: Option<FailureKind>,
}

impl CascadeOutcome {
    pub fn is_success(&self) -> bool {
        self.succeeded_with.is_some()
    }
}

pub struct StrategyCascade {
    runner: AttemptRunner,
    profiles: Profiles,
}

impl StrategyCascade {
    pub fn new(runner: AttemptRunner, profiles: Profiles) -> Self {
        Self { runner, profiles }
    }

    pub fn runner(&self) -> &AttemptRunner {
        &self.runner
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    pub async fn fetch(&self, reference: &str, format: &str, output: &Path) -> Result<CascadeOutcome> {
        let strategies = self.profiles.strategies();
        let total = strategies.len();
        let mut outcome = CascadeOutcome {
            succeeded_with: None,
            attempts: 0,
            last_failure: None,
        };

        for (idx, (strategy, extra)) in strategies.iter().enumerate() {
            tracing::info!(
                "[Cascade] Trying strategy '{}' ({}/{}) format={}",
                strategy,
                idx + 1,
                total,
                format
            );
            outcome.attempts += 1;

            let result = self
                .runner
                .run(reference, format, output, self.profiles.baseline(), extra)
                .await?;

            match result {
                AttemptResult::Success => {
                    tracing::info!("[Cascade] ✓ Success with '{}'", strategy);
                    outcome.succeeded_with = Some(*strategy);
                    return Ok(outcome);
                }
                AttemptResult::Failure { kind, tail } => {
                    if kind.is_access_denied() {
                        tracing::warn!("[Cascade] ✗ '{}' denied access by remote", strategy);
                    } else {
                        tracing::warn!("[Cascade] ✗ '{}' failed: {}", strategy, kind);
                    }
                    if !tail.is_empty() {
                        tracing::warn!("[Cascade] last output:\n{}", tail);
                    }
                    outcome.last_failure = Some(kind);
                }
            }
        }

        tracing::warn!("[Cascade] All {} strategies failed for format {}", total, format);
        if let Some(kind) = outcome.last_failure {
            if kind.cookies_might_help() && !self.profiles.has_credentials() {
                tracing::info!("[Cascade] {}: retrying with --use-cookies may help", kind);
            }
        }
        Ok(outcome)
    }
}
