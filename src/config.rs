//! Resolved run configuration.
//!
//! Everything the pipeline needs from the process boundary, already parsed.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;
use crate::downloader::{ArtifactPaths, CredentialSource, ProfileSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Automatic,
    Interactive,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub reference: Option<String>,
    pub profile: ProfileSettings,
    pub paths: ArtifactPaths,
    pub ytdlp: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub attempt_timeout: Option<Duration>,
    pub keep_tracks: bool,
    pub report: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        let work_dir = args.work_dir.clone().unwrap_or_else(default_work_dir);
        let mut paths = ArtifactPaths::in_dir(&work_dir);
        if let Some(output) = args.output {
            paths = paths.with_output(output);
        }

        let credentials = match args.cookies {
            Some(file) => CredentialSource::File(file),
            None => CredentialSource::Browser(args.cookies_from_browser),
        };

        Self {
            mode: if args.auto {
                Mode::Automatic
            } else {
                Mode::Interactive
            },
            reference: args.reference.filter(|r| !r.trim().is_empty()),
            profile: ProfileSettings {
                use_cookies: args.use_cookies,
                credentials,
                force_ipv4: args.ipv4,
                user_agent: args.user_agent.filter(|ua| !ua.trim().is_empty()),
                player_client: args.player_client,
            },
            paths,
            ytdlp: args.ytdlp,
            ffmpeg: args.ffmpeg,
            attempt_timeout: args
                .attempt_timeout
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            keep_tracks: args.keep_tracks,
            report: args.report,
        }
    }

    /// Directory holding the track artifacts
    pub fn work_dir(&self) -> Option<&std::path::Path> {
        self.paths.video.parent()
    }
}

fn default_work_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
