#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use media_acquirer::downloader::{DownloadError, FetchTool, Muxer, Result};

/// `--help` excerpt advertising every optional flag the profiles use
pub const FULL_HELP: &str = "\
    --no-playlist                   Download only the video
    -R, --retries RETRIES           Number of retries
    --fragment-retries RETRIES      Number of retries for a fragment
    --merge-output-format FORMAT    Containers that may be used when merging
    -4, --force-ipv4                Make all connections via IPv4
    --user-agent UA                 Specify a custom user agent
    --hls-prefer-native             Use the native HLS downloader
    --extractor-args IE_KEY:ARGS    Pass ARGS arguments to the IE_KEY extractor
    --cookies FILE                  Netscape formatted file to read cookies from
    --cookies-from-browser BROWSER  The name of the browser to load cookies from
";

/// A tool that advertises nothing optional: only the direct strategy applies
pub const MINIMAL_HELP: &str = "Usage: yt-dlp [OPTIONS] URL\n    -h, --help   Print help\n";

#[derive(Debug, Clone)]
pub enum Outcome {
    /// Exit 0 and write these bytes to the `-o` path
    Succeed(&'static [u8]),
    /// Exit 0 without producing a file
    SucceedEmpty,
    /// Exit 1 with this text as combined output
    Fail(&'static str),
    /// Killed by the attempt timeout
    TimeOut,
    /// Process could not be started (not a missing binary)
    SpawnFails,
}

/// yt-dlp stand-in that replays scripted outcomes and records every call
pub struct ScriptedTool {
    help: String,
    outcomes: Mutex<VecDeque<Outcome>>,
    pub calls: Mutex<Vec<Vec<String>>>,
    pub listings: Mutex<Vec<String>>,
    watch: Option<PathBuf>,
    /// Capture logs present in the watched dir while each fetch ran
    pub logs_during_fetch: Mutex<Vec<usize>>,
}

impl ScriptedTool {
    pub fn new(help: &str, outcomes: Vec<Outcome>) -> Self {
        Self {
            help: help.to_string(),
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
            listings: Mutex::new(Vec::new()),
            watch: None,
            logs_during_fetch: Mutex::new(Vec::new()),
        }
    }

    /// Count `fetch-log-*` files in `dir` at the start of every fetch
    pub fn watching(mut self, dir: &Path) -> Self {
        self.watch = Some(dir.to_path_buf());
        self
    }

    pub fn logs_during_fetch(&self) -> Vec<usize> {
        self.logs_during_fetch.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn listings(&self) -> Vec<String> {
        self.listings.lock().unwrap().clone()
    }

    /// Value following `-f` in each recorded call
    pub fn formats(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|args| value_after(args, "-f").unwrap_or_default())
            .collect()
    }
}

pub fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[async_trait]
impl FetchTool for ScriptedTool {
    fn name(&self) -> &str {
        "scripted-yt-dlp"
    }

    async fn help_text(&self) -> Result<String> {
        Ok(self.help.clone())
    }

    async fn fetch(&self, args: &[String], mut capture: File) -> Result<bool> {
        self.calls.lock().unwrap().push(args.to_vec());
        if let Some(dir) = &self.watch {
            let seen = files_with_prefix(dir, "fetch-log-").len();
            self.logs_during_fetch.lock().unwrap().push(seen);
        }
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Fail("ERROR: script exhausted"));

        match outcome {
            Outcome::Succeed(bytes) => {
                let out = value_after(args, "-o").expect("-o present");
                std::fs::write(out, bytes)?;
                capture.write_all(b"[download] 100% of 1.00MiB\n")?;
                Ok(true)
            }
            Outcome::SucceedEmpty => Ok(true),
            Outcome::Fail(log) => {
                capture.write_all(log.as_bytes())?;
                Ok(false)
            }
            Outcome::TimeOut => Err(DownloadError::TimedOut {
                tool: "yt-dlp".to_string(),
                seconds: 30,
            }),
            Outcome::SpawnFails => Err(DownloadError::spawn(
                "yt-dlp",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            )),
        }
    }

    async fn list_formats(&self, reference: &str, _baseline: &[String]) -> Result<()> {
        self.listings.lock().unwrap().push(reference.to_string());
        Ok(())
    }
}

/// ffmpeg stand-in; concatenates inputs on success, leaves junk on failure
pub struct RecordingMuxer {
    succeed: bool,
    pub calls: Mutex<Vec<(PathBuf, PathBuf, PathBuf)>>,
}

impl RecordingMuxer {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Muxer for RecordingMuxer {
    fn name(&self) -> &str {
        "recording-ffmpeg"
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<bool> {
        self.calls
            .lock()
            .unwrap()
            .push((video.to_path_buf(), audio.to_path_buf(), output.to_path_buf()));

        if !self.succeed {
            std::fs::write(output, b"trunc")?;
            return Ok(false);
        }
        let mut joined = std::fs::read(video)?;
        joined.extend(std::fs::read(audio)?);
        std::fs::write(output, joined)?;
        Ok(true)
    }
}

/// Files in `dir` whose name starts with `prefix`
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
        })
        .collect()
}

/// Scratch dir on a different filesystem from the default temp dir, if the
/// host has one (tmpfs at /dev/shm on most Linux machines).
#[cfg(unix)]
pub fn foreign_fs_dir() -> Option<tempfile::TempDir> {
    use std::os::unix::fs::MetadataExt;

    let tmp_dev = std::fs::metadata(std::env::temp_dir()).ok()?.dev();
    ["/dev/shm", "/run/user"]
        .iter()
        .map(Path::new)
        .filter(|p| p.is_dir())
        .filter(|p| std::fs::metadata(p).map(|m| m.dev() != tmp_dev).unwrap_or(false))
        .find_map(|p| tempfile::tempdir_in(p).ok())
}
