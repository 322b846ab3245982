use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Fetch separate video and audio tracks with yt-dlp, retrying across
/// client strategies, and join them with ffmpeg.
#[derive(Parser, Debug, Clone)]
#[command(name = "media-acquirer", author, version, about)]
pub struct Args {
    /// Video URL or id. Prompted for in interactive mode when absent
    #[arg(env = "MEDIA_ACQUIRER_REFERENCE")]
    pub reference: Option<String>,

    /// Automatic mode: no prompts, fallback formats, single-pass fallback
    #[arg(short = 'a', long, env = "MEDIA_ACQUIRER_AUTO", action = ArgAction::SetTrue)]
    pub auto: bool,

    /// Allow credential-assisted retries (browser cookies or cookies file)
    #[arg(long, env = "MEDIA_ACQUIRER_USE_COOKIES", action = ArgAction::SetTrue)]
    pub use_cookies: bool,

    /// Browser to read cookies from for credential-assisted retries
    #[arg(long, env = "MEDIA_ACQUIRER_BROWSER", default_value = "chrome")]
    pub cookies_from_browser: String,

    /// Netscape cookies file; takes precedence over --cookies-from-browser
    #[arg(long, env = "MEDIA_ACQUIRER_COOKIES")]
    pub cookies: Option<PathBuf>,

    /// Force all connections over IPv4
    #[arg(short = '4', long, env = "MEDIA_ACQUIRER_IPV4", action = ArgAction::SetTrue)]
    pub ipv4: bool,

    /// Custom HTTP User-Agent passed to yt-dlp
    #[arg(long, env = "MEDIA_ACQUIRER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Player client used by the alternate-identity strategy
    #[arg(long, env = "MEDIA_ACQUIRER_PLAYER_CLIENT", default_value = "android")]
    pub player_client: String,

    /// Directory for track artifacts (default: your Downloads folder)
    #[arg(long, env = "MEDIA_ACQUIRER_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Final output file (default: <work-dir>/merged_output.mp4)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long, env = "YTDLP_PATH")]
    pub ytdlp: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, env = "FFMPEG_PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Kill a single yt-dlp attempt after this many seconds (default: no limit)
    #[arg(long, value_name = "SECONDS")]
    pub attempt_timeout: Option<u64>,

    /// Keep the separate track files after a successful merge
    #[arg(long, action = ArgAction::SetTrue)]
    pub keep_tracks: bool,

    /// Write a JSON summary of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
