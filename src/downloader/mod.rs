// Downloader module - resilient acquisition pipeline
//
// orchestrator -> format_loop (per track) -> cascade -> attempt -> yt-dlp
//                                         \-> merge -> ffmpeg

pub mod attempt;
pub mod cascade;
pub mod diagnostics;
pub mod errors;
pub mod format_loop;
pub mod merge;
pub mod models;
pub mod orchestrator;
pub mod profiles;
pub mod prompt;
pub mod tools;
pub mod traits;
pub mod utils;

pub use attempt::AttemptRunner;
pub use cascade::{CascadeOutcome, StrategyCascade};
pub use diagnostics::{classify_log, Classifier, FailureKind, SignatureClassifier};
pub use errors::{DownloadError, Result};
pub use format_loop::{FormatPolicy, FormatSelectionLoop};
pub use merge::{MergeOutcome, MergeStage};
pub use models::{normalize, ArtifactPaths, AttemptResult, FormatSpec, RunReport, TrackKind, TrackReport};
pub use orchestrator::Orchestrator;
pub use profiles::{Capabilities, CredentialSource, ProfileSettings, Profiles, Strategy};
pub use prompt::{ScriptedPrompt, StdinPrompt};
pub use tools::{find_tool, Ffmpeg, ToolType, YtDlp};
pub use traits::{FetchTool, Muxer, PromptProvider};
