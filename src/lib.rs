pub mod cli;
pub mod config;
pub mod downloader;

pub use config::Config;
pub use downloader::{DownloadError, Orchestrator, RunReport};
