use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use media_acquirer::cli::Args;
use media_acquirer::config::{Config, Mode};
use media_acquirer::downloader::{
    find_tool, Ffmpeg, FetchTool, Muxer, Orchestrator, RunReport, StdinPrompt, ToolType, YtDlp,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "media_acquirer=info",
        1 => "media_acquirer=debug",
        _ => "media_acquirer=trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = Config::from_args(args);
    match run(&config).await {
        Ok(report) => {
            if let Some(output) = &report.output {
                println!("Done: {}", output.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(config: &Config) -> Result<RunReport> {
    if let Some(dir) = config.work_dir() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create work dir {}", dir.display()))?;
    }

    let ytdlp_path = find_tool(ToolType::YtDlp, config.ytdlp.as_deref()).context("locate yt-dlp")?;
    let ffmpeg_path = find_tool(ToolType::Ffmpeg, config.ffmpeg.as_deref()).context("locate ffmpeg")?;
    tracing::debug!("yt-dlp: {}, ffmpeg: {}", ytdlp_path.display(), ffmpeg_path.display());

    let tool: Arc<dyn FetchTool> = Arc::new(YtDlp::new(ytdlp_path, config.attempt_timeout));
    let muxer: Arc<dyn Muxer> = Arc::new(Ffmpeg::new(ffmpeg_path));

    let orchestrator = Orchestrator::prepare(tool, muxer, &config.profile, config.paths.clone())
        .await
        .context("probe yt-dlp capabilities")?
        .keep_tracks(config.keep_tracks);

    let report = match config.mode {
        Mode::Automatic => {
            let reference = config
                .reference
                .as_deref()
                .context("automatic mode needs a video URL or id")?;
            orchestrator.run_automatic(reference).await?
        }
        Mode::Interactive => {
            let mut prompt = StdinPrompt::new();
            orchestrator
                .run_interactive(config.reference.as_deref(), &mut prompt)
                .await?
        }
    };

    if let Some(path) = &config.report {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("write report {}", path.display()))?;
    }
    Ok(report)
}
