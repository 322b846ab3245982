// Helper functions for driving child processes

use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::errors::{DownloadError, Result};

/// Run `program` with stdout and stderr both appended to `capture`.
///
/// With `limit` set, the child is killed once it runs longer than that.
pub async fn run_captured(
    program: &Path,
    args: &[String],
    capture: File,
    limit: Option<Duration>,
) -> Result<ExitStatus> {
    let tool = display_name(program);
    let stderr = capture.try_clone()?;

    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(capture))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DownloadError::spawn(&tool, e))?;

    wait_with_limit(&mut child, &tool, limit).await
}

/// Run `program` with the terminal attached (used for the variant table).
pub async fn run_inherited(program: &Path, args: &[String]) -> Result<ExitStatus> {
    let tool = display_name(program);
    TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| DownloadError::spawn(&tool, e))
}

/// Run `program` and collect stdout; stderr is discarded.
pub async fn run_stdout(program: &Path, args: &[String]) -> Result<(ExitStatus, String)> {
    let tool = display_name(program);
    let out = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| DownloadError::spawn(&tool, e))?;
    Ok((out.status, String::from_utf8_lossy(&out.stdout).into_owned()))
}

async fn wait_with_limit(
    child: &mut tokio::process::Child,
    tool: &str,
    limit: Option<Duration>,
) -> Result<ExitStatus> {
    let Some(limit) = limit else {
        return child.wait().await.map_err(|e| DownloadError::spawn(tool, e));
    };

    match timeout(limit, child.wait()).await {
        Ok(status) => status.map_err(|e| DownloadError::spawn(tool, e)),
        Err(_) => {
            tracing::warn!("{} exceeded {}s, killing it", tool, limit.as_secs());
            let _ = child.kill().await;
            Err(DownloadError::TimedOut {
                tool: tool.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}

pub fn display_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}
