mod common;

use std::sync::Arc;

use common::{files_with_prefix, value_after, Outcome, ScriptedTool, FULL_HELP, MINIMAL_HELP};
use media_acquirer::downloader::{
    AttemptResult, AttemptRunner, Capabilities, CredentialSource, FailureKind, ProfileSettings,
    Profiles, Strategy, StrategyCascade,
};

fn cookie_settings() -> ProfileSettings {
    ProfileSettings {
        use_cookies: true,
        credentials: CredentialSource::Browser("firefox".into()),
        ..Default::default()
    }
}

fn cascade(tool: &Arc<ScriptedTool>, help: &str, settings: &ProfileSettings) -> StrategyCascade {
    let profiles = Profiles::build(&Capabilities::from_help(help), settings);
    StrategyCascade::new(AttemptRunner::new(tool.clone()), profiles)
}

#[tokio::test]
async fn stops_at_first_success_in_declared_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video_only.mp4");
    let tool = Arc::new(ScriptedTool::new(
        FULL_HELP,
        vec![
            Outcome::Fail("ERROR: HTTP Error 403: Forbidden"),
            Outcome::Fail("ERROR: Sign in to confirm you're not a bot"),
            Outcome::Succeed(b"video-bytes"),
        ],
    ));

    let outcome = cascade(&tool, FULL_HELP, &cookie_settings())
        .fetch("abc123", "bestvideo", &out)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.succeeded_with, Some(Strategy::Credentials));
    assert_eq!(outcome.attempts, 3);

    let calls = tool.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].contains(&"--hls-prefer-native".to_string()));
    assert!(!calls[0].contains(&"--extractor-args".to_string()));
    assert_eq!(
        value_after(&calls[1], "--extractor-args").as_deref(),
        Some("youtube:player_client=android")
    );
    assert_eq!(
        value_after(&calls[2], "--cookies-from-browser").as_deref(),
        Some("firefox")
    );
    assert!(!calls[2].contains(&"--extractor-args".to_string()));
    assert!(!calls[2].contains(&"--hls-prefer-native".to_string()));
    assert_eq!(std::fs::read(&out).unwrap(), b"video-bytes");
}

#[tokio::test]
async fn exhausts_every_applicable_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("audio_only.m4a");
    let tool = Arc::new(ScriptedTool::new(
        FULL_HELP,
        vec![Outcome::Fail("HTTP Error 403: Forbidden"); 5],
    ));

    let outcome = cascade(&tool, FULL_HELP, &cookie_settings())
        .fetch("abc123", "bestaudio", &out)
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.attempts, 5);
    assert_eq!(outcome.last_failure, Some(FailureKind::AccessDenied));

    let calls = tool.calls();
    assert_eq!(calls.len(), 5);
    // cookies + native, then cookies + alternate client
    assert!(calls[3].contains(&"--cookies-from-browser".to_string()));
    assert!(calls[3].contains(&"--hls-prefer-native".to_string()));
    assert!(calls[4].contains(&"--cookies-from-browser".to_string()));
    assert!(calls[4].contains(&"--extractor-args".to_string()));
    assert!(!out.exists());
}

#[tokio::test]
async fn skipped_strategies_do_not_count() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("v.mp4");

    let tool = Arc::new(ScriptedTool::new(MINIMAL_HELP, vec![Outcome::Fail("boom")]));
    let outcome = cascade(&tool, MINIMAL_HELP, &cookie_settings())
        .fetch("abc123", "bestvideo", &out)
        .await
        .unwrap();
    assert_eq!(outcome.attempts, 1);
    assert_eq!(tool.calls().len(), 1);
    assert_eq!(outcome.last_failure, Some(FailureKind::Unknown));

    let tool = Arc::new(ScriptedTool::new(
        FULL_HELP,
        vec![Outcome::Fail("boom"), Outcome::Fail("boom")],
    ));
    let outcome = cascade(&tool, FULL_HELP, &ProfileSettings::default())
        .fetch("abc123", "bestvideo", &out)
        .await
        .unwrap();
    assert_eq!(outcome.attempts, 2);
}

#[tokio::test]
async fn runner_removes_stale_output_win_or_lose() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video_only.mp4");

    std::fs::write(&out, b"stale data from a previous run").unwrap();
    let tool = Arc::new(ScriptedTool::new(MINIMAL_HELP, vec![Outcome::Fail("nope")]));
    let runner = AttemptRunner::new(tool.clone());
    let result = runner.run("abc123", "137", &out, &[], &[]).await.unwrap();
    assert!(!result.is_success());
    assert!(!out.exists());

    std::fs::write(&out, b"stale data from a previous run").unwrap();
    let tool = Arc::new(ScriptedTool::new(MINIMAL_HELP, vec![Outcome::Succeed(b"fresh")]));
    let runner = AttemptRunner::new(tool);
    let result = runner.run("abc123", "137", &out, &[], &[]).await.unwrap();
    assert_eq!(result, AttemptResult::Success);
    assert_eq!(std::fs::read(&out).unwrap(), b"fresh");
}

#[tokio::test]
async fn runner_classifies_and_keeps_tail() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("v.mp4");
    let tool = Arc::new(ScriptedTool::new(
        MINIMAL_HELP,
        vec![Outcome::Fail(
            "[youtube] abc123: Downloading webpage\nERROR: unable to download: HTTP Error 403: FORBIDDEN\n",
        )],
    ));
    let runner = AttemptRunner::new(tool);

    match runner.run("abc123", "137", &out, &[], &[]).await.unwrap() {
        AttemptResult::Failure { kind, tail } => {
            assert!(kind.is_access_denied());
            assert!(tail.ends_with("HTTP Error 403: FORBIDDEN"));
            assert_eq!(tail.lines().count(), 2);
        }
        AttemptResult::Success => panic!("expected failure"),
    }
}

#[test]
fn argument_vector_layout() {
    let args = AttemptRunner::build_args(
        "abc123",
        "137",
        std::path::Path::new("/w/video_only.mp4"),
        &["--no-playlist".to_string()],
        &["--hls-prefer-native".to_string()],
    );
    assert_eq!(
        args,
        vec![
            "--no-playlist",
            "--hls-prefer-native",
            "-f",
            "137",
            "-o",
            "/w/video_only.mp4",
            "abc123"
        ]
    );
}

#[tokio::test]
async fn capture_log_is_removed_on_every_branch() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");
    std::fs::create_dir(&logs).unwrap();
    let out = dir.path().join("v.mp4");
    let tool = Arc::new(
        ScriptedTool::new(
            MINIMAL_HELP,
            vec![
                Outcome::Succeed(b"v"),
                Outcome::Fail("ERROR: boom"),
                Outcome::TimeOut,
                Outcome::SpawnFails,
            ],
        )
        .watching(&logs),
    );
    let runner = AttemptRunner::new(tool.clone()).capture_in(&logs);

    for _ in 0..4 {
        runner.run("abc123", "137", &out, &[], &[]).await.unwrap();
        assert!(files_with_prefix(&logs, "fetch-log-").is_empty());
    }
    // the log existed while the tool ran
    assert_eq!(tool.logs_during_fetch(), vec![1, 1, 1, 1]);
}

#[tokio::test]
async fn timed_out_attempt_is_a_network_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let tool = Arc::new(ScriptedTool::new(MINIMAL_HELP, vec![Outcome::TimeOut]));
    let runner = AttemptRunner::new(tool);

    let result = runner
        .run("abc123", "137", &dir.path().join("v.mp4"), &[], &[])
        .await
        .unwrap();
    match result {
        AttemptResult::Failure { kind, tail } => {
            assert_eq!(kind, FailureKind::NetworkTimeout);
            assert!(tail.contains("30s"));
        }
        AttemptResult::Success => panic!("expected failure"),
    }
}

#[tokio::test]
async fn spawn_error_costs_one_attempt_not_the_cascade() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("v.mp4");
    let tool = Arc::new(ScriptedTool::new(
        FULL_HELP,
        vec![Outcome::SpawnFails, Outcome::Succeed(b"video")],
    ));

    let outcome = cascade(&tool, FULL_HELP, &ProfileSettings::default())
        .fetch("abc123", "bestvideo", &out)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded_with, Some(Strategy::AlternateClient));
    assert_eq!(outcome.attempts, 2);
    assert_eq!(std::fs::read(&out).unwrap(), b"video");
}

#[tokio::test]
async fn missing_binary_still_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let runner = AttemptRunner::new(Arc::new(media_acquirer::downloader::YtDlp::new(
        dir.path().join("no-such-yt-dlp"),
        None,
    )));

    let err = runner
        .run("abc123", "137", &dir.path().join("v.mp4"), &[], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, media_acquirer::downloader::DownloadError::ToolNotFound(_)));
}
