use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_main_switches() {
    Command::cargo_bin("media-acquirer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--auto"))
        .stdout(predicate::str::contains("--use-cookies"));
}

#[test]
fn missing_tool_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("media-acquirer")
        .unwrap()
        .args(["--auto", "abc123", "--ytdlp"])
        .arg(dir.path().join("no-such-yt-dlp"))
        .arg("--work-dir")
        .arg(dir.path())
        .env("PATH", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("yt-dlp"));
}
