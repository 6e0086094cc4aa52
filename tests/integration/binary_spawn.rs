use std::process::Command;

use crate::common::{fixture, BINARY_PATH};

#[test]
fn empty_directory_fails_at_project_location() {
    let temp = tempfile::tempdir().expect("can create temporary directory");

    let output = Command::new(BINARY_PATH)
        .arg("--dir")
        .arg(temp.path())
        .arg("--first-scheme")
        .env_remove("XCODE_RUNNER_CONFIG")
        .output()
        .expect("process should start");

    assert!(!output.status.success(), "empty directory must fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("locate_project failed: No .xcworkspace or .xcodeproj found"),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("hint: "), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_config_file_is_reported_before_any_command_runs() {
    let temp = tempfile::tempdir().expect("can create temporary directory");
    let config_path = temp.path().join("xcode-runner.toml");
    std::fs::write(&config_path, fixture("config_invalid_minutes.toml"))
        .expect("can write config");

    let output = Command::new(BINARY_PATH)
        .arg("--dir")
        .arg(temp.path())
        .env_remove("XCODE_RUNNER_CONFIG")
        .output()
        .expect("process should start");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("toolchain.max_build_minutes"),
        "stderr: {stderr}"
    );
}

#[test]
fn blank_scheme_flag_is_rejected() {
    let output = Command::new(BINARY_PATH)
        .args(["--scheme", " "])
        .output()
        .expect("process should start");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--scheme must not be blank"), "stderr: {stderr}");
}
