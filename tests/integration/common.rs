use std::{fs, path::PathBuf};

use tempfile::TempDir;
use xcode_runner::{
    config::{DeviceListerKind, RunnerConfig},
    lib::process::{CommandOutput, ScriptedCommandRunner},
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_xcode-runner");
pub const SIMULATOR_UDID: &str = "6C1B3F0A-2D4E-4B8C-9A7D-1E2F3A4B5C6D";
pub const DEVICE_UDID: &str = "00008110-001234567890801E";

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let path = root.join("tests/fixtures").join(relative);
    fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()))
}

/// Temporary directory holding an empty `App.xcodeproj`.
pub fn project_dir() -> TempDir {
    let temp = tempfile::tempdir().expect("can create temporary directory");
    fs::create_dir(temp.path().join("App.xcodeproj")).expect("can create project bundle");
    temp
}

pub fn simctl_config() -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config.workflow.device_lister = DeviceListerKind::Simctl;
    config
}

pub const SIMULATOR_APP: &str =
    "/Users/dev/Library/Developer/Xcode/DerivedData/App-abc/Build/Products/Debug-iphonesimulator/App.app";

pub fn settings_prefix(udid: &str) -> String {
    format!("xcodebuild -project App.xcodeproj -scheme App -destination id={udid} -showBuildSettings")
}

pub fn build_prefix(udid: &str) -> String {
    format!("xcodebuild -project App.xcodeproj -scheme App -destination id={udid} -configuration")
}

/// Append successful responses for every command of a simulator run.
/// Responses registered on `runner` beforehand take precedence.
pub fn with_simulator_defaults(runner: ScriptedCommandRunner) -> ScriptedCommandRunner {
    runner
        .respond(
            "xcodebuild -project App.xcodeproj -list",
            CommandOutput::success(fixture("xcodebuild_list_project.txt")),
        )
        .respond(
            "xcrun simctl list devices --json",
            CommandOutput::success(fixture("simctl_devices.json")),
        )
        .respond(
            settings_prefix(SIMULATOR_UDID),
            CommandOutput::success(fixture("build_settings_simulator.json")),
        )
        .respond(build_prefix(SIMULATOR_UDID), CommandOutput::success(""))
        .respond("xcrun simctl bootstatus", CommandOutput::success(""))
        .respond("xcrun simctl install", CommandOutput::success(""))
        .respond(
            "xcrun simctl launch",
            CommandOutput::success("com.example.App: 4242"),
        )
}
