//! Shared helpers for building `xcrun` invocations (simctl, devicectl, xctrace).

use std::{path::Path, time::Duration};

use crate::lib::process::Invocation;

#[derive(Debug, Clone, Copy)]
pub struct XcrunCommandConfig<'a> {
    pub xcrun_path: &'a Path,
    pub timeout: Duration,
}

impl XcrunCommandConfig<'_> {
    fn invocation(&self) -> Invocation {
        Invocation::new(self.xcrun_path, self.timeout)
    }
}

/// `xcrun simctl list devices --json`.
pub fn simctl_list_devices(config: XcrunCommandConfig<'_>) -> Invocation {
    config
        .invocation()
        .args(["simctl", "list", "devices", "--json"])
}

/// `xcrun xctrace list devices`.
pub fn xctrace_list_devices(config: XcrunCommandConfig<'_>) -> Invocation {
    config.invocation().args(["xctrace", "list", "devices"])
}

/// `xcrun simctl bootstatus UDID -b` (boots the simulator if needed and waits).
pub fn simctl_bootstatus(config: XcrunCommandConfig<'_>, udid: &str) -> Invocation {
    config
        .invocation()
        .args(["simctl", "bootstatus"])
        .arg(udid)
        .arg("-b")
}

pub fn simctl_install(config: XcrunCommandConfig<'_>, udid: &str, app_path: &str) -> Invocation {
    config
        .invocation()
        .args(["simctl", "install"])
        .arg(udid)
        .arg(app_path)
}

pub fn simctl_launch(config: XcrunCommandConfig<'_>, udid: &str, bundle_id: &str) -> Invocation {
    config
        .invocation()
        .args(["simctl", "launch"])
        .arg(udid)
        .arg(bundle_id)
}

pub fn devicectl_install(config: XcrunCommandConfig<'_>, udid: &str, app_path: &str) -> Invocation {
    config
        .invocation()
        .args(["devicectl", "device", "install", "app", "--device"])
        .arg(udid)
        .arg("--bundle")
        .arg(app_path)
}

/// `xcrun devicectl device process launch`, optionally suspended at launch.
pub fn devicectl_launch(
    config: XcrunCommandConfig<'_>,
    udid: &str,
    bundle_id: &str,
    start_stopped: bool,
) -> Invocation {
    let invocation = config
        .invocation()
        .args(["devicectl", "device", "process", "launch", "--device"])
        .arg(udid);
    let invocation = if start_stopped {
        invocation.arg("--start-stopped")
    } else {
        invocation
    };
    invocation.arg(bundle_id)
}
