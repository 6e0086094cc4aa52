//! Shared helpers for building `xcodebuild` invocations.

use std::{path::Path, time::Duration};

use crate::lib::process::Invocation;

pub struct XcodebuildCommandConfig<'a> {
    pub xcodebuild_path: &'a Path,
    pub timeout: Duration,
}

/// The project or workspace every invocation is pointed at.
pub struct XcodebuildProject<'a> {
    /// `-workspace` or `-project`.
    pub flag: &'a str,
    /// Entry name relative to `directory`.
    pub name: &'a str,
    pub directory: &'a Path,
}

pub struct XcodebuildBuildRequest<'a> {
    pub scheme: &'a str,
    pub destination_id: &'a str,
    pub configuration: &'a str,
}

/// `-destination` value addressing a device by identifier.
pub fn destination_for(device_id: &str) -> String {
    format!("id={device_id}")
}

fn base_invocation(config: &XcodebuildCommandConfig<'_>, project: &XcodebuildProject<'_>) -> Invocation {
    Invocation::new(config.xcodebuild_path, config.timeout)
        .current_dir(project.directory)
        .arg(project.flag)
        .arg(project.name)
}

/// `xcodebuild -list`.
pub fn list_command(
    config: XcodebuildCommandConfig<'_>,
    project: XcodebuildProject<'_>,
) -> Invocation {
    base_invocation(&config, &project).arg("-list")
}

/// `xcodebuild -scheme S -destination id=D -showBuildSettings -json`.
pub fn show_build_settings_command(
    config: XcodebuildCommandConfig<'_>,
    project: XcodebuildProject<'_>,
    scheme: &str,
    destination_id: &str,
) -> Invocation {
    base_invocation(&config, &project)
        .arg("-scheme")
        .arg(scheme)
        .arg("-destination")
        .arg(destination_for(destination_id))
        .args(["-showBuildSettings", "-json"])
}

/// `xcodebuild -scheme S -destination id=D -configuration C build`.
pub fn build_command(
    config: XcodebuildCommandConfig<'_>,
    project: XcodebuildProject<'_>,
    request: XcodebuildBuildRequest<'_>,
) -> Invocation {
    base_invocation(&config, &project)
        .arg("-scheme")
        .arg(request.scheme)
        .arg("-destination")
        .arg(destination_for(request.destination_id))
        .arg("-configuration")
        .arg(request.configuration)
        .arg("build")
}
