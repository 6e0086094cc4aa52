use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_XCODEBUILD_PATH: &str = "xcodebuild";
pub const DEFAULT_XCRUN_PATH: &str = "xcrun";
pub const DEFAULT_MAX_BUILD_MINUTES: u16 = 30;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 120;

/// `[toolchain]` section: where the Xcode tools live and how long they may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainSection {
    pub xcodebuild_path: PathBuf,
    pub xcrun_path: PathBuf,
    pub max_build_minutes: u16,
    pub query_timeout_secs: u32,
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            xcodebuild_path: PathBuf::from(DEFAULT_XCODEBUILD_PATH),
            xcrun_path: PathBuf::from(DEFAULT_XCRUN_PATH),
            max_build_minutes: DEFAULT_MAX_BUILD_MINUTES,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        }
    }
}

impl ToolchainSection {
    /// Deadline for the streamed `xcodebuild build`.
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_build_minutes) * 60)
    }

    /// Deadline for listing, settings queries, and deploy steps.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.query_timeout_secs))
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawToolchainSection {
    pub xcodebuild_path: Option<PathBuf>,
    pub xcrun_path: Option<PathBuf>,
    pub max_build_minutes: Option<u16>,
    pub query_timeout_secs: Option<u32>,
}

pub fn parse_toolchain_section(
    raw: Option<RawToolchainSection>,
    path: &Path,
) -> Result<ToolchainSection, ConfigError> {
    let raw = raw.unwrap_or_default();

    let xcodebuild_path = raw
        .xcodebuild_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_XCODEBUILD_PATH));
    validate_program(path, "toolchain.xcodebuild_path", &xcodebuild_path)?;

    let xcrun_path = raw
        .xcrun_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_XCRUN_PATH));
    validate_program(path, "toolchain.xcrun_path", &xcrun_path)?;

    let max_build_minutes = raw.max_build_minutes.unwrap_or(DEFAULT_MAX_BUILD_MINUTES);
    validate_build_minutes(path, max_build_minutes)?;

    let query_timeout_secs = raw.query_timeout_secs.unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS);
    validate_query_timeout(path, query_timeout_secs)?;

    Ok(ToolchainSection {
        xcodebuild_path,
        xcrun_path,
        max_build_minutes,
        query_timeout_secs,
    })
}

fn validate_program(path: &Path, field: &'static str, program: &Path) -> Result<(), ConfigError> {
    if program.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Provide a program name on PATH or an absolute path".into(),
        });
    }
    Ok(())
}

fn validate_build_minutes(path: &Path, minutes: u16) -> Result<(), ConfigError> {
    if !(1..=240).contains(&minutes) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "toolchain.max_build_minutes",
            message: "Specify a value between 1 and 240 minutes".into(),
        });
    }
    Ok(())
}

fn validate_query_timeout(path: &Path, secs: u32) -> Result<(), ConfigError> {
    if !(5..=1800).contains(&secs) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "toolchain.query_timeout_secs",
            message: "Specify a value between 5 and 1800 seconds".into(),
        });
    }
    Ok(())
}
