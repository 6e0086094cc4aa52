use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures raised by the locate → build → deploy workflow and its building blocks.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("No .xcworkspace or .xcodeproj found in {dir}")]
    ProjectNotFound { dir: PathBuf },
    #[error("Failed to read directory {dir}: {source}")]
    ProjectScan {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` timed out after {duration_secs} seconds")]
    CommandTimeout { command: String, duration_secs: u64 },
    #[error("`{command}` exited abnormally (exit={exit_code:?}):\n{output}")]
    ToolchainInvocationFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },
    #[error("Failed to parse {what}: {message}")]
    ParseFailed { what: &'static str, message: String },
    #[error("No schemes found in the xcodebuild -list output")]
    NoSchemesFound,
    #[error("Scheme `{scheme}` is not declared by the project")]
    SchemeNotFound { scheme: String },
    #[error("No available devices found")]
    NoDevicesFound,
    #[error("Selection for `{label}` was aborted")]
    SelectionAborted { label: String },
    #[error("Could not find an identifier for device `{name}`")]
    DeviceNotFound { name: String },
    #[error("Build of scheme `{scheme}` failed (exit={exit_code:?})")]
    BuildFailed {
        scheme: String,
        exit_code: Option<i32>,
    },
    #[error("Build setting `{field}` is missing or empty")]
    MissingBuildSetting { field: &'static str },
    #[error("Deploy step `{step}` failed (exit={exit_code:?}): {output}")]
    DeployFailed {
        step: &'static str,
        exit_code: Option<i32>,
        output: String,
    },
}

impl RunnerError {
    /// Short hint printed under the error message, when one applies.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            RunnerError::ProjectNotFound { .. } => Some(
                "Run inside a directory that contains an .xcodeproj or .xcworkspace, or pass --dir.",
            ),
            RunnerError::CommandSpawn { .. } => Some(
                "Install the Xcode command line tools or set toolchain.xcodebuild_path / toolchain.xcrun_path.",
            ),
            RunnerError::CommandTimeout { .. } => {
                Some("Increase toolchain.max_build_minutes or toolchain.query_timeout_secs.")
            }
            RunnerError::NoSchemesFound => {
                Some("Share at least one scheme in Xcode (Product > Scheme > Manage Schemes).")
            }
            RunnerError::NoDevicesFound => Some(
                "Boot a simulator or connect a device, or switch listers with --lister simctl|xctrace.",
            ),
            RunnerError::MissingBuildSetting { .. } => {
                Some("Check that the scheme builds an application target.")
            }
            _ => None,
        }
    }
}
