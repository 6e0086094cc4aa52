//! Load and validate runner configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod telemetry;
pub mod toolchain;
pub mod workflow;

pub use toolchain::{
    parse_toolchain_section, RawToolchainSection, ToolchainSection, DEFAULT_MAX_BUILD_MINUTES,
    DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_XCODEBUILD_PATH, DEFAULT_XCRUN_PATH,
};
pub use workflow::{
    parse_workflow_section, BuildConfiguration, DeployFailurePolicy, DeviceListerKind,
    IdentifierValidation, RawWorkflowSection, SchemeSelection, WorkflowOverrides, WorkflowSection,
};

pub const CONFIG_ENV_KEY: &str = "XCODE_RUNNER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "xcode-runner.toml";

/// Where the configuration file is expected and whether it has to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// `false` only for the implicit default file, which may be absent.
    pub required: bool,
}

/// Top-level configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    pub toolchain: ToolchainSection,
    pub workflow: WorkflowSection,
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawRunnerConfig {
    toolchain: Option<RawToolchainSection>,
    workflow: Option<RawWorkflowSection>,
}

impl RunnerConfig {
    /// Load from `location`, falling back to defaults when an optional file is absent.
    pub fn load(location: &ConfigLocation) -> Result<Self, ConfigError> {
        if !location.required && !location.path.exists() {
            telemetry::log_default_used(&location.path);
            let config = Self::default();
            telemetry::log_loaded(&config);
            return Ok(config);
        }
        Self::load_from_path(location.path.clone())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "xcode_runner::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(
            config::File::from(path.clone()).format(config::FileFormat::Toml),
        );
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "xcode_runner::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawRunnerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "xcode_runner::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "xcode_runner::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(mut self, overrides: &WorkflowOverrides) -> Self {
        self.workflow.apply_overrides(overrides);
        self
    }

    fn from_raw(raw: RawRunnerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let toolchain = parse_toolchain_section(raw.toolchain, &path)?;
        let workflow = parse_workflow_section(raw.workflow);

        Ok(Self {
            toolchain,
            workflow,
            source_path: Some(path),
        })
    }
}
