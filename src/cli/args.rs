//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::config::{
    BuildConfiguration, DeployFailurePolicy, DeviceListerKind, IdentifierValidation,
    SchemeSelection, WorkflowOverrides,
};

use super::{build_launch_args, resolve_config_location, resolve_project_dir, LaunchProfile};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunWorkflow(LaunchProfile),
    Cli {
        command: CliCommand,
        profile: LaunchProfile,
    },
}

/// Query-only commands that print JSON and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Print the detected project and its schemes.
    Schemes,
    /// Print the available devices reported by the configured lister.
    Devices,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Build an Xcode scheme and launch it on a simulator or device",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Directory containing the .xcworkspace or .xcodeproj (defaults to the current directory).
    #[arg(long = "dir")]
    pub project_dir: Option<PathBuf>,
    /// Path to the TOML config (overrides XCODE_RUNNER_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Build this scheme without prompting.
    #[arg(long, conflicts_with = "first_scheme")]
    pub scheme: Option<String>,
    /// Build the first listed scheme without prompting.
    #[arg(long, default_value_t = false)]
    pub first_scheme: bool,
    /// Deploy to the device with this name without prompting.
    #[arg(long)]
    pub device: Option<String>,
    /// Device listing strategy.
    #[arg(long, value_enum)]
    pub lister: Option<DeviceListerKind>,
    /// Build configuration.
    #[arg(long, value_enum)]
    pub configuration: Option<BuildConfiguration>,
    /// What to do when an install or launch step fails.
    #[arg(long, value_enum)]
    pub deploy_failure: Option<DeployFailurePolicy>,
    /// Accept free-form device identifiers from xctrace.
    #[arg(long, default_value_t = false)]
    pub permissive_ids: bool,
    /// Optional query command.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchProfile> {
        let scheme = non_blank("--scheme", self.scheme)?;
        let device = non_blank("--device", self.device)?;
        let project_dir = resolve_project_dir(self.project_dir)?;
        let config_location = resolve_config_location(self.config_override, &project_dir)?;

        let overrides = WorkflowOverrides {
            configuration: self.configuration,
            scheme_selection: self.first_scheme.then_some(SchemeSelection::First),
            device_lister: self.lister,
            identifier_validation: self
                .permissive_ids
                .then_some(IdentifierValidation::Permissive),
            deploy_failure: self.deploy_failure,
        };
        let launch_args = build_launch_args(
            &project_dir,
            &config_location.path,
            scheme.as_deref(),
            device.as_deref(),
        );

        Ok(LaunchProfile {
            project_dir,
            config_location,
            overrides,
            scheme,
            device,
            launch_args,
        })
    }

    /// Parse CLI args into either workflow mode or query command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        match self.command {
            Some(command) => Ok(ParsedCommand::Cli {
                command,
                profile: self.build()?,
            }),
            None => Ok(ParsedCommand::RunWorkflow(self.build()?)),
        }
    }
}

fn non_blank(flag: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(value) if value.trim().is_empty() => Err(anyhow!("{flag} must not be blank")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}
