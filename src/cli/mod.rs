//! CLI entrypoint module structure.
use anyhow::Result;
use serde_json::json;

use crate::{
    config::RunnerConfig,
    lib::{
        process::CommandRunner,
        telemetry::{emit_run_profile, RunProfileTelemetry},
    },
    runner::{Chooser, TerminalChooser, Workflow},
};

pub mod args;
pub mod exit;
pub mod profile;

pub use args::{CliCommand, LaunchProfileArgs, ParsedCommand};
pub use exit::RuntimeExit;
pub use profile::{
    build_launch_args, resolve_config_location, resolve_config_location_from,
    resolve_project_dir, LaunchProfile,
};

/// Load the configuration named by the profile and apply its CLI overrides.
pub fn load_config(profile: &LaunchProfile) -> Result<RunnerConfig> {
    let config = RunnerConfig::load(&profile.config_location)?.with_overrides(&profile.overrides);

    let project_dir = profile.project_dir.to_string_lossy();
    let config_path = config
        .source_path
        .as_ref()
        .map(|path| path.to_string_lossy().into_owned());
    emit_run_profile(&RunProfileTelemetry {
        project_dir: &project_dir,
        config_path: config_path.as_deref(),
        device_lister: config.workflow.device_lister.as_str(),
        scheme_selection: config.workflow.scheme_selection.as_str(),
        configuration: config.workflow.configuration.as_str(),
        launch_args: &profile.launch_args,
    });
    Ok(config)
}

/// Run the full workflow and return the summary as pretty JSON.
pub async fn run_workflow<R, C>(
    profile: &LaunchProfile,
    config: &RunnerConfig,
    runner: &R,
    chooser: &C,
) -> Result<String>
where
    R: CommandRunner,
    C: Chooser,
{
    let workflow = Workflow::new(
        runner,
        chooser,
        config,
        &profile.project_dir,
        profile.workflow_options(),
    );
    let summary = workflow.run().await?;
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Execute a query command and return a user-facing JSON payload.
pub async fn execute_cli_command<R: CommandRunner>(
    command: CliCommand,
    profile: &LaunchProfile,
    config: &RunnerConfig,
    runner: &R,
) -> Result<String> {
    let workflow = Workflow::new(
        runner,
        &TerminalChooser,
        config,
        &profile.project_dir,
        profile.workflow_options(),
    );

    let payload = match command {
        CliCommand::Schemes => {
            let (project, schemes) = workflow.detect_schemes().await?;
            json!({
                "project": project.path().to_string_lossy(),
                "kind": project.kind.as_str(),
                "schemes": schemes,
            })
        }
        CliCommand::Devices => {
            let registry = workflow.detect_devices().await?;
            json!({
                "lister": config.workflow.device_lister.as_str(),
                "devices": registry,
            })
        }
    };

    Ok(serde_json::to_string_pretty(&payload)?)
}
