//! Entry point for xcode-runner.
use std::process::ExitCode;

use clap::Parser;
use xcode_runner::{
    cli::{
        execute_cli_command, load_config, run_workflow, LaunchProfile, LaunchProfileArgs,
        ParsedCommand, RuntimeExit,
    },
    lib::{process::SystemCommandRunner, telemetry},
    runner::TerminalChooser,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;
    let args = LaunchProfileArgs::parse();
    let command = args.into_command().map_err(RuntimeExit::from_error)?;

    let message = match command {
        ParsedCommand::RunWorkflow(profile) => handle_workflow(profile).await?,
        ParsedCommand::Cli { command, profile } => {
            let config = load_config(&profile).map_err(RuntimeExit::from_error)?;
            execute_cli_command(command, &profile, &config, &SystemCommandRunner)
                .await
                .map_err(RuntimeExit::from_error)?
        }
    };
    println!("{message}");
    Ok(())
}

async fn handle_workflow(profile: LaunchProfile) -> Result<String, RuntimeExit> {
    let config = load_config(&profile).map_err(RuntimeExit::from_error)?;
    run_workflow(&profile, &config, &SystemCommandRunner, &TerminalChooser)
        .await
        .map_err(RuntimeExit::from_error)
}
