//! Queries and builds issued against the Xcode toolchain.
use tracing::{debug, info};

use crate::{
    config::{BuildConfiguration, ToolchainSection},
    lib::{
        errors::RunnerError,
        process::CommandRunner,
        xcodebuild::{self, XcodebuildBuildRequest, XcodebuildCommandConfig},
    },
    runner::{
        listers::DeviceLister,
        parsers::DeviceRegistry,
        project::ProjectDescriptor,
    },
};

/// Toolchain commands bound to a runner and the configured tool paths.
pub struct Toolchain<'a, R> {
    runner: &'a R,
    config: &'a ToolchainSection,
}

impl<'a, R: CommandRunner> Toolchain<'a, R> {
    pub fn new(runner: &'a R, config: &'a ToolchainSection) -> Self {
        Self { runner, config }
    }

    /// Raw `xcodebuild -list` output.
    pub async fn list_schemes(&self, project: &ProjectDescriptor) -> Result<String, RunnerError> {
        let invocation =
            xcodebuild::list_command(self.query_config(), project.as_xcodebuild_project());
        let output = self.runner.capture(&invocation).await?;
        Ok(output.ensure_success(&invocation)?.stdout)
    }

    pub async fn list_devices(
        &self,
        lister: &dyn DeviceLister,
    ) -> Result<DeviceRegistry, RunnerError> {
        let invocation = lister.invocation(self.config);
        let output = self
            .runner
            .capture(&invocation)
            .await?
            .ensure_success(&invocation)?;
        let registry = lister.parse(&output)?;
        debug!(
            target: "xcode_runner::toolchain",
            lister = lister.kind().as_str(),
            devices = registry.len(),
            "Parsed device listing"
        );
        Ok(registry)
    }

    /// Raw `-showBuildSettings -json` output for the scheme and device.
    pub async fn show_build_settings(
        &self,
        project: &ProjectDescriptor,
        scheme: &str,
        device_id: &str,
    ) -> Result<String, RunnerError> {
        let invocation = xcodebuild::show_build_settings_command(
            self.query_config(),
            project.as_xcodebuild_project(),
            scheme,
            device_id,
        );
        let output = self.runner.capture(&invocation).await?;
        Ok(output.ensure_success(&invocation)?.stdout)
    }

    /// Build with output streamed to the terminal.
    pub async fn build(
        &self,
        project: &ProjectDescriptor,
        scheme: &str,
        device_id: &str,
        configuration: BuildConfiguration,
    ) -> Result<(), RunnerError> {
        let invocation = xcodebuild::build_command(
            XcodebuildCommandConfig {
                xcodebuild_path: &self.config.xcodebuild_path,
                timeout: self.config.build_timeout(),
            },
            project.as_xcodebuild_project(),
            XcodebuildBuildRequest {
                scheme,
                destination_id: device_id,
                configuration: configuration.as_str(),
            },
        );
        info!(
            target: "xcode_runner::toolchain",
            command = %invocation.command_line(),
            timeout_secs = invocation.timeout.as_secs(),
            "Starting build"
        );

        let output = self.runner.stream(&invocation).await?;
        if !output.succeeded() {
            return Err(RunnerError::BuildFailed {
                scheme: scheme.to_string(),
                exit_code: output.exit_code,
            });
        }
        Ok(())
    }

    fn query_config(&self) -> XcodebuildCommandConfig<'a> {
        XcodebuildCommandConfig {
            xcodebuild_path: &self.config.xcodebuild_path,
            timeout: self.config.query_timeout(),
        }
    }
}
