//! Install and launch of a built app on a simulator or a physical device.
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::DeployFailurePolicy,
    lib::{
        errors::RunnerError,
        process::{CommandRunner, Invocation},
        xcrun::{self, XcrunCommandConfig},
    },
};

/// Path segment that marks a simulator build product.
pub const SIMULATOR_MARKER: &str = "simulator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Simulator,
    Device,
}

impl TargetKind {
    /// `Debug-iphonesimulator/App.app` → simulator, anything else → device.
    pub fn from_app_path(app_path: &str) -> Self {
        if app_path.to_ascii_lowercase().contains(SIMULATOR_MARKER) {
            TargetKind::Simulator
        } else {
            TargetKind::Device
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Simulator => "simulator",
            TargetKind::Device => "device",
        }
    }
}

/// Where and what to deploy.
#[derive(Debug, Clone, Copy)]
pub struct DeployTarget<'a> {
    pub udid: &'a str,
    pub app_path: &'a str,
    pub bundle_identifier: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployStep {
    pub name: &'static str,
    pub invocation: Invocation,
}

/// Ordered deploy steps for one target kind.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    target: TargetKind,
    steps: Vec<DeployStep>,
}

impl DeployPlan {
    pub fn new(
        target: TargetKind,
        xcrun_config: XcrunCommandConfig<'_>,
        deploy: DeployTarget<'_>,
        start_stopped: bool,
    ) -> Self {
        let steps = match target {
            TargetKind::Simulator => vec![
                DeployStep {
                    name: "boot",
                    invocation: xcrun::simctl_bootstatus(xcrun_config, deploy.udid),
                },
                DeployStep {
                    name: "install",
                    invocation: xcrun::simctl_install(xcrun_config, deploy.udid, deploy.app_path),
                },
                DeployStep {
                    name: "launch",
                    invocation: xcrun::simctl_launch(
                        xcrun_config,
                        deploy.udid,
                        deploy.bundle_identifier,
                    ),
                },
            ],
            TargetKind::Device => vec![
                DeployStep {
                    name: "install",
                    invocation: xcrun::devicectl_install(
                        xcrun_config,
                        deploy.udid,
                        deploy.app_path,
                    ),
                },
                DeployStep {
                    name: "launch",
                    invocation: xcrun::devicectl_launch(
                        xcrun_config,
                        deploy.udid,
                        deploy.bundle_identifier,
                        start_stopped,
                    ),
                },
            ],
        };
        Self { target, steps }
    }

    pub fn steps(&self) -> &[DeployStep] {
        &self.steps
    }

    /// Run every step in order under `policy`.
    ///
    /// Spawn errors and timeouts count as step failures; the report is
    /// always complete, one outcome per step.
    pub async fn execute<R: CommandRunner>(
        &self,
        runner: &R,
        policy: DeployFailurePolicy,
    ) -> DeployReport {
        let mut outcomes = Vec::with_capacity(self.steps.len());
        let mut halted = false;

        for step in &self.steps {
            let command = step.invocation.command_line();
            if halted {
                outcomes.push(StepOutcome {
                    step: step.name,
                    command,
                    status: StepStatus::Skipped,
                });
                continue;
            }

            let status = match runner.capture(&step.invocation).await {
                Ok(output) if output.succeeded() => StepStatus::Succeeded,
                Ok(output) => StepStatus::Failed {
                    exit_code: output.exit_code,
                    output: output.excerpt(),
                },
                Err(err) => StepStatus::Failed {
                    exit_code: None,
                    output: err.to_string(),
                },
            };

            match &status {
                StepStatus::Failed { exit_code, output } => {
                    warn!(
                        target: "xcode_runner::workflow",
                        step = step.name,
                        command = %command,
                        exit_code = ?exit_code,
                        output = %output,
                        "Deploy step failed"
                    );
                    halted = policy == DeployFailurePolicy::Abort;
                }
                _ => info!(
                    target: "xcode_runner::workflow",
                    step = step.name,
                    "Deploy step succeeded"
                ),
            }

            outcomes.push(StepOutcome {
                step: step.name,
                command,
                status,
            });
        }

        DeployReport {
            target: self.target,
            outcomes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed {
        exit_code: Option<i32>,
        output: String,
    },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: &'static str,
    pub command: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Per-step outcome of a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub target: TargetKind,
    pub outcomes: Vec<StepOutcome>,
}

impl DeployReport {
    pub fn first_failure(&self) -> Option<&StepOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| matches!(outcome.status, StepStatus::Failed { .. }))
    }

    pub fn succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| outcome.status == StepStatus::Succeeded)
    }

    /// The first failure as `DeployFailed`, if any step failed.
    pub fn failure_error(&self) -> Option<RunnerError> {
        let outcome = self.first_failure()?;
        match &outcome.status {
            StepStatus::Failed { exit_code, output } => Some(RunnerError::DeployFailed {
                step: outcome.step,
                exit_code: *exit_code,
                output: output.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use super::*;
    use crate::lib::process::{CommandOutput, ScriptedCommandRunner};

    const UDID: &str = "6C1B3F0A-2D4E-4B8C-9A7D-1E2F3A4B5C6D";

    fn xcrun_config() -> XcrunCommandConfig<'static> {
        XcrunCommandConfig {
            xcrun_path: Path::new("xcrun"),
            timeout: Duration::from_secs(30),
        }
    }

    fn plan(target: TargetKind) -> DeployPlan {
        DeployPlan::new(
            target,
            xcrun_config(),
            DeployTarget {
                udid: UDID,
                app_path: "/out/Debug-iphonesimulator/App.app",
                bundle_identifier: "com.example.App",
            },
            true,
        )
    }

    fn statuses(report: &DeployReport) -> Vec<&'static str> {
        report
            .outcomes
            .iter()
            .map(|outcome| match outcome.status {
                StepStatus::Succeeded => "succeeded",
                StepStatus::Failed { .. } => "failed",
                StepStatus::Skipped => "skipped",
            })
            .collect()
    }

    #[test]
    fn target_kind_follows_the_app_path_marker() {
        assert_eq!(
            TargetKind::from_app_path("/out/Debug-iphonesimulator/App.app"),
            TargetKind::Simulator
        );
        assert_eq!(
            TargetKind::from_app_path("/out/Debug-iPhoneSimulator/App.app"),
            TargetKind::Simulator
        );
        assert_eq!(
            TargetKind::from_app_path("/out/Debug-iphoneos/App.app"),
            TargetKind::Device
        );
    }

    #[test]
    fn simulator_plan_boots_before_installing() {
        let names: Vec<_> = plan(TargetKind::Simulator)
            .steps()
            .iter()
            .map(|step| step.name)
            .collect();
        assert_eq!(names, vec!["boot", "install", "launch"]);

        let device = plan(TargetKind::Device);
        assert_eq!(device.steps().len(), 2);
        assert!(device.steps()[1]
            .invocation
            .command_line()
            .contains("--start-stopped"));
    }

    #[tokio::test]
    async fn abort_policy_skips_steps_after_a_failure() {
        let runner = ScriptedCommandRunner::new()
            .respond("xcrun simctl bootstatus", CommandOutput::success(""))
            .respond(
                "xcrun simctl install",
                CommandOutput::failure(22, "Invalid app bundle"),
            )
            .respond("xcrun simctl launch", CommandOutput::success(""));

        let report = plan(TargetKind::Simulator)
            .execute(&runner, DeployFailurePolicy::Abort)
            .await;

        assert_eq!(statuses(&report), vec!["succeeded", "failed", "skipped"]);
        assert_eq!(runner.command_lines().len(), 2);
        assert!(!report.succeeded());
        match report.failure_error() {
            Some(RunnerError::DeployFailed {
                step,
                exit_code,
                output,
            }) => {
                assert_eq!(step, "install");
                assert_eq!(exit_code, Some(22));
                assert_eq!(output, "Invalid app bundle");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn continue_policy_runs_every_step() {
        let runner = ScriptedCommandRunner::new()
            .respond(
                "xcrun simctl bootstatus",
                CommandOutput::failure(149, "already booted"),
            )
            .respond("xcrun simctl install", CommandOutput::success(""))
            .respond("xcrun simctl launch", CommandOutput::success("com.example.App: 4242"));

        let report = plan(TargetKind::Simulator)
            .execute(&runner, DeployFailurePolicy::Continue)
            .await;

        assert_eq!(statuses(&report), vec!["failed", "succeeded", "succeeded"]);
        assert_eq!(runner.command_lines().len(), 3);
        assert_eq!(report.first_failure().map(|o| o.step), Some("boot"));
    }

    #[tokio::test]
    async fn spawn_error_counts_as_step_failure() {
        let runner = ScriptedCommandRunner::new();

        let report = plan(TargetKind::Device)
            .execute(&runner, DeployFailurePolicy::Abort)
            .await;

        assert_eq!(statuses(&report), vec!["failed", "skipped"]);
        assert_eq!(report.target, TargetKind::Device);
    }
}
