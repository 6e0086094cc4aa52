//! The locate → select → build → deploy state machine.
use std::{future::Future, path::Path};

use tracing::{info, Instrument};
use uuid::Uuid;

use crate::{
    config::{DeployFailurePolicy, RunnerConfig, SchemeSelection},
    lib::{errors::RunnerError, process::CommandRunner, telemetry::StageSpan},
    runner::{
        deploy::{DeployPlan, DeployReport, DeployTarget, TargetKind},
        listers::{device_lister, xcrun_config},
        parsers::{parse_build_settings, parse_schemes, BuildSettings, DeviceRegistry},
        project::{locate_project, ProjectDescriptor},
        selector::Chooser,
        toolchain::Toolchain,
    },
};

mod stage;
mod summary;

pub use stage::{WorkflowError, WorkflowStage};
pub use summary::RunSummary;

pub const SCHEME_PROMPT: &str = "Select a Scheme";
pub const DEVICE_PROMPT: &str = "Select a Device";

/// How the scheme gets picked for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeChoice {
    Interactive,
    First,
    Named(String),
}

impl SchemeChoice {
    /// A named scheme wins over the configured selection policy.
    pub fn resolve(named: Option<&str>, selection: SchemeSelection) -> Self {
        match (named, selection) {
            (Some(name), _) => SchemeChoice::Named(name.to_string()),
            (None, SchemeSelection::First) => SchemeChoice::First,
            (None, SchemeSelection::Interactive) => SchemeChoice::Interactive,
        }
    }
}

/// Per-run choices made on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub scheme: Option<String>,
    pub device: Option<String>,
}

pub struct Workflow<'a, R, C> {
    runner: &'a R,
    chooser: &'a C,
    config: &'a RunnerConfig,
    project_dir: &'a Path,
    options: WorkflowOptions,
    run_id: Uuid,
}

impl<'a, R, C> Workflow<'a, R, C>
where
    R: CommandRunner,
    C: Chooser,
{
    pub fn new(
        runner: &'a R,
        chooser: &'a C,
        config: &'a RunnerConfig,
        project_dir: &'a Path,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            runner,
            chooser,
            config,
            project_dir,
            options,
            run_id: Uuid::new_v4(),
        }
    }

    /// Drive every stage in order, stopping at the first failure.
    pub async fn run(&self) -> Result<RunSummary, WorkflowError> {
        let (project, schemes) = self.detect_schemes().await?;
        let scheme = self
            .stage(WorkflowStage::SelectScheme, async { self.select_scheme(&schemes) })
            .await?;

        let registry = self.detect_devices().await?;
        let (device_name, device_id) = self
            .stage(WorkflowStage::SelectDevice, async {
                self.select_device(&registry)
            })
            .await?;
        info!(
            target: "xcode_runner::workflow",
            run_id = %self.run_id,
            scheme = %scheme,
            device = %device_name,
            device_id = %device_id,
            "Selected scheme and device"
        );

        let settings = self
            .stage(
                WorkflowStage::QueryBuildSettings,
                self.query_build_settings(&project, &scheme, &device_id),
            )
            .await?;
        let app_path = settings.app_path();
        let target = TargetKind::from_app_path(&app_path);

        self.stage(
            WorkflowStage::Build,
            self.toolchain().build(
                &project,
                &scheme,
                &device_id,
                self.config.workflow.configuration,
            ),
        )
        .await?;

        let deploy = self
            .stage(
                WorkflowStage::DeployOrLaunch,
                self.deploy(target, &device_id, &app_path, &settings),
            )
            .await?;

        Ok(RunSummary {
            run_id: self.run_id,
            project: project.path(),
            project_kind: project.kind,
            scheme,
            device_name,
            device_id,
            target,
            app_path,
            bundle_identifier: settings.bundle_identifier,
            deploy,
        })
    }

    /// Locate the project and list its schemes.
    pub async fn detect_schemes(
        &self,
    ) -> Result<(ProjectDescriptor, Vec<String>), WorkflowError> {
        let project = self
            .stage(WorkflowStage::LocateProject, async {
                locate_project(self.project_dir)
            })
            .await?;
        let schemes = self
            .stage(WorkflowStage::ListSchemes, async {
                let listing = self.toolchain().list_schemes(&project).await?;
                parse_schemes(&listing)
            })
            .await?;
        Ok((project, schemes))
    }

    /// List devices with the configured lister.
    pub async fn detect_devices(&self) -> Result<DeviceRegistry, WorkflowError> {
        let lister = device_lister(
            self.config.workflow.device_lister,
            self.config.workflow.identifier_validation,
        );
        let toolchain = self.toolchain();
        let registry = self
            .stage(
                WorkflowStage::ListDevices,
                toolchain.list_devices(lister.as_ref()),
            )
            .await?;
        Ok(registry)
    }

    fn toolchain(&self) -> Toolchain<'a, R> {
        Toolchain::new(self.runner, &self.config.toolchain)
    }

    fn select_scheme(&self, schemes: &[String]) -> Result<String, RunnerError> {
        let choice = SchemeChoice::resolve(
            self.options.scheme.as_deref(),
            self.config.workflow.scheme_selection,
        );
        match choice {
            SchemeChoice::Named(name) => {
                if schemes.contains(&name) {
                    Ok(name)
                } else {
                    Err(RunnerError::SchemeNotFound { scheme: name })
                }
            }
            SchemeChoice::First => schemes.first().cloned().ok_or(RunnerError::NoSchemesFound),
            SchemeChoice::Interactive => self.chooser.choose(SCHEME_PROMPT, schemes),
        }
    }

    fn select_device(&self, registry: &DeviceRegistry) -> Result<(String, String), RunnerError> {
        let name = match &self.options.device {
            Some(name) => name.clone(),
            None => self.chooser.choose(DEVICE_PROMPT, &registry.names())?,
        };
        match registry.get(&name) {
            Some(udid) => {
                let udid = udid.to_string();
                Ok((name, udid))
            }
            None => Err(RunnerError::DeviceNotFound { name }),
        }
    }

    async fn query_build_settings(
        &self,
        project: &ProjectDescriptor,
        scheme: &str,
        device_id: &str,
    ) -> Result<BuildSettings, RunnerError> {
        let raw = self
            .toolchain()
            .show_build_settings(project, scheme, device_id)
            .await?;
        let settings = parse_build_settings(&raw)?;
        settings.ensure_complete()?;
        Ok(settings)
    }

    async fn deploy(
        &self,
        target: TargetKind,
        device_id: &str,
        app_path: &str,
        settings: &BuildSettings,
    ) -> Result<DeployReport, RunnerError> {
        let policy = self.config.workflow.deploy_failure;
        let plan = DeployPlan::new(
            target,
            xcrun_config(&self.config.toolchain),
            DeployTarget {
                udid: device_id,
                app_path,
                bundle_identifier: &settings.bundle_identifier,
            },
            self.config.workflow.launch_start_stopped,
        );
        info!(
            target: "xcode_runner::workflow",
            run_id = %self.run_id,
            target_kind = target.as_str(),
            steps = plan.steps().len(),
            "Deploying build"
        );

        let report = plan.execute(self.runner, policy).await;
        if policy == DeployFailurePolicy::Abort {
            if let Some(err) = report.failure_error() {
                return Err(err);
            }
        }
        Ok(report)
    }

    async fn stage<T, F>(&self, stage: WorkflowStage, work: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, RunnerError>>,
    {
        let span = StageSpan::start(self.run_id, stage.as_str());
        let result = work.instrument(span.span().clone()).await;
        span.finish(if result.is_ok() { "ok" } else { "error" });
        result.map_err(|source| WorkflowError::new(stage, source))
    }
}
