use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::lib::errors::RunnerError;

/// Workflow stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    LocateProject,
    ListSchemes,
    SelectScheme,
    ListDevices,
    SelectDevice,
    QueryBuildSettings,
    Build,
    DeployOrLaunch,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::LocateProject => "locate_project",
            WorkflowStage::ListSchemes => "list_schemes",
            WorkflowStage::SelectScheme => "select_scheme",
            WorkflowStage::ListDevices => "list_devices",
            WorkflowStage::SelectDevice => "select_device",
            WorkflowStage::QueryBuildSettings => "query_build_settings",
            WorkflowStage::Build => "build",
            WorkflowStage::DeployOrLaunch => "deploy_or_launch",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runner failure tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct WorkflowError {
    pub stage: WorkflowStage,
    #[source]
    pub source: RunnerError,
}

impl WorkflowError {
    pub fn new(stage: WorkflowStage, source: RunnerError) -> Self {
        Self { stage, source }
    }
}
