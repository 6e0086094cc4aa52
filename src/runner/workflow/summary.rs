use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::runner::{
    deploy::{DeployReport, TargetKind},
    project::ProjectKind,
};

/// Outcome of a completed run, printed as JSON by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub project: PathBuf,
    pub project_kind: ProjectKind,
    pub scheme: String,
    pub device_name: String,
    pub device_id: String,
    pub target: TargetKind,
    pub app_path: String,
    pub bundle_identifier: String,
    pub deploy: DeployReport,
}
