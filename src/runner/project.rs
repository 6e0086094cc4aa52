//! Detection of the Xcode workspace or project in a directory.
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::warn;

use crate::lib::{errors::RunnerError, xcodebuild::XcodebuildProject};

pub const WORKSPACE_EXTENSION: &str = "xcworkspace";
pub const PROJECT_EXTENSION: &str = "xcodeproj";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Workspace,
    Project,
}

impl ProjectKind {
    /// The `xcodebuild` flag that selects this kind of descriptor.
    pub fn flag(&self) -> &'static str {
        match self {
            ProjectKind::Workspace => "-workspace",
            ProjectKind::Project => "-project",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Workspace => "workspace",
            ProjectKind::Project => "project",
        }
    }
}

/// The descriptor every `xcodebuild` call is pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    pub kind: ProjectKind,
    /// Entry name, e.g. `App.xcworkspace`.
    pub name: String,
    pub directory: PathBuf,
}

impl ProjectDescriptor {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }

    pub fn as_xcodebuild_project(&self) -> XcodebuildProject<'_> {
        XcodebuildProject {
            flag: self.kind.flag(),
            name: &self.name,
            directory: &self.directory,
        }
    }
}

/// Find the workspace or project in `dir`. Workspaces win over projects.
pub fn locate_project(dir: &Path) -> Result<ProjectDescriptor, RunnerError> {
    let entries = fs::read_dir(dir).map_err(|source| RunnerError::ProjectScan {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut workspaces = Vec::new();
    let mut projects = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RunnerError::ProjectScan {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(WORKSPACE_EXTENSION) => workspaces.push(name),
            Some(PROJECT_EXTENSION) => projects.push(name),
            _ => {}
        }
    }

    let (kind, mut candidates) = if !workspaces.is_empty() {
        (ProjectKind::Workspace, workspaces)
    } else if !projects.is_empty() {
        (ProjectKind::Project, projects)
    } else {
        return Err(RunnerError::ProjectNotFound {
            dir: dir.to_path_buf(),
        });
    };

    candidates.sort();
    if candidates.len() > 1 {
        warn!(
            target: "xcode_runner::workflow",
            kind = kind.as_str(),
            candidates = ?candidates,
            "Several candidates found; using the first in name order"
        );
    }
    let name = candidates.swap_remove(0);

    Ok(ProjectDescriptor {
        kind,
        name,
        directory: dir.to_path_buf(),
    })
}
