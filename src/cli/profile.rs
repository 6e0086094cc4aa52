//! LaunchProfile and project/config path resolution.
use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    config::{ConfigLocation, WorkflowOverrides, CONFIG_ENV_KEY, DEFAULT_CONFIG_FILE},
    runner::WorkflowOptions,
};

/// Resolved launch profile.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub project_dir: PathBuf,
    pub config_location: ConfigLocation,
    pub overrides: WorkflowOverrides,
    pub scheme: Option<String>,
    pub device: Option<String>,
    pub launch_args: Vec<String>,
}

impl LaunchProfile {
    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            scheme: self.scheme.clone(),
            device: self.device.clone(),
        }
    }
}

/// `--dir` made absolute, or the current directory.
pub fn resolve_project_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok(absolutize(dir.unwrap_or_else(|| cwd.clone()), &cwd))
}

/// Resolve the config file in the order: CLI override → env var → project default.
pub fn resolve_config_location(
    override_path: Option<PathBuf>,
    project_dir: &Path,
) -> Result<ConfigLocation> {
    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok(resolve_config_location_from(
        override_path,
        env::var_os(CONFIG_ENV_KEY),
        project_dir,
        &cwd,
    ))
}

/// Environment-free core of [`resolve_config_location`].
pub fn resolve_config_location_from(
    override_path: Option<PathBuf>,
    env_value: Option<OsString>,
    project_dir: &Path,
    cwd: &Path,
) -> ConfigLocation {
    let explicit = override_path.or_else(|| {
        env_value
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    });
    match explicit {
        Some(path) => ConfigLocation {
            path: absolutize(path, cwd),
            required: true,
        },
        None => ConfigLocation {
            path: project_dir.join(DEFAULT_CONFIG_FILE),
            required: false,
        },
    }
}

/// Build launch arguments suitable for reproduction/logging.
pub fn build_launch_args(
    project_dir: &Path,
    config: &Path,
    scheme: Option<&str>,
    device: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        format!("--dir={}", project_dir.display()),
        format!("--config={}", config.display()),
    ];
    if let Some(scheme) = scheme {
        args.push(format!("--scheme={scheme}"));
    }
    if let Some(device) = device {
        args.push(format!("--device={device}"));
    }
    args
}

fn absolutize(path: PathBuf, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
