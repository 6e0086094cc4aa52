use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Build configuration passed to `xcodebuild -configuration`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildConfiguration {
    #[default]
    Debug,
    Release,
}

impl BuildConfiguration {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::Release => "Release",
        }
    }
}

/// How the scheme is picked when none is named on the command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemeSelection {
    #[default]
    Interactive,
    /// Take the first declared scheme without prompting.
    First,
}

impl SchemeSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeSelection::Interactive => "interactive",
            SchemeSelection::First => "first",
        }
    }
}

/// Which toolchain command enumerates devices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceListerKind {
    /// `xcrun simctl list devices --json` (simulators only).
    Simctl,
    /// `xcrun xctrace list devices` (simulators and connected devices).
    #[default]
    Xctrace,
}

impl DeviceListerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceListerKind::Simctl => "simctl",
            DeviceListerKind::Xctrace => "xctrace",
        }
    }
}

/// Identifier check applied to `xctrace` device lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierValidation {
    /// UUIDs and `8-16` hex device identifiers only.
    #[default]
    Strict,
    /// Also accept any identifier containing a hyphen or a hex character.
    Permissive,
}

/// What happens when one install/launch step fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployFailurePolicy {
    /// Stop at the first failing step and fail the run.
    #[default]
    Abort,
    /// Run every step, log failures, and finish successfully.
    Continue,
}

/// `[workflow]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSection {
    pub configuration: BuildConfiguration,
    pub scheme_selection: SchemeSelection,
    pub device_lister: DeviceListerKind,
    pub identifier_validation: IdentifierValidation,
    pub deploy_failure: DeployFailurePolicy,
    pub launch_start_stopped: bool,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            configuration: BuildConfiguration::default(),
            scheme_selection: SchemeSelection::default(),
            device_lister: DeviceListerKind::default(),
            identifier_validation: IdentifierValidation::default(),
            deploy_failure: DeployFailurePolicy::default(),
            launch_start_stopped: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawWorkflowSection {
    pub configuration: Option<BuildConfiguration>,
    pub scheme_selection: Option<SchemeSelection>,
    pub device_lister: Option<DeviceListerKind>,
    pub identifier_validation: Option<IdentifierValidation>,
    pub deploy_failure: Option<DeployFailurePolicy>,
    pub launch_start_stopped: Option<bool>,
}

/// Command-line values that take precedence over the `[workflow]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOverrides {
    pub configuration: Option<BuildConfiguration>,
    pub scheme_selection: Option<SchemeSelection>,
    pub device_lister: Option<DeviceListerKind>,
    pub identifier_validation: Option<IdentifierValidation>,
    pub deploy_failure: Option<DeployFailurePolicy>,
}

pub fn parse_workflow_section(raw: Option<RawWorkflowSection>) -> WorkflowSection {
    let raw = raw.unwrap_or_default();
    let defaults = WorkflowSection::default();
    WorkflowSection {
        configuration: raw.configuration.unwrap_or(defaults.configuration),
        scheme_selection: raw.scheme_selection.unwrap_or(defaults.scheme_selection),
        device_lister: raw.device_lister.unwrap_or(defaults.device_lister),
        identifier_validation: raw
            .identifier_validation
            .unwrap_or(defaults.identifier_validation),
        deploy_failure: raw.deploy_failure.unwrap_or(defaults.deploy_failure),
        launch_start_stopped: raw
            .launch_start_stopped
            .unwrap_or(defaults.launch_start_stopped),
    }
}

impl WorkflowSection {
    pub fn apply_overrides(&mut self, overrides: &WorkflowOverrides) {
        if let Some(configuration) = overrides.configuration {
            self.configuration = configuration;
        }
        if let Some(selection) = overrides.scheme_selection {
            self.scheme_selection = selection;
        }
        if let Some(lister) = overrides.device_lister {
            self.device_lister = lister;
        }
        if let Some(validation) = overrides.identifier_validation {
            self.identifier_validation = validation;
        }
        if let Some(policy) = overrides.deploy_failure {
            self.deploy_failure = policy;
        }
    }
}
