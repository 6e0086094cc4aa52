//! Project detection, toolchain queries, selection, and the build/deploy workflow.
pub mod deploy;
pub mod listers;
pub mod parsers;
pub mod project;
pub mod selector;
pub mod toolchain;
pub mod workflow;

pub use deploy::{DeployPlan, DeployReport, StepOutcome, StepStatus, TargetKind};
pub use listers::{device_lister, DeviceLister, SimctlDeviceLister, XctraceDeviceLister};
pub use project::{locate_project, ProjectDescriptor, ProjectKind};
pub use selector::{Chooser, ScriptedChooser, TerminalChooser};
pub use toolchain::Toolchain;
pub use workflow::{RunSummary, Workflow, WorkflowError, WorkflowOptions, WorkflowStage};
