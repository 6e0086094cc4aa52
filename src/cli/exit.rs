use std::process::ExitCode;

use anyhow::Error;

use crate::{lib::errors::ConfigError, runner::WorkflowError};

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        let message = if let Some(workflow) = err.downcast_ref::<WorkflowError>() {
            Self::workflow_message(workflow)
        } else if err.downcast_ref::<ConfigError>().is_some() {
            err.to_string()
        } else {
            format!("{err:#}")
        };
        Self {
            message,
            exit_code: ExitCode::FAILURE,
        }
    }

    /// Stage failure plus a remediation hint when one applies.
    fn workflow_message(err: &WorkflowError) -> String {
        match err.source.remediation() {
            Some(hint) => format!("{err}\nhint: {hint}"),
            None => err.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn report(self) -> ExitCode {
        eprintln!("{}", self.message);
        self.exit_code
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{lib::errors::RunnerError, runner::WorkflowStage};

    #[test]
    fn workflow_failure_carries_stage_and_hint() {
        let exit = RuntimeExit::from_error(WorkflowError::new(
            WorkflowStage::LocateProject,
            RunnerError::ProjectNotFound {
                dir: PathBuf::from("/tmp/empty"),
            },
        ));

        assert!(exit.message().starts_with("locate_project failed: No .xcworkspace"));
        assert!(exit.message().contains("hint: "));
    }

    #[test]
    fn anyhow_wrapped_workflow_error_keeps_hint() {
        let err = Error::new(WorkflowError::new(
            WorkflowStage::ListDevices,
            RunnerError::NoDevicesFound,
        ));
        let exit = RuntimeExit::from_error(err);
        assert!(exit.message().contains("--lister"), "{}", exit.message());
    }
}
