//! Single-choice selection, either at the terminal or from a script.
use std::{cell::RefCell, collections::VecDeque};

use dialoguer::{theme::ColorfulTheme, Select};
use tracing::warn;

use crate::lib::errors::RunnerError;

/// Picks one entry out of an ordered list of choices.
pub trait Chooser {
    fn choose(&self, label: &str, choices: &[String]) -> Result<String, RunnerError>;
}

/// Arrow-key list prompt on the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalChooser;

impl Chooser for TerminalChooser {
    fn choose(&self, label: &str, choices: &[String]) -> Result<String, RunnerError> {
        if choices.is_empty() {
            return Err(aborted(label));
        }

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .items(choices)
            .default(0)
            .interact_opt()
            .map_err(|err| {
                warn!(
                    target: "xcode_runner::workflow",
                    label,
                    reason = %err,
                    "Prompt failed"
                );
                aborted(label)
            })?;

        selection
            .and_then(|index| choices.get(index).cloned())
            .ok_or_else(|| aborted(label))
    }
}

/// Chooser that replays prepared answers in order.
///
/// Each call consumes one answer; a cancelled answer or an exhausted script
/// aborts the selection. Answers are returned as-is, even when they are not
/// among the offered choices.
#[derive(Debug, Default)]
pub struct ScriptedChooser {
    answers: RefCell<VecDeque<Option<String>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedChooser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, choice: impl Into<String>) -> Self {
        self.answers.borrow_mut().push_back(Some(choice.into()));
        self
    }

    /// Simulate the operator cancelling the prompt.
    pub fn cancel(self) -> Self {
        self.answers.borrow_mut().push_back(None);
        self
    }

    /// Labels of the prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&self, label: &str, choices: &[String]) -> Result<String, RunnerError> {
        if choices.is_empty() {
            return Err(aborted(label));
        }
        self.prompts.borrow_mut().push(label.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .flatten()
            .ok_or_else(|| aborted(label))
    }
}

fn aborted(label: &str) -> RunnerError {
    RunnerError::SelectionAborted {
        label: label.to_string(),
    }
}
