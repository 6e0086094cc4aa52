//! External command execution: invocation description, captured output, and runners.

use std::{
    cell::RefCell,
    io,
    path::PathBuf,
    process::{Output, Stdio},
    time::Duration,
};

use tokio::{process::Command, time};
use tracing::debug;

use crate::lib::errors::RunnerError;

/// Maximum number of characters of captured output kept in error messages.
pub const OUTPUT_EXCERPT_LIMIT: usize = 5_000;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Human-readable command line used in logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.kill_on_drop(true);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command
    }
}

/// Exit status and captured streams of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful exit with the given standard output.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed exit with the given code and standard error.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn from_process(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, trimmed to the last `OUTPUT_EXCERPT_LIMIT` characters.
    pub fn excerpt(&self) -> String {
        collect_log_excerpt(&self.stdout, &self.stderr, OUTPUT_EXCERPT_LIMIT)
    }

    /// Turn a nonzero exit into `ToolchainInvocationFailed`.
    pub fn ensure_success(self, invocation: &Invocation) -> Result<Self, RunnerError> {
        if self.succeeded() {
            return Ok(self);
        }
        Err(RunnerError::ToolchainInvocationFailed {
            command: invocation.command_line(),
            exit_code: self.exit_code,
            output: self.excerpt(),
        })
    }
}

/// Merge stdout/stderr and take at most `limit` characters from the end.
pub fn collect_log_excerpt(stdout: &str, stderr: &str, limit: usize) -> String {
    let mut combined = String::with_capacity(stdout.len() + stderr.len());
    combined.push_str(stdout);
    combined.push_str(stderr);
    let count = combined.chars().count();
    if count <= limit {
        return combined;
    }
    combined.chars().skip(count - limit).collect()
}

/// Abstraction over process execution so workflows can run against scripted output.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run to completion and capture stdout/stderr.
    async fn capture(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;

    /// Run to completion with stdout/stderr passed through to the terminal.
    /// The returned output carries only the exit code.
    async fn stream(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;
}

/// Runner that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn capture(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let mut command = invocation.to_command();
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        debug!(
            target: "xcode_runner::toolchain",
            command = %invocation.command_line(),
            "Running command"
        );

        let output = time::timeout(invocation.timeout, command.output())
            .await
            .map_err(|_| timeout_error(invocation))?
            .map_err(|source| spawn_error(invocation, source))?;
        Ok(CommandOutput::from_process(output))
    }

    async fn stream(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let mut command = invocation.to_command();
        command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        debug!(
            target: "xcode_runner::toolchain",
            command = %invocation.command_line(),
            "Running command with streamed output"
        );

        let mut child = command
            .spawn()
            .map_err(|source| spawn_error(invocation, source))?;
        let status = time::timeout(invocation.timeout, child.wait())
            .await
            .map_err(|_| timeout_error(invocation))?
            .map_err(|source| spawn_error(invocation, source))?;
        Ok(CommandOutput {
            exit_code: status.code(),
            ..CommandOutput::default()
        })
    }
}

fn timeout_error(invocation: &Invocation) -> RunnerError {
    RunnerError::CommandTimeout {
        command: invocation.command_line(),
        duration_secs: invocation.timeout.as_secs(),
    }
}

fn spawn_error(invocation: &Invocation, source: io::Error) -> RunnerError {
    RunnerError::CommandSpawn {
        command: invocation.command_line(),
        source,
    }
}

/// Runner that replays canned output, matched by command-line prefix.
///
/// Every invocation is recorded so callers can assert on the exact command
/// sequence. An invocation without a matching response fails as if the
/// program did not exist.
#[derive(Debug, Default)]
pub struct ScriptedCommandRunner {
    responses: Vec<(String, CommandOutput)>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `output` for every command line starting with `command_prefix`.
    /// Earlier registrations win.
    pub fn respond(mut self, command_prefix: impl Into<String>, output: CommandOutput) -> Self {
        self.responses.push((command_prefix.into(), output));
        self
    }

    /// Command lines seen so far, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Invocations seen so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    fn replay(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.calls.borrow_mut().push(invocation.clone());
        let line = invocation.command_line();
        self.responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .ok_or_else(|| {
                spawn_error(
                    invocation,
                    io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
                )
            })
    }
}

impl CommandRunner for ScriptedCommandRunner {
    async fn capture(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.replay(invocation)
    }

    async fn stream(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.replay(invocation).map(|output| CommandOutput {
            exit_code: output.exit_code,
            ..CommandOutput::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        Invocation::new("xcrun", Duration::from_secs(5))
            .args(["simctl", "launch"])
            .arg("iPhone 15")
    }

    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        assert_eq!(
            invocation().command_line(),
            "xcrun simctl launch \"iPhone 15\""
        );
    }

    #[test]
    fn excerpt_keeps_the_tail_of_combined_output() {
        assert_eq!(collect_log_excerpt("abc", "def", 4), "cdef");
        assert_eq!(collect_log_excerpt("ab", "", 10), "ab");
    }

    #[test]
    fn ensure_success_wraps_nonzero_exit_with_output() {
        let err = CommandOutput::failure(70, "boom")
            .ensure_success(&invocation())
            .expect_err("nonzero exit should fail");

        match err {
            RunnerError::ToolchainInvocationFailed {
                command,
                exit_code,
                output,
            } => {
                assert_eq!(command, "xcrun simctl launch \"iPhone 15\"");
                assert_eq!(exit_code, Some(70));
                assert_eq!(output, "boom");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn scripted_runner_records_calls_and_rejects_unknown_commands() {
        let runner = ScriptedCommandRunner::new()
            .respond("xcrun simctl", CommandOutput::success("ok"));

        let output = runner.capture(&invocation()).await.expect("scripted");
        assert_eq!(output.stdout, "ok");

        let unknown = Invocation::new("xcodebuild", Duration::from_secs(5)).arg("-list");
        let err = runner
            .capture(&unknown)
            .await
            .expect_err("unscripted command should fail");
        assert!(matches!(err, RunnerError::CommandSpawn { .. }));

        assert_eq!(
            runner.command_lines(),
            vec![
                "xcrun simctl launch \"iPhone 15\"".to_string(),
                "xcodebuild -list".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn system_runner_enforces_the_deadline() {
        let sleeper = Invocation::new("sleep", Duration::from_secs(1)).arg("5");

        for streamed in [false, true] {
            let result = if streamed {
                SystemCommandRunner.stream(&sleeper).await
            } else {
                SystemCommandRunner.capture(&sleeper).await
            };
            match result {
                Err(RunnerError::CommandTimeout {
                    command,
                    duration_secs,
                }) => {
                    assert_eq!(command, "sleep 5");
                    assert_eq!(duration_secs, 1);
                }
                other => panic!("Unexpected result (streamed={streamed}): {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn system_runner_captures_both_streams_on_nonzero_exit() {
        let failing = Invocation::new("sh", Duration::from_secs(10))
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");

        let output = SystemCommandRunner
            .capture(&failing)
            .await
            .expect("process should run");

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(!output.succeeded());
        assert!(matches!(
            output.ensure_success(&failing),
            Err(RunnerError::ToolchainInvocationFailed {
                exit_code: Some(3),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn system_runner_reports_missing_program_as_spawn_error() {
        let missing = Invocation::new(
            "/nonexistent/xcode-runner-test-binary",
            Duration::from_secs(5),
        );
        let err = SystemCommandRunner
            .capture(&missing)
            .await
            .expect_err("missing program should fail");
        assert!(matches!(err, RunnerError::CommandSpawn { .. }));
    }
}
