//! Telemetry initialization and workflow stage span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record start and finish of a single workflow stage.
pub struct StageSpan {
    span: Span,
    started_at: Instant,
    run_id: Uuid,
    stage: &'static str,
}

impl StageSpan {
    /// Start a stage span.
    pub fn start(run_id: Uuid, stage: &'static str) -> Self {
        let span = info_span!(
            target: "xcode_runner::workflow",
            "workflow_stage",
            %run_id,
            stage
        );
        Self {
            span,
            started_at: Instant::now(),
            run_id,
            stage,
        }
    }

    /// The span to enter while the stage runs.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the span while recording the stage status.
    pub fn finish(self, status: &'static str) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "xcode_runner::workflow",
            run_id = %self.run_id,
            stage = self.stage,
            status = status,
            elapsed_ms = elapsed_ms,
            "Completed workflow stage"
        );
    }
}

/// Payload for logging the resolved run profile as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RunProfileTelemetry<'a> {
    pub project_dir: &'a str,
    pub config_path: Option<&'a str>,
    pub device_lister: &'a str,
    pub scheme_selection: &'a str,
    pub configuration: &'a str,
    pub launch_args: &'a [String],
}

/// Emit the run profile to `tracing`.
pub fn emit_run_profile(telemetry: &RunProfileTelemetry<'_>) {
    info!(
        target: "xcode_runner::runtime",
        project_dir = telemetry.project_dir,
        config_path = telemetry.config_path.unwrap_or("<defaults>"),
        device_lister = telemetry.device_lister,
        scheme_selection = telemetry.scheme_selection,
        configuration = telemetry.configuration,
        launch_args = ?telemetry.launch_args,
        "Starting xcode-runner"
    );
}
