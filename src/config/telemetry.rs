use std::path::Path;

use tracing::{debug, info};

use super::{RunnerConfig, CONFIG_ENV_KEY, DEFAULT_CONFIG_FILE};

pub fn log_default_used(path: &Path) {
    debug!(
        target: "xcode_runner::config",
        path = %path.display(),
        env = CONFIG_ENV_KEY,
        default = DEFAULT_CONFIG_FILE,
        "No configuration file found; using built-in defaults"
    );
}

pub fn log_loaded(config: &RunnerConfig) {
    info!(
        target: "xcode_runner::config",
        path = %config
            .source_path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<defaults>".into()),
        xcodebuild_path = %config.toolchain.xcodebuild_path.display(),
        xcrun_path = %config.toolchain.xcrun_path.display(),
        max_build_minutes = config.toolchain.max_build_minutes,
        device_lister = config.workflow.device_lister.as_str(),
        configuration = config.workflow.configuration.as_str(),
        "Configuration loaded"
    );
}
