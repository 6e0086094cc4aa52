//! Interchangeable device enumeration strategies.
use crate::{
    config::{DeviceListerKind, IdentifierValidation, ToolchainSection},
    lib::{
        errors::RunnerError,
        process::{CommandOutput, Invocation},
        xcrun::{self, XcrunCommandConfig},
    },
    runner::parsers::{parse_json_devices, parse_text_devices, DeviceRegistry},
};

/// A command that enumerates devices plus the parser for its output.
pub trait DeviceLister {
    fn kind(&self) -> DeviceListerKind;

    fn invocation(&self, toolchain: &ToolchainSection) -> Invocation;

    fn parse(&self, output: &CommandOutput) -> Result<DeviceRegistry, RunnerError>;
}

/// `xcrun simctl list devices --json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimctlDeviceLister;

impl DeviceLister for SimctlDeviceLister {
    fn kind(&self) -> DeviceListerKind {
        DeviceListerKind::Simctl
    }

    fn invocation(&self, toolchain: &ToolchainSection) -> Invocation {
        xcrun::simctl_list_devices(xcrun_config(toolchain))
    }

    fn parse(&self, output: &CommandOutput) -> Result<DeviceRegistry, RunnerError> {
        parse_json_devices(&output.stdout)
    }
}

/// `xcrun xctrace list devices`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XctraceDeviceLister {
    pub validation: IdentifierValidation,
}

impl DeviceLister for XctraceDeviceLister {
    fn kind(&self) -> DeviceListerKind {
        DeviceListerKind::Xctrace
    }

    fn invocation(&self, toolchain: &ToolchainSection) -> Invocation {
        xcrun::xctrace_list_devices(xcrun_config(toolchain))
    }

    fn parse(&self, output: &CommandOutput) -> Result<DeviceRegistry, RunnerError> {
        // Older xctrace releases print the listing on stderr.
        let listing = if output.stdout.trim().is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        parse_text_devices(listing, self.validation)
    }
}

/// Lister selected by configuration.
pub fn device_lister(
    kind: DeviceListerKind,
    validation: IdentifierValidation,
) -> Box<dyn DeviceLister> {
    match kind {
        DeviceListerKind::Simctl => Box::new(SimctlDeviceLister),
        DeviceListerKind::Xctrace => Box::new(XctraceDeviceLister { validation }),
    }
}

pub(crate) fn xcrun_config(toolchain: &ToolchainSection) -> XcrunCommandConfig<'_> {
    XcrunCommandConfig {
        xcrun_path: &toolchain.xcrun_path,
        timeout: toolchain.query_timeout(),
    }
}
