//! Shared library modules providing error types, process execution, command builders, and telemetry.

pub mod errors;
pub mod process;
pub mod telemetry;
pub mod xcodebuild;
pub mod xcrun;
