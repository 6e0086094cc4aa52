//! Parsers turning raw toolchain output into schemes, device registries, and build settings.
pub mod devices;
pub mod schemes;
pub mod settings;

pub use devices::{parse_json_devices, parse_text_devices, Device, DeviceRegistry};
pub use schemes::{parse_schemes, SCHEMES_MARKER};
pub use settings::{parse_build_settings, BuildSettings};
