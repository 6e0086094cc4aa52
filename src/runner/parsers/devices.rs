//! Device listing parsers for `simctl` JSON and `xctrace` text output.
use std::{
    collections::{btree_map, BTreeMap},
    sync::OnceLock,
};

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::IdentifierValidation, lib::errors::RunnerError};

/// Prefix of every `xctrace` section header.
pub const SECTION_PREFIX: &str = "== ";
pub const DEVICES_SECTION: &str = "== Devices ==";
pub const SIMULATORS_SECTION: &str = "== Simulators ==";
pub const OFFLINE_SECTION: &str = "== Devices Offline ==";

/// One device record as reported by the toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub udid: String,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
}

/// Display name → identifier for every available device, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an available device; a later device with the same name replaces
    /// the earlier one. Returns `false` when the device was unavailable.
    pub fn insert(&mut self, device: Device) -> bool {
        if !device.is_available {
            return false;
        }
        self.devices.insert(device.name, device.udid);
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.devices.get(name).map(String::as_str)
    }

    pub fn names(&self) -> Vec<String> {
        self.devices.keys().cloned().collect()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct DeviceListing {
    // Sorted keys make the duplicate-name tie-break deterministic.
    devices: BTreeMap<String, Vec<Device>>,
}

/// Parse `xcrun simctl list devices --json`.
pub fn parse_json_devices(output: &str) -> Result<DeviceRegistry, RunnerError> {
    let listing: DeviceListing =
        serde_json::from_str(output).map_err(|err| RunnerError::ParseFailed {
            what: "simctl device listing",
            message: err.to_string(),
        })?;

    let mut registry = DeviceRegistry::new();
    for device in listing.devices.into_values().flatten() {
        registry.insert(device);
    }

    if registry.is_empty() {
        return Err(RunnerError::NoDevicesFound);
    }
    Ok(registry)
}

/// Parse `xcrun xctrace list devices`.
///
/// Only lines under the `Devices` and `Simulators` sections are considered;
/// offline devices are never listed.
pub fn parse_text_devices(
    output: &str,
    validation: IdentifierValidation,
) -> Result<DeviceRegistry, RunnerError> {
    let mut registry = DeviceRegistry::new();
    let mut section = "";
    for line in output.lines() {
        let line = line.trim_end();
        if line.starts_with(SECTION_PREFIX) {
            section = line.trim();
            continue;
        }
        if line.trim().is_empty() || section == OFFLINE_SECTION {
            continue;
        }
        if section != DEVICES_SECTION && section != SIMULATORS_SECTION {
            continue;
        }
        if let Some(device) = parse_device_line(line, validation) {
            registry.insert(device);
        }
    }

    if registry.is_empty() {
        return Err(RunnerError::NoDevicesFound);
    }
    Ok(registry)
}

/// `Name (version) (identifier)` → device, if the identifier is acceptable.
fn parse_device_line(line: &str, validation: IdentifierValidation) -> Option<Device> {
    let open = line.rfind('(')?;
    let udid = line[open + 1..].trim().trim_end_matches(')').trim();

    let mut name = line[..open].trim_end();
    if let Some(version_open) = name.rfind('(') {
        name = &name[..version_open];
    }
    let name = name.trim();

    if name.is_empty() || !is_acceptable_identifier(udid, validation) {
        return None;
    }
    Some(Device {
        name: name.to_string(),
        udid: udid.to_string(),
        is_available: true,
    })
}

/// Simulator UUIDs, `8-16` ECIDs, and 40-hex UDIDs of older devices.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}|[0-9A-Fa-f]{8}-[0-9A-Fa-f]{16}|[0-9A-Fa-f]{40})$",
        )
        .expect("identifier pattern is valid")
    })
}

fn is_acceptable_identifier(udid: &str, validation: IdentifierValidation) -> bool {
    if identifier_pattern().is_match(udid) {
        return true;
    }
    match validation {
        IdentifierValidation::Strict => false,
        IdentifierValidation::Permissive => {
            !udid.is_empty()
                && (udid.contains('-')
                    || udid
                        .chars()
                        .any(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)))
        }
    }
}
