use serde::Serialize;
use serde_json::{Map, Value};

use crate::lib::errors::RunnerError;

pub const BUILT_PRODUCTS_DIR: &str = "BUILT_PRODUCTS_DIR";
pub const CONTENTS_FOLDER_PATH: &str = "CONTENTS_FOLDER_PATH";
pub const PRODUCT_BUNDLE_IDENTIFIER: &str = "PRODUCT_BUNDLE_IDENTIFIER";

/// The build settings the workflow consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSettings {
    pub built_products_dir: String,
    pub contents_folder_path: String,
    pub bundle_identifier: String,
}

impl BuildSettings {
    /// Location of the built `.app` bundle.
    pub fn app_path(&self) -> String {
        format!("{}/{}", self.built_products_dir, self.contents_folder_path)
    }

    /// Reject settings that resolve to an empty path component or bundle id.
    pub fn ensure_complete(&self) -> Result<(), RunnerError> {
        let fields = [
            (BUILT_PRODUCTS_DIR, &self.built_products_dir),
            (CONTENTS_FOLDER_PATH, &self.contents_folder_path),
            (PRODUCT_BUNDLE_IDENTIFIER, &self.bundle_identifier),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(RunnerError::MissingBuildSetting { field: *field }),
            None => Ok(()),
        }
    }
}

/// Parse `xcodebuild -showBuildSettings -json`, reading the first target only.
pub fn parse_build_settings(output: &str) -> Result<BuildSettings, RunnerError> {
    let records: Vec<Value> =
        serde_json::from_str(output).map_err(|err| RunnerError::ParseFailed {
            what: "build settings",
            message: err.to_string(),
        })?;

    let first = records.first().ok_or(RunnerError::ParseFailed {
        what: "build settings",
        message: "no build setting records".into(),
    })?;
    let settings = first
        .get("buildSettings")
        .and_then(Value::as_object)
        .ok_or(RunnerError::ParseFailed {
            what: "build settings",
            message: "first record has no `buildSettings` object".into(),
        })?;

    Ok(BuildSettings {
        built_products_dir: string_field(settings, BUILT_PRODUCTS_DIR)?,
        contents_folder_path: string_field(settings, CONTENTS_FOLDER_PATH)?,
        bundle_identifier: string_field(settings, PRODUCT_BUNDLE_IDENTIFIER)?,
    })
}

fn string_field(settings: &Map<String, Value>, field: &'static str) -> Result<String, RunnerError> {
    settings
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(RunnerError::MissingBuildSetting { field })
}
